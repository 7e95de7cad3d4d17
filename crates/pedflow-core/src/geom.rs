use crate::{Error, Result};
use serde::Serialize;

/// Unit tag for facility (floor plan) coordinates, usually metres.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacilitySpace {}

pub type Point = euclid::Point2D<f64, FacilitySpace>;

pub fn point(x: f64, y: f64) -> Point {
    euclid::point2(x, y)
}

/// Axis-aligned extent of the facility walls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl BoundingBox {
    pub fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Self {
        Self {
            xmin,
            xmax,
            ymin,
            ymax,
        }
    }

    /// Returns `None` for an empty iterator.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point>) -> Option<Self> {
        let mut it = points.into_iter();
        let first = it.next()?;
        let mut bbox = Self::new(first.x, first.x, first.y, first.y);
        for p in it {
            bbox.xmin = bbox.xmin.min(p.x);
            bbox.xmax = bbox.xmax.max(p.x);
            bbox.ymin = bbox.ymin.min(p.y);
            bbox.ymax = bbox.ymax.max(p.y);
        }
        Some(bbox)
    }

    pub fn validate(&self) -> Result<()> {
        let bounds = [self.xmin, self.xmax, self.ymin, self.ymax];
        if bounds.iter().any(|v| !v.is_finite()) {
            return Err(Error::invalid_grid(format!(
                "bounding box has a non-finite bound: {self:?}"
            )));
        }
        if self.xmin > self.xmax {
            return Err(Error::invalid_grid(format!(
                "degenerate x extent: xmin {} > xmax {}",
                self.xmin, self.xmax
            )));
        }
        if self.ymin > self.ymax {
            return Err(Error::invalid_grid(format!(
                "degenerate y extent: ymin {} > ymax {}",
                self.ymin, self.ymax
            )));
        }
        Ok(())
    }

    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    /// Closed-interval containment on both axes.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.xmin && p.x <= self.xmax && p.y >= self.ymin && p.y <= self.ymax
    }
}
