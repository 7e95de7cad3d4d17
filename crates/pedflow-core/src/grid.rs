use crate::geom::BoundingBox;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Spatial cell size of a profile grid; the two axes may differ.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellSize {
    pub dx: f64,
    pub dy: f64,
}

impl Default for CellSize {
    fn default() -> Self {
        Self { dx: 0.2, dy: 0.2 }
    }
}

impl CellSize {
    pub fn uniform(size: f64) -> Self {
        Self { dx: size, dy: size }
    }
}

/// Strictly increasing bin boundaries along one axis.
///
/// Cell `i` is the half-open interval `[edges[i], edges[i + 1])`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BinEdges(Vec<f64>);

impl BinEdges {
    /// Steps from `min` by `step` until an edge at or beyond `max + step` has been emitted, so a
    /// value sitting exactly on `max` always lands inside the last cell.
    pub fn span(min: f64, max: f64, step: f64, max_cells: usize) -> Result<Self> {
        if !(step.is_finite() && step > 0.0) {
            return Err(Error::invalid_grid(format!(
                "cell size must be a positive finite number, got {step}"
            )));
        }
        if !(min.is_finite() && max.is_finite()) {
            return Err(Error::invalid_grid(format!(
                "axis bounds must be finite, got [{min}, {max}]"
            )));
        }
        if min > max {
            return Err(Error::invalid_grid(format!(
                "degenerate axis: min {min} > max {max}"
            )));
        }

        let upper = max + step;
        let expected_cells = ((upper - min) / step).ceil();
        if expected_cells > max_cells as f64 {
            return Err(Error::invalid_grid(format!(
                "axis [{min}, {max}] with step {step} needs about {expected_cells} cells, limit is {max_cells}"
            )));
        }

        let mut edges = Vec::with_capacity(expected_cells as usize + 2);
        let mut i = 0usize;
        loop {
            // Multiplying instead of accumulating keeps rounding error from drifting.
            let edge = min + (i as f64) * step;
            if edges.last().is_some_and(|&prev: &f64| edge <= prev) {
                return Err(Error::invalid_grid(format!(
                    "cell size {step} is below the floating point resolution at {edge}"
                )));
            }
            edges.push(edge);
            if edge >= upper {
                break;
            }
            i += 1;
        }
        Ok(Self(edges))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn cell_count(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    pub fn first(&self) -> Option<f64> {
        self.0.first().copied()
    }

    pub fn last(&self) -> Option<f64> {
        self.0.last().copied()
    }

    /// Index of the half-open cell containing `v`, or `None` when `v` lies outside every cell
    /// (including NaN).
    pub fn locate(&self, v: f64) -> Option<usize> {
        let first = self.first()?;
        let last = self.last()?;
        if !(v >= first && v < last) {
            return None;
        }
        // First edge strictly greater than `v`, minus one.
        let upper = self.0.partition_point(|&e| e <= v);
        Some(upper - 1)
    }
}

/// Upper bounds on grid size, checked before any cell storage is allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridLimits {
    pub max_bins_per_axis: usize,
    /// Limit on `rows * columns`.
    pub max_cells: usize,
}

pub const DEFAULT_MAX_BINS_PER_AXIS: usize = 100_000;
pub const DEFAULT_MAX_CELLS: usize = 10_000_000;

impl Default for GridLimits {
    fn default() -> Self {
        Self {
            max_bins_per_axis: DEFAULT_MAX_BINS_PER_AXIS,
            max_cells: DEFAULT_MAX_CELLS,
        }
    }
}

/// Bin edges for both axes of a profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grid {
    pub x: BinEdges,
    pub y: BinEdges,
}

impl Grid {
    pub fn columns(&self) -> usize {
        self.x.cell_count()
    }

    pub fn rows(&self) -> usize {
        self.y.cell_count()
    }

    /// `(row, column)` of the cell containing `(x, y)`.
    pub fn locate(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        Some((self.y.locate(y)?, self.x.locate(x)?))
    }
}

pub fn build_grid(bbox: &BoundingBox, cell: CellSize, limits: GridLimits) -> Result<Grid> {
    bbox.validate()?;
    let x = BinEdges::span(bbox.xmin, bbox.xmax, cell.dx, limits.max_bins_per_axis)?;
    let y = BinEdges::span(bbox.ymin, bbox.ymax, cell.dy, limits.max_bins_per_axis)?;
    let (columns, rows) = (x.cell_count(), y.cell_count());
    match columns.checked_mul(rows) {
        Some(cells) if cells <= limits.max_cells => {}
        _ => {
            return Err(Error::invalid_grid(format!(
                "{columns} x {rows} grid exceeds the limit of {} cells",
                limits.max_cells
            )));
        }
    }
    tracing::debug!(columns, rows, dx = cell.dx, dy = cell.dy, "built profile grid");
    Ok(Grid { x, y })
}
