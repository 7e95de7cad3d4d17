//! Fundamental diagram aggregation: per-frame means, windowed (density, velocity, flow) points
//! and pedestrian counts over time.
//!
//! Unlike the spatial profiles, frames without samples are left out of every series instead of
//! being filled with zeros.

use crate::sample::{FrameTagged, Sample};
use crate::window::ResolvedWindow;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use std::collections::BTreeMap;

/// Mean density and velocity of one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameMean {
    pub frame: i64,
    pub density: f64,
    pub velocity: f64,
    /// Distinct pedestrians recorded in the frame.
    pub pedestrians: usize,
}

/// One sample projected onto the fundamental diagram.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DiagramPoint {
    pub frame: i64,
    pub density: f64,
    pub velocity: f64,
    /// `density * velocity` of the same sample.
    pub flow: f64,
}

impl From<&Sample> for DiagramPoint {
    fn from(s: &Sample) -> Self {
        Self {
            frame: s.frame,
            density: s.density,
            velocity: s.velocity,
            flow: s.flow(),
        }
    }
}

/// Axis maxima over the whole dataset, independent of the window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DiagramMaxima {
    pub density: f64,
    pub velocity: f64,
    pub flow: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagramReport {
    pub window: ResolvedWindow,
    /// Per-frame means over the full dataset, ordered by frame.
    pub series: Vec<FrameMean>,
    /// Samples whose frame lies inside the window, in input order.
    pub points: Vec<DiagramPoint>,
    /// Series entry at the window's first frame, if that frame has samples.
    pub begin_marker: Option<FrameMean>,
    /// Series entry at the window's last frame, if that frame has samples.
    pub end_marker: Option<FrameMean>,
    pub maxima: Option<DiagramMaxima>,
}

pub fn frame_series(samples: &[Sample]) -> Vec<FrameMean> {
    #[derive(Default)]
    struct Slot {
        density: Vec<f64>,
        velocity: Vec<f64>,
        pedestrians: FxHashSet<i64>,
    }

    let mut by_frame: BTreeMap<i64, Slot> = BTreeMap::new();
    for s in samples {
        let slot = by_frame.entry(s.frame).or_default();
        slot.density.push(s.density);
        slot.velocity.push(s.velocity);
        slot.pedestrians.insert(s.pedestrian);
    }
    by_frame
        .into_iter()
        .map(|(frame, mut slot)| FrameMean {
            frame,
            density: ordered_mean(&mut slot.density),
            velocity: ordered_mean(&mut slot.velocity),
            pedestrians: slot.pedestrians.len(),
        })
        .collect()
}

/// Mean that does not depend on the order of `values`.
fn ordered_mean(values: &mut [f64]) -> f64 {
    values.sort_unstable_by(f64::total_cmp);
    values.iter().sum::<f64>() / values.len() as f64
}

pub fn diagram_points(samples: &[Sample], window: ResolvedWindow) -> Vec<DiagramPoint> {
    samples
        .iter()
        .filter(|s| window.contains(s.frame))
        .map(DiagramPoint::from)
        .collect()
}

pub fn diagram_maxima(samples: &[Sample]) -> Option<DiagramMaxima> {
    let first = samples.first()?;
    let init = DiagramMaxima {
        density: first.density,
        velocity: first.velocity,
        flow: first.flow(),
    };
    Some(samples.iter().skip(1).fold(init, |acc, s| DiagramMaxima {
        density: acc.density.max(s.density),
        velocity: acc.velocity.max(s.velocity),
        flow: acc.flow.max(s.flow()),
    }))
}

pub fn diagram(samples: &[Sample], window: ResolvedWindow) -> DiagramReport {
    let series = frame_series(samples);
    let marker = |frame: i64| {
        series
            .binary_search_by_key(&frame, |m| m.frame)
            .ok()
            .map(|i| series[i])
    };
    let begin_marker = marker(window.begin);
    let end_marker = marker(window.end);
    let points = diagram_points(samples, window);

    tracing::debug!(
        frames = series.len(),
        points = points.len(),
        begin = window.begin,
        end = window.end,
        "aggregated fundamental diagram"
    );

    DiagramReport {
        window,
        maxima: diagram_maxima(samples),
        series,
        points,
        begin_marker,
        end_marker,
    }
}

/// Number of distinct pedestrians present in one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CountPoint {
    pub frame: i64,
    /// Seconds when a framerate is known, otherwise the frame index.
    pub time: f64,
    pub count: usize,
}

pub fn pedestrian_count_series<T: FrameTagged>(
    records: &[T],
    framerate: Option<f64>,
) -> Vec<CountPoint> {
    let mut by_frame: FxHashMap<i64, FxHashSet<i64>> = FxHashMap::default();
    for r in records {
        by_frame.entry(r.frame()).or_default().insert(r.pedestrian());
    }
    let mut out: Vec<CountPoint> = by_frame
        .into_iter()
        .map(|(frame, peds)| CountPoint {
            frame,
            time: match framerate {
                Some(fps) if fps > 0.0 => frame as f64 / fps,
                _ => frame as f64,
            },
            count: peds.len(),
        })
        .collect();
    out.sort_unstable_by_key(|p| p.frame);
    out
}
