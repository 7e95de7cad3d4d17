//! End-to-end pipelines: one call per request, fresh inputs in, fresh results out.

use crate::config::AnalysisConfig;
use crate::diagram::{DiagramReport, diagram};
use crate::field::{FieldSummary, ProfileFields, aggregate_fields};
use crate::geom::BoundingBox;
use crate::geometry::Geometry;
use crate::grid::{CellSize, Grid, build_grid};
use crate::sample::Sample;
use crate::window::{ResolvedWindow, select_window};
use crate::{Error, Result};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileReport {
    pub window: ResolvedWindow,
    pub cell_size: CellSize,
    /// Wall extent the grid was built from.
    pub extent: BoundingBox,
    pub grid: Grid,
    pub fields: ProfileFields,
    pub density_summary: FieldSummary,
    pub velocity_summary: FieldSummary,
    /// Samples inside the frame window (before spatial binning).
    pub windowed_samples: usize,
}

/// Density and velocity profiles over the facility for the configured frame window.
pub fn profile_report(
    geometry: &Geometry,
    samples: &[Sample],
    config: &AnalysisConfig,
) -> Result<ProfileReport> {
    if samples.is_empty() {
        return Err(Error::EmptyDataset {
            what: "no samples to build profiles from",
        });
    }
    let window = select_window(samples, config.window)?;
    let extent = geometry.bounding_box()?;
    let grid = build_grid(&extent, config.cell_size, config.grid_limits())?;

    let windowed: Vec<Sample> = samples
        .iter()
        .filter(|s| window.contains(s.frame))
        .cloned()
        .collect();
    let fields = aggregate_fields(&windowed, &grid);

    tracing::info!(
        begin = window.begin,
        end = window.end,
        samples = windowed.len(),
        dropped = fields.dropped,
        "profiles computed"
    );

    Ok(ProfileReport {
        window,
        cell_size: config.cell_size,
        extent,
        density_summary: fields.density.summary(),
        velocity_summary: fields.velocity.summary(),
        windowed_samples: windowed.len(),
        grid,
        fields,
    })
}

/// Fundamental diagram for the configured frame window.
pub fn diagram_report(samples: &[Sample], config: &AnalysisConfig) -> Result<DiagramReport> {
    if samples.is_empty() {
        return Err(Error::EmptyDataset {
            what: "no samples to build a fundamental diagram from",
        });
    }
    let window = select_window(samples, config.window)?;
    let report = diagram(samples, window);
    tracing::info!(
        begin = window.begin,
        end = window.end,
        frames = report.series.len(),
        points = report.points.len(),
        "fundamental diagram computed"
    );
    Ok(report)
}
