#![forbid(unsafe_code)]

//! Pedestrian trajectory analysis core (headless).
//!
//! Reads a JuPedSim facility geometry and individual fundamental diagram (IFD) measurements and
//! reduces them to:
//! - spatially binned density/velocity profiles over the floor plan ([`profile_report`])
//! - per-frame means and windowed (density, velocity, flow) points ([`diagram_report`])
//!
//! Every operation is deterministic and independent of sample order. Rendering, uploads and
//! file caching are left to the caller.

pub mod analysis;
pub mod config;
pub mod detect;
pub mod diagram;
pub mod error;
pub mod export;
pub mod field;
pub mod geom;
pub mod geometry;
pub mod grid;
pub mod sample;
pub mod trajectory;
pub mod window;

pub use analysis::{ProfileReport, diagram_report, profile_report};
pub use config::AnalysisConfig;
pub use detect::{FormatDetectorRegistry, InputFormat, detect_format};
pub use diagram::{CountPoint, DiagramPoint, DiagramReport, FrameMean, pedestrian_count_series};
pub use error::{Error, GeometryError, Result};
pub use field::{Field, FieldSummary, ProfileFields, aggregate_fields};
pub use geom::{BoundingBox, Point, point};
pub use geometry::{Geometry, Polygon, parse_geometry};
pub use grid::{BinEdges, CellSize, Grid, GridLimits, build_grid};
pub use sample::{FrameTagged, Sample, Zone, parse_ifd};
pub use trajectory::{TrajectoryFile, TrajectoryPoint, parse_trajectory_txt};
pub use window::{FrameRange, FrameWindow, ResolvedWindow, observed_range, resolve_window};
