use crate::grid::{CellSize, DEFAULT_MAX_BINS_PER_AXIS, DEFAULT_MAX_CELLS, GridLimits};
use crate::window::FrameWindow;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Parameters of one analysis run.
///
/// JSON form (every field optional):
///
/// ```json
/// { "cell_size": { "dx": 0.2, "dy": 0.2 }, "window": { "begin": 100, "end": 900 } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    pub cell_size: CellSize,
    pub window: FrameWindow,
    pub max_bins_per_axis: usize,
    /// Limit on the total number of grid cells.
    pub max_cells: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            cell_size: CellSize::default(),
            window: FrameWindow::default(),
            max_bins_per_axis: DEFAULT_MAX_BINS_PER_AXIS,
            max_cells: DEFAULT_MAX_CELLS,
        }
    }
}

impl AnalysisConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::InvalidConfigJson {
            message: e.to_string(),
        })
    }

    pub fn grid_limits(&self) -> GridLimits {
        GridLimits {
            max_bins_per_axis: self.max_bins_per_axis,
            max_cells: self.max_cells,
        }
    }

    pub fn with_cell_size(mut self, cell_size: CellSize) -> Self {
        self.cell_size = cell_size;
        self
    }

    pub fn with_window(mut self, window: FrameWindow) -> Self {
        self.window = window;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_is_the_default_config() {
        assert_eq!(
            AnalysisConfig::from_json_str("{}").unwrap(),
            AnalysisConfig::default()
        );
    }

    #[test]
    fn partial_json_overrides_only_given_fields() {
        let cfg =
            AnalysisConfig::from_json_str(r#"{"cell_size":{"dx":0.5,"dy":0.25},"window":{"begin":3}}"#)
                .unwrap();
        assert_eq!(cfg.cell_size, CellSize { dx: 0.5, dy: 0.25 });
        assert_eq!(cfg.window, FrameWindow::new(Some(3), None));
        assert_eq!(cfg.max_bins_per_axis, DEFAULT_MAX_BINS_PER_AXIS);
        assert_eq!(cfg.grid_limits(), GridLimits::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = AnalysisConfig::from_json_str(r#"{"cellsize":1}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidConfigJson { .. }));
    }
}
