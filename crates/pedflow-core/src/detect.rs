//! Content-based identification of input files. File names are never consulted.

use crate::Result;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
#[error("Input format not recognised; starts with: {head:?}")]
pub struct UnknownFormatError {
    pub head: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum InputFormat {
    /// JuPedSim geometry XML (`<geometry>` root).
    Geometry,
    /// JuPedSim trajectory XML (`<trajectories>` root).
    TrajectoryXml,
    /// Plain-text trajectory with a `#framerate` header.
    TrajectoryText,
    /// Individual fundamental diagram rows (frame, id, x, y, z, density, velocity[, zone]).
    IndividualFd,
}

pub type DetectorFn = fn(text: &str) -> bool;

#[derive(Debug, Clone)]
pub struct FormatDetector {
    pub format: InputFormat,
    pub detector: DetectorFn,
}

#[derive(Debug, Clone, Default)]
pub struct FormatDetectorRegistry {
    detectors: Vec<FormatDetector>,
}

impl FormatDetectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_fn(&mut self, format: InputFormat, detector: DetectorFn) {
        self.detectors.push(FormatDetector { format, detector });
    }

    pub fn detect(&self, text: &str) -> Result<InputFormat> {
        let text = text.trim_start_matches('\u{feff}');
        for det in &self.detectors {
            if (det.detector)(text) {
                return Ok(det.format);
            }
        }
        let head: String = text.chars().take(80).collect();
        Err(UnknownFormatError { head }.into())
    }

    pub fn default_formats() -> Self {
        let mut reg = Self::new();

        // Order matters: JPSreport IFD files may also carry a `#framerate` header, so the
        // column caption lines are checked before it.
        reg.add_fn(InputFormat::Geometry, detector_geometry_xml);
        reg.add_fn(InputFormat::TrajectoryXml, detector_trajectory_xml);
        reg.add_fn(InputFormat::TrajectoryText, detector_trajectory_columns);
        reg.add_fn(InputFormat::IndividualFd, detector_ifd_columns);
        reg.add_fn(InputFormat::TrajectoryText, detector_framerate_header);
        reg.add_fn(InputFormat::IndividualFd, detector_ifd_rows);

        reg
    }
}

pub fn detect_format(text: &str) -> Result<InputFormat> {
    FormatDetectorRegistry::default_formats().detect(text)
}

fn xml_root_name(text: &str) -> Option<String> {
    if !text.trim_start().starts_with('<') {
        return None;
    }
    let doc = roxmltree::Document::parse(text).ok()?;
    Some(doc.root_element().tag_name().name().to_string())
}

fn detector_geometry_xml(text: &str) -> bool {
    xml_root_name(text).as_deref() == Some("geometry")
}

fn detector_trajectory_xml(text: &str) -> bool {
    xml_root_name(text).as_deref() == Some("trajectories")
}

fn header_comments(text: &str) -> impl Iterator<Item = &str> {
    text.lines()
        .map(str::trim)
        .take_while(|l| l.is_empty() || l.starts_with('#'))
        .filter_map(|l| l.strip_prefix('#'))
}

/// First two caption tokens of a `#A\tB\t...` column header, lowercased.
fn caption_starts_with(comment: &str, first: &str, second: &str) -> bool {
    let mut tokens = comment.split_whitespace().map(|t| t.to_ascii_lowercase());
    tokens.next().as_deref() == Some(first) && tokens.next().as_deref() == Some(second)
}

fn detector_trajectory_columns(text: &str) -> bool {
    header_comments(text).any(|c| caption_starts_with(c, "id", "fr"))
}

fn detector_ifd_columns(text: &str) -> bool {
    header_comments(text).any(|c| caption_starts_with(c, "frame", "persid"))
}

fn detector_framerate_header(text: &str) -> bool {
    header_comments(text)
        .any(|c| matches!(crate::trajectory::header_framerate(c, 0), Ok(Some(_))))
        && !first_data_row(text).is_some_and(is_ifd_row)
}

fn detector_ifd_rows(text: &str) -> bool {
    first_data_row(text).is_some_and(is_ifd_row)
}

fn first_data_row(text: &str) -> Option<&str> {
    text.lines()
        .map(str::trim)
        .find(|l| !l.is_empty() && !l.starts_with('#'))
}

/// Seven numeric columns, optionally followed by one zone column (an id or polygon text).
///
/// Trajectory rows carry either five columns or more than eight numeric ones.
fn is_ifd_row(row: &str) -> bool {
    let cols = crate::sample::split_columns(row);
    if cols.len() < 7 || !cols[..7].iter().all(|c| c.parse::<f64>().is_ok()) {
        return false;
    }
    cols.len() <= 8 || cols[7].parse::<f64>().is_err()
}
