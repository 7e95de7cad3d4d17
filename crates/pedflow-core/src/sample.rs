//! Individual fundamental diagram (IFD) samples and their tab-separated reader.
//!
//! One row per pedestrian and frame:
//!
//! ```text
//! #Frame	PersID	x/m	y/m	z/m	rho/m^-2	v/m/s	zone
//! 10	1	1.25	2.00	0.00	1.80	1.10	POLYGON((1 1.5,1.5 1.5,1.5 2.5,1 2.5,1 1.5))
//! ```
//!
//! Lines starting with `#` and blank lines are skipped. The zone column is optional.

use crate::geom::Point;
use crate::geometry::parse_polygon_text;
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum Zone {
    Id(i64),
    Polygon(Vec<Point>),
}

/// One measurement of one pedestrian in one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub frame: i64,
    pub pedestrian: i64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub density: f64,
    pub velocity: f64,
    pub zone: Option<Zone>,
}

impl Sample {
    /// Specific flow of this single sample.
    pub fn flow(&self) -> f64 {
        self.density * self.velocity
    }
}

/// Records that carry a frame index and a pedestrian id.
pub trait FrameTagged {
    fn frame(&self) -> i64;
    fn pedestrian(&self) -> i64;
}

impl FrameTagged for Sample {
    fn frame(&self) -> i64 {
        self.frame
    }

    fn pedestrian(&self) -> i64 {
        self.pedestrian
    }
}

const REQUIRED_COLUMNS: usize = 7;

pub fn parse_ifd(text: &str) -> Result<Vec<Sample>> {
    let mut samples = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        samples.push(parse_ifd_row(line, line_no)?);
    }
    tracing::debug!(samples = samples.len(), "parsed IFD rows");
    Ok(samples)
}

pub(crate) fn split_columns(line: &str) -> Vec<&str> {
    if line.contains('\t') {
        line.split('\t').map(str::trim).collect()
    } else {
        line.split_whitespace().collect()
    }
}

fn parse_ifd_row(line: &str, line_no: usize) -> Result<Sample> {
    let cols = split_columns(line);
    if cols.len() < REQUIRED_COLUMNS {
        return Err(Error::malformed(
            line_no,
            format!(
                "expected at least {REQUIRED_COLUMNS} columns, found {}",
                cols.len()
            ),
        ));
    }

    // A zone polygon written without tabs spills over several whitespace columns.
    let zone_text = if line.contains('\t') {
        if cols.len() > REQUIRED_COLUMNS + 1 {
            return Err(Error::malformed(
                line_no,
                format!(
                    "expected at most {} columns, found {}",
                    REQUIRED_COLUMNS + 1,
                    cols.len()
                ),
            ));
        }
        cols.get(REQUIRED_COLUMNS).copied().map(str::to_string)
    } else if cols.len() > REQUIRED_COLUMNS {
        Some(cols[REQUIRED_COLUMNS..].join(" "))
    } else {
        None
    };

    let zone = match zone_text.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(text) => Some(parse_zone(text).ok_or_else(|| {
            Error::malformed(line_no, format!("unrecognised zone column: {text:?}"))
        })?),
    };

    Ok(Sample {
        frame: parse_int(cols[0], "frame", line_no)?,
        pedestrian: parse_int(cols[1], "pedestrian id", line_no)?,
        x: parse_float(cols[2], "x", line_no)?,
        y: parse_float(cols[3], "y", line_no)?,
        z: parse_float(cols[4], "z", line_no)?,
        density: parse_float(cols[5], "density", line_no)?,
        velocity: parse_float(cols[6], "velocity", line_no)?,
        zone,
    })
}

fn parse_zone(text: &str) -> Option<Zone> {
    if let Ok(id) = text.parse::<i64>() {
        return Some(Zone::Id(id));
    }
    parse_polygon_text(text).map(Zone::Polygon)
}

/// Frame and id columns are integral but some writers emit them as `12.0`.
pub(crate) fn parse_int(raw: &str, what: &str, line_no: usize) -> Result<i64> {
    if let Ok(v) = raw.parse::<i64>() {
        return Ok(v);
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 9.0e15 => Ok(v as i64),
        _ => Err(Error::malformed(
            line_no,
            format!("{what} is not an integer: {raw:?}"),
        )),
    }
}

pub(crate) fn parse_float(raw: &str, what: &str, line_no: usize) -> Result<f64> {
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(Error::malformed(
            line_no,
            format!("{what} is not a finite number: {raw:?}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::point;

    #[test]
    fn comment_and_blank_lines_are_skipped() {
        let text = "# header\n#Frame\tPersID\n\n10\t1\t1.0\t2.0\t0.0\t1.5\t1.2\n";
        let samples = parse_ifd(text).unwrap();
        assert_eq!(samples.len(), 1);
        let s = &samples[0];
        assert_eq!((s.frame, s.pedestrian), (10, 1));
        assert_eq!((s.x, s.y, s.density, s.velocity), (1.0, 2.0, 1.5, 1.2));
        assert_eq!(s.zone, None);
    }

    #[test]
    fn zone_column_accepts_ids_and_polygons() {
        let text = "1\t1\t0\t0\t0\t1\t1\t7\n\
                    2\t1\t0\t0\t0\t1\t1\tPOLYGON((0 0,1 0,1 1))\n";
        let samples = parse_ifd(text).unwrap();
        assert_eq!(samples[0].zone, Some(Zone::Id(7)));
        assert_eq!(
            samples[1].zone,
            Some(Zone::Polygon(vec![
                point(0.0, 0.0),
                point(1.0, 0.0),
                point(1.0, 1.0)
            ]))
        );
    }

    #[test]
    fn whitespace_separated_rows_are_accepted() {
        let text = "3 4 1.5 2.5 0 2.0 0.5\n";
        let samples = parse_ifd(text).unwrap();
        assert_eq!(samples[0].frame, 3);
        assert_eq!(samples[0].flow(), 1.0);
    }

    #[test]
    fn float_formatted_frame_ids_are_accepted() {
        let samples = parse_ifd("12.0\t3.0\t0\t0\t0\t1\t1\n").unwrap();
        assert_eq!((samples[0].frame, samples[0].pedestrian), (12, 3));
    }

    #[test]
    fn short_rows_report_their_physical_line() {
        let text = "# c\n1\t1\t0\t0\t0\t1\t1\n2\t1\t0\t0\n";
        match parse_ifd(text).unwrap_err() {
            Error::MalformedSample { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_numeric_and_non_finite_values_are_rejected() {
        for row in [
            "1\t1\tx\t0\t0\t1\t1",
            "1\t1\t0\t0\t0\tnan\t1",
            "1.5\t1\t0\t0\t0\t1\t1",
            "1\t1\t0\t0\t0\t1\t1\tnot-a-zone",
        ] {
            assert!(
                matches!(parse_ifd(row), Err(Error::MalformedSample { line: 1, .. })),
                "row {row:?}"
            );
        }
    }
}
