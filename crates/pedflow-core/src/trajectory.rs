//! Plain-text JuPedSim trajectory reader (`#framerate: 16` header, `ID FR X Y Z ...` rows).

use crate::sample::{FrameTagged, parse_float, parse_int, split_columns};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectoryPoint {
    pub pedestrian: i64,
    pub frame: i64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl FrameTagged for TrajectoryPoint {
    fn frame(&self) -> i64 {
        self.frame
    }

    fn pedestrian(&self) -> i64 {
        self.pedestrian
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrajectoryFile {
    /// Frames per second from the header, when present.
    pub framerate: Option<f64>,
    pub points: Vec<TrajectoryPoint>,
}

const REQUIRED_COLUMNS: usize = 5;

pub fn parse_trajectory_txt(text: &str) -> Result<TrajectoryFile> {
    let mut out = TrajectoryFile::default();
    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(comment) = line.strip_prefix('#') {
            if let Some(fps) = header_framerate(comment, line_no)? {
                out.framerate = Some(fps);
            }
            continue;
        }

        let cols = split_columns(line);
        if cols.len() < REQUIRED_COLUMNS {
            return Err(Error::malformed(
                line_no,
                format!(
                    "expected at least {REQUIRED_COLUMNS} trajectory columns, found {}",
                    cols.len()
                ),
            ));
        }
        out.points.push(TrajectoryPoint {
            pedestrian: parse_int(cols[0], "pedestrian id", line_no)?,
            frame: parse_int(cols[1], "frame", line_no)?,
            x: parse_float(cols[2], "x", line_no)?,
            y: parse_float(cols[3], "y", line_no)?,
            z: parse_float(cols[4], "z", line_no)?,
        });
    }
    tracing::debug!(
        points = out.points.len(),
        framerate = ?out.framerate,
        "parsed trajectory text"
    );
    Ok(out)
}

pub(crate) fn header_framerate(comment: &str, line_no: usize) -> Result<Option<f64>> {
    let comment = comment.trim();
    let Some((key, value)) = comment
        .split_once(':')
        .or_else(|| comment.split_once(char::is_whitespace))
    else {
        return Ok(None);
    };
    if !key.trim().eq_ignore_ascii_case("framerate") {
        return Ok(None);
    }
    let fps = parse_float(value.trim(), "framerate", line_no)?;
    if fps <= 0.0 {
        return Err(Error::malformed(
            line_no,
            format!("framerate must be positive, got {fps}"),
        ));
    }
    Ok(Some(fps))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "#description: jpscore (0.8.4)\n\
#agents: 2\n\
#framerate: 16.00\n\
#ID: the agent ID\n\
#ID\tFR\tX\tY\tZ\tA\tB\tANGLE\tCOLOR\n\
1\t0\t1.50\t2.00\t0.00\t0.18\t0.25\t0.00\t220\n\
2\t0\t3.00\t2.50\t0.00\t0.18\t0.25\t0.00\t220\n\
1\t1\t1.60\t2.00\t0.00\t0.18\t0.25\t0.00\t220\n";

    #[test]
    fn header_framerate_and_rows_are_read() {
        let traj = parse_trajectory_txt(SAMPLE).unwrap();
        assert_eq!(traj.framerate, Some(16.0));
        assert_eq!(traj.points.len(), 3);
        assert_eq!(
            traj.points[2],
            TrajectoryPoint {
                pedestrian: 1,
                frame: 1,
                x: 1.6,
                y: 2.0,
                z: 0.0
            }
        );
    }

    #[test]
    fn missing_framerate_header_is_not_an_error() {
        let traj = parse_trajectory_txt("1 5 0 0 0\n").unwrap();
        assert_eq!(traj.framerate, None);
        assert_eq!(traj.points[0].frame, 5);
    }

    #[test]
    fn invalid_framerate_is_rejected() {
        let err = parse_trajectory_txt("#framerate: 0\n").unwrap_err();
        assert!(matches!(err, Error::MalformedSample { line: 1, .. }));
    }

    #[test]
    fn short_trajectory_rows_are_rejected() {
        let err = parse_trajectory_txt("#framerate: 10\n1\t2\t3\n").unwrap_err();
        assert!(matches!(err, Error::MalformedSample { line: 2, .. }));
    }
}
