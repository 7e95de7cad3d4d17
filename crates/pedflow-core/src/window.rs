use crate::sample::FrameTagged;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Smallest and largest frame present in a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrameRange {
    pub min: i64,
    pub max: i64,
}

/// Caller-supplied frame window; missing ends fall back to the observed range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameWindow {
    pub begin: Option<i64>,
    pub end: Option<i64>,
}

impl FrameWindow {
    pub fn new(begin: Option<i64>, end: Option<i64>) -> Self {
        Self { begin, end }
    }
}

/// A window clamped into the observed range; `begin <= end`, both inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedWindow {
    pub begin: i64,
    pub end: i64,
}

impl ResolvedWindow {
    pub fn contains(&self, frame: i64) -> bool {
        frame >= self.begin && frame <= self.end
    }
}

pub fn observed_range<T: FrameTagged>(records: &[T]) -> Result<FrameRange> {
    let mut frames = records.iter().map(FrameTagged::frame);
    let first = frames.next().ok_or(Error::EmptyDataset {
        what: "no frames to select a window from",
    })?;
    let (min, max) = frames.fold((first, first), |(lo, hi), f| (lo.min(f), hi.max(f)));
    Ok(FrameRange { min, max })
}

/// Clamps `candidate` into `observed`.
///
/// A begin frame below the range (or absent) becomes the observed minimum and an end frame above
/// it (or absent) the observed maximum. Ends on the far side of the range are pulled to the
/// nearest bound as well; a window that is still inverted afterwards is rejected.
pub fn resolve_window(observed: FrameRange, candidate: FrameWindow) -> Result<ResolvedWindow> {
    let begin = candidate
        .begin
        .map_or(observed.min, |b| b.clamp(observed.min, observed.max));
    let end = candidate
        .end
        .map_or(observed.max, |e| e.clamp(observed.min, observed.max));
    if begin > end {
        return Err(Error::InvalidFrameWindow { begin, end });
    }
    if candidate.begin != Some(begin) || candidate.end != Some(end) {
        tracing::debug!(
            requested_begin = ?candidate.begin,
            requested_end = ?candidate.end,
            begin,
            end,
            "frame window adjusted to the observed range"
        );
    }
    Ok(ResolvedWindow { begin, end })
}

/// [`observed_range`] followed by [`resolve_window`].
pub fn select_window<T: FrameTagged>(
    records: &[T],
    candidate: FrameWindow,
) -> Result<ResolvedWindow> {
    resolve_window(observed_range(records)?, candidate)
}
