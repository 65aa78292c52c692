use crate::error::{GraphError, Result};
use crate::time::{TimeRange, Timestamp};

/// Partition of a time range into `width` pixel columns.
///
/// Every bucket lasts `duration = floor(range / width)` microseconds except
/// the last one, which runs to the end of the range and absorbs the
/// remainder of the division.
///
/// A range shorter than `width` microseconds cannot give every column a
/// whole microsecond. Bucket `i` then starts at `start + ceil(i * span / width)`,
/// so each microsecond of the range owns exactly one bucket and the columns
/// in between are empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketGrid {
    range: TimeRange,
    width: usize,
    span: i64,
    duration: i64,
}

impl BucketGrid {
    pub fn new(range: TimeRange, width: usize) -> Result<Self> {
        if width == 0 {
            return Err(GraphError::invalid("width must be positive"));
        }
        let span = range
            .end
            .checked_sub(range.start)
            .filter(|span| *span > 0)
            .ok_or_else(|| GraphError::invalid("time range end must be after start"))?;
        Ok(Self {
            range,
            width,
            span,
            duration: span / width as i64,
        })
    }

    pub fn range(&self) -> TimeRange {
        self.range
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Nominal bucket length, 0 when the range is shorter than the width.
    pub fn duration(&self) -> i64 {
        self.duration
    }

    /// Bucket holding `ts`, or `None` when `ts` lies outside `[start, end]`.
    /// The range end itself maps to the last bucket.
    #[inline]
    pub fn index_of(&self, ts: Timestamp) -> Option<usize> {
        if ts < self.range.start || ts > self.range.end {
            return None;
        }
        let offset = ts - self.range.start;
        let idx = if self.duration > 0 {
            (offset / self.duration) as usize
        } else {
            (offset as i128 * self.width as i128 / self.span as i128) as usize
        };
        Some(idx.min(self.width - 1))
    }

    /// Start of bucket `i`; `edge(width)` is the range end.
    fn edge(&self, i: usize) -> Timestamp {
        if i >= self.width {
            return self.range.end;
        }
        if self.duration > 0 {
            self.range.start + i as i64 * self.duration
        } else {
            let w = self.width as i128;
            self.range.start + ((i as i128 * self.span as i128 + w - 1) / w) as i64
        }
    }

    /// `[start, end[` of bucket `i`.
    pub fn bounds(&self, i: usize) -> (Timestamp, Timestamp) {
        (self.edge(i), self.edge(i + 1))
    }
}
