//! Microsecond timestamps and half-open time ranges.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};

/// Microseconds since the Unix epoch (UTC).
pub type Timestamp = i64;

pub const MICROS_PER_SECOND: i64 = 1_000_000;
pub const MICROS_PER_HOUR: i64 = 3_600 * MICROS_PER_SECOND;
pub const MICROS_PER_DAY: i64 = 24 * MICROS_PER_HOUR;

pub fn from_datetime(dt: &DateTime<Utc>) -> Timestamp {
    dt.timestamp_micros()
}

/// A half-open interval `[start, end)` in microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl TimeRange {
    /// Rejects empty ranges and ranges whose length does not fit in an `i64`.
    pub fn new(start: Timestamp, end: Timestamp) -> Result<Self> {
        if end <= start {
            return Err(GraphError::invalid(format!(
                "time range end ({end}) must be after start ({start})"
            )));
        }
        if end.checked_sub(start).is_none() {
            return Err(GraphError::invalid(format!(
                "time range [{start}, {end}) is too long"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn duration(&self) -> i64 {
        self.end.saturating_sub(self.start)
    }

    /// Grows the range by `before` and `after` microseconds on each side.
    pub fn padded(&self, before: i64, after: i64) -> Result<Self> {
        match (self.start.checked_sub(before), self.end.checked_add(after)) {
            (Some(start), Some(end)) => Self::new(start, end),
            _ => Err(GraphError::invalid("padded time range overflows")),
        }
    }
}
