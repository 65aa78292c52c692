use serde::{Deserialize, Serialize};

use crate::gaps::GapIndex;
use crate::time::{TimeRange, Timestamp, MICROS_PER_SECOND};

/// One decoded sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: Timestamp,
    pub value: f64,
}

impl Sample {
    pub fn new(timestamp: Timestamp, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Anything that can feed the downsampler: ordered samples plus declared gaps.
pub trait SampleSource: Send + Sync {
    /// Half-open time extent of the data, `None` when there are no samples.
    fn extent(&self) -> Option<TimeRange>;

    /// Declared gaps. Takes precedence over whatever the samples suggest.
    fn gaps(&self) -> &GapIndex;

    /// Samples in non-decreasing timestamp order.
    fn samples(&self) -> Box<dyn Iterator<Item = Sample> + '_>;

    /// Total number of samples
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Pre-supplied samples held in memory.
#[derive(Debug, Clone, Default)]
pub struct SampleSeries {
    samples: Vec<Sample>,
    gaps: GapIndex,
}

impl SampleSeries {
    pub fn new(samples: Vec<Sample>) -> Self {
        Self {
            samples,
            gaps: GapIndex::default(),
        }
    }

    /// Evenly spaced samples starting at `start`.
    pub fn regular(start: Timestamp, sampling_rate: f64, values: &[f64]) -> Self {
        let period = MICROS_PER_SECOND as f64 / sampling_rate;
        let samples = values
            .iter()
            .enumerate()
            .map(|(i, v)| Sample::new(start.saturating_add((i as f64 * period).round() as i64), *v))
            .collect();
        Self::new(samples)
    }

    pub fn with_gaps(mut self, gaps: GapIndex) -> Self {
        self.gaps = gaps;
        self
    }

    pub fn as_slice(&self) -> &[Sample] {
        &self.samples
    }
}

impl SampleSource for SampleSeries {
    fn extent(&self) -> Option<TimeRange> {
        let first = self.samples.first()?;
        let last = self.samples.last()?;
        // The last sample is included by ending one microsecond after it.
        let end = last.timestamp.max(first.timestamp).saturating_add(1);
        TimeRange::new(first.timestamp, end).ok()
    }

    fn gaps(&self) -> &GapIndex {
        &self.gaps
    }

    fn samples(&self) -> Box<dyn Iterator<Item = Sample> + '_> {
        Box::new(self.samples.iter().copied())
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
