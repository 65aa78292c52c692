use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::bucketing::BucketGrid;
use crate::error::{GraphError, Result};
use crate::gaps::GapIndex;
use crate::source::{Sample, SampleSource};
use crate::time::{TimeRange, Timestamp};

/// Samples per rayon task in `downsample_parallel`.
const PAR_CHUNK_SIZE: usize = 64 * 1024;

/// One pixel column's worth of source data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    pub start: Timestamp,
    pub end: Timestamp,
    /// Meaningless (0.0) when `has_data` is false.
    pub min: f64,
    pub max: f64,
    pub has_data: bool,
}

/// Downsampled series: exactly one bucket per pixel column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoredMinMaxList")]
pub struct MinMaxList {
    range: TimeRange,
    bucket_duration: i64,
    buckets: Vec<Bucket>,
}

/// Wire shape of a persisted list, checked before it becomes a `MinMaxList`.
#[derive(Deserialize)]
struct StoredMinMaxList {
    range: TimeRange,
    bucket_duration: i64,
    buckets: Vec<Bucket>,
}

impl TryFrom<StoredMinMaxList> for MinMaxList {
    type Error = GraphError;

    fn try_from(stored: StoredMinMaxList) -> Result<Self> {
        let grid = BucketGrid::new(stored.range, stored.buckets.len())?;
        if stored.bucket_duration != grid.duration() {
            return Err(GraphError::format(format!(
                "bucket duration {} does not match {} buckets over {}us",
                stored.bucket_duration,
                grid.width(),
                stored.range.duration()
            )));
        }
        for (i, b) in stored.buckets.iter().enumerate() {
            if (b.start, b.end) != grid.bounds(i) {
                return Err(GraphError::format(format!(
                    "bucket {i} spans [{}, {}), expected {:?}",
                    b.start,
                    b.end,
                    grid.bounds(i)
                )));
            }
            if b.has_data && !(b.min <= b.max) {
                return Err(GraphError::format(format!(
                    "bucket {i} has min {} above max {}",
                    b.min, b.max
                )));
            }
        }
        Ok(Self {
            range: stored.range,
            bucket_duration: stored.bucket_duration,
            buckets: stored.buckets,
        })
    }
}

impl MinMaxList {
    pub fn width(&self) -> usize {
        self.buckets.len()
    }

    pub fn range(&self) -> TimeRange {
        self.range
    }

    pub fn bucket_duration(&self) -> i64 {
        self.bucket_duration
    }

    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Bucket> {
        self.buckets.iter()
    }

    /// Number of buckets holding at least one sample.
    pub fn data_buckets(&self) -> usize {
        self.buckets.iter().filter(|b| b.has_data).count()
    }

    /// Global (min, max) over buckets with data.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.buckets
            .iter()
            .filter(|b| b.has_data)
            .fold(None, |acc, b| match acc {
                None => Some((b.min, b.max)),
                Some((lo, hi)) => Some((lo.min(b.min), hi.max(b.max))),
            })
    }
}

impl<'a> IntoIterator for &'a MinMaxList {
    type Item = &'a Bucket;
    type IntoIter = std::slice::Iter<'a, Bucket>;

    fn into_iter(self) -> Self::IntoIter {
        self.buckets.iter()
    }
}

/// Running extrema of one bucket. Merging is associative and commutative.
#[derive(Debug, Clone, Copy)]
struct Extrema {
    min: f64,
    max: f64,
    count: u64,
}

impl Extrema {
    const EMPTY: Extrema = Extrema {
        min: f64::INFINITY,
        max: f64::NEG_INFINITY,
        count: 0,
    };

    #[inline(always)]
    fn push(&mut self, v: f64) {
        if v < self.min {
            self.min = v;
        }
        if v > self.max {
            self.max = v;
        }
        self.count += 1;
    }

    #[inline(always)]
    fn merge(&mut self, other: &Extrema) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        self.count += other.count;
    }
}

#[derive(Default)]
struct ScanStats {
    seen: usize,
    nan: usize,
}

/// Feeds one ordered run of samples into `acc`.
/// Returns an error on the first timestamp that goes backwards.
fn accumulate<I>(grid: &BucketGrid, samples: I, acc: &mut [Extrema]) -> Result<ScanStats>
where
    I: IntoIterator<Item = Sample>,
{
    let mut stats = ScanStats::default();
    let mut last: Option<Timestamp> = None;
    let end = grid.range().end;

    for sample in samples {
        if let Some(prev) = last {
            if sample.timestamp < prev {
                return Err(GraphError::format(format!(
                    "samples out of order: {} follows {}",
                    sample.timestamp, prev
                )));
            }
        }
        last = Some(sample.timestamp);
        if sample.timestamp > end {
            break;
        }
        stats.seen += 1;
        if sample.value.is_nan() {
            stats.nan += 1;
            continue;
        }
        if let Some(idx) = grid.index_of(sample.timestamp) {
            acc[idx].push(sample.value);
        }
    }

    Ok(stats)
}

/// Turns accumulated extrema into buckets. Declared gaps override data.
fn finish(grid: &BucketGrid, acc: &[Extrema], gaps: Option<&GapIndex>) -> MinMaxList {
    let mut cursor = gaps.map(GapIndex::cursor);
    let mut masked = 0usize;

    let buckets = acc
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let (start, end) = grid.bounds(i);
            let in_gap = cursor.as_mut().is_some_and(|c| c.covers(start, end));
            if in_gap && e.count > 0 {
                masked += 1;
            }
            if e.count == 0 || in_gap {
                Bucket {
                    start,
                    end,
                    min: 0.0,
                    max: 0.0,
                    has_data: false,
                }
            } else {
                Bucket {
                    start,
                    end,
                    min: e.min,
                    max: e.max,
                    has_data: true,
                }
            }
        })
        .collect();

    if masked > 0 {
        debug!(masked, "buckets inside declared gaps dropped their samples");
    }

    MinMaxList {
        range: grid.range(),
        bucket_duration: grid.duration(),
        buckets,
    }
}

/// Reduces an ordered sample stream to `width` min/max buckets over `range`.
///
/// Samples outside `[range.start, range.end]` are ignored, NaN values are
/// skipped. Buckets wholly inside one of `gaps` are reported as gaps even if
/// samples fell into them.
pub fn downsample<I>(
    samples: I,
    width: usize,
    range: TimeRange,
    gaps: Option<&GapIndex>,
) -> Result<MinMaxList>
where
    I: IntoIterator<Item = Sample>,
{
    let grid = BucketGrid::new(range, width)?;
    let mut acc = vec![Extrema::EMPTY; width];
    let stats = accumulate(&grid, samples, &mut acc)?;
    if stats.nan > 0 {
        warn!(nan = stats.nan, "skipped NaN samples");
    }

    let list = finish(&grid, &acc, gaps);
    debug!(
        width,
        samples = stats.seen,
        data_buckets = list.data_buckets(),
        bucket_us = grid.duration(),
        "min/max list computed"
    );
    Ok(list)
}

/// Downsamples a source over `range`, defaulting to the source's own extent.
pub fn downsample_source(
    source: &dyn SampleSource,
    width: usize,
    range: Option<TimeRange>,
) -> Result<MinMaxList> {
    let range = match range {
        Some(r) => r,
        None => source
            .extent()
            .ok_or_else(|| GraphError::invalid("source has no samples and no range was given"))?,
    };
    downsample(source.samples(), width, range, Some(source.gaps()))
}

/// Same result as `downsample`, splitting an in-memory slice across the rayon
/// pool and merging the per-bucket extrema.
pub fn downsample_parallel(
    samples: &[Sample],
    width: usize,
    range: TimeRange,
    gaps: Option<&GapIndex>,
) -> Result<MinMaxList> {
    let grid = BucketGrid::new(range, width)?;

    if let Some(w) = samples
        .par_windows(2)
        .find_first(|w| w[1].timestamp < w[0].timestamp)
    {
        return Err(GraphError::format(format!(
            "samples out of order: {} follows {}",
            w[1].timestamp, w[0].timestamp
        )));
    }

    let merged = samples
        .par_chunks(PAR_CHUNK_SIZE)
        .fold(
            || vec![Extrema::EMPTY; width],
            |mut acc, chunk| {
                for s in chunk {
                    if s.value.is_nan() {
                        continue;
                    }
                    if let Some(idx) = grid.index_of(s.timestamp) {
                        acc[idx].push(s.value);
                    }
                }
                acc
            },
        )
        .reduce(
            || vec![Extrema::EMPTY; width],
            |mut a, b| {
                for (x, y) in a.iter_mut().zip(b.iter()) {
                    x.merge(y);
                }
                a
            },
        );

    Ok(finish(&grid, &merged, gaps))
}
