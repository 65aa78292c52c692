//! Validated, owned trace lists.
//!
//! A `TraceList` is what a record reader hands over once every record of a
//! channel has been decoded: contiguous runs of samples at a constant rate,
//! sorted by start time, with the holes between them recorded as gaps.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{GraphError, Result};
use crate::gaps::{GapIndex, GapSegment};
use crate::source::{Sample, SampleSource};
use crate::time::{TimeRange, Timestamp, MICROS_PER_SECOND};

/// Decoded sample payload of a trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "encoding", content = "samples", rename_all = "lowercase")]
pub enum TraceData {
    Int32(Vec<i32>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
}

impl TraceData {
    pub fn len(&self) -> usize {
        match self {
            TraceData::Int32(v) => v.len(),
            TraceData::Float32(v) => v.len(),
            TraceData::Float64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn value(&self, i: usize) -> f64 {
        match self {
            TraceData::Int32(v) => v[i] as f64,
            TraceData::Float32(v) => v[i] as f64,
            TraceData::Float64(v) => v[i],
        }
    }
}

/// A contiguous run of samples at a constant sampling rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    #[serde(default)]
    pub network: String,
    #[serde(default)]
    pub station: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub channel: String,
    /// Time of the first sample, microseconds since epoch.
    pub start_time: Timestamp,
    /// Samples per second.
    pub sampling_rate: f64,
    pub data: TraceData,
}

impl Trace {
    pub fn new(start_time: Timestamp, sampling_rate: f64, data: TraceData) -> Self {
        Self {
            network: String::new(),
            station: String::new(),
            location: String::new(),
            channel: String::new(),
            start_time,
            sampling_rate,
            data,
        }
    }

    pub fn with_id(mut self, network: &str, station: &str, location: &str, channel: &str) -> Self {
        self.network = network.to_string();
        self.station = station.to_string();
        self.location = location.to_string();
        self.channel = channel.to_string();
        self
    }

    /// `NET.STA.LOC.CHA`
    pub fn id(&self) -> String {
        format!(
            "{}.{}.{}.{}",
            self.network, self.station, self.location, self.channel
        )
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Sample period in microseconds.
    pub fn period(&self) -> f64 {
        MICROS_PER_SECOND as f64 / self.sampling_rate
    }

    /// Saturates at `i64::MAX`; validated traces never get there.
    #[inline]
    pub fn timestamp_at(&self, i: usize) -> Timestamp {
        self.start_time
            .saturating_add((i as f64 * self.period()).round() as i64)
    }

    /// Timestamp of the last sample.
    pub fn last_sample_time(&self) -> Timestamp {
        self.timestamp_at(self.len().saturating_sub(1))
    }

    /// Exclusive end: one period after the last sample.
    pub fn end_time(&self) -> Timestamp {
        self.timestamp_at(self.len())
    }

    pub fn samples(&self) -> impl Iterator<Item = Sample> + '_ {
        (0..self.len()).map(move |i| Sample::new(self.timestamp_at(i), self.data.value(i)))
    }

    fn validate(&self) -> Result<()> {
        if !(self.sampling_rate.is_finite() && self.sampling_rate > 0.0) {
            return Err(GraphError::format(format!(
                "trace {} has invalid sampling rate {}",
                self.id(),
                self.sampling_rate
            )));
        }
        if self.is_empty() {
            return Err(GraphError::format(format!("trace {} has no samples", self.id())));
        }
        let span = (self.len() as f64 * self.period()).round();
        let end = (span < i64::MAX as f64)
            .then_some(span as i64)
            .and_then(|span| self.start_time.checked_add(span));
        if end.is_none() {
            return Err(GraphError::format(format!(
                "trace {} starting at {} with {} samples at {} Hz ends past the last representable time",
                self.id(),
                self.start_time,
                self.len(),
                self.sampling_rate
            )));
        }
        Ok(())
    }
}

/// On-disk shape of a decoded channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceDocument {
    pub traces: Vec<Trace>,
    #[serde(default)]
    pub gaps: Vec<GapSegment>,
}

/// Traces of one channel, sorted and checked, with gaps between them.
#[derive(Debug, Clone)]
pub struct TraceList {
    traces: Vec<Trace>,
    gaps: GapIndex,
    len: usize,
}

impl TraceList {
    pub fn new(mut traces: Vec<Trace>) -> Result<Self> {
        if traces.is_empty() {
            return Err(GraphError::format("trace list is empty"));
        }
        for trace in &traces {
            trace.validate()?;
        }

        let id = traces[0].id();
        if let Some(other) = traces.iter().find(|t| t.id() != id) {
            return Err(GraphError::format(format!(
                "trace list mixes channels {} and {}",
                id,
                other.id()
            )));
        }

        if traces.windows(2).any(|w| w[1].start_time < w[0].start_time) {
            warn!(channel = %id, "traces out of order, sorting by start time");
            traces.sort_by_key(|t| t.start_time);
        }

        let mut gaps = Vec::new();
        for pair in traces.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            // Half a sample period of jitter is tolerated either way.
            let tolerance = (prev.period() / 2.0).round() as i64;
            let prev_end = prev.end_time();
            if next.start_time < prev_end.saturating_sub(tolerance) {
                return Err(GraphError::format(format!(
                    "overlapping traces for {}: {} starts before {} ends",
                    id, next.start_time, prev_end
                )));
            }
            if next.start_time.saturating_sub(prev_end) > tolerance {
                gaps.push(GapSegment::new(prev_end, next.start_time));
            }
        }

        let len = traces.iter().map(Trace::len).sum();
        debug!(channel = %id, traces = traces.len(), gaps = gaps.len(), samples = len, "trace list built");

        Ok(Self {
            traces,
            gaps: GapIndex::new(gaps),
            len,
        })
    }

    /// Adds gaps known from outside the sample data (e.g. reader markers).
    pub fn with_declared_gaps(mut self, declared: GapIndex) -> Self {
        self.gaps = self.gaps.union(&declared);
        self
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        let doc: TraceDocument = serde_json::from_slice(bytes)
            .map_err(|e| GraphError::format(format!("malformed trace document: {e}")))?;
        Self::from_document(doc)
    }

    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self> {
        let doc: TraceDocument = serde_json::from_reader(reader)
            .map_err(|e| GraphError::format(format!("malformed trace document: {e}")))?;
        Self::from_document(doc)
    }

    /// Reads a JSON trace document from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            GraphError::invalid(format!("cannot read source {}: {e}", path.display()))
        })?;
        Self::from_json_reader(BufReader::new(file))
    }

    fn from_document(doc: TraceDocument) -> Result<Self> {
        Ok(Self::new(doc.traces)?.with_declared_gaps(GapIndex::new(doc.gaps)))
    }

    pub fn to_document(&self) -> TraceDocument {
        TraceDocument {
            traces: self.traces.clone(),
            gaps: self.gaps.segments().to_vec(),
        }
    }

    pub fn traces(&self) -> &[Trace] {
        &self.traces
    }

    pub fn id(&self) -> String {
        self.traces[0].id()
    }

    pub fn start_time(&self) -> Timestamp {
        self.traces[0].start_time
    }

    /// Exclusive end of the last trace.
    pub fn end_time(&self) -> Timestamp {
        self.traces[self.traces.len() - 1].end_time()
    }
}

impl SampleSource for TraceList {
    fn extent(&self) -> Option<TimeRange> {
        TimeRange::new(self.start_time(), self.end_time()).ok()
    }

    fn gaps(&self) -> &GapIndex {
        &self.gaps
    }

    fn samples(&self) -> Box<dyn Iterator<Item = Sample> + '_> {
        Box::new(self.traces.iter().flat_map(|t| t.samples()))
    }

    fn len(&self) -> usize {
        self.len
    }
}
