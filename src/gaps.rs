use serde::{Deserialize, Serialize};

use crate::time::Timestamp;

/// A declared interval `[start, end[` (microseconds) that holds no samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapSegment {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl GapSegment {
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        Self { start, end }
    }
}

/// Sorted, merged, non-overlapping gap segments.
///
/// Serialized as a plain list of segments; deserializing goes through
/// `GapIndex::new`, so stored lists need not be sorted or merged.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<GapSegment>", into = "Vec<GapSegment>")]
pub struct GapIndex {
    segments: Vec<GapSegment>,
}

impl GapIndex {
    /// Builds an index from arbitrary segments.
    /// Empty segments are dropped, overlapping or touching ones are merged.
    pub fn new(mut raw: Vec<GapSegment>) -> Self {
        raw.retain(|s| s.end > s.start);
        if raw.is_empty() {
            return Self::default();
        }
        raw.sort_by_key(|s| s.start);

        let mut merged: Vec<GapSegment> = Vec::with_capacity(raw.len());
        let mut current = raw[0];
        for next in raw.into_iter().skip(1) {
            if next.start <= current.end {
                // Overlapping or contiguous -> merge
                current.end = current.end.max(next.end);
            } else {
                merged.push(current);
                current = next;
            }
        }
        merged.push(current);

        Self { segments: merged }
    }

    pub fn segments(&self) -> &[GapSegment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns a new index holding the segments of both.
    pub fn union(&self, other: &GapIndex) -> GapIndex {
        let mut all = self.segments.clone();
        all.extend_from_slice(&other.segments);
        GapIndex::new(all)
    }

    /// Index of the last segment starting at or before `ts`.
    fn segment_at_or_before(&self, ts: Timestamp) -> Option<&GapSegment> {
        match self.segments.binary_search_by_key(&ts, |s| s.start) {
            Ok(idx) => Some(&self.segments[idx]),
            Err(0) => None,
            Err(idx) => Some(&self.segments[idx - 1]),
        }
    }

    /// Checks if a timestamp is inside a gap.
    pub fn is_inside(&self, ts: Timestamp) -> bool {
        self.segment_at_or_before(ts).is_some_and(|s| ts < s.end)
    }

    /// True when the whole interval `[start, end[` lies inside a single gap.
    pub fn covers(&self, start: Timestamp, end: Timestamp) -> bool {
        if end <= start {
            return false;
        }
        self.segment_at_or_before(start)
            .is_some_and(|s| start < s.end && end <= s.end)
    }

    /// Returns a stateful cursor for sequential queries.
    pub fn cursor(&self) -> GapCursor<'_> {
        GapCursor {
            index: self,
            pos: 0,
        }
    }
}

impl From<Vec<GapSegment>> for GapIndex {
    fn from(raw: Vec<GapSegment>) -> Self {
        GapIndex::new(raw)
    }
}

impl From<GapIndex> for Vec<GapSegment> {
    fn from(index: GapIndex) -> Self {
        index.segments
    }
}

/// Answers `covers` queries for increasing intervals in amortized O(1).
pub struct GapCursor<'a> {
    index: &'a GapIndex,
    pos: usize,
}

impl GapCursor<'_> {
    /// `start` must not decrease between calls.
    pub fn covers(&mut self, start: Timestamp, end: Timestamp) -> bool {
        let segments = &self.index.segments;
        while self.pos < segments.len() && segments[self.pos].end <= start {
            self.pos += 1;
        }
        match segments.get(self.pos) {
            Some(seg) => end > start && seg.start <= start && end <= seg.end,
            None => false,
        }
    }
}
