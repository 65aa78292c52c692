use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::trace;

use crate::decimation::{downsample_source, MinMaxList};
use crate::error::Result;
use crate::source::SampleSource;
use crate::time::TimeRange;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    source: String,
    width: usize,
    range: Option<TimeRange>,
}

/// Caller-owned store of computed min/max lists.
///
/// Lists are keyed by a caller-chosen source name, the width and the
/// requested range. The cache never inspects the source to decide a hit,
/// so the caller must use a new name when the underlying data changes.
#[derive(Debug, Default)]
pub struct MinMaxCache {
    entries: RwLock<HashMap<CacheKey, Arc<MinMaxList>>>,
}

impl MinMaxCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, source: &str, width: usize, range: Option<TimeRange>) -> Option<Arc<MinMaxList>> {
        let key = CacheKey {
            source: source.to_string(),
            width,
            range,
        };
        self.entries.read().get(&key).cloned()
    }

    /// Returns the cached list or computes and stores it.
    pub fn get_or_compute(
        &self,
        name: &str,
        source: &dyn SampleSource,
        width: usize,
        range: Option<TimeRange>,
    ) -> Result<Arc<MinMaxList>> {
        if let Some(hit) = self.get(name, width, range) {
            trace!(source = name, width, "min/max cache hit");
            return Ok(hit);
        }

        trace!(source = name, width, "min/max cache miss");
        let list = Arc::new(downsample_source(source, width, range)?);
        let key = CacheKey {
            source: name.to_string(),
            width,
            range,
        };
        // Another thread may have raced us here; keep whichever landed first.
        let mut entries = self.entries.write();
        Ok(entries.entry(key).or_insert(list).clone())
    }

    /// Stores a list computed elsewhere, e.g. one reloaded from disk.
    pub fn insert(&self, source: &str, range: Option<TimeRange>, list: MinMaxList) -> Arc<MinMaxList> {
        let list = Arc::new(list);
        let key = CacheKey {
            source: source.to_string(),
            width: list.width(),
            range,
        };
        self.entries.write().insert(key, list.clone());
        list
    }

    /// Drops every list computed for `source`.
    pub fn invalidate(&self, source: &str) {
        self.entries.write().retain(|k, _| k.source != source);
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
