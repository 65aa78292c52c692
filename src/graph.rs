//! Entry points tying a sample source, the downsampler and the renderer
//! together.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::decimation::{downsample_source, MinMaxList};
use crate::error::{GraphError, Result};
use crate::render::render;
use crate::source::SampleSource;
use crate::style::{GraphConfig, RenderStyle};
use crate::time::{from_datetime, TimeRange, Timestamp};

/// Everything a single graph rendering needs besides the source.
#[derive(Debug, Clone, Default)]
pub struct GraphRequest<'a> {
    pub style: RenderStyle,
    /// Left edge of the graph; defaults to the first sample.
    pub starttime: Option<Timestamp>,
    /// Right edge of the graph; defaults to the end of the data.
    pub endtime: Option<Timestamp>,
    /// A list computed earlier for this source and width. When present the
    /// source is not scanned at all.
    pub minmaxlist: Option<&'a MinMaxList>,
}

impl<'a> GraphRequest<'a> {
    pub fn new(style: RenderStyle) -> Self {
        Self {
            style,
            ..Default::default()
        }
    }

    pub fn from_config(config: &GraphConfig) -> Self {
        Self {
            style: config.style.clone(),
            starttime: config.starttime.as_ref().map(from_datetime),
            endtime: config.endtime.as_ref().map(from_datetime),
            minmaxlist: None,
        }
    }

    pub fn with_starttime(mut self, starttime: Timestamp) -> Self {
        self.starttime = Some(starttime);
        self
    }

    pub fn with_endtime(mut self, endtime: Timestamp) -> Self {
        self.endtime = Some(endtime);
        self
    }

    pub fn with_min_max_list(mut self, list: &'a MinMaxList) -> Self {
        self.minmaxlist = Some(list);
        self
    }
}

/// Fills in whichever end of the window the caller left open from the
/// source extent.
pub fn resolve_range(
    source: &dyn SampleSource,
    starttime: Option<Timestamp>,
    endtime: Option<Timestamp>,
) -> Result<TimeRange> {
    let extent = source.extent();
    let start = starttime.or(extent.map(|e| e.start));
    let end = endtime.or(extent.map(|e| e.end));
    match (start, end) {
        (Some(start), Some(end)) => TimeRange::new(start, end),
        _ => Err(GraphError::invalid(
            "source has no samples; both starttime and endtime are required",
        )),
    }
}

/// Computes the min/max list for `width` pixel columns, to be reused across
/// several `create_graph` calls.
pub fn create_min_max_list(
    source: &dyn SampleSource,
    width: usize,
    range: Option<TimeRange>,
) -> Result<MinMaxList> {
    downsample_source(source, width, range)
}

/// Renders a graph of `source` and returns the encoded bytes.
pub fn create_graph(source: &dyn SampleSource, request: &GraphRequest<'_>) -> Result<Vec<u8>> {
    request.style.validate()?;
    let width = request.style.width as usize;

    let computed;
    let list = match request.minmaxlist {
        Some(list) => {
            if list.width() != width {
                return Err(GraphError::invalid(format!(
                    "precomputed min/max list is {} wide, graph is {}",
                    list.width(),
                    width
                )));
            }
            let range = list.range();
            if request.starttime.is_some_and(|t| t != range.start)
                || request.endtime.is_some_and(|t| t != range.end)
            {
                return Err(GraphError::invalid(
                    "explicit time window disagrees with the precomputed min/max list",
                ));
            }
            debug!(width, "using precomputed min/max list");
            list
        }
        None => {
            let range = resolve_range(source, request.starttime, request.endtime)?;
            computed = downsample_source(source, width, Some(range))?;
            &computed
        }
    };

    render(list, &request.style)
}

/// Renders to `path`, appending the format's extension when the path has
/// none. Returns the path actually written.
pub fn create_graph_file(
    source: &dyn SampleSource,
    path: impl AsRef<Path>,
    request: &GraphRequest<'_>,
) -> Result<PathBuf> {
    let bytes = create_graph(source, request)?;

    let mut path = path.as_ref().to_path_buf();
    if path.extension().is_none() {
        path.set_extension(request.style.format.extension());
    }
    std::fs::write(&path, &bytes)?;
    info!(path = %path.display(), bytes = bytes.len(), "graph written");
    Ok(path)
}
