//! mseed_graph: min/max waveform overview graphs for seismological traces

pub mod cache;
pub mod color;
pub mod decimation;
pub mod error;
pub mod gaps;
pub mod graph;
pub mod render;
pub mod scales;
pub mod source;
pub mod style;
pub mod time;
pub mod trace;

pub use cache::MinMaxCache;
pub use color::Color;
pub use decimation::{downsample, downsample_parallel, downsample_source, Bucket, MinMaxList};
pub use error::{GraphError, Result};
pub use gaps::{GapIndex, GapSegment};
pub use graph::{create_graph, create_graph_file, create_min_max_list, GraphRequest};
pub use source::{Sample, SampleSeries, SampleSource};
pub use style::{GraphConfig, OutputFormat, RenderStyle};
pub use time::{TimeRange, Timestamp};
pub use trace::{Trace, TraceData, TraceList};
