pub mod bucketing;
pub mod min_max;

pub use bucketing::BucketGrid;
pub use min_max::{downsample, downsample_parallel, downsample_source, Bucket, MinMaxList};
