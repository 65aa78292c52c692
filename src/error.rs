use thiserror::Error;

/// Errors reported by downsampling, trace validation and rendering.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("data format error: {0}")]
    DataFormat(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

impl GraphError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn format(msg: impl Into<String>) -> Self {
        Self::DataFormat(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, GraphError>;
