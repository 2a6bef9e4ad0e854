use std::io;

/// All error types for the lumel pipeline.
///
/// `NoPositionChannel` and `AtlasOverflow` are recoverable per mesh: the
/// pipeline renders the model without a lightmap. The remaining variants are
/// loud failures.
#[derive(thiserror::Error, Debug)]
pub enum LumelError {
    #[error("Input error: {0}")]
    Input(String),
    #[error("Mesh has no 3-float position channel")]
    NoPositionChannel,
    #[error("Malformed vertex layout: {0}")]
    MalformedLayout(String),
    #[error("Unsupported index width: {0}-bit (16-bit required)")]
    UnsupportedIndexWidth(u32),
    #[error("Atlas overflow: triangle {triangle} needs {needed}px but atlas {axis} is {limit}px")]
    AtlasOverflow {
        triangle: usize,
        needed: u32,
        limit: u32,
        axis: &'static str,
    },
    #[error("Output error: {0}")]
    Output(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, LumelError>;
