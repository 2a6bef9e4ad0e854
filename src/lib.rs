pub mod atlas;
pub mod config;
pub mod error;
pub mod ingestion;
pub mod pipeline;
pub mod types;

pub use config::{AtlasConfig, PipelineConfig};
pub use pipeline::Pipeline;
