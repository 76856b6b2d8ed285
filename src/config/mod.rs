pub mod pipeline_config;

pub use pipeline_config::{DerivedConfig, PipelineConfiguration, SourceConfig};
