//a Rust-based frequency normalization and quarterly alignment engine for economic time series

pub mod config;
pub mod data;
pub mod engine;
pub mod metrics;

//prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{DerivedConfig, PipelineConfiguration, SourceConfig};
    pub use crate::data::{
        write_long_csv, write_panel_csv, AggregationRule, CsvSource, Frequency, Observation,
        Panel, PanelError, PanelRow, QuarterKey, SeriesCache, SeriesError, SeriesRecord,
        SeriesSource,
    };
    pub use crate::engine::{
        derive, derive_op, fuse, normalize, normalize_all, DerivedOp, PanelPipeline,
        PipelineResult,
    };
    pub use crate::metrics::{pretty_print_panel, ColumnSummary, PanelSummary};
}
