pub mod cache;
pub mod loader;
pub mod panel;
pub mod quarter;
pub mod series;
pub mod writer;

pub use cache::SeriesCache;
pub use loader::{load_observations, parse_period_start, parse_value, CsvSource, SeriesSource};
pub use panel::{LongRow, Panel, PanelError, PanelRow};
pub use quarter::{ParseQuarterError, QuarterKey};
pub use series::{AggregationRule, Frequency, Observation, SeriesError, SeriesRecord};
pub use writer::{write_long, write_long_csv, write_panel, write_panel_csv};
