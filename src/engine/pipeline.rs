use crate::config::PipelineConfiguration;
use crate::data::cache::SeriesCache;
use crate::data::loader::SeriesSource;
use crate::data::panel::Panel;
use crate::data::series::{Frequency, SeriesRecord};
use crate::engine::derive::derive_op;
use crate::engine::fusion::fuse;
use crate::engine::normalizer::normalize;
use crate::metrics::PanelSummary;
use anyhow::{Context, Result};

//result of a pipeline run
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub panel: Panel,
    pub summary: PanelSummary,
    pub normalized: Vec<SeriesRecord>,
}

//load -> normalize -> fuse -> derive -> summarize
pub struct PanelPipeline {
    config: PipelineConfiguration,
}

impl PanelPipeline {
    pub fn new(config: PipelineConfiguration) -> Self {
        PanelPipeline { config }
    }

    pub fn config(&self) -> &PipelineConfiguration {
        &self.config
    }

    //runs every stage; all series are fully loaded before fusion starts
    pub fn run<S>(&self, source: &S, cache: &mut SeriesCache) -> Result<PipelineResult>
    where
        S: SeriesSource + ?Sized,
    {
        self.config.validate()?;

        log::info!(
            "Loading {} sources for {}",
            self.config.sources.len(),
            self.config.region
        );
        let mut raw = Vec::with_capacity(self.config.sources.len());
        for source_config in &self.config.sources {
            let series = cache
                .get_or_load(source, source_config)
                .context(format!("Failed to load source '{}'", source_config.name))?;
            log::debug!(
                "'{}': {} {} observations",
                series.name(),
                series.len(),
                series.native_frequency()
            );
            raw.push(series);
        }

        self.run_with_series(&raw)
    }

    //runs the in-memory stages on already parsed series
    pub fn run_with_series(&self, raw: &[SeriesRecord]) -> Result<PipelineResult> {
        log::info!("Normalizing {} series to quarterly", raw.len());
        let normalized = raw
            .iter()
            .map(|series| {
                normalize(series, Frequency::Quarterly)
                    .context(format!("Failed to normalize '{}'", series.name()))
            })
            .collect::<Result<Vec<_>>>()?;

        for series in &normalized {
            if let Some((first, last)) = series.quarter_range() {
                log::debug!(
                    "'{}': {} quarters ({} to {})",
                    series.name(),
                    series.len(),
                    first,
                    last
                );
            }
        }

        let mut panel = fuse(&normalized).context("Failed to fuse series into a panel")?;
        log::info!(
            "Fused panel: {} quarters x {} columns",
            panel.len(),
            panel.column_count()
        );

        for derived in &self.config.derived {
            let inputs: Vec<&str> = derived.inputs.iter().map(String::as_str).collect();
            panel = derive_op(&panel, &derived.name, derived.op, &inputs)
                .context(format!("Failed to derive '{}'", derived.name))?;
            log::debug!("Derived '{}' from {:?}", derived.name, derived.inputs);
        }

        let summary = PanelSummary::from_panel(&self.config.region, &panel);

        Ok(PipelineResult {
            panel,
            summary,
            normalized,
        })
    }
}
