use crate::config::SourceConfig;
use crate::data::loader::SeriesSource;
use crate::data::series::SeriesRecord;
use anyhow::Result;
use std::collections::HashMap;

//caller-owned cache of parsed series keyed by (source name, content version)
//a changed file yields a new version, so stale entries are never served
#[derive(Debug, Default)]
pub struct SeriesCache {
    entries: HashMap<(String, String), SeriesRecord>,
    hits: u64,
    misses: u64,
}

impl SeriesCache {
    pub fn new() -> Self {
        Self::default()
    }

    //returns the cached series for the current content, loading it on a miss
    pub fn get_or_load<S>(&mut self, source: &S, config: &SourceConfig) -> Result<SeriesRecord>
    where
        S: SeriesSource + ?Sized,
    {
        let version = source.content_version(config)?;
        let key = (config.name.clone(), version);

        if let Some(series) = self.entries.get(&key) {
            self.hits += 1;
            log::debug!("Cache hit for '{}' (version {})", config.name, key.1);
            return Ok(series.clone());
        }

        self.misses += 1;
        let series = source.load(config)?;

        //older versions of the same source can no longer be requested
        self.entries.retain(|(name, _), _| name != &config.name);
        self.entries.insert(key, series.clone());
        Ok(series)
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
