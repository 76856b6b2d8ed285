use crate::config::SourceConfig;
use crate::data::quarter::QuarterKey;
use crate::data::series::{Observation, SeriesRecord};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

//cells the statistical agencies use for "not available"
const MISSING_MARKERS: &[&str] = &["", "..", "...", "x", "X", "F", "NA", "n/a"];

//parser collaborator: turns a configured source into a series record
pub trait SeriesSource {
    //loads and parses the source; frequency and rule come from the config, never inferred
    fn load(&self, source: &SourceConfig) -> Result<SeriesRecord>;

    //identifies the current content of the source, used as a cache key
    fn content_version(&self, source: &SourceConfig) -> Result<String>;
}

//reads two-column (date, value) csv files relative to a base directory
#[derive(Debug, Clone)]
pub struct CsvSource {
    base_dir: PathBuf,
}

impl CsvSource {
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Self {
        CsvSource {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn resolve(&self, source: &SourceConfig) -> PathBuf {
        self.base_dir.join(&source.path)
    }
}

impl SeriesSource for CsvSource {
    fn load(&self, source: &SourceConfig) -> Result<SeriesRecord> {
        let path = self.resolve(source);
        let observations = load_observations(&path, &source.date_column, &source.value_column)?;

        log::debug!(
            "Loaded {} observations for '{}' from {:?}",
            observations.len(),
            source.name,
            path
        );

        SeriesRecord::new(
            source.name.clone(),
            source.native_frequency,
            source.aggregation_rule,
            observations,
        )
        .context(format!("Invalid series data in {:?}", path))
    }

    //sha256 of the file bytes, stable across processes and toolchains
    fn content_version(&self, source: &SourceConfig) -> Result<String> {
        let path = self.resolve(source);
        let bytes =
            std::fs::read(&path).context(format!("Failed to read source file: {:?}", path))?;

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(format!("{:x}", hasher.finalize()))
    }
}

//reads (date, value) observations from a csv file with a header row
pub fn load_observations<P: AsRef<Path>>(
    path: P,
    date_column: &str,
    value_column: &str,
) -> Result<Vec<Observation>> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_path(path)
        .context(format!("Failed to open CSV file: {:?}", path))?;

    let headers = reader
        .headers()
        .context(format!("Failed to read CSV header of {:?}", path))?
        .clone();
    let date_idx = find_column(&headers, date_column)
        .ok_or_else(|| anyhow::anyhow!("Column '{}' not found in {:?}", date_column, path))?;
    let value_idx = find_column(&headers, value_column)
        .ok_or_else(|| anyhow::anyhow!("Column '{}' not found in {:?}", value_column, path))?;

    let mut observations = Vec::new();
    let mut skipped = 0usize;

    for (index, result) in reader.records().enumerate() {
        let line = index + 2;
        let record = result.context(format!("Failed to parse CSV record at line {}", line))?;

        let raw_value = record.get(value_idx).unwrap_or("");
        let value = match parse_value(raw_value) {
            Some(value) => value,
            None => {
                log::debug!("Skipping line {} of {:?}: value '{}'", line, path, raw_value);
                skipped += 1;
                continue;
            }
        };

        let raw_date = record.get(date_idx).unwrap_or("");
        let date = parse_period_start(raw_date).ok_or_else(|| {
            anyhow::anyhow!(
                "Failed to parse date '{}' at line {} of {:?}",
                raw_date,
                line,
                path
            )
        })?;

        observations.push(Observation::new(date, value));
    }

    if skipped > 0 {
        log::warn!("Skipped {} rows without a numeric value in {:?}", skipped, path);
    }

    Ok(observations)
}

//parses a numeric cell, none for missing markers and non-numeric text
pub fn parse_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if MISSING_MARKERS.contains(&trimmed) {
        return None;
    }

    let cleaned: String = trimmed.chars().filter(|c| *c != ',').collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

//parses a period label into the date its period starts on
//accepts 2021-03-15, 2021-03, Mar 2021, Mar-21 and quarter labels like Q1 2021
pub fn parse_period_start(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }

    for (suffix, format) in [
        ("-01", "%Y-%m-%d"),
        (" 01", "%b %Y %d"),
        ("-01", "%b-%y-%d"),
    ] {
        let candidate = format!("{}{}", s, suffix);
        if let Ok(date) = NaiveDate::parse_from_str(&candidate, format) {
            return Some(date);
        }
    }

    s.parse::<QuarterKey>().ok().map(|q| q.start_date())
}

fn find_column(headers: &StringRecord, wanted: &str) -> Option<usize> {
    let wanted = normalize_header(wanted);
    headers.iter().position(|h| normalize_header(h) == wanted)
}

//lowercases and collapses every run of non-word characters to one underscore,
//so "Net non-permanent residents" matches net_non_permanent_residents
fn normalize_header(header: &str) -> String {
    let mut out = String::with_capacity(header.len());
    let mut pending_sep = false;

    for c in header.trim_start_matches('\u{feff}').chars() {
        if c.is_alphanumeric() || c == '_' {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.extend(c.to_lowercase());
        } else {
            pending_sep = true;
        }
    }

    out.trim_matches('_').to_string()
}
