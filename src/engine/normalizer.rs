use crate::data::quarter::QuarterKey;
use crate::data::series::{Frequency, Observation, SeriesError, SeriesRecord};
use std::collections::BTreeMap;

//collapses a daily, monthly or quarterly series into a quarterly one
//quarters without any observation are left out rather than zero-filled
pub fn normalize(series: &SeriesRecord, target: Frequency) -> Result<SeriesRecord, SeriesError> {
    if target != Frequency::Quarterly {
        return Err(SeriesError::UnsupportedTarget {
            name: series.name().to_string(),
            from: series.native_frequency(),
            to: target,
        });
    }

    let rule = series.aggregation_rule();

    //observations are already date-sorted, so each bucket is chronological
    let mut buckets: BTreeMap<QuarterKey, Vec<f64>> = BTreeMap::new();
    for obs in series.observations() {
        buckets.entry(obs.quarter()).or_default().push(obs.value);
    }

    let mut observations = Vec::with_capacity(buckets.len());
    for (quarter, values) in buckets {
        let value = match rule.reduce(&values) {
            Some(value) => value,
            None => continue,
        };

        //finite inputs can still sum past f64::MAX
        if !value.is_finite() {
            return Err(SeriesError::AggregateOverflow {
                name: series.name().to_string(),
                quarter: quarter.to_string(),
                rule,
            });
        }
        observations.push(Observation::new(quarter.start_date(), value));
    }

    SeriesRecord::new(
        series.name(),
        Frequency::Quarterly,
        rule,
        observations,
    )
}

//normalizes every series to quarterly, stopping at the first failure
pub fn normalize_all(series: &[SeriesRecord]) -> Result<Vec<SeriesRecord>, SeriesError> {
    series
        .iter()
        .map(|s| normalize(s, Frequency::Quarterly))
        .collect()
}
