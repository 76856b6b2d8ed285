use crate::data::quarter::QuarterKey;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SeriesError {
    #[error("Series name must not be empty")]
    EmptyName,
    #[error("Series '{name}' has more than one observation dated {date}")]
    DuplicateDate { name: String, date: NaiveDate },
    #[error("Series '{name}' has a non-finite value ({value}) at {date}")]
    NonFiniteValue {
        name: String,
        date: NaiveDate,
        value: f64,
    },
    #[error(
        "Series '{name}' is tagged {frequency} but has several observations in period {period}"
    )]
    DuplicatePeriod {
        name: String,
        frequency: Frequency,
        period: String,
    },
    #[error("Cannot normalize series '{name}' from {from} to {to}")]
    UnsupportedTarget {
        name: String,
        from: Frequency,
        to: Frequency,
    },
    #[error("Aggregating series '{name}' overflowed in {quarter} ({rule})")]
    AggregateOverflow {
        name: String,
        quarter: String,
        rule: AggregationRule,
    },
}

//recording cadence of a series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Monthly,
    Quarterly,
}

impl Frequency {
    //parse frequency from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "d" => Some(Frequency::Daily),
            "monthly" | "m" => Some(Frequency::Monthly),
            "quarterly" | "q" => Some(Frequency::Quarterly),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Monthly => "monthly",
            Frequency::Quarterly => "quarterly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Frequency::parse(s).ok_or_else(|| format!("unknown frequency '{}'", s))
    }
}

//reduction applied when collapsing finer periods into a quarter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationRule {
    Last,
    Mean,
    Sum,
}

impl AggregationRule {
    //parse aggregation rule from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "last" | "end" => Some(AggregationRule::Last),
            "mean" | "avg" | "average" => Some(AggregationRule::Mean),
            "sum" | "total" => Some(AggregationRule::Sum),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationRule::Last => "last",
            AggregationRule::Mean => "mean",
            AggregationRule::Sum => "sum",
        }
    }

    //reduces chronologically ordered values, none when there is nothing to reduce
    pub fn reduce(&self, values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }

        match self {
            AggregationRule::Last => values.last().copied(),
            AggregationRule::Sum => Some(values.iter().sum()),
            AggregationRule::Mean => Some(values.iter().sum::<f64>() / values.len() as f64),
        }
    }
}

impl fmt::Display for AggregationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AggregationRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AggregationRule::parse(s).ok_or_else(|| format!("unknown aggregation rule '{}'", s))
    }
}

//a single dated value, dated at the start of its period
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

impl Observation {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Observation { date, value }
    }

    pub fn quarter(&self) -> QuarterKey {
        QuarterKey::from_date(self.date)
    }
}

impl From<(NaiveDate, f64)> for Observation {
    fn from((date, value): (NaiveDate, f64)) -> Self {
        Observation { date, value }
    }
}

//frequency-tagged, time-ordered sequence of observations
//immutable once built: observations are sorted with unique dates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesRecord {
    name: String,
    native_frequency: Frequency,
    aggregation_rule: AggregationRule,
    observations: Vec<Observation>,
}

impl SeriesRecord {
    //creates a series record, sorting observations and validating them
    pub fn new<I, O>(
        name: impl Into<String>,
        native_frequency: Frequency,
        aggregation_rule: AggregationRule,
        observations: I,
    ) -> Result<Self, SeriesError>
    where
        I: IntoIterator<Item = O>,
        O: Into<Observation>,
    {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(SeriesError::EmptyName);
        }

        let mut observations: Vec<Observation> =
            observations.into_iter().map(Into::into).collect();

        if let Some(bad) = observations.iter().find(|o| !o.value.is_finite()) {
            return Err(SeriesError::NonFiniteValue {
                name,
                date: bad.date,
                value: bad.value,
            });
        }

        observations.sort_by_key(|o| o.date);

        for pair in observations.windows(2) {
            let (prev, next) = (pair[0], pair[1]);
            if prev.date == next.date {
                return Err(SeriesError::DuplicateDate {
                    name,
                    date: next.date,
                });
            }

            //coarse series must carry one observation per native period
            let period = match native_frequency {
                Frequency::Daily => None,
                Frequency::Monthly => {
                    let same_month = prev.date.year() == next.date.year()
                        && prev.date.month() == next.date.month();
                    same_month.then(|| next.date.format("%Y-%m").to_string())
                }
                Frequency::Quarterly => {
                    (prev.quarter() == next.quarter()).then(|| next.quarter().to_string())
                }
            };

            if let Some(period) = period {
                return Err(SeriesError::DuplicatePeriod {
                    name,
                    frequency: native_frequency,
                    period,
                });
            }
        }

        Ok(SeriesRecord {
            name,
            native_frequency,
            aggregation_rule,
            observations,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn native_frequency(&self) -> Frequency {
        self.native_frequency
    }

    pub fn aggregation_rule(&self) -> AggregationRule {
        self.aggregation_rule
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn first(&self) -> Option<&Observation> {
        self.observations.first()
    }

    pub fn last(&self) -> Option<&Observation> {
        self.observations.last()
    }

    //returns the value observed on an exact date
    pub fn value_at(&self, date: NaiveDate) -> Option<f64> {
        self.observations
            .binary_search_by_key(&date, |o| o.date)
            .ok()
            .map(|idx| self.observations[idx].value)
    }

    //quarter span covered by the observations
    pub fn quarter_range(&self) -> Option<(QuarterKey, QuarterKey)> {
        match (self.first(), self.last()) {
            (Some(first), Some(last)) => Some((first.quarter(), last.quarter())),
            _ => None,
        }
    }

    //observations where the value differs from the preceding one (eg rate announcements)
    pub fn change_points(&self) -> Vec<Observation> {
        let mut changes = Vec::new();
        let mut previous: Option<f64> = None;

        for obs in &self.observations {
            if previous != Some(obs.value) {
                changes.push(*obs);
            }
            previous = Some(obs.value);
        }

        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_new_sorts_observations() {
        let series = SeriesRecord::new(
            "policy_rate",
            Frequency::Daily,
            AggregationRule::Last,
            vec![(d(2021, 3, 20), 0.5), (d(2021, 1, 4), 0.25)],
        )
        .unwrap();

        let dates: Vec<_> = series.observations().iter().map(|o| o.date).collect();
        assert_eq!(dates, vec![d(2021, 1, 4), d(2021, 3, 20)]);
    }

    #[test]
    fn test_new_rejects_duplicate_dates() {
        let err = SeriesRecord::new(
            "policy_rate",
            Frequency::Daily,
            AggregationRule::Last,
            vec![(d(2021, 1, 4), 0.25), (d(2021, 1, 4), 0.5)],
        )
        .unwrap_err();

        assert_eq!(
            err,
            SeriesError::DuplicateDate {
                name: "policy_rate".to_string(),
                date: d(2021, 1, 4)
            }
        );
    }

    #[test]
    fn test_new_rejects_non_finite_values() {
        let err = SeriesRecord::new(
            "starts",
            Frequency::Monthly,
            AggregationRule::Mean,
            vec![(d(2021, 1, 1), f64::NAN)],
        )
        .unwrap_err();

        assert!(matches!(err, SeriesError::NonFiniteValue { .. }));
    }

    #[test]
    fn test_new_rejects_empty_name() {
        let err = SeriesRecord::new(
            "  ",
            Frequency::Monthly,
            AggregationRule::Mean,
            Vec::<Observation>::new(),
        )
        .unwrap_err();

        assert_eq!(err, SeriesError::EmptyName);
    }

    #[test]
    fn test_monthly_series_flags_mixed_cadence() {
        let err = SeriesRecord::new(
            "starts",
            Frequency::Monthly,
            AggregationRule::Mean,
            vec![(d(2021, 1, 1), 10.0), (d(2021, 1, 31), 12.0)],
        )
        .unwrap_err();

        assert!(matches!(err, SeriesError::DuplicatePeriod { ref period, .. } if period == "2021-01"));
    }

    #[test]
    fn test_quarterly_series_flags_two_values_in_one_quarter() {
        let err = SeriesRecord::new(
            "immigrants",
            Frequency::Quarterly,
            AggregationRule::Sum,
            vec![(d(2021, 1, 1), 10.0), (d(2021, 3, 31), 12.0)],
        )
        .unwrap_err();

        assert!(matches!(err, SeriesError::DuplicatePeriod { ref period, .. } if period == "2021Q1"));
    }

    #[test]
    fn test_change_points() {
        let series = SeriesRecord::new(
            "policy_rate",
            Frequency::Daily,
            AggregationRule::Last,
            vec![
                (d(2022, 1, 3), 0.25),
                (d(2022, 1, 4), 0.25),
                (d(2022, 3, 2), 0.5),
                (d(2022, 3, 3), 0.5),
                (d(2022, 4, 13), 1.0),
            ],
        )
        .unwrap();

        let changes: Vec<_> = series.change_points().iter().map(|o| o.date).collect();
        assert_eq!(changes, vec![d(2022, 1, 3), d(2022, 3, 2), d(2022, 4, 13)]);
    }

    #[test]
    fn test_value_at_and_quarter_range() {
        let series = SeriesRecord::new(
            "hpi",
            Frequency::Monthly,
            AggregationRule::Mean,
            vec![(d(2020, 2, 1), 100.0), (d(2021, 5, 1), 110.0)],
        )
        .unwrap();

        assert_eq!(series.value_at(d(2021, 5, 1)), Some(110.0));
        assert_eq!(series.value_at(d(2021, 4, 1)), None);
        assert_eq!(
            series.quarter_range(),
            Some((
                QuarterKey::new(2020, 1).unwrap(),
                QuarterKey::new(2021, 2).unwrap()
            ))
        );
    }

    #[test]
    fn test_reduce_rules() {
        let values = [1.0, 2.0, 6.0];
        assert_eq!(AggregationRule::Last.reduce(&values), Some(6.0));
        assert_eq!(AggregationRule::Sum.reduce(&values), Some(9.0));
        assert_eq!(AggregationRule::Mean.reduce(&values), Some(3.0));
        assert_eq!(AggregationRule::Mean.reduce(&[]), None);
    }

    #[test]
    fn test_parse_tags() {
        assert_eq!(Frequency::parse("DAILY"), Some(Frequency::Daily));
        assert_eq!(Frequency::parse("weekly"), None);
        assert_eq!(AggregationRule::parse("Mean"), Some(AggregationRule::Mean));
        assert_eq!(
            serde_json::to_string(&AggregationRule::Last).unwrap(),
            "\"last\""
        );
    }
}
