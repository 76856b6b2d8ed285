use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid quarter label: '{0}'")]
pub struct ParseQuarterError(pub String);

//canonical (year, quarter) join key shared by every series
//field order gives the (year, quarter) total order through the derived Ord
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QuarterKey {
    year: i32,
    quarter: u8,
}

impl QuarterKey {
    //creates a quarter key, none if quarter is outside 1..=4
    //or the year has no full calendar in chrono's date range
    pub fn new(year: i32, quarter: u8) -> Option<Self> {
        let calendar_year = NaiveDate::from_ymd_opt(year, 1, 1).is_some()
            && NaiveDate::from_ymd_opt(year, 12, 31).is_some();

        if (1..=4).contains(&quarter) && calendar_year {
            Some(QuarterKey { year, quarter })
        } else {
            None
        }
    }

    //returns the quarter containing the given date
    pub fn from_date(date: NaiveDate) -> Self {
        QuarterKey {
            year: date.year(),
            quarter: ((date.month0() / 3) + 1) as u8,
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn quarter(&self) -> u8 {
        self.quarter
    }

    //first calendar day of the quarter
    //keys only exist for years with a full calendar, so the fallback is unreachable
    pub fn start_date(&self) -> NaiveDate {
        let month = (self.quarter as u32 - 1) * 3 + 1;
        NaiveDate::from_ymd_opt(self.year, month, 1).unwrap_or(NaiveDate::MIN)
    }

    //last calendar day of the quarter
    pub fn end_date(&self) -> NaiveDate {
        let (month, day) = match self.quarter {
            1 => (3, 31),
            2 => (6, 30),
            3 => (9, 30),
            _ => (12, 31),
        };
        NaiveDate::from_ymd_opt(self.year, month, day).unwrap_or(NaiveDate::MAX)
    }

    pub fn next(&self) -> Self {
        if self.quarter == 4 {
            QuarterKey {
                year: self.year + 1,
                quarter: 1,
            }
        } else {
            QuarterKey {
                year: self.year,
                quarter: self.quarter + 1,
            }
        }
    }

    pub fn prev(&self) -> Self {
        if self.quarter == 1 {
            QuarterKey {
                year: self.year - 1,
                quarter: 4,
            }
        } else {
            QuarterKey {
                year: self.year,
                quarter: self.quarter - 1,
            }
        }
    }

    //number of quarters from self to other (negative if other is earlier)
    pub fn quarters_until(&self, other: &QuarterKey) -> i64 {
        other.ordinal() - self.ordinal()
    }

    //returns every quarter from start to end inclusive, empty if end < start
    pub fn range_inclusive(start: QuarterKey, end: QuarterKey) -> Vec<QuarterKey> {
        let span = start.quarters_until(&end);
        if span < 0 {
            return Vec::new();
        }

        let mut quarters = Vec::with_capacity(span as usize + 1);
        let mut current = start;
        while current <= end {
            quarters.push(current);
            current = current.next();
        }
        quarters
    }

    //chart axis label, eg "2021 Q1"
    pub fn label(&self) -> String {
        format!("{} Q{}", self.year, self.quarter)
    }

    fn ordinal(&self) -> i64 {
        self.year as i64 * 4 + (self.quarter as i64 - 1)
    }
}

impl fmt::Display for QuarterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Q{}", self.year, self.quarter)
    }
}

impl FromStr for QuarterKey {
    type Err = ParseQuarterError;

    //accepts "2021Q1", "2021 Q1", "2021-Q1" and "Q1 2021"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseQuarterError(s.to_string());
        let compact: String = s
            .trim()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .collect::<String>()
            .to_uppercase();
        if !compact.is_ascii() {
            return Err(err());
        }

        let (year_part, quarter_part) = if let Some(rest) = compact.strip_prefix('Q') {
            //"Q1 2021" form
            if rest.is_empty() {
                return Err(err());
            }
            (&rest[1..], &rest[..1])
        } else {
            let pos = compact.find('Q').ok_or_else(err)?;
            (&compact[..pos], &compact[pos + 1..])
        };

        if year_part.len() != 4 || quarter_part.len() != 1 {
            return Err(err());
        }

        let year: i32 = year_part.parse().map_err(|_| err())?;
        let quarter: u8 = quarter_part.parse().map_err(|_| err())?;
        QuarterKey::new(year, quarter).ok_or_else(err)
    }
}

impl TryFrom<String> for QuarterKey {
    type Error = ParseQuarterError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<QuarterKey> for String {
    fn from(key: QuarterKey) -> Self {
        key.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(year: i32, quarter: u8) -> QuarterKey {
        QuarterKey::new(year, quarter).unwrap()
    }

    #[test]
    fn test_rejects_out_of_range_quarter() {
        assert!(QuarterKey::new(2021, 0).is_none());
        assert!(QuarterKey::new(2021, 5).is_none());
    }

    #[test]
    fn test_rejects_years_outside_calendar() {
        assert!(QuarterKey::new(300_000, 1).is_none());
        assert!(QuarterKey::new(-300_000, 4).is_none());
        assert!(QuarterKey::new(i32::MAX, 2).is_none());
        assert!(QuarterKey::new(i32::MIN, 3).is_none());

        let last = QuarterKey::from_date(NaiveDate::MAX);
        assert_eq!(QuarterKey::new(last.year(), last.quarter()), Some(last));
        assert_eq!(last.end_date(), NaiveDate::MAX);

        let first = QuarterKey::from_date(NaiveDate::MIN);
        assert_eq!(QuarterKey::new(first.year(), first.quarter()), Some(first));
        assert_eq!(first.start_date(), NaiveDate::MIN);
    }

    #[test]
    fn test_from_date_boundaries() {
        let d = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();
        assert_eq!(QuarterKey::from_date(d(2021, 1, 1)), q(2021, 1));
        assert_eq!(QuarterKey::from_date(d(2021, 3, 31)), q(2021, 1));
        assert_eq!(QuarterKey::from_date(d(2021, 4, 1)), q(2021, 2));
        assert_eq!(QuarterKey::from_date(d(2021, 12, 31)), q(2021, 4));
    }

    #[test]
    fn test_start_and_end_dates() {
        let key = q(2024, 1);
        assert_eq!(key.start_date(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(key.end_date(), NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());
        assert_eq!(q(2023, 4).end_date(), NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
    }

    #[test]
    fn test_ordering_follows_year_then_quarter() {
        assert!(q(2020, 4) < q(2021, 1));
        assert!(q(2021, 1) < q(2021, 2));
        assert_eq!(q(2020, 4).next(), q(2021, 1));
        assert_eq!(q(2021, 1).prev(), q(2020, 4));
    }

    #[test]
    fn test_range_inclusive_crosses_years() {
        let range = QuarterKey::range_inclusive(q(2020, 3), q(2021, 2));
        assert_eq!(range, vec![q(2020, 3), q(2020, 4), q(2021, 1), q(2021, 2)]);
        assert!(QuarterKey::range_inclusive(q(2021, 2), q(2020, 3)).is_empty());
        assert_eq!(QuarterKey::range_inclusive(q(2021, 2), q(2021, 2)).len(), 1);
    }

    #[test]
    fn test_parse_label_forms() {
        assert_eq!("2021Q1".parse::<QuarterKey>().unwrap(), q(2021, 1));
        assert_eq!("2021 Q3".parse::<QuarterKey>().unwrap(), q(2021, 3));
        assert_eq!("2021-q4".parse::<QuarterKey>().unwrap(), q(2021, 4));
        assert_eq!("Q2 2025".parse::<QuarterKey>().unwrap(), q(2025, 2));
        assert!("2021Q5".parse::<QuarterKey>().is_err());
        assert!("Q".parse::<QuarterKey>().is_err());
        assert!("2021-03-01".parse::<QuarterKey>().is_err());
    }

    #[test]
    fn test_display_and_label() {
        assert_eq!(q(2021, 1).to_string(), "2021Q1");
        assert_eq!(q(2021, 1).label(), "2021 Q1");
    }

    #[test]
    fn test_serde_uses_label() {
        assert_eq!(serde_json::to_string(&q(2021, 2)).unwrap(), "\"2021Q2\"");
        assert_eq!(serde_json::from_str::<QuarterKey>("\"2021Q2\"").unwrap(), q(2021, 2));
        assert!(serde_json::from_str::<QuarterKey>("\"2021Q7\"").is_err());
    }
}
