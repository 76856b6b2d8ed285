use crate::data::panel::{Panel, PanelError};
use crate::data::quarter::QuarterKey;
use crate::data::series::{Frequency, SeriesRecord};
use std::collections::{HashMap, HashSet};

//outer-joins quarterly series on the quarter key
//rows span every quarter between the global min and max, one column per series in input order
pub fn fuse(series: &[SeriesRecord]) -> Result<Panel, PanelError> {
    if series.is_empty() {
        return Err(PanelError::EmptyInput);
    }

    //validate everything before building anything
    let mut seen = HashSet::with_capacity(series.len());
    for s in series {
        if !seen.insert(s.name()) {
            return Err(PanelError::DuplicateSeriesName(s.name().to_string()));
        }
        if s.native_frequency() != Frequency::Quarterly {
            return Err(PanelError::NotQuarterly {
                name: s.name().to_string(),
                frequency: s.native_frequency(),
            });
        }
    }

    let bounds = series
        .iter()
        .filter_map(SeriesRecord::quarter_range)
        .reduce(|(lo, hi), (first, last)| (lo.min(first), hi.max(last)));

    let index = match bounds {
        Some((min, max)) => QuarterKey::range_inclusive(min, max),
        None => Vec::new(),
    };

    let mut panel = Panel::with_index(index);
    for s in series {
        let by_quarter: HashMap<QuarterKey, f64> = s
            .observations()
            .iter()
            .map(|o| (o.quarter(), o.value))
            .collect();

        let cells = panel
            .quarters()
            .iter()
            .map(|q| by_quarter.get(q).copied())
            .collect();

        panel.push_column(s.name().to_string(), cells)?;
    }

    Ok(panel)
}
