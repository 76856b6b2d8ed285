use crate::data::panel::Panel;
use crate::data::quarter::QuarterKey;
use prettytable::{Cell, Row, Table};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

//coverage and descriptive statistics for one panel column, over present cells only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub name: String,
    pub first_quarter: Option<QuarterKey>,
    pub last_quarter: Option<QuarterKey>,
    pub present: usize,
    pub absent: usize,
    pub coverage: f64,
    pub mean: Option<f64>,
    pub std_dev: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl ColumnSummary {
    pub fn from_cells(name: &str, quarters: &[QuarterKey], cells: &[Option<f64>]) -> Self {
        let present: Vec<(QuarterKey, f64)> = quarters
            .iter()
            .zip(cells)
            .filter_map(|(&q, cell)| cell.map(|v| (q, v)))
            .collect();
        let values: Vec<f64> = present.iter().map(|(_, v)| *v).collect();

        let coverage = if cells.is_empty() {
            0.0
        } else {
            values.len() as f64 / cells.len() as f64
        };

        let (mean, min, max) = if values.is_empty() {
            (None, None, None)
        } else {
            (
                Some(values.iter().mean()),
                Some(Statistics::min(values.iter())),
                Some(Statistics::max(values.iter())),
            )
        };

        //sample standard deviation needs at least two points
        let std_dev = if values.len() >= 2 {
            Some(values.iter().std_dev())
        } else {
            None
        };

        ColumnSummary {
            name: name.to_string(),
            first_quarter: present.first().map(|(q, _)| *q),
            last_quarter: present.last().map(|(q, _)| *q),
            present: values.len(),
            absent: cells.len() - values.len(),
            coverage,
            mean,
            std_dev,
            min,
            max,
        }
    }
}

//summary of a whole panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelSummary {
    pub region: String,
    pub first_quarter: Option<QuarterKey>,
    pub last_quarter: Option<QuarterKey>,
    pub rows: usize,
    pub columns: Vec<ColumnSummary>,
}

impl PanelSummary {
    //calculate per-column summaries for a panel
    pub fn from_panel(region: &str, panel: &Panel) -> Self {
        let columns = panel
            .column_names()
            .filter_map(|name| {
                panel
                    .column(name)
                    .map(|cells| ColumnSummary::from_cells(name, panel.quarters(), cells))
            })
            .collect();

        PanelSummary {
            region: region.to_string(),
            first_quarter: panel.first_quarter(),
            last_quarter: panel.last_quarter(),
            rows: panel.len(),
            columns,
        }
    }

    pub fn column(&self, name: &str) -> Option<&ColumnSummary> {
        self.columns.iter().find(|c| c.name == name)
    }

    //prints column summaries in a formatted table
    pub fn pretty_print_table(&self) {
        let span = match (self.first_quarter, self.last_quarter) {
            (Some(first), Some(last)) => format!("{} to {}", first.label(), last.label()),
            _ => "no data".to_string(),
        };
        println!("{}: {} quarters ({})", self.region, self.rows, span);

        let mut table = Table::new();
        table.add_row(Row::new(
            ["Series", "First", "Last", "Present", "Coverage", "Mean", "Std Dev", "Min", "Max"]
                .iter()
                .map(|h| Cell::new(h))
                .collect(),
        ));

        for column in &self.columns {
            table.add_row(Row::new(vec![
                Cell::new(&column.name),
                Cell::new(&format_quarter(column.first_quarter)),
                Cell::new(&format_quarter(column.last_quarter)),
                Cell::new(&format!("{}/{}", column.present, column.present + column.absent)),
                Cell::new(&format!("{:.1}%", column.coverage * 100.0)),
                Cell::new(&format_number(column.mean)),
                Cell::new(&format_number(column.std_dev)),
                Cell::new(&format_number(column.min)),
                Cell::new(&format_number(column.max)),
            ]));
        }

        table.printstd();
    }
}

//prints the panel itself, one row per quarter
pub fn pretty_print_panel(panel: &Panel) {
    let mut table = Table::new();

    let mut header = vec![Cell::new("Quarter")];
    header.extend(panel.column_names().map(Cell::new));
    table.add_row(Row::new(header));

    for row in panel.rows() {
        let mut cells = vec![Cell::new(&row.quarter.label())];
        cells.extend(
            row.values
                .iter()
                .map(|(_, value)| Cell::new(&format_number(*value))),
        );
        table.add_row(Row::new(cells));
    }

    table.printstd();
}

fn format_quarter(quarter: Option<QuarterKey>) -> String {
    quarter.map(|q| q.label()).unwrap_or_else(|| "-".to_string())
}

fn format_number(value: Option<f64>) -> String {
    match value {
        Some(v) if v.abs() >= 1000.0 => format!("{:.0}", v),
        Some(v) => format!("{:.2}", v),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::series::{AggregationRule, Frequency, SeriesRecord};
    use crate::engine::fusion::fuse;
    use approx::assert_relative_eq;

    fn q(year: i32, quarter: u8) -> QuarterKey {
        QuarterKey::new(year, quarter).unwrap()
    }

    fn panel() -> Panel {
        let starts = SeriesRecord::new(
            "starts",
            Frequency::Quarterly,
            AggregationRule::Mean,
            vec![
                (q(2020, 1).start_date(), 2.0),
                (q(2020, 2).start_date(), 4.0),
                (q(2020, 4).start_date(), 6.0),
            ],
        )
        .unwrap();
        let rate = SeriesRecord::new(
            "rate",
            Frequency::Quarterly,
            AggregationRule::Last,
            vec![(q(2020, 3).start_date(), 0.25)],
        )
        .unwrap();
        fuse(&[starts, rate]).unwrap()
    }

    #[test]
    fn test_column_statistics() {
        let summary = PanelSummary::from_panel("Alberta", &panel());
        assert_eq!(summary.rows, 4);

        let starts = summary.column("starts").unwrap();
        assert_eq!(starts.present, 3);
        assert_eq!(starts.absent, 1);
        assert_relative_eq!(starts.coverage, 0.75);
        assert_relative_eq!(starts.mean.unwrap(), 4.0);
        assert_relative_eq!(starts.std_dev.unwrap(), 2.0);
        assert_eq!(starts.min, Some(2.0));
        assert_eq!(starts.max, Some(6.0));
        assert_eq!(starts.first_quarter, Some(q(2020, 1)));
        assert_eq!(starts.last_quarter, Some(q(2020, 4)));
    }

    #[test]
    fn test_single_point_has_no_std_dev() {
        let summary = PanelSummary::from_panel("Alberta", &panel());
        let rate = summary.column("rate").unwrap();
        assert_eq!(rate.present, 1);
        assert_eq!(rate.std_dev, None);
        assert_eq!(rate.mean, Some(0.25));
        assert_eq!(rate.first_quarter, rate.last_quarter);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(Some(25_123.4)), "25123");
        assert_eq!(format_number(Some(0.256)), "0.26");
        assert_eq!(format_number(None), "-");
    }
}
