use crate::data::quarter::QuarterKey;
use crate::data::series::Frequency;
use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PanelError {
    #[error("Cannot build a panel from zero series")]
    EmptyInput,
    #[error("Series name '{0}' was supplied more than once")]
    DuplicateSeriesName(String),
    #[error("Series '{name}' is {frequency}; only quarterly series can be fused")]
    NotQuarterly { name: String, frequency: Frequency },
    #[error("Unknown panel column: '{0}'")]
    UnknownColumn(String),
    #[error("Panel column '{0}' already exists")]
    DuplicateColumn(String),
}

//one chronological row of a panel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelRow<'a> {
    pub quarter: QuarterKey,
    pub values: Vec<(&'a str, Option<f64>)>,
}

impl PanelRow<'_> {
    pub fn get(&self, column: &str) -> Option<f64> {
        self.values
            .iter()
            .find(|(name, _)| *name == column)
            .and_then(|(_, value)| *value)
    }
}

//a present cell in long (tidy) layout
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LongRow {
    pub quarter: QuarterKey,
    pub series: String,
    pub value: f64,
}

//quarter-indexed table of named columns; a cell is a value or absent
//rows are contiguous and chronological, columns keep insertion order
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    quarters: Vec<QuarterKey>,
    columns: IndexMap<String, Vec<Option<f64>>>,
}

impl Panel {
    //builds a panel over a fixed quarter index with no columns yet
    pub(crate) fn with_index(quarters: Vec<QuarterKey>) -> Self {
        Panel {
            quarters,
            columns: IndexMap::new(),
        }
    }

    //appends a column whose cells line up with the quarter index
    pub(crate) fn push_column(
        &mut self,
        name: String,
        cells: Vec<Option<f64>>,
    ) -> Result<(), PanelError> {
        debug_assert_eq!(cells.len(), self.quarters.len());
        if self.columns.contains_key(&name) {
            return Err(PanelError::DuplicateColumn(name));
        }
        self.columns.insert(name, cells);
        Ok(())
    }

    pub fn quarters(&self) -> &[QuarterKey] {
        &self.quarters
    }

    pub fn first_quarter(&self) -> Option<QuarterKey> {
        self.quarters.first().copied()
    }

    pub fn last_quarter(&self) -> Option<QuarterKey> {
        self.quarters.last().copied()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    //cells for a column, aligned with quarters()
    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    pub fn value(&self, quarter: QuarterKey, column: &str) -> Option<f64> {
        let idx = self.row_index(quarter)?;
        self.columns.get(column).and_then(|cells| cells[idx])
    }

    pub fn row_index(&self, quarter: QuarterKey) -> Option<usize> {
        self.quarters.binary_search(&quarter).ok()
    }

    pub fn len(&self) -> usize {
        self.quarters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quarters.is_empty()
    }

    //iterates rows in chronological order
    pub fn rows(&self) -> impl Iterator<Item = PanelRow<'_>> + '_ {
        self.quarters.iter().enumerate().map(move |(idx, &quarter)| PanelRow {
            quarter,
            values: self
                .columns
                .iter()
                .map(|(name, cells)| (name.as_str(), cells[idx]))
                .collect(),
        })
    }

    //present cells in long layout, by quarter then column order
    pub fn to_long(&self) -> Vec<LongRow> {
        let mut long = Vec::new();
        for (idx, &quarter) in self.quarters.iter().enumerate() {
            for (name, cells) in &self.columns {
                if let Some(value) = cells[idx] {
                    long.push(LongRow {
                        quarter,
                        series: name.clone(),
                        value,
                    });
                }
            }
        }
        long
    }

    //restricts rows to the inclusive window [from, to]; either bound may be open
    pub fn slice(&self, from: Option<QuarterKey>, to: Option<QuarterKey>) -> Panel {
        let keep: Vec<usize> = self
            .quarters
            .iter()
            .enumerate()
            .filter(|(_, q)| from.map_or(true, |f| **q >= f) && to.map_or(true, |t| **q <= t))
            .map(|(idx, _)| idx)
            .collect();

        Panel {
            quarters: keep.iter().map(|&idx| self.quarters[idx]).collect(),
            columns: self
                .columns
                .iter()
                .map(|(name, cells)| (name.clone(), keep.iter().map(|&idx| cells[idx]).collect()))
                .collect(),
        }
    }
}
