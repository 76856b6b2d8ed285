use crate::data::panel::{Panel, PanelError};
use serde::{Deserialize, Serialize};

//named composite operations available from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DerivedOp {
    //first input minus the remaining inputs
    Difference,
    Sum,
}

impl DerivedOp {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "difference" | "diff" | "subtract" => Some(DerivedOp::Difference),
            "sum" | "add" => Some(DerivedOp::Sum),
            _ => None,
        }
    }

    pub fn apply(&self, values: &[f64]) -> f64 {
        match self {
            DerivedOp::Difference => match values.split_first() {
                Some((first, rest)) => first - rest.iter().sum::<f64>(),
                None => 0.0,
            },
            DerivedOp::Sum => values.iter().sum(),
        }
    }
}

//appends a column computed row by row from existing columns
//a row is absent unless every input is present; the source panel is never modified
pub fn derive<F>(panel: &Panel, name: &str, inputs: &[&str], f: F) -> Result<Panel, PanelError>
where
    F: Fn(&[f64]) -> f64,
{
    if panel.has_column(name) {
        return Err(PanelError::DuplicateColumn(name.to_string()));
    }

    let columns = inputs
        .iter()
        .map(|input| {
            panel
                .column(input)
                .ok_or_else(|| PanelError::UnknownColumn(input.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut scratch = Vec::with_capacity(columns.len());
    let cells = (0..panel.len())
        .map(|row| {
            scratch.clear();
            for column in &columns {
                scratch.push(column[row]?);
            }
            Some(f(&scratch))
        })
        .collect();

    let mut derived = panel.clone();
    derived.push_column(name.to_string(), cells)?;
    Ok(derived)
}

//derive() with one of the named operations
pub fn derive_op(
    panel: &Panel,
    name: &str,
    op: DerivedOp,
    inputs: &[&str],
) -> Result<Panel, PanelError> {
    derive(panel, name, inputs, |values| op.apply(values))
}
