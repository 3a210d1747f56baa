//! Ordered result tables.
//!
//! Every analysis returns one or more [`Table`]s: an ordered list of named
//! columns plus labeled rows. Row and column order carry meaning (they are
//! part of the presentation contract), so the type preserves insertion order
//! exactly and only renders to CSV at the reporting boundary.
//!
//! A [`Cell::Marker`] renders as `-` and marks a cell that is zero *by
//! construction* rather than zero by observation; the distinction is part of
//! the output contract for the exclusion crosstabs.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One table cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    /// No value.
    Empty,
    /// Integer count.
    Int(i64),
    /// Floating-point statistic; NaN renders as `NaN`.
    Num(f64),
    /// Free-form label.
    Text(String),
    /// Structurally-impossible cell, rendered as `-`.
    Marker,
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Int(value) => write!(f, "{value}"),
            Cell::Num(value) => write!(f, "{value}"),
            Cell::Text(value) => write!(f, "{value}"),
            Cell::Marker => write!(f, "-"),
        }
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Num(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Int(value)
    }
}

impl From<usize> for Cell {
    #[expect(clippy::cast_possible_wrap)]
    fn from(value: usize) -> Self {
        Cell::Int(value as i64)
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

/// An ordered, labeled result table.
///
/// The leading column holds the row labels under `index_name`; the remaining
/// columns are named by `columns`. Rows keep insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    index_name: String,
    columns: Vec<String>,
    rows: Vec<(String, Vec<Cell>)>,
}

impl Table {
    /// Create an empty table with the given index header and column names.
    #[must_use]
    pub fn new<I, S>(index_name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Table {
            index_name: index_name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row.
    ///
    /// # Panics
    ///
    /// Panics if the cell count does not match the column count.
    pub fn push_row(&mut self, label: impl Into<String>, cells: Vec<Cell>) {
        assert_eq!(
            cells.len(),
            self.columns.len(),
            "row cell count must match column count"
        );
        self.rows.push((label.into(), cells));
    }

    /// The index column header.
    #[must_use]
    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    /// The column names, excluding the index column.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// The rows in insertion order.
    #[must_use]
    pub fn rows(&self) -> &[(String, Vec<Cell>)] {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Look up a cell by row label and column name.
    #[must_use]
    pub fn get(&self, row_label: &str, column: &str) -> Option<&Cell> {
        let column_idx = self.columns.iter().position(|name| name == column)?;
        self.rows
            .iter()
            .find(|(label, _)| label == row_label)
            .map(|(_, cells)| &cells[column_idx])
    }

    /// Render the table as CSV with a header row.
    ///
    /// The row label is the leading field of every record. Fields containing
    /// commas, quotes, or newlines are quoted.
    #[must_use]
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        out.push_str(&csv_field(&self.index_name));
        for column in &self.columns {
            out.push(',');
            out.push_str(&csv_field(column));
        }
        out.push('\n');
        for (label, cells) in &self.rows {
            out.push_str(&csv_field(label));
            for cell in cells {
                out.push(',');
                out.push_str(&csv_field(&cell.to_string()));
            }
            out.push('\n');
        }
        out
    }
}

fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_header_and_rows() {
        let mut table = Table::new("feature", ["mean", "N"]);
        table.push_row("grammar", vec![Cell::Num(0.5), Cell::Int(10)]);
        table.push_row("fluency", vec![Cell::Num(f64::NAN), Cell::Int(10)]);
        assert_eq!(
            table.to_csv(),
            "feature,mean,N\ngrammar,0.5,10\nfluency,NaN,10\n"
        );
    }

    #[test]
    fn marker_renders_as_dash() {
        let mut table = Table::new("Score/Features", ["all features numeric"]);
        table.push_row("numeric non-zero human score", vec![Cell::Marker]);
        assert_eq!(
            table.to_csv(),
            "Score/Features,all features numeric\nnumeric non-zero human score,-\n"
        );
    }

    #[test]
    fn quotes_fields_with_commas() {
        let mut table = Table::new("group", ["N"]);
        table.push_row("Berlin, DE", vec![Cell::Int(3)]);
        assert_eq!(table.to_csv(), "group,N\n\"Berlin, DE\",3\n");
    }

    #[test]
    fn cell_lookup_by_name() {
        let mut table = Table::new("feature", ["mean", "N"]);
        table.push_row("grammar", vec![Cell::Num(0.5), Cell::Int(10)]);
        assert_eq!(table.get("grammar", "N"), Some(&Cell::Int(10)));
        assert_eq!(table.get("grammar", "missing"), None);
        assert_eq!(table.get("fluency", "N"), None);
    }

    #[test]
    #[should_panic(expected = "row cell count must match column count")]
    fn rejects_mismatched_row_arity() {
        let mut table = Table::new("feature", ["mean", "N"]);
        table.push_row("grammar", vec![Cell::Num(0.5)]);
    }
}
