//! Tabular result types.
//!
//! A [`Row`] is what a data source hands back: an ordered mapping from
//! column name to [`Value`]. The normalizer turns a sequence of rows into
//! a [`Table`] with a single column schema, which is what the comparison
//! engine operates on. Tables are never mutated after normalization.

use serde::{Deserialize, Serialize};

use crate::core::Value;
use crate::error::{ReconcileError, Result};

/// One result row as produced by a data source.
///
/// Cells keep the order the underlying system returned the columns in;
/// column names must be unique within a row (enforced by the normalizer).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    cells: Vec<(String, Value)>,
}

impl Row {
    /// Create an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a named cell, builder style.
    #[must_use]
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.cells.push((column.into(), value.into()));
        self
    }

    /// Look up a cell by column name.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Column names in returned order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check if the row has no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterate over (column, value) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.cells.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}

/// A normalized result set: ordered column names plus row-major values.
///
/// Every row has exactly `columns.len()` values, in column order. Produced
/// by the normalizer and read-only from then on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Column names in first-seen order.
    pub columns: Vec<String>,

    /// Row values, one inner vector per row, aligned with `columns`.
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    /// Create an empty table with the given column schema.
    pub fn with_columns(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Extract the single aggregate value of a 1x1 result set.
    ///
    /// Scalar checks (empty join keys) expect each source to return exactly
    /// one row with one column.
    pub fn scalar(&self) -> Result<&Value> {
        if self.rows.len() != 1 || self.columns.len() != 1 {
            return Err(ReconcileError::Schema(format!(
                "expected a single aggregate value, got {} row(s) x {} column(s)",
                self.rows.len(),
                self.columns.len()
            )));
        }
        Ok(&self.rows[0][0])
    }
}
