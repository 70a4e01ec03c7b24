//! Result normalization: heterogeneous row shapes into one [`Table`].
//!
//! Different drivers return columns in whatever order their wire protocol
//! produced; the normalizer pins a single schema so the comparison engine
//! can index columns positionally. Rules:
//!
//! - Column order is first-seen order, fixed by the first row.
//! - Every subsequent row must carry exactly the same column set (order
//!   may differ); anything else is a `Schema` error.
//! - A column mixing `Int` and `Float` is promoted to `Float`; all other
//!   values pass through untouched, including NULLs.
//! - Zero rows is not an error: it yields an empty table with zero
//!   inferred columns.

use tracing::debug;

use crate::core::{Row, Table, Value};
use crate::error::{ReconcileError, Result};

/// Normalize a sequence of source rows into a table.
pub fn normalize(rows: Vec<Row>) -> Result<Table> {
    let Some(first) = rows.first() else {
        return Ok(Table::default());
    };

    let columns: Vec<String> = first.columns().map(str::to_string).collect();
    check_unique(&columns)?;

    let mut table = Table::with_columns(columns);
    for (idx, row) in rows.iter().enumerate() {
        table.rows.push(project(row, &table.columns, idx)?);
    }

    promote_numeric_columns(&mut table);

    debug!(
        rows = table.len(),
        columns = table.columns.len(),
        "normalized result set"
    );
    Ok(table)
}

/// Reorder one row's cells into schema order.
fn project(row: &Row, columns: &[String], row_idx: usize) -> Result<Vec<Value>> {
    if row.len() != columns.len() {
        return Err(ReconcileError::Schema(format!(
            "row {} has {} column(s), expected {}",
            row_idx,
            row.len(),
            columns.len()
        )));
    }

    let mut values = Vec::with_capacity(columns.len());
    for column in columns {
        match row.get(column) {
            Some(value) => values.push(value.clone()),
            None => {
                return Err(ReconcileError::Schema(format!(
                    "row {} is missing column '{}'",
                    row_idx, column
                )));
            }
        }
    }
    Ok(values)
}

fn check_unique(columns: &[String]) -> Result<()> {
    for (i, name) in columns.iter().enumerate() {
        if columns[..i].contains(name) {
            return Err(ReconcileError::Schema(format!(
                "duplicate column '{}' within one row",
                name
            )));
        }
    }
    Ok(())
}

/// Promote Int values to Float in columns that mix the two kinds, so
/// per-column typing stays consistent for comparison.
fn promote_numeric_columns(table: &mut Table) {
    for col in 0..table.columns.len() {
        let mut saw_int = false;
        let mut saw_float = false;
        for row in &table.rows {
            match row[col] {
                Value::Int(_) => saw_int = true,
                Value::Float(_) => saw_float = true,
                _ => {}
            }
        }
        if saw_int && saw_float {
            for row in &mut table.rows {
                if let Value::Int(v) = row[col] {
                    row[col] = Value::Float(v as f64);
                }
            }
        }
    }
}
