//! Alignment and comparison engine.
//!
//! Two modes, selected by the check's join keys:
//!
//! - **Scalar** (no keys): each source contributes exactly one aggregate
//!   value; values are compared pairwise against the first-listed source.
//! - **Row-aligned** (keys given): an inner join across all source tables
//!   on the key tuple, then per-column comparison of every joined row.
//!   Rows whose key tuple contains NULL never join; they are reported
//!   as unmatched. Keys absent from some sources are reported as
//!   missing-in-source, separately from value mismatches.
//!
//! Mismatches are never errors; they produce a FAILED verdict with the
//! discrepancy list attached. Errors out of this module mean the inputs
//! could not be compared at all (wrong scalar shape, missing key column).

pub mod types;

pub use types::{
    CheckStatus, ComparisonPolicy, Difference, Discrepancy, SourceValue, ValidationResult,
};

use std::collections::{HashMap, HashSet};

use chrono::Datelike;
use tracing::debug;

use crate::core::{Table, Value};
use crate::error::{ReconcileError, Result};

/// Compare normalized tables from two or more sources.
///
/// `sources` is ordered; the first entry is the baseline for tolerance
/// arithmetic. Produces PASSED or FAILED; `Err` is reserved for inputs
/// that cannot be compared (the orchestrator turns it into ERROR).
pub fn compare(
    sources: &[(String, Table)],
    join_keys: &[String],
    policy: &ComparisonPolicy,
) -> Result<ValidationResult> {
    if sources.len() < 2 {
        return Err(ReconcileError::Schema(format!(
            "comparison requires at least two sources, got {}",
            sources.len()
        )));
    }

    let result = if join_keys.is_empty() {
        compare_scalar(sources, policy)?
    } else {
        compare_rows(sources, join_keys, policy)?
    };

    debug!(
        status = %result.status,
        discrepancies = result.discrepancies.len(),
        "comparison complete"
    );
    Ok(result)
}

// ===== Scalar mode =====

fn compare_scalar(
    sources: &[(String, Table)],
    policy: &ComparisonPolicy,
) -> Result<ValidationResult> {
    let mut values = Vec::with_capacity(sources.len());
    for (name, table) in sources {
        let value = table.scalar().map_err(|_| {
            ReconcileError::Schema(format!(
                "source '{}' did not return a single aggregate value ({} row(s) x {} column(s))",
                name,
                table.len(),
                table.columns.len()
            ))
        })?;
        values.push(SourceValue::new(name.clone(), value.clone()));
    }

    let discrepancies = match policy {
        ComparisonPolicy::Exact => {
            // An aggregate can legitimately be NULL in every source (say,
            // SUM over zero rows). Uniform NULLs are agreement; the
            // null-never-matches rule applies only to join keys.
            let baseline = &values[0].value;
            let all_null = values.iter().all(|sv| sv.value.is_null());
            let all_match =
                all_null || values[1..].iter().all(|sv| sv.value.matches(baseline));
            if all_match {
                Vec::new()
            } else {
                vec![Discrepancy::ScalarMismatch {
                    difference: pairwise_difference(&values),
                    values,
                }]
            }
        }
        ComparisonPolicy::Tolerance { threshold_percent } => {
            scalar_tolerance(&values, *threshold_percent)?
        }
    };

    Ok(ValidationResult::from_discrepancies(
        discrepancies,
        "aggregate values match across all sources",
    ))
}

/// Absolute difference for the two-source numeric case.
fn pairwise_difference(values: &[SourceValue]) -> Option<Difference> {
    if values.len() != 2 {
        return None;
    }
    let a = values[0].value.as_f64()?;
    let b = values[1].value.as_f64()?;
    Some(Difference::Absolute((a - b).abs()))
}

fn scalar_tolerance(values: &[SourceValue], threshold_percent: f64) -> Result<Vec<Discrepancy>> {
    let baseline = &values[0];
    let base = baseline.value.as_f64().ok_or_else(|| {
        ReconcileError::Schema(format!(
            "tolerance comparison requires a numeric baseline, source '{}' returned {}",
            baseline.source,
            baseline.value.kind()
        ))
    })?;

    let mut discrepancies = Vec::new();
    for other in &values[1..] {
        let Some(value) = other.value.as_f64() else {
            return Err(ReconcileError::Schema(format!(
                "tolerance comparison requires numeric values, source '{}' returned {}",
                other.source,
                other.value.kind()
            )));
        };

        match percent_deviation(base, value) {
            Deviation::Within => {}
            Deviation::Exceeds(pct) if pct <= threshold_percent => {}
            Deviation::Exceeds(pct) => {
                discrepancies.push(Discrepancy::ScalarMismatch {
                    values: vec![baseline.clone(), other.clone()],
                    difference: Some(Difference::Percent(pct)),
                });
            }
            Deviation::Undefined => {
                discrepancies.push(Discrepancy::ScalarMismatch {
                    values: vec![baseline.clone(), other.clone()],
                    difference: Some(Difference::UndefinedPercent),
                });
            }
        }
    }
    Ok(discrepancies)
}

enum Deviation {
    /// Values are numerically equal.
    Within,
    /// Deviation in percent of the baseline.
    Exceeds(f64),
    /// Baseline is zero; percentage cannot be computed.
    Undefined,
}

/// Percentage deviation of `value` from `baseline`.
///
/// A zero baseline is reported as data, never raised: the caller records
/// an undefined-percentage discrepancy instead of dividing by zero.
fn percent_deviation(baseline: f64, value: f64) -> Deviation {
    if value == baseline {
        return Deviation::Within;
    }
    if baseline == 0.0 {
        return Deviation::Undefined;
    }
    Deviation::Exceeds((value - baseline).abs() / baseline.abs() * 100.0)
}

// ===== Row-aligned mode =====

/// Hashable canonical form of a join-key value.
///
/// Numeric kinds collapse to their f64 bits so `Int(1)` and a decimal
/// `1.00` key the same row across sources. NULLs never reach this point;
/// rows with NULL keys are excluded before canonicalization.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum CanonicalValue {
    Num(u64),
    Bool(bool),
    Text(String),
    Timestamp(i64),
    Date(i32),
}

fn canonical(value: &Value) -> Option<CanonicalValue> {
    match value {
        Value::Null => None,
        Value::Bool(v) => Some(CanonicalValue::Bool(*v)),
        Value::Int(_) | Value::Float(_) | Value::Decimal(_) => {
            let mut f = value.as_f64()?;
            if f == 0.0 {
                f = 0.0; // collapse -0.0 and +0.0
            }
            Some(CanonicalValue::Num(f.to_bits()))
        }
        Value::Text(v) => Some(CanonicalValue::Text(v.clone())),
        Value::Timestamp(v) => Some(CanonicalValue::Timestamp(v.and_utc().timestamp_micros())),
        Value::Date(v) => Some(CanonicalValue::Date(v.num_days_from_ce())),
    }
}

type KeyTuple = Vec<CanonicalValue>;

struct SourceView<'a> {
    name: &'a str,
    table: &'a Table,
    /// Indices of the join-key columns within the table schema.
    key_cols: Vec<usize>,
    /// Key tuple -> row index. Later rows with a duplicate key win.
    by_key: HashMap<KeyTuple, usize>,
}

fn compare_rows(
    sources: &[(String, Table)],
    join_keys: &[String],
    policy: &ComparisonPolicy,
) -> Result<ValidationResult> {
    let mut discrepancies = Vec::new();
    let mut views = Vec::with_capacity(sources.len());

    // Key extraction, null-key exclusion, and per-source key maps.
    for (name, table) in sources {
        let mut key_cols = Vec::with_capacity(join_keys.len());
        for key in join_keys {
            // An empty table never declared its columns; treat it as
            // having no joinable rows rather than a schema failure.
            if table.is_empty() && table.columns.is_empty() {
                break;
            }
            let idx = table.column_index(key).ok_or_else(|| {
                ReconcileError::Schema(format!(
                    "source '{}' result has no join-key column '{}'",
                    name, key
                ))
            })?;
            key_cols.push(idx);
        }

        let mut by_key = HashMap::new();
        for (row_idx, row) in table.rows.iter().enumerate() {
            let raw_key: Vec<Value> = key_cols.iter().map(|&c| row[c].clone()).collect();
            match raw_key.iter().map(canonical).collect::<Option<KeyTuple>>() {
                Some(tuple) => {
                    by_key.insert(tuple, row_idx);
                }
                None => {
                    // NULL key never matches another NULL; the row cannot join.
                    discrepancies.push(Discrepancy::UnmatchedNullKey {
                        source: name.clone(),
                        key: raw_key,
                    });
                }
            }
        }

        views.push(SourceView {
            name: name.as_str(),
            table,
            key_cols,
            by_key,
        });
    }

    // Key universe in first-seen order across sources.
    let mut key_order: Vec<KeyTuple> = Vec::new();
    let mut seen: HashSet<KeyTuple> = HashSet::new();
    for view in &views {
        let mut keys: Vec<(usize, KeyTuple)> = view
            .by_key
            .iter()
            .map(|(k, &row)| (row, k.clone()))
            .collect();
        keys.sort_by_key(|(row, _)| *row);
        for (_, key) in keys {
            if seen.insert(key.clone()) {
                key_order.push(key);
            }
        }
    }

    // Non-key columns present in more than one source, first-seen order.
    let compared_columns = shared_value_columns(&views, join_keys);

    for key in &key_order {
        let rows: Vec<Option<usize>> = views.iter().map(|v| v.by_key.get(key).copied()).collect();

        if rows.iter().any(Option::is_none) {
            // Inner join drops this key; report where it is missing.
            let display_key = display_key(&views, &rows);
            for (view, row) in views.iter().zip(&rows) {
                if row.is_none() {
                    discrepancies.push(Discrepancy::MissingInSource {
                        key: display_key.clone(),
                        missing_from: view.name.to_string(),
                    });
                }
            }
            continue;
        }

        let display_key = display_key(&views, &rows);
        for column in &compared_columns {
            compare_cell(&views, &rows, &display_key, column, policy, &mut discrepancies);
        }
    }

    Ok(ValidationResult::from_discrepancies(
        discrepancies,
        "row-aligned values match across all sources",
    ))
}

/// Non-key columns shared by at least two sources, in first-seen order.
fn shared_value_columns(views: &[SourceView<'_>], join_keys: &[String]) -> Vec<String> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for view in views {
        for column in &view.table.columns {
            if join_keys.contains(column) {
                continue;
            }
            let count = counts.entry(column).or_insert(0);
            *count += 1;
            if *count == 1 {
                order.push(column.clone());
            }
        }
    }
    order.retain(|c| counts.get(c.as_str()).copied().unwrap_or(0) > 1);
    order
}

/// Original (non-canonical) key values for reporting, taken from the
/// first source that has the row.
fn display_key(views: &[SourceView<'_>], rows: &[Option<usize>]) -> Vec<Value> {
    for (view, row) in views.iter().zip(rows) {
        if let Some(row_idx) = row {
            return view
                .key_cols
                .iter()
                .map(|&c| view.table.rows[*row_idx][c].clone())
                .collect();
        }
    }
    Vec::new()
}

/// Compare one column of one joined row across every source that has the
/// column, appending discrepancies.
fn compare_cell(
    views: &[SourceView<'_>],
    rows: &[Option<usize>],
    display_key: &[Value],
    column: &str,
    policy: &ComparisonPolicy,
    discrepancies: &mut Vec<Discrepancy>,
) {
    let mut present: Vec<SourceValue> = Vec::new();
    for (view, row) in views.iter().zip(rows) {
        let (Some(row_idx), Some(col_idx)) = (row, view.table.column_index(column)) else {
            continue;
        };
        present.push(SourceValue::new(
            view.name,
            view.table.rows[*row_idx][col_idx].clone(),
        ));
    }
    if present.len() < 2 {
        return;
    }

    let baseline = &present[0];
    match policy {
        ComparisonPolicy::Exact => {
            let all_agree = present[1..]
                .iter()
                .all(|sv| cells_agree(&baseline.value, &sv.value));
            if !all_agree {
                discrepancies.push(Discrepancy::ValueMismatch {
                    key: display_key.to_vec(),
                    column: column.to_string(),
                    difference: pairwise_difference(&present),
                    values: present,
                });
            }
        }
        ComparisonPolicy::Tolerance { threshold_percent } => {
            // Non-numeric columns fall back to exact comparison.
            let Some(base) = baseline.value.as_f64() else {
                let all_agree = present[1..]
                    .iter()
                    .all(|sv| cells_agree(&baseline.value, &sv.value));
                if !all_agree {
                    discrepancies.push(Discrepancy::ValueMismatch {
                        key: display_key.to_vec(),
                        column: column.to_string(),
                        difference: None,
                        values: present,
                    });
                }
                return;
            };

            for other in &present[1..] {
                let Some(value) = other.value.as_f64() else {
                    discrepancies.push(Discrepancy::ValueMismatch {
                        key: display_key.to_vec(),
                        column: column.to_string(),
                        values: vec![baseline.clone(), other.clone()],
                        difference: None,
                    });
                    continue;
                };
                match percent_deviation(base, value) {
                    Deviation::Within => {}
                    Deviation::Exceeds(pct) if pct <= *threshold_percent => {}
                    Deviation::Exceeds(pct) => {
                        discrepancies.push(Discrepancy::ValueMismatch {
                            key: display_key.to_vec(),
                            column: column.to_string(),
                            values: vec![baseline.clone(), other.clone()],
                            difference: Some(Difference::Percent(pct)),
                        });
                    }
                    Deviation::Undefined => {
                        discrepancies.push(Discrepancy::ValueMismatch {
                            key: display_key.to_vec(),
                            column: column.to_string(),
                            values: vec![baseline.clone(), other.clone()],
                            difference: Some(Difference::UndefinedPercent),
                        });
                    }
                }
            }
        }
    }
}

/// Equality for non-key cells: NULL equals NULL here, unlike join keys.
fn cells_agree(a: &Value, b: &Value) -> bool {
    if a.is_null() && b.is_null() {
        return true;
    }
    a.matches(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Row;
    use crate::normalize::normalize;

    fn table(rows: Vec<Row>) -> Table {
        normalize(rows).unwrap()
    }

    fn scalar_table(column: &str, value: impl Into<Value>) -> Table {
        table(vec![Row::new().with(column, value)])
    }

    fn named(sources: Vec<(&str, Table)>) -> Vec<(String, Table)> {
        sources
            .into_iter()
            .map(|(n, t)| (n.to_string(), t))
            .collect()
    }

    // ----- scalar mode -----

    #[test]
    fn test_scalar_exact_match_passes() {
        let sources = named(vec![
            ("postgres", scalar_table("customer_count", 120i64)),
            ("oracle", scalar_table("customer_count", 120i64)),
            ("snowflake", scalar_table("customer_count", 120i64)),
        ]);
        let result = compare(&sources, &[], &ComparisonPolicy::Exact).unwrap();
        assert_eq!(result.status, CheckStatus::Passed);
        assert!(result.discrepancies.is_empty());
    }

    #[test]
    fn test_scalar_exact_mismatch_lists_every_value() {
        let sources = named(vec![
            ("postgres", scalar_table("n", 120i64)),
            ("oracle", scalar_table("n", 118i64)),
        ]);
        let result = compare(&sources, &[], &ComparisonPolicy::Exact).unwrap();
        assert_eq!(result.status, CheckStatus::Failed);
        assert_eq!(result.discrepancies.len(), 1);
        match &result.discrepancies[0] {
            Discrepancy::ScalarMismatch { values, difference } => {
                assert_eq!(values.len(), 2);
                assert_eq!(values[0].value, Value::Int(120));
                assert_eq!(values[1].value, Value::Int(118));
                assert_eq!(difference, &Some(Difference::Absolute(2.0)));
            }
            other => panic!("unexpected discrepancy: {:?}", other),
        }
    }

    #[test]
    fn test_scalar_exact_uniform_null_aggregates_pass() {
        // SUM over zero rows yields NULL everywhere; every source reporting
        // the same nothing is agreement, not drift.
        let sources = named(vec![
            ("postgres", scalar_table("total", Value::Null)),
            ("oracle", scalar_table("total", Value::Null)),
        ]);
        let result = compare(&sources, &[], &ComparisonPolicy::Exact).unwrap();
        assert_eq!(result.status, CheckStatus::Passed);
        assert!(result.discrepancies.is_empty());
    }

    #[test]
    fn test_scalar_exact_null_against_value_fails() {
        let sources = named(vec![
            ("postgres", scalar_table("total", Value::Null)),
            ("oracle", scalar_table("total", 42i64)),
        ]);
        let result = compare(&sources, &[], &ComparisonPolicy::Exact).unwrap();
        assert_eq!(result.status, CheckStatus::Failed);
        assert_eq!(result.discrepancies.len(), 1);
    }

    #[test]
    fn test_scalar_exact_matches_across_numeric_kinds() {
        let sources = named(vec![
            ("postgres", scalar_table("n", 120i64)),
            ("snowflake", scalar_table("n", 120.0f64)),
        ]);
        let result = compare(&sources, &[], &ComparisonPolicy::Exact).unwrap();
        assert_eq!(result.status, CheckStatus::Passed);
    }

    #[test]
    fn test_tolerance_boundary() {
        let policy = ComparisonPolicy::Tolerance {
            threshold_percent: 1.0,
        };

        // 100 -> 100.99 is 0.99%, inside the bound.
        let sources = named(vec![
            ("postgres", scalar_table("revenue", 100.0f64)),
            ("snowflake", scalar_table("revenue", 100.99f64)),
        ]);
        let result = compare(&sources, &[], &policy).unwrap();
        assert_eq!(result.status, CheckStatus::Passed);

        // 100 -> 101.01 is 1.01%, outside the bound.
        let sources = named(vec![
            ("postgres", scalar_table("revenue", 100.0f64)),
            ("snowflake", scalar_table("revenue", 101.01f64)),
        ]);
        let result = compare(&sources, &[], &policy).unwrap();
        assert_eq!(result.status, CheckStatus::Failed);
        match &result.discrepancies[0] {
            Discrepancy::ScalarMismatch {
                difference: Some(Difference::Percent(pct)),
                ..
            } => assert!((pct - 1.01).abs() < 1e-9),
            other => panic!("unexpected discrepancy: {:?}", other),
        }
    }

    #[test]
    fn test_tolerance_zero_baseline_is_reported_not_raised() {
        let policy = ComparisonPolicy::Tolerance {
            threshold_percent: 5.0,
        };
        let sources = named(vec![
            ("postgres", scalar_table("revenue", 0i64)),
            ("snowflake", scalar_table("revenue", 10i64)),
        ]);
        let result = compare(&sources, &[], &policy).unwrap();
        assert_eq!(result.status, CheckStatus::Failed);
        match &result.discrepancies[0] {
            Discrepancy::ScalarMismatch { difference, .. } => {
                assert_eq!(difference, &Some(Difference::UndefinedPercent));
            }
            other => panic!("unexpected discrepancy: {:?}", other),
        }
    }

    #[test]
    fn test_tolerance_zero_baseline_equal_values_pass() {
        let policy = ComparisonPolicy::Tolerance {
            threshold_percent: 5.0,
        };
        let sources = named(vec![
            ("postgres", scalar_table("revenue", 0i64)),
            ("snowflake", scalar_table("revenue", 0i64)),
        ]);
        let result = compare(&sources, &[], &policy).unwrap();
        assert_eq!(result.status, CheckStatus::Passed);
    }

    #[test]
    fn test_scalar_wrong_shape_is_error() {
        let multi = table(vec![Row::new().with("n", 1i64), Row::new().with("n", 2i64)]);
        let sources = named(vec![("postgres", scalar_table("n", 1i64)), ("oracle", multi)]);
        assert!(compare(&sources, &[], &ComparisonPolicy::Exact).is_err());
    }

    #[test]
    fn test_single_source_is_error() {
        let sources = named(vec![("postgres", scalar_table("n", 1i64))]);
        assert!(compare(&sources, &[], &ComparisonPolicy::Exact).is_err());
    }

    // ----- row-aligned mode -----

    fn inventory_row(id: i64, name: &str, stock: i64) -> Row {
        Row::new()
            .with("product_id", id)
            .with("product_name", name)
            .with("current_stock", stock)
    }

    #[test]
    fn test_identical_tables_pass() {
        let rows = vec![inventory_row(1, "bolt", 10), inventory_row(2, "nut", 20)];
        let sources = named(vec![
            ("postgres", table(rows.clone())),
            ("oracle", table(rows)),
        ]);
        let keys = vec!["product_id".to_string()];
        let result = compare(&sources, &keys, &ComparisonPolicy::Exact).unwrap();
        assert_eq!(result.status, CheckStatus::Passed);
    }

    #[test]
    fn test_concrete_mismatch_scenario() {
        // A: (1,x,10) (2,y,20) (3,z,30); B: (1,x,10) (2,y,25) (4,w,40)
        let a = table(vec![
            inventory_row(1, "x", 10),
            inventory_row(2, "y", 20),
            inventory_row(3, "z", 30),
        ]);
        let b = table(vec![
            inventory_row(1, "x", 10),
            inventory_row(2, "y", 25),
            inventory_row(4, "w", 40),
        ]);
        let sources = named(vec![("a", a), ("b", b)]);
        let keys = vec!["product_id".to_string()];
        let result = compare(&sources, &keys, &ComparisonPolicy::Exact).unwrap();

        assert_eq!(result.status, CheckStatus::Failed);

        let mismatches: Vec<_> = result
            .discrepancies
            .iter()
            .filter(|d| matches!(d, Discrepancy::ValueMismatch { .. }))
            .collect();
        assert_eq!(mismatches.len(), 1);
        match mismatches[0] {
            Discrepancy::ValueMismatch { key, column, values, .. } => {
                assert_eq!(key, &vec![Value::Int(2)]);
                assert_eq!(column, "current_stock");
                assert_eq!(values[0].value, Value::Int(20));
                assert_eq!(values[1].value, Value::Int(25));
            }
            _ => unreachable!(),
        }

        let missing: Vec<_> = result
            .discrepancies
            .iter()
            .filter_map(|d| match d {
                Discrepancy::MissingInSource { key, missing_from } => {
                    Some((key.clone(), missing_from.clone()))
                }
                _ => None,
            })
            .collect();
        assert!(missing.contains(&(vec![Value::Int(3)], "b".to_string())));
        assert!(missing.contains(&(vec![Value::Int(4)], "a".to_string())));
        assert_eq!(missing.len(), 2);
    }

    #[test]
    fn test_null_keys_never_match() {
        let a = table(vec![
            Row::new().with("id", Value::Null).with("v", 1i64),
            Row::new().with("id", 2i64).with("v", 2i64),
        ]);
        let b = table(vec![
            Row::new().with("id", Value::Null).with("v", 1i64),
            Row::new().with("id", 2i64).with("v", 2i64),
        ]);
        let sources = named(vec![("a", a), ("b", b)]);
        let keys = vec!["id".to_string()];
        let result = compare(&sources, &keys, &ComparisonPolicy::Exact).unwrap();

        assert_eq!(result.status, CheckStatus::Failed);
        let unmatched: Vec<_> = result
            .discrepancies
            .iter()
            .filter(|d| matches!(d, Discrepancy::UnmatchedNullKey { .. }))
            .collect();
        // One per source: the NULL-key rows surface as unmatched, never as
        // a false value-match.
        assert_eq!(unmatched.len(), 2);
    }

    #[test]
    fn test_empty_results_pass_vacuously() {
        let sources = named(vec![("a", Table::default()), ("b", Table::default())]);
        let keys = vec!["id".to_string()];
        let result = compare(&sources, &keys, &ComparisonPolicy::Exact).unwrap();
        assert_eq!(result.status, CheckStatus::Passed);
        assert!(result.discrepancies.is_empty());
    }

    #[test]
    fn test_row_tolerance_per_numeric_column() {
        let policy = ComparisonPolicy::Tolerance {
            threshold_percent: 10.0,
        };
        let a = table(vec![
            Row::new().with("day", "2026-08-01").with("revenue", 100.0f64),
            Row::new().with("day", "2026-08-02").with("revenue", 200.0f64),
        ]);
        let b = table(vec![
            Row::new().with("day", "2026-08-01").with("revenue", 105.0f64),
            Row::new().with("day", "2026-08-02").with("revenue", 250.0f64),
        ]);
        let sources = named(vec![("postgres", a), ("snowflake", b)]);
        let keys = vec!["day".to_string()];
        let result = compare(&sources, &keys, &policy).unwrap();

        // 5% passes, 25% fails.
        assert_eq!(result.status, CheckStatus::Failed);
        assert_eq!(result.discrepancies.len(), 1);
        match &result.discrepancies[0] {
            Discrepancy::ValueMismatch { key, difference, .. } => {
                assert_eq!(key, &vec![Value::Text("2026-08-02".into())]);
                match difference {
                    Some(Difference::Percent(pct)) => assert!((pct - 25.0).abs() < 1e-9),
                    other => panic!("unexpected difference: {:?}", other),
                }
            }
            other => panic!("unexpected discrepancy: {:?}", other),
        }
    }

    #[test]
    fn test_missing_key_column_is_error() {
        let a = table(vec![Row::new().with("id", 1i64).with("v", 1i64)]);
        let b = table(vec![Row::new().with("other", 1i64).with("v", 1i64)]);
        let sources = named(vec![("a", a), ("b", b)]);
        let keys = vec!["id".to_string()];
        let err = compare(&sources, &keys, &ComparisonPolicy::Exact).unwrap_err();
        assert!(matches!(err, ReconcileError::Schema(_)));
    }

    #[test]
    fn test_columns_private_to_one_source_are_ignored() {
        let a = table(vec![Row::new().with("id", 1i64).with("v", 1i64).with("local", 9i64)]);
        let b = table(vec![Row::new().with("id", 1i64).with("v", 1i64)]);
        let sources = named(vec![("a", a), ("b", b)]);
        let keys = vec!["id".to_string()];
        let result = compare(&sources, &keys, &ComparisonPolicy::Exact).unwrap();
        assert_eq!(result.status, CheckStatus::Passed);
    }

    #[test]
    fn test_null_data_cells_agree() {
        let a = table(vec![Row::new().with("id", 1i64).with("v", Value::Null)]);
        let b = table(vec![Row::new().with("id", 1i64).with("v", Value::Null)]);
        let sources = named(vec![("a", a), ("b", b)]);
        let keys = vec!["id".to_string()];
        let result = compare(&sources, &keys, &ComparisonPolicy::Exact).unwrap();
        assert_eq!(result.status, CheckStatus::Passed);
    }

    #[test]
    fn test_three_way_join() {
        let rows = vec![inventory_row(1, "bolt", 10)];
        let drifted = vec![inventory_row(1, "bolt", 11)];
        let sources = named(vec![
            ("postgres", table(rows.clone())),
            ("oracle", table(rows)),
            ("teradata", table(drifted)),
        ]);
        let keys = vec!["product_id".to_string()];
        let result = compare(&sources, &keys, &ComparisonPolicy::Exact).unwrap();
        assert_eq!(result.status, CheckStatus::Failed);
        match &result.discrepancies[0] {
            Discrepancy::ValueMismatch { values, .. } => {
                // All three participating values are listed.
                assert_eq!(values.len(), 3);
            }
            other => panic!("unexpected discrepancy: {:?}", other),
        }
    }
}
