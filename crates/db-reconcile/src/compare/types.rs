//! Result and discrepancy types for the comparison engine.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::Value;

/// How values are compared across sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ComparisonPolicy {
    /// Values must be identical (type-aware: numeric kinds compare by
    /// value, everything else exactly).
    Exact,

    /// Numeric values may deviate from the baseline source by up to
    /// `threshold_percent` percent of the baseline value.
    Tolerance { threshold_percent: f64 },
}

/// Outcome classification for a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckStatus {
    /// All sources agree under the policy.
    Passed,
    /// The sources disagree; discrepancies attached.
    Failed,
    /// The check could not be carried out (transport or schema failure).
    Error,
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckStatus::Passed => write!(f, "PASSED"),
            CheckStatus::Failed => write!(f, "FAILED"),
            CheckStatus::Error => write!(f, "ERROR"),
        }
    }
}

/// A value attributed to the source that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceValue {
    pub source: String,
    pub value: Value,
}

impl SourceValue {
    pub fn new(source: impl Into<String>, value: Value) -> Self {
        Self {
            source: source.into(),
            value,
        }
    }
}

/// Computed difference attached to a mismatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "unit", content = "amount", rename_all = "snake_case")]
pub enum Difference {
    /// Absolute numeric difference.
    Absolute(f64),
    /// Percentage deviation from the baseline value.
    Percent(f64),
    /// Percentage is undefined because the baseline value is zero.
    UndefinedPercent,
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difference::Absolute(v) => write!(f, "{}", v),
            Difference::Percent(v) => write!(f, "{:.4}%", v),
            Difference::UndefinedPercent => write!(f, "undefined percentage"),
        }
    }
}

/// One reported inconsistency, scalar or row-level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Discrepancy {
    /// A joined row carries different values for one column.
    ValueMismatch {
        /// Join-key values identifying the row.
        key: Vec<Value>,
        /// Column whose values differ.
        column: String,
        /// Per-source values that differ.
        values: Vec<SourceValue>,
        /// Computed difference where the values are numeric.
        difference: Option<Difference>,
    },

    /// Aggregate values disagree in a scalar check.
    ScalarMismatch {
        /// Per-source aggregate values.
        values: Vec<SourceValue>,
        /// Computed difference where the values are numeric.
        difference: Option<Difference>,
    },

    /// A key present in other sources is absent from one source.
    MissingInSource {
        /// Join-key values identifying the row.
        key: Vec<Value>,
        /// Source the key is missing from.
        missing_from: String,
    },

    /// A row whose key tuple contains NULL; excluded from the join.
    UnmatchedNullKey {
        /// Source the row came from.
        source: String,
        /// Key values as returned, including the NULL(s).
        key: Vec<Value>,
    },
}

impl fmt::Display for Discrepancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Discrepancy::ValueMismatch {
                key,
                column,
                values,
                difference,
            } => {
                write!(f, "key {} column '{}': ", format_key(key), column)?;
                write_values(f, values)?;
                if let Some(diff) = difference {
                    write!(f, " (difference: {})", diff)?;
                }
                Ok(())
            }
            Discrepancy::ScalarMismatch { values, difference } => {
                write_values(f, values)?;
                if let Some(diff) = difference {
                    write!(f, " (difference: {})", diff)?;
                }
                Ok(())
            }
            Discrepancy::MissingInSource { key, missing_from } => {
                write!(f, "key {} missing in {}", format_key(key), missing_from)
            }
            Discrepancy::UnmatchedNullKey { source, key } => {
                write!(f, "row with NULL key {} in {} is unmatched", format_key(key), source)
            }
        }
    }
}

fn format_key(key: &[Value]) -> String {
    let parts: Vec<String> = key.iter().map(|v| v.to_string()).collect();
    format!("({})", parts.join(", "))
}

fn write_values(f: &mut fmt::Formatter<'_>, values: &[SourceValue]) -> fmt::Result {
    for (i, sv) in values.iter().enumerate() {
        if i > 0 {
            write!(f, " vs ")?;
        }
        write!(f, "{}={}", sv.source, sv.value)?;
    }
    Ok(())
}

/// Verdict for a single check invocation.
///
/// Invariant: `status` is `Failed` iff `discrepancies` is non-empty;
/// `Error` carries the failure message and no discrepancies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Outcome classification.
    pub status: CheckStatus,

    /// Human-readable summary.
    pub message: String,

    /// Ordered discrepancy records; empty unless `status` is `Failed`.
    pub discrepancies: Vec<Discrepancy>,
}

impl ValidationResult {
    /// A passing result.
    pub fn passed(message: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Passed,
            message: message.into(),
            discrepancies: Vec::new(),
        }
    }

    /// An error result (the check could not be carried out).
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Error,
            message: message.into(),
            discrepancies: Vec::new(),
        }
    }

    /// Assemble a verdict from the collected discrepancies, deriving the
    /// status and summary message.
    pub fn from_discrepancies(discrepancies: Vec<Discrepancy>, passed_message: &str) -> Self {
        if discrepancies.is_empty() {
            Self::passed(passed_message)
        } else {
            Self {
                status: CheckStatus::Failed,
                message: format!("Found {} discrepancy(ies)", discrepancies.len()),
                discrepancies,
            }
        }
    }
}
