//! Configuration validation.

use std::collections::HashSet;

use super::Config;
use crate::compare::ComparisonPolicy;
use crate::error::{ReconcileError, Result};

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    if config.sources.is_empty() {
        return Err(ReconcileError::Config("at least one source is required".into()));
    }

    let mut source_names = HashSet::new();
    for source in &config.sources {
        if source.name.is_empty() {
            return Err(ReconcileError::Config("source.name is required".into()));
        }
        if source.r#type.is_empty() {
            return Err(ReconcileError::Config(format!(
                "source '{}': type is required",
                source.name
            )));
        }
        if source.host.is_empty() {
            return Err(ReconcileError::Config(format!(
                "source '{}': host is required",
                source.name
            )));
        }
        if !source_names.insert(source.name.as_str()) {
            return Err(ReconcileError::Config(format!(
                "duplicate source name '{}'",
                source.name
            )));
        }
    }

    if config.reconcile.query_timeout_secs == 0 {
        return Err(ReconcileError::Config(
            "reconcile.query_timeout_secs must be at least 1".into(),
        ));
    }

    let mut check_names = HashSet::new();
    for check in &config.checks {
        if check.name.is_empty() {
            return Err(ReconcileError::Config("check.name is required".into()));
        }
        if !check_names.insert(check.name.as_str()) {
            return Err(ReconcileError::Config(format!(
                "duplicate check name '{}'",
                check.name
            )));
        }
        if check.queries.len() < 2 {
            return Err(ReconcileError::Config(format!(
                "check '{}': at least two source queries are required",
                check.name
            )));
        }

        let mut query_sources = HashSet::new();
        for sq in &check.queries {
            if !source_names.contains(sq.source.as_str()) {
                return Err(ReconcileError::Config(format!(
                    "check '{}': query references undeclared source '{}'",
                    check.name, sq.source
                )));
            }
            if !query_sources.insert(sq.source.as_str()) {
                return Err(ReconcileError::Config(format!(
                    "check '{}': duplicate query for source '{}'",
                    check.name, sq.source
                )));
            }
            if sq.query.trim().is_empty() {
                return Err(ReconcileError::Config(format!(
                    "check '{}': query for source '{}' is empty",
                    check.name, sq.source
                )));
            }
        }

        if check.join_keys.iter().any(String::is_empty) {
            return Err(ReconcileError::Config(format!(
                "check '{}': join keys must be non-empty column names",
                check.name
            )));
        }

        if let ComparisonPolicy::Tolerance { threshold_percent } = check.policy {
            if !(threshold_percent > 0.0) || !threshold_percent.is_finite() {
                return Err(ReconcileError::Config(format!(
                    "check '{}': tolerance threshold must be a positive finite percentage",
                    check.name
                )));
            }
        }
    }

    Ok(())
}
