//! Validation orchestrator - runs the check catalog and assembles the report.
//!
//! Checks are independent: they share no mutable state and may run
//! concurrently. Within one check, every source query is issued
//! concurrently (fan-out) and comparison starts only once all results are
//! in (fan-in barrier). A transport or schema failure degrades that single
//! check to an ERROR verdict; it never aborts the other checks.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::compare::{compare, CheckStatus, ValidationResult};
use crate::config::{CheckDefinition, Config};
use crate::core::Table;
use crate::error::Result;
use crate::gateway::Gateway;

/// Reconciliation orchestrator.
pub struct Orchestrator {
    gateway: Arc<Gateway>,
    checks: Vec<CheckDefinition>,
    query_timeout: Duration,
}

/// Verdict for one named check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckOutcome {
    /// Check name from the catalog.
    pub check_name: String,

    /// The verdict.
    pub result: ValidationResult,
}

/// Result of a full reconciliation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileReport {
    /// Unique run identifier.
    pub run_id: String,

    /// When the run started.
    pub started_at: DateTime<Utc>,

    /// When the run completed.
    pub completed_at: DateTime<Utc>,

    /// Total duration in seconds.
    pub duration_seconds: f64,

    /// Total checks executed.
    pub checks_total: usize,

    /// Checks that passed.
    pub checks_passed: usize,

    /// Checks that found discrepancies.
    pub checks_failed: usize,

    /// Checks that could not be carried out.
    pub checks_errored: usize,

    /// Per-check verdicts in catalog order.
    pub outcomes: Vec<CheckOutcome>,
}

impl ReconcileReport {
    /// Check whether every check passed.
    pub fn all_passed(&self) -> bool {
        self.checks_passed == self.checks_total
    }
}

impl Orchestrator {
    /// Create an orchestrator over a gateway and an explicit check catalog.
    pub fn new(gateway: Arc<Gateway>, checks: Vec<CheckDefinition>, query_timeout: Duration) -> Self {
        Self {
            gateway,
            checks,
            query_timeout,
        }
    }

    /// Create an orchestrator from a validated configuration. The gateway
    /// must already hold every source the config declares.
    pub fn from_config(gateway: Arc<Gateway>, config: &Config) -> Self {
        Self::new(
            gateway,
            config.checks.clone(),
            config.reconcile.query_timeout(),
        )
    }

    /// The check catalog, in execution order.
    pub fn checks(&self) -> &[CheckDefinition] {
        &self.checks
    }

    /// Run a single check end to end.
    ///
    /// Always yields exactly one result: transport and schema failures are
    /// converted into an ERROR verdict rather than propagated, so one
    /// source's outage degrades this check without crashing the run.
    pub async fn run_check(&self, check: &CheckDefinition) -> ValidationResult {
        info!(check = %check.name, sources = check.queries.len(), "running check");

        let tables = match self.fetch_all(check).await {
            Ok(tables) => tables,
            Err(err) => {
                warn!(check = %check.name, error = %err, "check degraded to ERROR");
                return ValidationResult::error(err.to_string());
            }
        };

        match compare(&tables, &check.join_keys, &check.policy) {
            Ok(result) => {
                match result.status {
                    CheckStatus::Passed => info!(check = %check.name, "check passed"),
                    _ => warn!(
                        check = %check.name,
                        discrepancies = result.discrepancies.len(),
                        "check failed"
                    ),
                }
                result
            }
            Err(err) => {
                warn!(check = %check.name, error = %err, "check degraded to ERROR");
                ValidationResult::error(err.to_string())
            }
        }
    }

    /// Fan out every source query concurrently and wait for all of them.
    async fn fetch_all(&self, check: &CheckDefinition) -> Result<Vec<(String, Table)>> {
        let fetches = check.queries.iter().map(|sq| {
            let gateway = Arc::clone(&self.gateway);
            async move {
                let table = gateway
                    .fetch(&sq.source, &sq.query, self.query_timeout)
                    .await?;
                Ok((sq.source.clone(), table))
            }
        });

        // Fan-in barrier: comparison never starts on partial results.
        future::join_all(fetches).await.into_iter().collect()
    }

    /// Run every check in the catalog and assemble the report.
    ///
    /// Checks run concurrently; the report preserves catalog order.
    pub async fn run_all(&self) -> ReconcileReport {
        let started_at = Utc::now();
        let run_id = uuid::Uuid::new_v4().to_string();

        info!(run_id = %run_id, checks = self.checks.len(), "starting reconciliation run");

        let results = future::join_all(self.checks.iter().map(|c| self.run_check(c))).await;

        let outcomes: Vec<CheckOutcome> = self
            .checks
            .iter()
            .zip(results)
            .map(|(check, result)| CheckOutcome {
                check_name: check.name.clone(),
                result,
            })
            .collect();

        let completed_at = Utc::now();
        let duration_seconds = (completed_at - started_at).num_milliseconds() as f64 / 1000.0;

        let mut checks_passed = 0;
        let mut checks_failed = 0;
        let mut checks_errored = 0;
        for outcome in &outcomes {
            match outcome.result.status {
                CheckStatus::Passed => checks_passed += 1,
                CheckStatus::Failed => checks_failed += 1,
                CheckStatus::Error => checks_errored += 1,
            }
        }

        info!(
            run_id = %run_id,
            passed = checks_passed,
            failed = checks_failed,
            errored = checks_errored,
            "reconciliation run complete"
        );

        ReconcileReport {
            run_id,
            started_at,
            completed_at,
            duration_seconds,
            checks_total: outcomes.len(),
            checks_passed,
            checks_failed,
            checks_errored,
            outcomes,
        }
    }
}
