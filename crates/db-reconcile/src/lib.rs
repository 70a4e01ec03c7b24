//! # db-reconcile
//!
//! Cross-database reconciliation library.
//!
//! Runs semantically equivalent, dialect-specific queries against multiple
//! heterogeneous databases and compares the results to detect:
//!
//! - **Row-count and aggregate parity** via scalar checks
//! - **Aggregate drift** beyond a percentage tolerance
//! - **Record-level discrepancies** via key-aligned row comparison
//!
//! Every check always produces exactly one verdict: `PASSED` when all
//! sources agree under the policy, `FAILED` when they disagree (with the
//! discrepancy list attached), and `ERROR` when the check could not be
//! carried out, so callers can distinguish "the systems disagree" from
//! "we could not find out".
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use db_reconcile::{Config, Gateway, Orchestrator};
//!
//! #[tokio::main]
//! async fn main() -> db_reconcile::Result<()> {
//!     let config = Config::load("reconcile.yaml")?;
//!     let gateway = Arc::new(Gateway::new()); // register driver-backed sources here
//!     let orchestrator = Orchestrator::from_config(gateway, &config);
//!     let report = orchestrator.run_all().await;
//!     for outcome in &report.outcomes {
//!         println!("{}: {}", outcome.check_name, outcome.result.status);
//!     }
//!     Ok(())
//! }
//! ```

pub mod compare;
pub mod config;
pub mod core;
pub mod error;
pub mod gateway;
pub mod normalize;
pub mod orchestrator;

// Re-exports for convenient access
pub use compare::{
    CheckStatus, ComparisonPolicy, Difference, Discrepancy, SourceValue, ValidationResult,
};
pub use config::{CheckDefinition, Config, ReconcileConfig, SourceConfig, SourceQuery};
pub use core::{Row, Table, Value};
pub use error::{ReconcileError, Result};
pub use gateway::{DataSource, Gateway, StaticSource};
pub use normalize::normalize;
pub use orchestrator::{CheckOutcome, Orchestrator, ReconcileReport};
