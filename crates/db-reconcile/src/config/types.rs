//! Configuration type definitions.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::compare::ComparisonPolicy;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Declared data sources. The core only needs the names; the
    /// connection parameters are consumed by the gateway factory that
    /// builds the drivers.
    pub sources: Vec<SourceConfig>,

    /// Reconciliation behavior configuration.
    #[serde(default)]
    pub reconcile: ReconcileConfig,

    /// The check catalog.
    pub checks: Vec<CheckDefinition>,
}

/// Connection parameters for one named data source.
#[derive(Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Source name referenced by checks (e.g., "postgres", "oracle").
    pub name: String,

    /// Database kind (e.g., "postgres", "oracle", "teradata", "snowflake").
    pub r#type: String,

    /// Database host.
    pub host: String,

    /// Database port.
    pub port: u16,

    /// Database name.
    pub database: String,

    /// Username.
    pub user: String,

    /// Password.
    pub password: String,
}

// Manual Debug keeps passwords out of logs.
impl fmt::Debug for SourceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceConfig")
            .field("name", &self.name)
            .field("type", &self.r#type)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Reconciliation behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileConfig {
    /// Per-query timeout in seconds. Absence of a response within the
    /// bound is treated as a connection-class failure for that check.
    #[serde(default = "default_query_timeout_secs")]
    pub query_timeout_secs: u64,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            query_timeout_secs: default_query_timeout_secs(),
        }
    }
}

impl ReconcileConfig {
    /// Query timeout as a `Duration`.
    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }
}

fn default_query_timeout_secs() -> u64 {
    30
}

/// One named reconciliation check.
///
/// Each check carries one query string per source because SQL dialects
/// differ in date arithmetic, quoting, and function names; the per-source
/// text is configuration data, not duplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckDefinition {
    /// Check name (e.g., "customer count parity").
    pub name: String,

    /// Ordered per-source queries. The first entry is the baseline for
    /// tolerance comparison.
    pub queries: Vec<SourceQuery>,

    /// Columns to align rows on. Empty means the check compares a single
    /// scalar aggregate per source.
    #[serde(default)]
    pub join_keys: Vec<String>,

    /// Comparison policy.
    pub policy: ComparisonPolicy,
}

/// Dialect-correct query text for one source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceQuery {
    /// Declared source name.
    pub source: String,

    /// Query text in that source's dialect.
    pub query: String,
}
