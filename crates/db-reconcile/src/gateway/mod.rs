//! Data source gateway: named sources behind one execute capability.
//!
//! The gateway owns no comparison logic. It resolves a source by name,
//! runs the query with a timeout bound, and hands the normalized table
//! back to the orchestrator. Connection lifecycle, credential sourcing,
//! and wire protocols live behind the [`DataSource`] trait, implemented
//! per driver outside this crate.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::core::{Row, Table};
use crate::error::{ReconcileError, Result};
use crate::normalize::normalize;

/// One database system participating in a comparison.
///
/// Implementations wrap a driver and its connection pool. Queries in this
/// domain are side-effect-free reads; the gateway never retries, a single
/// failure propagates to the caller.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Source identifier (e.g., "postgres", "oracle").
    fn name(&self) -> &str;

    /// Execute a dialect-correct query and return the raw rows.
    async fn execute(&self, query: &str) -> Result<Vec<Row>>;

    /// Release the underlying connections.
    async fn close(&self);
}

/// Registry of named data sources.
#[derive(Default)]
pub struct Gateway {
    sources: HashMap<String, Arc<dyn DataSource>>,
}

impl Gateway {
    /// Create an empty gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a source under its own name. Replaces any previous
    /// registration with the same name.
    pub fn register(&mut self, source: Arc<dyn DataSource>) {
        let name = source.name().to_string();
        if self.sources.insert(name.clone(), source).is_some() {
            warn!(source = %name, "replacing previously registered source");
        }
    }

    /// Check whether a source name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.sources.contains_key(name)
    }

    /// Registered source names, unordered.
    pub fn source_names(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(String::as_str)
    }

    /// Execute a query against a named source and normalize the result.
    ///
    /// Fails with `Connection` for an unknown source, `Timeout` when no
    /// response arrives within the bound, and whatever the driver reports
    /// otherwise. No retries on any path.
    pub async fn fetch(&self, source: &str, query: &str, timeout: Duration) -> Result<Table> {
        let ds = self.sources.get(source).ok_or_else(|| {
            ReconcileError::connection(source, "source is not registered with the gateway")
        })?;

        debug!(source, timeout_ms = timeout.as_millis() as u64, "executing query");

        let rows = tokio::time::timeout(timeout, ds.execute(query))
            .await
            .map_err(|_| ReconcileError::Timeout {
                source_name: source.to_string(),
                timeout,
            })??;

        normalize(rows)
    }

    /// Close every registered source.
    pub async fn close_all(&self) {
        for source in self.sources.values() {
            source.close().await;
        }
    }
}

/// In-memory source serving canned results, keyed by query text.
///
/// Used for wiring tests and dry runs where no real database is
/// available. Unknown query text is reported as a `Query` error, the same
/// way a driver surfaces a rejected statement.
pub struct StaticSource {
    name: String,
    results: HashMap<String, Vec<Row>>,
}

impl StaticSource {
    /// Create a static source with no canned results.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            results: HashMap::new(),
        }
    }

    /// Register the rows returned for an exact query string.
    #[must_use]
    pub fn with_result(mut self, query: impl Into<String>, rows: Vec<Row>) -> Self {
        self.results.insert(query.into(), rows);
        self
    }
}

#[async_trait]
impl DataSource for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, query: &str) -> Result<Vec<Row>> {
        match self.results.get(query) {
            Some(rows) => Ok(rows.clone()),
            None => Err(ReconcileError::query(
                &self.name,
                format!("no canned result for query: {}", query),
            )),
        }
    }

    async fn close(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Value;

    fn gateway_with(source: StaticSource) -> Gateway {
        let mut gateway = Gateway::new();
        gateway.register(Arc::new(source));
        gateway
    }

    #[tokio::test]
    async fn test_fetch_normalizes_rows() {
        let source = StaticSource::new("pg").with_result(
            "SELECT 1",
            vec![Row::new().with("n", 1i64), Row::new().with("n", 2i64)],
        );
        let gateway = gateway_with(source);

        let table = gateway
            .fetch("pg", "SELECT 1", Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(table.columns, vec!["n"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0][0], Value::Int(1));
    }

    #[tokio::test]
    async fn test_unknown_source_is_connection_error() {
        let gateway = Gateway::new();
        let err = gateway
            .fetch("oracle", "SELECT 1", Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, ReconcileError::Connection { .. }));
        assert_eq!(err.source_name(), Some("oracle"));
    }

    #[tokio::test]
    async fn test_rejected_query_is_query_error() {
        let gateway = gateway_with(StaticSource::new("pg"));
        let err = gateway
            .fetch("pg", "SELECT nope", Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, ReconcileError::Query { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_source_times_out() {
        struct SlowSource;

        #[async_trait]
        impl DataSource for SlowSource {
            fn name(&self) -> &str {
                "slow"
            }

            async fn execute(&self, _query: &str) -> Result<Vec<Row>> {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(Vec::new())
            }

            async fn close(&self) {}
        }

        let mut gateway = Gateway::new();
        gateway.register(Arc::new(SlowSource));

        let err = gateway
            .fetch("slow", "SELECT 1", Duration::from_millis(100))
            .await
            .unwrap_err();
        assert!(matches!(err, ReconcileError::Timeout { .. }));
        assert_eq!(err.source_name(), Some("slow"));
    }
}
