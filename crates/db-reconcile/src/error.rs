//! Error types for reconciliation operations.

use std::time::Duration;

use thiserror::Error;

/// Main error type for reconciliation operations.
///
/// Comparison mismatches are never errors; they are the expected FAILED
/// outcome of a check. These variants cover the cases where a check could
/// not be carried out at all.
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// Configuration error (invalid YAML, missing fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Source unreachable, unknown, or misconfigured.
    // The name field cannot be called `source`: thiserror reserves that
    // name for the std error cause.
    #[error("Connection error for source '{source_name}': {message}")]
    Connection {
        source_name: String,
        message: String,
    },

    /// Query rejected by the source.
    #[error("Query error for source '{source_name}': {message}")]
    Query {
        source_name: String,
        message: String,
    },

    /// No response from the source within the timeout bound.
    #[error("Timeout after {timeout:?} waiting on source '{source_name}'")]
    Timeout {
        source_name: String,
        timeout: Duration,
    },

    /// Rows within one result set disagree irreconcilably on column identity.
    #[error("Schema error: {0}")]
    Schema(String),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReconcileError {
    /// Create a Connection error for a named source.
    pub fn connection(source: impl Into<String>, message: impl Into<String>) -> Self {
        ReconcileError::Connection {
            source_name: source.into(),
            message: message.into(),
        }
    }

    /// Create a Query error for a named source.
    pub fn query(source: impl Into<String>, message: impl Into<String>) -> Self {
        ReconcileError::Query {
            source_name: source.into(),
            message: message.into(),
        }
    }

    /// Name of the source involved in a transport failure, if any.
    pub fn source_name(&self) -> Option<&str> {
        match self {
            ReconcileError::Connection { source_name, .. }
            | ReconcileError::Query { source_name, .. }
            | ReconcileError::Timeout { source_name, .. } => Some(source_name),
            _ => None,
        }
    }

    /// Format error with full details including error chain.
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for reconciliation operations.
pub type Result<T> = std::result::Result<T, ReconcileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_name_on_transport_errors() {
        let err = ReconcileError::connection("oracle", "refused");
        assert_eq!(err.source_name(), Some("oracle"));

        let err = ReconcileError::Timeout {
            source_name: "snowflake".to_string(),
            timeout: Duration::from_secs(30),
        };
        assert_eq!(err.source_name(), Some("snowflake"));

        let err = ReconcileError::Schema("bad shape".to_string());
        assert_eq!(err.source_name(), None);
    }

    #[test]
    fn test_transport_errors_have_no_cause_chain() {
        // The source name is payload, not an underlying cause.
        let err = ReconcileError::connection("oracle", "refused");
        assert!(std::error::Error::source(&err).is_none());
        assert_eq!(err.format_detailed(), format!("Error: {}\n", err));

        let err = ReconcileError::Timeout {
            source_name: "oracle".to_string(),
            timeout: Duration::from_secs(30),
        };
        assert!(std::error::Error::source(&err).is_none());
        assert!(err.to_string().contains("oracle"));
    }

    #[test]
    fn test_query_error_display_names_source() {
        let err = ReconcileError::query("postgres", "relation does not exist");
        let msg = err.to_string();
        assert!(msg.contains("postgres"));
        assert!(msg.contains("relation does not exist"));
    }
}
