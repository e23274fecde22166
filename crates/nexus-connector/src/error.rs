//! Error types shared by dialect adapters and their callers.

use thiserror::Error;

/// Errors surfaced by a [`crate::SchemaConnector`] implementation.
///
/// Driver-specific errors (`rusqlite::Error`, `postgres::Error`, ...) are
/// captured as formatted strings rather than `#[from]` sources: this crate
/// has no dependency on any concrete driver, so each dialect in
/// `nexus-sql` converts its own driver error into [`ConnectorError::Driver`]
/// with the failing operation as context.
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// A capability the dialect does not support was requested (e.g.
    /// `RETURNING` on MySQL).
    #[error("dialect '{dialect}' does not support {feature}")]
    DialectUnsupported {
        /// The dialect identifier.
        dialect: String,
        /// The unsupported capability.
        feature: String,
    },

    /// A relation's `restrict` action would be violated by the requested
    /// operation.
    #[error("operation refused: cascade would violate restrict action on {table}")]
    CascadeRestrict {
        /// The table whose restrict action blocked the operation.
        table: String,
    },

    /// A semantic type has no known mapping for this dialect.
    #[error("no type mapping for {semantic_type:?} on dialect '{dialect}'")]
    UnmappedType {
        /// The dialect identifier.
        dialect: String,
        /// Debug-formatted semantic type that could not be mapped.
        semantic_type: String,
    },

    /// The underlying database driver reported an error.
    #[error("{operation}: {source}")]
    Driver {
        /// A short description of the operation that failed, e.g.
        /// `"introspecting table 'User'"`.
        operation: String,
        /// The formatted driver error.
        source: String,
    },

    /// An I/O error occurred (e.g. reading a migration file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout connector-facing crates.
pub type Result<T> = std::result::Result<T, ConnectorError>;

impl ConnectorError {
    /// Builds a [`ConnectorError::Driver`] from any displayable driver error.
    pub fn driver(operation: impl Into<String>, source: impl std::fmt::Display) -> Self {
        Self::Driver {
            operation: operation.into(),
            source: source.to_string(),
        }
    }

    /// Builds a [`ConnectorError::DialectUnsupported`].
    pub fn unsupported(dialect: impl Into<String>, feature: impl Into<String>) -> Self {
        Self::DialectUnsupported {
            dialect: dialect.into(),
            feature: feature.into(),
        }
    }
}
