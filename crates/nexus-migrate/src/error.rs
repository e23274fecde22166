//! The Migration/Query error taxonomy of spec §7 (the subset owned by the
//! engine, as opposed to `nexus_parser::ParseError` or
//! `nexus_connector::ConnectorError`, which the engine wraps rather than
//! redefines).

use thiserror::Error;

/// Errors surfaced by [`crate::MigrationEngine`] and its supporting
/// modules (history, lock, file layout, validation, config).
#[derive(Debug, Error)]
pub enum EngineError {
    /// A referenced migration id is absent from the loaded set.
    #[error("migration '{0}' not found")]
    NotFound(String),

    /// A diff produced no changes; there is nothing to generate.
    #[error("no changes to migrate")]
    NoChanges,

    /// Another holder has the lock, and it has not expired.
    #[error("database locked by '{locked_by}' since {locked_at} (expires {expires_at})")]
    Locked {
        /// The identifier the lock holder registered itself under.
        locked_by: String,
        /// When the lock was acquired, RFC 3339.
        locked_at: String,
        /// When the lock will expire, RFC 3339.
        expires_at: String,
    },

    /// A rollback was requested for a migration with empty down-SQL.
    #[error("migration '{0}' has no DOWN section")]
    NoRollback(String),

    /// A migration filename or file section markers did not match the
    /// expected format.
    #[error("invalid migration format: {0}")]
    InvalidFormat(String),

    /// A migration's up-SQL or down-SQL failed to apply.
    #[error("migration '{id}' failed to apply: {source}")]
    ApplyFailed {
        /// The id of the migration that failed.
        id: String,
        /// The underlying connector error.
        #[source]
        source: nexus_connector::ConnectorError,
    },

    /// A migration failed validation and was refused execution.
    #[error("migration '{id}' failed validation: {reasons}")]
    ValidationFailed {
        /// The id of the migration that failed.
        id: String,
        /// A semicolon-joined summary of the validation errors.
        reasons: String,
    },

    /// The underlying connector reported an error unrelated to a specific
    /// migration's application (e.g. ensuring the history/lock tables).
    #[error(transparent)]
    Connector(#[from] nexus_connector::ConnectorError),

    /// An I/O error occurred reading or writing migration files or the
    /// project configuration.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The project configuration file was malformed JSON.
    #[error("invalid project configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// No `nexus.json` was found walking up from the starting directory.
    #[error("no nexus.json found (run 'nexus init' first)")]
    ProjectNotFound,
}

/// Convenience alias for this crate's fallible operations.
pub type Result<T> = std::result::Result<T, EngineError>;
