//! Errors surfaced by the squash pipeline.

use thiserror::Error;

/// Errors that can abort a squash run.
#[derive(Debug, Error)]
pub enum SquashError {
    /// The requested `[from_id, to_id]` range selected fewer than two
    /// migrations; there is nothing to squash.
    #[error("squash needs at least two migrations in range, found {0}")]
    TooFewMigrations(usize),

    /// Pair cancellation eliminated every up-statement, leaving nothing to
    /// emit.
    #[error("all statements cancelled out")]
    EmptyResult,
}

/// Convenience alias for this crate's fallible operations.
pub type Result<T> = std::result::Result<T, SquashError>;
