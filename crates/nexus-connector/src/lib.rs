//! Shared vocabulary between the schema model and the dialect adapters:
//! database snapshots, typed schema changes, the migration record, and the
//! [`SchemaConnector`] trait every dialect implements.
//!
//! This crate has no dependency on any concrete database driver — those
//! live in `nexus-sql`. It exists so `nexus-diff`, `nexus-squash`, and
//! `nexus-migrate` can speak of "a connector" without depending on
//! Postgres/MySQL/SQLite drivers directly.

mod canonical;
mod change;
mod connector;
mod error;
mod exec;
mod migration;
mod snapshot;

pub use canonical::CanonicalType;
pub use change::SchemaChange;
pub use connector::{Dialect, SchemaConnector};
pub use error::{ConnectorError, Result};
pub use exec::{SqlParam, SqlRow, SqlValue};
pub use migration::{checksum_of, format_id, Migration};
pub use snapshot::{ColumnInfo, DatabaseSnapshot, IndexInfo, TableInfo};
