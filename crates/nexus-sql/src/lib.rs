//! Concrete SQL dialect adapters implementing
//! [`nexus_connector::SchemaConnector`].
//!
//! Three self-contained modules, one per dialect, each owning its own
//! connection (behind a `Mutex`, matching the teacher's `SqliteStore`
//! pattern) and rendering its own DDL. The shared parts -- the type-mapping
//! matrix and the dialect-type canonicalization used by the diff engine --
//! live in [`type_mapping`] and [`parse_sql_type`] so all three adapters
//! agree on the same semantics.

mod mysql_adapter;
mod parse_sql_type;
mod postgres_adapter;
mod sqlite_adapter;
mod type_mapping;

pub use mysql_adapter::MysqlConnector;
pub use parse_sql_type::parse_sql_type;
pub use postgres_adapter::PostgresConnector;
pub use sqlite_adapter::SqliteConnector;
