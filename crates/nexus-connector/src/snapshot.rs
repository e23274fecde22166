//! Structural capture of a live database: [`DatabaseSnapshot`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A point-in-time structural capture of a live database, produced by
/// [`crate::SchemaConnector::introspect`]. Never mutated after construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSnapshot {
    /// User tables, keyed by table name. A `BTreeMap` so iteration order is
    /// deterministic for tests and diagnostics; the diff engine imposes its
    /// own ordering rules independently (see `nexus-diff`).
    pub tables: BTreeMap<String, TableInfo>,
}

impl DatabaseSnapshot {
    /// An empty snapshot, as would be introspected from a fresh database.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Looks up a table by name.
    pub fn table(&self, name: &str) -> Option<&TableInfo> {
        self.tables.get(name)
    }

    /// Returns `true` if the given table exists in this snapshot.
    pub fn has_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }
}

/// Structural information about a single table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableInfo {
    /// Table name.
    pub name: String,
    /// Columns, keyed by name.
    pub columns: BTreeMap<String, ColumnInfo>,
    /// Indexes, keyed by name.
    pub indexes: BTreeMap<String, IndexInfo>,
}

impl TableInfo {
    /// Creates an empty table description.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: BTreeMap::new(),
            indexes: BTreeMap::new(),
        }
    }
}

/// Dialect-reported information about a single column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,
    /// The SQL type exactly as the dialect reports it, e.g.
    /// `"character varying(255)"` or `"VARCHAR(255)"`. Compared by the diff
    /// engine only after canonicalization through `parse_sql_type`.
    pub sql_type: String,
    /// Whether the column accepts `NULL`.
    pub nullable: bool,
    /// Whether the column is (part of) the primary key.
    pub primary_key: bool,
    /// Whether the column has a uniqueness constraint.
    pub unique: bool,
    /// The default expression text as reported by the dialect, if any.
    pub default_expr: Option<String>,
    /// Whether the column auto-increments.
    pub auto_increment: bool,
}

/// Dialect-reported information about a single index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexInfo {
    /// Index name.
    pub name: String,
    /// Whether the index enforces uniqueness.
    pub unique: bool,
    /// Ordered list of column names the index covers.
    pub columns: Vec<String>,
}
