//! Typed structural changes emitted by the diff engine.

use nexus_schema::{Field, Index};
use serde::{Deserialize, Serialize};

/// A single structural edit between a [`nexus_schema::Schema`] and a
/// [`crate::DatabaseSnapshot`].
///
/// Carries enough information for a [`crate::SchemaConnector`] to render DDL
/// without consulting the schema or snapshot again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SchemaChange {
    /// A table must be created with the given fields.
    CreateTable {
        /// Target table name.
        table: String,
        /// Fields in definition order.
        fields: Vec<Field>,
    },
    /// A table must be dropped.
    DropTable {
        /// Target table name.
        table: String,
    },
    /// A column must be added to an existing table.
    AddColumn {
        /// Target table name.
        table: String,
        /// The field to add.
        field: Field,
    },
    /// A column must be dropped from an existing table.
    DropColumn {
        /// Target table name.
        table: String,
        /// The column name to drop.
        column: String,
    },
    /// An index must be created.
    CreateIndex {
        /// Target table name.
        table: String,
        /// The index to create.
        index: Index,
    },
    /// An index must be dropped.
    DropIndex {
        /// Target table name.
        table: String,
        /// The index name to drop.
        index: String,
    },
}

impl SchemaChange {
    /// The table this change targets.
    pub fn table(&self) -> &str {
        match self {
            SchemaChange::CreateTable { table, .. }
            | SchemaChange::DropTable { table }
            | SchemaChange::AddColumn { table, .. }
            | SchemaChange::DropColumn { table, .. }
            | SchemaChange::CreateIndex { table, .. }
            | SchemaChange::DropIndex { table, .. } => table,
        }
    }

    /// A short, human-readable description of this change, used by
    /// `nexus-diff`'s `describe_changes`.
    pub fn describe(&self) -> String {
        match self {
            SchemaChange::CreateTable { table, fields } => {
                format!("create table '{table}' ({} fields)", fields.len())
            }
            SchemaChange::DropTable { table } => format!("drop table '{table}'"),
            SchemaChange::AddColumn { table, field } => {
                format!("add column '{}' to '{table}'", field.name)
            }
            SchemaChange::DropColumn { table, column } => {
                format!("drop column '{column}' from '{table}'")
            }
            SchemaChange::CreateIndex { table, index } => {
                format!("create index '{}' on '{table}'", index.name)
            }
            SchemaChange::DropIndex { table, index } => {
                format!("drop index '{index}' from '{table}'")
            }
        }
    }

    /// Ordering rank used to tie-break equally-applicable changes within a
    /// single diff step, per spec: create-table, add-column, create-index
    /// (forward order); drop-index, drop-column, drop-table (reverse order).
    pub fn forward_rank(&self) -> u8 {
        match self {
            SchemaChange::CreateTable { .. } => 0,
            SchemaChange::AddColumn { .. } => 1,
            SchemaChange::CreateIndex { .. } => 2,
            SchemaChange::DropIndex { .. } => 3,
            SchemaChange::DropColumn { .. } => 4,
            SchemaChange::DropTable { .. } => 5,
        }
    }
}
