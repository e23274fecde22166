//! Inverts a single [`SchemaChange`] for reverse (down) migration
//! generation.
//!
//! Inversion is lossless for the operations that carry their own payload
//! (`CreateTable`, `AddColumn`, `CreateIndex`): undoing them is just a
//! drop. The drop-shaped changes (`DropTable`, `DropColumn`, `DropIndex`)
//! carry only a name, so reconstructing *their* inverse means looking the
//! original structure back up in the snapshot being diffed against --
//! that's what `snapshot` is for here.
//!
//! Reconstruction of a dropped column's `Field` from a bare
//! [`nexus_connector::ColumnInfo`] is necessarily best-effort: the
//! semantic type is recovered via [`SchemaConnector::canonical_type`], but
//! a column's default expression is not translated back into a
//! [`nexus_schema::DefaultValue`] (documented in `DESIGN.md`) -- the
//! recreated table/column will have the right shape but not necessarily
//! the same default.

use nexus_connector::{CanonicalType, ColumnInfo, DatabaseSnapshot, SchemaChange, SchemaConnector};
use nexus_schema::{Field, FieldType, Index};

/// Computes the inverse of `change`, consulting `snapshot` to recover the
/// structure of anything the forward change only names by identifier.
/// Returns `None` if the snapshot doesn't have the information needed
/// (e.g. inverting a `DropTable` for a table the snapshot never recorded).
pub fn invert(change: &SchemaChange, snapshot: &DatabaseSnapshot, connector: &dyn SchemaConnector) -> Option<SchemaChange> {
    match change {
        SchemaChange::CreateTable { table, .. } => Some(SchemaChange::DropTable { table: table.clone() }),
        SchemaChange::DropTable { table } => {
            let info = snapshot.table(table)?;
            let fields = info
                .columns
                .values()
                .map(|col| field_from_column(col, connector))
                .collect();
            Some(SchemaChange::CreateTable {
                table: table.clone(),
                fields,
            })
        }
        SchemaChange::AddColumn { table, field } => Some(SchemaChange::DropColumn {
            table: table.clone(),
            column: field.name.clone(),
        }),
        SchemaChange::DropColumn { table, column } => {
            let info = snapshot.table(table)?;
            let col = info.columns.get(column)?;
            Some(SchemaChange::AddColumn {
                table: table.clone(),
                field: field_from_column(col, connector),
            })
        }
        SchemaChange::CreateIndex { table, index } => Some(SchemaChange::DropIndex {
            table: table.clone(),
            index: index.name.clone(),
        }),
        SchemaChange::DropIndex { table, index } => {
            let info = snapshot.table(table)?;
            let idx = info.indexes.get(index)?;
            Some(SchemaChange::CreateIndex {
                table: table.clone(),
                index: Index {
                    name: idx.name.clone(),
                    fields: idx.columns.clone(),
                    unique: idx.unique,
                },
            })
        }
    }
}

/// Best-effort reconstruction of a [`Field`] from introspected column
/// metadata, for down-migration generation of a drop-shaped change.
fn field_from_column(col: &ColumnInfo, connector: &dyn SchemaConnector) -> Field {
    let canonical = connector.canonical_type(&col.sql_type);
    let (field_type, length, precision, scale) = match canonical {
        CanonicalType::Integer => (FieldType::Int, None, None, None),
        CanonicalType::BigInteger => (FieldType::BigInt, None, None, None),
        CanonicalType::Varchar(len) => (FieldType::String, len, None, None),
        CanonicalType::Text => (FieldType::Text, None, None, None),
        CanonicalType::Boolean => (FieldType::Bool, None, None, None),
        CanonicalType::Double => (FieldType::Float, None, None, None),
        CanonicalType::Numeric(p, s) => (FieldType::Decimal, None, p, s),
        CanonicalType::Timestamp => (FieldType::DateTime, None, None, None),
        CanonicalType::Date => (FieldType::Date, None, None, None),
        CanonicalType::Time => (FieldType::Time, None, None, None),
        CanonicalType::Json => (FieldType::Json, None, None, None),
        CanonicalType::Blob => (FieldType::Bytes, None, None, None),
        CanonicalType::Uuid => (FieldType::Uuid, None, None, None),
        CanonicalType::Other(_) => (FieldType::String, None, None, None),
    };

    let mut field = Field::new(col.name.clone(), field_type);
    field.nullable = col.nullable;
    field.primary_key = col.primary_key;
    field.unique = col.unique;
    field.auto_increment = col.auto_increment;
    field.length = length;
    field.precision = precision;
    field.scale = scale;
    field
}
