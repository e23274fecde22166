//! `diff(schema, snapshot, connector) -> Vec<SchemaChange>`, implementing
//! the change-detection rules of spec §4.4.

use nexus_connector::{ColumnInfo, DatabaseSnapshot, SchemaChange, SchemaConnector};
use nexus_schema::{Field, Model, Schema};
use tracing::warn;

/// Computes the structural diff between `schema` and `snapshot`.
///
/// Determinism (spec §4.4): model ordering follows schema-definition
/// order; within a model, columns follow field-definition order; drops of
/// tables absent from the schema follow alphabetical order of their names.
/// Within a single model's change set, changes are ordered create-table,
/// add-column, create-index, drop-index, drop-column (matching
/// [`SchemaChange::forward_rank`]) -- except a column-alteration pair,
/// which is always emitted drop-then-add so the replacement column never
/// collides with the one it replaces.
///
/// `connector` resolves this crate's share of spec §9's open question: it
/// canonicalizes both the field's semantic type and the snapshot column's
/// reported type before comparing them, so dialect-specific spelling never
/// produces a spurious alteration.
pub fn diff(schema: &Schema, snapshot: &DatabaseSnapshot, connector: &dyn SchemaConnector) -> Vec<SchemaChange> {
    let mut changes = Vec::new();

    for model in schema.models() {
        if !snapshot.has_table(&model.name) {
            changes.push(SchemaChange::CreateTable {
                table: model.name.clone(),
                fields: model.fields.clone(),
            });
            for index in &model.indexes {
                changes.push(SchemaChange::CreateIndex {
                    table: model.name.clone(),
                    index: index.clone(),
                });
            }
            continue;
        }

        changes.extend(diff_existing_model(model, snapshot, connector));
    }

    let mut dropped_tables: Vec<&String> = snapshot
        .tables
        .keys()
        .filter(|name| !schema.has_model(name))
        .collect();
    dropped_tables.sort();
    for table in dropped_tables {
        changes.push(SchemaChange::DropTable { table: table.clone() });
    }

    changes
}

/// Computes the changes for a model present on both sides.
fn diff_existing_model(model: &Model, snapshot: &DatabaseSnapshot, connector: &dyn SchemaConnector) -> Vec<SchemaChange> {
    let table = snapshot.table(&model.name).expect("caller checked has_table");
    let mut ranked: Vec<(u8, SchemaChange)> = Vec::new();
    let mut modify_pairs: Vec<(SchemaChange, SchemaChange)> = Vec::new();

    for field in &model.fields {
        match table.columns.get(&field.name) {
            None => {
                let change = SchemaChange::AddColumn {
                    table: model.name.clone(),
                    field: field.clone(),
                };
                ranked.push((change.forward_rank(), change));
            }
            Some(col) => {
                if let Some((old, new)) = detect_alteration(model, field, col, connector) {
                    modify_pairs.push((old, new));
                }
            }
        }
    }

    for column_name in table.columns.keys() {
        if model.field(column_name).is_none() {
            let change = SchemaChange::DropColumn {
                table: model.name.clone(),
                column: column_name.clone(),
            };
            ranked.push((change.forward_rank(), change));
        }
    }

    for index in &model.indexes {
        if !table.indexes.contains_key(&index.name) {
            let change = SchemaChange::CreateIndex {
                table: model.name.clone(),
                index: index.clone(),
            };
            ranked.push((change.forward_rank(), change));
        }
    }
    for index_name in table.indexes.keys() {
        if !model.indexes.iter().any(|i| &i.name == index_name) {
            let change = SchemaChange::DropIndex {
                table: model.name.clone(),
                index: index_name.clone(),
            };
            ranked.push((change.forward_rank(), change));
        }
    }

    ranked.sort_by_key(|(rank, _)| *rank);
    let mut out: Vec<SchemaChange> = ranked.into_iter().map(|(_, c)| c).collect();
    for (old, new) in modify_pairs {
        out.push(old);
        out.push(new);
    }
    out
}

/// Detects whether `field` and `col` describe structurally different
/// columns (type or nullability), returning `(drop_old, add_new)` if so.
///
/// A default-expression mismatch alone is not an alteration (spec §9,
/// "Default-expression round-trip"): it is logged as a warning, since
/// introspected default text is often dialect-mangled (e.g.
/// `nextval('users_id_seq')`) and comparing it as an opaque string against
/// the semantic default would otherwise flag every auto-increment column.
fn detect_alteration(
    model: &Model,
    field: &Field,
    col: &ColumnInfo,
    connector: &dyn SchemaConnector,
) -> Option<(SchemaChange, SchemaChange)> {
    let field_type = connector.canonical_type_of_field(field);
    let col_type = connector.canonical_type(&col.sql_type);
    let type_changed = field_type != col_type;
    let nullable_changed = field.nullable != col.nullable;

    if !type_changed && !nullable_changed {
        if field.default.is_some() != col.default_expr.is_some() {
            warn!(
                model = %model.name,
                field = %field.name,
                "default expression differs between schema and snapshot; not treated as a structural change"
            );
        }
        return None;
    }

    let drop = SchemaChange::DropColumn {
        table: model.name.clone(),
        column: field.name.clone(),
    };
    let add = SchemaChange::AddColumn {
        table: model.name.clone(),
        field: field.clone(),
    };
    Some((drop, add))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nexus_connector::{ColumnInfo, TableInfo};
    use nexus_schema::{FieldType, Index};
    use pretty_assertions::assert_eq;

    fn connector() -> nexus_sql_test_stub::TestConnector {
        nexus_sql_test_stub::TestConnector
    }

    // A minimal stand-in SchemaConnector so this crate's tests don't depend
    // on `nexus-sql` (which would be a cyclic dev-dependency). It implements
    // just enough of the trait -- type mapping and canonicalization -- to
    // exercise the diff rules; DDL rendering is irrelevant to `diff` itself.
    mod nexus_sql_test_stub {
        use nexus_connector::{CanonicalType, ColumnInfo, ConnectorError, Dialect, IndexInfo, Result, SchemaConnector, SqlParam, SqlRow};
        use nexus_schema::{DefaultValue, Field, FieldType, Index};

        pub struct TestConnector;

        impl SchemaConnector for TestConnector {
            fn dialect(&self) -> Dialect {
                Dialect::Sqlite
            }
            fn driver_name(&self) -> &'static str {
                "test"
            }
            fn quote(&self, identifier: &str) -> String {
                format!("\"{identifier}\"")
            }
            fn placeholder(&self, _i: u32) -> String {
                "?".to_string()
            }
            fn type_mapping(&self, field: &Field) -> String {
                match field.field_type {
                    FieldType::Int | FieldType::BigInt => "INTEGER".to_string(),
                    _ => "TEXT".to_string(),
                }
            }
            fn canonical_type(&self, sql_type: &str) -> CanonicalType {
                match sql_type.to_ascii_uppercase().as_str() {
                    "INTEGER" => CanonicalType::Integer,
                    "TEXT" => CanonicalType::Text,
                    other => CanonicalType::Other(other.to_string()),
                }
            }
            fn render_default(&self, _default: &DefaultValue) -> String {
                String::new()
            }
            fn supports_returning(&self) -> bool {
                false
            }
            fn supports_upsert(&self) -> bool {
                false
            }
            fn supports_ddl_transactions(&self) -> bool {
                false
            }
            fn create_table_sql(&self, _table: &str, _fields: &[Field]) -> String {
                String::new()
            }
            fn drop_table_sql(&self, _table: &str) -> String {
                String::new()
            }
            fn create_index_sql(&self, _table: &str, _index: &Index) -> String {
                String::new()
            }
            fn drop_index_sql(&self, _table: &str, _index_name: &str) -> String {
                String::new()
            }
            fn add_column_sql(&self, _table: &str, _field: &Field) -> String {
                String::new()
            }
            fn drop_column_sql(&self, _table: &str, _column: &str) -> String {
                String::new()
            }
            fn rename_column_sql(&self, _table: &str, _from: &str, _to: &str) -> String {
                String::new()
            }
            fn execute_raw(&self, _sql: &str) -> Result<()> {
                Ok(())
            }
            fn execute_params(&self, _sql: &str, _params: &[SqlParam]) -> Result<u64> {
                Ok(0)
            }
            fn query_params(&self, _sql: &str, _params: &[SqlParam]) -> Result<Vec<SqlRow>> {
                Ok(Vec::new())
            }
            fn introspect_tables(&self) -> Result<Vec<String>> {
                Ok(Vec::new())
            }
            fn introspect_columns(&self, _table: &str) -> Result<Vec<ColumnInfo>> {
                Ok(Vec::new())
            }
            fn introspect_indexes(&self, _table: &str) -> Result<Vec<IndexInfo>> {
                Ok(Vec::new())
            }
        }
    }

    fn user_post_schema() -> Schema {
        let mut schema = Schema::new();
        schema.add_model("User", |m| {
            m.add_field(Field::new("id", FieldType::Int).primary_key().auto_increment());
            m.add_field(Field::new("email", FieldType::String).unique());
        });
        schema.add_model("Post", |m| {
            m.add_field(Field::new("id", FieldType::Int).primary_key().auto_increment());
            m.add_field(Field::new("title", FieldType::String));
        });
        schema
    }

    #[test]
    fn create_from_empty_emits_tables_in_schema_order() {
        let schema = user_post_schema();
        let snapshot = DatabaseSnapshot::empty();
        let changes = diff(&schema, &snapshot, &connector());
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].table(), "User");
        assert_eq!(changes[1].table(), "Post");
        assert!(matches!(changes[0], SchemaChange::CreateTable { .. }));
    }

    #[test]
    fn add_column_detected_for_new_field() {
        let mut schema = Schema::new();
        schema.add_model("User", |m| {
            m.add_field(Field::new("id", FieldType::Int).primary_key());
            m.add_field(Field::new("email", FieldType::String).unique());
        });

        let mut snapshot = DatabaseSnapshot::empty();
        let mut table = TableInfo::new("User");
        table.columns.insert(
            "id".to_string(),
            ColumnInfo {
                name: "id".to_string(),
                sql_type: "INTEGER".to_string(),
                nullable: false,
                primary_key: true,
                unique: false,
                default_expr: None,
                auto_increment: true,
            },
        );
        snapshot.tables.insert("User".to_string(), table);

        let changes = diff(&schema, &snapshot, &connector());
        assert_eq!(changes.len(), 1);
        assert!(matches!(&changes[0], SchemaChange::AddColumn { field, .. } if field.name == "email"));
    }

    #[test]
    fn drop_column_detected_for_removed_field() {
        let mut schema = Schema::new();
        schema.add_model("User", |m| {
            m.add_field(Field::new("id", FieldType::Int).primary_key());
        });

        let mut snapshot = DatabaseSnapshot::empty();
        let mut table = TableInfo::new("User");
        table.columns.insert(
            "id".to_string(),
            ColumnInfo {
                name: "id".to_string(),
                sql_type: "INTEGER".to_string(),
                nullable: false,
                primary_key: true,
                unique: false,
                default_expr: None,
                auto_increment: true,
            },
        );
        table.columns.insert(
            "old_column".to_string(),
            ColumnInfo {
                name: "old_column".to_string(),
                sql_type: "TEXT".to_string(),
                nullable: true,
                primary_key: false,
                unique: false,
                default_expr: None,
                auto_increment: false,
            },
        );
        snapshot.tables.insert("User".to_string(), table);

        let changes = diff(&schema, &snapshot, &connector());
        assert_eq!(changes.len(), 1);
        assert!(matches!(&changes[0], SchemaChange::DropColumn { column, .. } if column == "old_column"));
    }

    #[test]
    fn drop_table_for_snapshot_only_tables_is_alphabetical() {
        let schema = Schema::new();
        let mut snapshot = DatabaseSnapshot::empty();
        snapshot.tables.insert("Zebra".to_string(), TableInfo::new("Zebra"));
        snapshot.tables.insert("Alpha".to_string(), TableInfo::new("Alpha"));

        let changes = diff(&schema, &snapshot, &connector());
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].table(), "Alpha");
        assert_eq!(changes[1].table(), "Zebra");
    }

    #[test]
    fn type_change_emits_drop_then_add_pair() {
        let mut schema = Schema::new();
        schema.add_model("User", |m| {
            m.add_field(Field::new("id", FieldType::Int).primary_key());
            m.add_field(Field::new("age", FieldType::Int));
        });

        let mut snapshot = DatabaseSnapshot::empty();
        let mut table = TableInfo::new("User");
        table.columns.insert(
            "id".to_string(),
            ColumnInfo {
                name: "id".to_string(),
                sql_type: "INTEGER".to_string(),
                nullable: false,
                primary_key: true,
                unique: false,
                default_expr: None,
                auto_increment: true,
            },
        );
        table.columns.insert(
            "age".to_string(),
            ColumnInfo {
                name: "age".to_string(),
                sql_type: "TEXT".to_string(),
                nullable: false,
                primary_key: false,
                unique: false,
                default_expr: None,
                auto_increment: false,
            },
        );
        snapshot.tables.insert("User".to_string(), table);

        let changes = diff(&schema, &snapshot, &connector());
        assert_eq!(changes.len(), 2);
        assert!(matches!(&changes[0], SchemaChange::DropColumn { column, .. } if column == "age"));
        assert!(matches!(&changes[1], SchemaChange::AddColumn { field, .. } if field.name == "age"));
    }

    #[test]
    fn index_changes_detected_by_name() {
        let mut schema = Schema::new();
        schema.add_model("User", |m| {
            m.add_field(Field::new("id", FieldType::Int).primary_key());
            m.add_index(Index::new("idx_new", vec!["id".to_string()]));
        });

        let mut snapshot = DatabaseSnapshot::empty();
        let mut table = TableInfo::new("User");
        table.columns.insert(
            "id".to_string(),
            ColumnInfo {
                name: "id".to_string(),
                sql_type: "INTEGER".to_string(),
                nullable: false,
                primary_key: true,
                unique: false,
                default_expr: None,
                auto_increment: true,
            },
        );
        table.indexes.insert(
            "idx_old".to_string(),
            nexus_connector::IndexInfo {
                name: "idx_old".to_string(),
                unique: false,
                columns: vec!["id".to_string()],
            },
        );
        snapshot.tables.insert("User".to_string(), table);

        let changes = diff(&schema, &snapshot, &connector());
        assert_eq!(changes.len(), 2);
        assert!(changes.iter().any(|c| matches!(c, SchemaChange::CreateIndex { index, .. } if index.name == "idx_new")));
        assert!(changes.iter().any(|c| matches!(c, SchemaChange::DropIndex { index, .. } if index == "idx_old")));
    }
}
