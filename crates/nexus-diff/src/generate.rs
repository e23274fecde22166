//! Turns a diffed change set into a [`Migration`] ready to write to disk.

use nexus_connector::{DatabaseSnapshot, Migration, SchemaChange, SchemaConnector};

use crate::invert::invert;

/// Renders `changes` as forward DDL and, best-effort, their inverse as
/// reverse DDL, bundling both into a named [`Migration`] with id `id`.
///
/// The forward statements run in the order `changes` is given (already
/// ordered by [`crate::diff`] per spec's forward-rank rules). The reverse
/// statements run in the opposite order, each produced by
/// [`invert`] against `snapshot` -- the schema state the forward changes
/// were diffed from, i.e. the state `down` must restore.
///
/// If any change can't be inverted (see `invert`'s doc comment), the
/// migration is still produced but its `down_sql` is left empty, making it
/// irreversible: partial down-SQL would silently corrupt a rollback, which
/// is worse than refusing to offer one.
pub fn generate_migration_from_diff(connector: &dyn SchemaConnector, snapshot: &DatabaseSnapshot, changes: &[SchemaChange], name: &str, id: String) -> Migration {
    let up_sql = render_statements(connector, changes);

    let mut down_sql = String::new();
    let mut all_invertible = true;
    let mut reverse_changes = Vec::with_capacity(changes.len());
    for change in changes.iter().rev() {
        match invert(change, snapshot, connector) {
            Some(inverted) => reverse_changes.push(inverted),
            None => {
                all_invertible = false;
                break;
            }
        }
    }
    if all_invertible {
        down_sql = render_statements(connector, &reverse_changes);
    }

    Migration::new(id, name, up_sql, down_sql)
}

fn render_statements(connector: &dyn SchemaConnector, changes: &[SchemaChange]) -> String {
    changes
        .iter()
        .map(|c| format!("{};", connector.render_change(c)))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use nexus_connector::{CanonicalType, ColumnInfo, Dialect, IndexInfo, Result, SqlParam, SqlRow};
    use nexus_schema::{DefaultValue, Field, FieldType, Index};
    use pretty_assertions::assert_eq;

    struct StubConnector;
    impl SchemaConnector for StubConnector {
        fn dialect(&self) -> Dialect {
            Dialect::Sqlite
        }
        fn driver_name(&self) -> &'static str {
            "stub"
        }
        fn quote(&self, identifier: &str) -> String {
            format!("\"{identifier}\"")
        }
        fn placeholder(&self, _i: u32) -> String {
            "?".to_string()
        }
        fn type_mapping(&self, field: &Field) -> String {
            match field.field_type {
                FieldType::Int => "INTEGER".to_string(),
                _ => "TEXT".to_string(),
            }
        }
        fn canonical_type(&self, sql_type: &str) -> CanonicalType {
            match sql_type {
                "INTEGER" => CanonicalType::Integer,
                _ => CanonicalType::Text,
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
        fn create_table_sql(&self, table: &str, fields: &[Field]) -> String {
            let cols = fields
                .iter()
                .map(|f| format!("{} {}", f.name, self.type_mapping(f)))
                .collect::<Vec<_>>()
                .join(", ");
            format!("CREATE TABLE {} ({cols})", self.quote(table))
        }
        fn drop_table_sql(&self, table: &str) -> String {
            format!("DROP TABLE {}", self.quote(table))
        }
        fn create_index_sql(&self, table: &str, index: &Index) -> String {
            format!("CREATE INDEX {} ON {}", index.name, self.quote(table))
        }
        fn drop_index_sql(&self, _table: &str, index_name: &str) -> String {
            format!("DROP INDEX {index_name}")
        }
        fn add_column_sql(&self, table: &str, field: &Field) -> String {
            format!("ALTER TABLE {} ADD COLUMN {}", self.quote(table), field.name)
        }
        fn drop_column_sql(&self, table: &str, column: &str) -> String {
            format!("ALTER TABLE {} DROP COLUMN {column}", self.quote(table))
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

    #[test]
    fn create_table_migration_has_matching_up_and_down() {
        let changes = vec![SchemaChange::CreateTable {
            table: "User".to_string(),
            fields: vec![Field::new("id", FieldType::Int).primary_key()],
        }];
        let snapshot = DatabaseSnapshot::empty();
        let migration = generate_migration_from_diff(&StubConnector, &snapshot, &changes, "create_user", "20260115_093000".to_string());

        assert_eq!(migration.up_sql, "CREATE TABLE \"User\" (id INTEGER);");
        assert_eq!(migration.down_sql, "DROP TABLE \"User\";");
        assert!(!migration.is_irreversible());
    }

    #[test]
    fn uninvertible_change_leaves_migration_irreversible() {
        let changes = vec![SchemaChange::DropIndex {
            table: "User".to_string(),
            index: "idx_missing".to_string(),
        }];
        let snapshot = DatabaseSnapshot::empty();
        let migration = generate_migration_from_diff(&StubConnector, &snapshot, &changes, "drop_idx", "20260115_093000".to_string());

        assert!(migration.is_irreversible());
        assert_eq!(migration.up_sql, "DROP INDEX idx_missing;");
    }

    #[test]
    fn multiple_changes_render_in_order_forward_and_reverse() {
        let changes = vec![
            SchemaChange::CreateTable {
                table: "User".to_string(),
                fields: vec![Field::new("id", FieldType::Int).primary_key()],
            },
            SchemaChange::AddColumn {
                table: "User".to_string(),
                field: Field::new("email", FieldType::String),
            },
        ];
        let snapshot = DatabaseSnapshot::empty();
        let migration = generate_migration_from_diff(&StubConnector, &snapshot, &changes, "setup", "20260115_093000".to_string());

        assert_eq!(
            migration.up_sql,
            "CREATE TABLE \"User\" (id INTEGER);\n\nALTER TABLE \"User\" ADD COLUMN email;"
        );
        assert_eq!(
            migration.down_sql,
            "ALTER TABLE \"User\" DROP COLUMN email;\n\nDROP TABLE \"User\";"
        );
    }
}
