//! [`SqliteConnector`] -- SQLite-backed [`SchemaConnector`] implementation.

use std::sync::Mutex;

use nexus_connector::{
    CanonicalType, ColumnInfo, ConnectorError, Dialect, IndexInfo, Result, SchemaConnector,
    SqlParam, SqlRow, SqlValue,
};
use nexus_schema::{DefaultValue, Field, FieldType, Index};
use rusqlite::types::{Value as RusqliteValue, ValueRef};
use rusqlite::Connection;
use tracing::{debug, trace};

use crate::parse_sql_type::parse_sql_type;
use crate::type_mapping;

/// SQLite-backed implementation of [`SchemaConnector`].
///
/// Wraps a [`rusqlite::Connection`] in a `Mutex`, matching the teacher's
/// `SqliteStore` pattern: every public method acquires the lock, runs its
/// SQL, and releases it. The connector borrows the connection -- it neither
/// opens nor closes it (spec §9, "Ownership"); callers construct it with
/// [`SqliteConnector::new`] around a connection they own.
pub struct SqliteConnector {
    conn: Mutex<Connection>,
}

impl SqliteConnector {
    /// Wraps an existing SQLite connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Renders one column definition for `CREATE TABLE`.
    fn column_def(&self, field: &Field) -> String {
        let mut parts = vec![format!(
            "\"{}\" {}",
            field.name,
            type_mapping::sqlite_type(field)
        )];
        if field.primary_key {
            parts.push("PRIMARY KEY".to_string());
            if field.auto_increment {
                parts.push("AUTOINCREMENT".to_string());
            }
        }
        if !field.nullable && !field.primary_key {
            parts.push("NOT NULL".to_string());
        }
        if field.unique && !field.primary_key {
            parts.push("UNIQUE".to_string());
        }
        if let Some(default) = &field.default {
            parts.push(format!("DEFAULT {}", self.render_default(default)));
        }
        parts.join(" ")
    }
}

impl SchemaConnector for SqliteConnector {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn driver_name(&self) -> &'static str {
        "rusqlite"
    }

    fn quote(&self, identifier: &str) -> String {
        format!("\"{identifier}\"")
    }

    fn placeholder(&self, _i: u32) -> String {
        "?".to_string()
    }

    fn type_mapping(&self, field: &Field) -> String {
        type_mapping::sqlite_type(field)
    }

    fn canonical_type(&self, sql_type: &str) -> CanonicalType {
        parse_sql_type(Dialect::Sqlite, sql_type)
    }

    fn render_default(&self, default: &DefaultValue) -> String {
        type_mapping::render_default_sqlite(default)
    }

    fn supports_returning(&self) -> bool {
        true
    }

    fn supports_upsert(&self) -> bool {
        true
    }

    fn supports_ddl_transactions(&self) -> bool {
        false
    }

    fn create_table_sql(&self, table: &str, fields: &[Field]) -> String {
        let cols: Vec<String> = fields.iter().map(|f| self.column_def(f)).collect();
        format!(
            "CREATE TABLE IF NOT EXISTS \"{table}\" (\n  {}\n)",
            cols.join(",\n  ")
        )
    }

    fn drop_table_sql(&self, table: &str) -> String {
        format!("DROP TABLE \"{table}\"")
    }

    fn create_index_sql(&self, table: &str, index: &Index) -> String {
        let unique = if index.unique { "UNIQUE " } else { "" };
        let cols: Vec<String> = index.fields.iter().map(|c| format!("\"{c}\"")).collect();
        format!(
            "CREATE {unique}INDEX \"{}\" ON \"{table}\" ({})",
            index.name,
            cols.join(", ")
        )
    }

    fn drop_index_sql(&self, _table: &str, index_name: &str) -> String {
        format!("DROP INDEX \"{index_name}\"")
    }

    fn add_column_sql(&self, table: &str, field: &Field) -> String {
        format!("ALTER TABLE \"{table}\" ADD COLUMN {}", self.column_def(field))
    }

    fn drop_column_sql(&self, table: &str, column: &str) -> String {
        format!("ALTER TABLE \"{table}\" DROP COLUMN \"{column}\"")
    }

    fn rename_column_sql(&self, table: &str, from: &str, to: &str) -> String {
        format!("ALTER TABLE \"{table}\" RENAME COLUMN \"{from}\" TO \"{to}\"")
    }

    fn execute_raw(&self, sql: &str) -> Result<()> {
        trace!(sql, "executing raw batch");
        self.lock()
            .execute_batch(sql)
            .map_err(|e| ConnectorError::driver("executing statement batch", e))
    }

    fn execute_params(&self, sql: &str, params: &[SqlParam]) -> Result<u64> {
        trace!(sql, "executing parameterized statement");
        let values: Vec<RusqliteValue> = params.iter().map(param_to_rusqlite).collect();
        let refs: Vec<&dyn rusqlite::ToSql> = values.iter().map(|v| v as &dyn rusqlite::ToSql).collect();
        let n = self
            .lock()
            .execute(sql, refs.as_slice())
            .map_err(|e| ConnectorError::driver("executing parameterized statement", e))?;
        Ok(n as u64)
    }

    fn query_params(&self, sql: &str, params: &[SqlParam]) -> Result<Vec<SqlRow>> {
        trace!(sql, "executing parameterized query");
        let conn = self.lock();
        let values: Vec<RusqliteValue> = params.iter().map(param_to_rusqlite).collect();
        let refs: Vec<&dyn rusqlite::ToSql> = values.iter().map(|v| v as &dyn rusqlite::ToSql).collect();
        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| ConnectorError::driver("preparing parameterized query", e))?;
        let col_count = stmt.column_count();
        let rows = stmt
            .query_map(refs.as_slice(), |row| {
                let mut out = Vec::with_capacity(col_count);
                for i in 0..col_count {
                    out.push(sqlite_value_to_sql_value(row.get_ref(i)?));
                }
                Ok(out)
            })
            .map_err(|e| ConnectorError::driver("executing parameterized query", e))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| ConnectorError::driver("executing parameterized query", e))?;
        Ok(rows)
    }

    fn introspect_tables(&self) -> Result<Vec<String>> {
        let conn = self.lock();
        let mut stmt = conn
            .prepare(
                "SELECT name FROM sqlite_master \
                 WHERE type = 'table' \
                   AND name NOT LIKE 'sqlite_%' \
                   AND name NOT LIKE '_nexus_%' \
                 ORDER BY name",
            )
            .map_err(|e| ConnectorError::driver("listing tables", e))?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| ConnectorError::driver("listing tables", e))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| ConnectorError::driver("listing tables", e))?;
        debug!(count = names.len(), "introspected tables");
        Ok(names)
    }

    fn introspect_columns(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        let conn = self.lock();
        let mut stmt = conn
            .prepare(&format!("PRAGMA table_info(\"{table}\")"))
            .map_err(|e| ConnectorError::driver(format!("introspecting columns of '{table}'"), e))?;
        let rows = stmt
            .query_map([], |row| {
                let name: String = row.get(1)?;
                let sql_type: String = row.get(2)?;
                let notnull: i64 = row.get(3)?;
                let default_expr: Option<String> = row.get(4)?;
                let pk: i64 = row.get(5)?;
                Ok((name, sql_type, notnull, default_expr, pk))
            })
            .map_err(|e| ConnectorError::driver(format!("introspecting columns of '{table}'"), e))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| ConnectorError::driver(format!("introspecting columns of '{table}'"), e))?;

        Ok(rows
            .into_iter()
            .map(|(name, sql_type, notnull, default_expr, pk)| ColumnInfo {
                name,
                sql_type,
                nullable: notnull == 0,
                primary_key: pk > 0,
                unique: false,
                default_expr,
                auto_increment: pk > 0,
            })
            .collect())
    }

    fn introspect_indexes(&self, table: &str) -> Result<Vec<IndexInfo>> {
        let conn = self.lock();
        let mut list_stmt = conn
            .prepare(&format!("PRAGMA index_list(\"{table}\")"))
            .map_err(|e| ConnectorError::driver(format!("introspecting indexes of '{table}'"), e))?;
        let indexes = list_stmt
            .query_map([], |row| {
                let name: String = row.get(1)?;
                let unique: i64 = row.get(2)?;
                let origin: String = row.get(3)?;
                Ok((name, unique != 0, origin))
            })
            .map_err(|e| ConnectorError::driver(format!("introspecting indexes of '{table}'"), e))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| ConnectorError::driver(format!("introspecting indexes of '{table}'"), e))?;

        let mut result = Vec::new();
        for (name, unique, origin) in indexes {
            // "u" / "pk" origin indexes are auto-created by UNIQUE/PRIMARY
            // KEY column constraints, not standalone schema indexes.
            if origin != "c" {
                continue;
            }
            let mut info_stmt = conn
                .prepare(&format!("PRAGMA index_info(\"{name}\")"))
                .map_err(|e| ConnectorError::driver(format!("introspecting index '{name}'"), e))?;
            let columns = info_stmt
                .query_map([], |row| row.get::<_, String>(2))
                .map_err(|e| ConnectorError::driver(format!("introspecting index '{name}'"), e))?
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| ConnectorError::driver(format!("introspecting index '{name}'"), e))?;
            result.push(IndexInfo {
                name,
                unique,
                columns,
            });
        }
        Ok(result)
    }
}

/// Converts an engine-level [`SqlParam`] into rusqlite's owned value type.
fn param_to_rusqlite(param: &SqlParam) -> RusqliteValue {
    match param {
        SqlParam::Text(s) => RusqliteValue::Text(s.clone()),
        SqlParam::Int(i) => RusqliteValue::Integer(*i),
        SqlParam::Null => RusqliteValue::Null,
    }
}

/// Converts a borrowed rusqlite column value into an engine-level
/// [`SqlValue`]. Reals and blobs are not expected in the engine's own
/// history/lock tables; they fall back to a text rendering.
fn sqlite_value_to_sql_value(value: ValueRef<'_>) -> SqlValue {
    match value {
        ValueRef::Null => SqlValue::Null,
        ValueRef::Integer(i) => SqlValue::Int(i),
        ValueRef::Real(f) => SqlValue::Text(f.to_string()),
        ValueRef::Text(t) => SqlValue::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => SqlValue::Text(hex::encode(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nexus_schema::Index as SchemaIndex;
    use pretty_assertions::assert_eq;

    fn user_field() -> Field {
        Field::new("id", FieldType::Int).primary_key().auto_increment()
    }

    #[test]
    fn create_table_sql_includes_all_fields() {
        let conn = Connection::open_in_memory().unwrap();
        let connector = SqliteConnector::new(conn);
        let email = Field::new("email", FieldType::String).unique();
        let sql = connector.create_table_sql("User", &[user_field(), email]);
        assert!(sql.contains("CREATE TABLE IF NOT EXISTS \"User\""));
        assert!(sql.contains("\"id\" INTEGER PRIMARY KEY AUTOINCREMENT"));
        assert!(sql.contains("\"email\" TEXT UNIQUE"));
    }

    #[test]
    fn introspection_round_trips_created_table() {
        let conn = Connection::open_in_memory().unwrap();
        let connector = SqliteConnector::new(conn);
        let email = Field::new("email", FieldType::String).unique();
        let sql = connector.create_table_sql("User", &[user_field(), email]);
        connector.lock().execute_batch(&sql).unwrap();

        let tables = connector.introspect_tables().unwrap();
        assert_eq!(tables, vec!["User".to_string()]);

        let cols = connector.introspect_columns("User").unwrap();
        assert_eq!(cols.len(), 2);
        let id_col = cols.iter().find(|c| c.name == "id").unwrap();
        assert!(id_col.primary_key);
    }

    #[test]
    fn excludes_internal_nexus_tables_from_introspection() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE _nexus_migrations (id INTEGER PRIMARY KEY);\
             CREATE TABLE widgets (id INTEGER PRIMARY KEY);",
        )
        .unwrap();
        let connector = SqliteConnector::new(conn);
        let tables = connector.introspect_tables().unwrap();
        assert_eq!(tables, vec!["widgets".to_string()]);
    }

    #[test]
    fn create_index_sql_renders_unique_flag() {
        let conn = Connection::open_in_memory().unwrap();
        let connector = SqliteConnector::new(conn);
        let idx = SchemaIndex::new("idx_email", vec!["email".to_string()]).unique();
        let sql = connector.create_index_sql("User", &idx);
        assert_eq!(sql, "CREATE UNIQUE INDEX \"idx_email\" ON \"User\" (\"email\")");
    }

    #[test]
    fn introspects_standalone_indexes_only() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE widgets (id INTEGER PRIMARY KEY, sku TEXT UNIQUE, name TEXT);\
             CREATE INDEX idx_name ON widgets (name);",
        )
        .unwrap();
        let connector = SqliteConnector::new(conn);
        let indexes = connector.introspect_indexes("widgets").unwrap();
        assert_eq!(indexes.len(), 1);
        assert_eq!(indexes[0].name, "idx_name");
    }
}
