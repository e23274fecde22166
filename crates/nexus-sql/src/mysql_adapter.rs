//! [`MysqlConnector`] -- MySQL-backed [`SchemaConnector`] implementation,
//! built on the synchronous `mysql` crate.

use std::sync::Mutex;

use mysql::prelude::Queryable;
use mysql::{Conn, Value};
use nexus_connector::{
    CanonicalType, ColumnInfo, ConnectorError, Dialect, IndexInfo, Result, SchemaConnector,
    SqlParam, SqlRow, SqlValue,
};
use nexus_schema::{DefaultValue, Field, Index};
use tracing::{debug, trace};

use crate::parse_sql_type::parse_sql_type;
use crate::type_mapping;

/// MySQL-backed implementation of [`SchemaConnector`].
///
/// MySQL has no transactional DDL (spec §9): each migration statement runs
/// independently, and [`SchemaConnector::supports_ddl_transactions`]
/// reports `false`.
pub struct MysqlConnector {
    conn: Mutex<Conn>,
}

impl MysqlConnector {
    /// Wraps an existing MySQL connection.
    pub fn new(conn: Conn) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Conn> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn column_def(&self, field: &Field) -> String {
        let mut parts = vec![format!("`{}` {}", field.name, self.type_mapping(field))];
        if !field.nullable {
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

impl SchemaConnector for MysqlConnector {
    fn dialect(&self) -> Dialect {
        Dialect::Mysql
    }

    fn driver_name(&self) -> &'static str {
        "mysql"
    }

    fn quote(&self, identifier: &str) -> String {
        format!("`{identifier}`")
    }

    fn placeholder(&self, _i: u32) -> String {
        "?".to_string()
    }

    fn type_mapping(&self, field: &Field) -> String {
        type_mapping::mysql_type(field)
    }

    fn canonical_type(&self, sql_type: &str) -> CanonicalType {
        parse_sql_type(Dialect::Mysql, sql_type)
    }

    fn render_default(&self, default: &DefaultValue) -> String {
        type_mapping::render_default_mysql(default)
    }

    fn supports_returning(&self) -> bool {
        false
    }

    fn supports_upsert(&self) -> bool {
        true
    }

    fn supports_ddl_transactions(&self) -> bool {
        false
    }

    fn create_table_sql(&self, table: &str, fields: &[Field]) -> String {
        let mut cols: Vec<String> = fields.iter().map(|f| self.column_def(f)).collect();
        if let Some(pk) = fields.iter().find(|f| f.primary_key) {
            cols.push(format!("PRIMARY KEY (`{}`)", pk.name));
        }
        format!(
            "CREATE TABLE IF NOT EXISTS `{table}` (\n  {}\n)",
            cols.join(",\n  ")
        )
    }

    fn drop_table_sql(&self, table: &str) -> String {
        format!("DROP TABLE `{table}`")
    }

    fn create_index_sql(&self, table: &str, index: &Index) -> String {
        let unique = if index.unique { "UNIQUE " } else { "" };
        let cols: Vec<String> = index.fields.iter().map(|c| format!("`{c}`")).collect();
        format!(
            "CREATE {unique}INDEX `{}` ON `{table}` ({})",
            index.name,
            cols.join(", ")
        )
    }

    fn drop_index_sql(&self, table: &str, index_name: &str) -> String {
        format!("DROP INDEX `{index_name}` ON `{table}`")
    }

    fn add_column_sql(&self, table: &str, field: &Field) -> String {
        format!("ALTER TABLE `{table}` ADD COLUMN {}", self.column_def(field))
    }

    fn drop_column_sql(&self, table: &str, column: &str) -> String {
        format!("ALTER TABLE `{table}` DROP COLUMN `{column}`")
    }

    fn rename_column_sql(&self, table: &str, from: &str, to: &str) -> String {
        // MySQL 8's RENAME COLUMN does not require repeating the type.
        format!("ALTER TABLE `{table}` RENAME COLUMN `{from}` TO `{to}`")
    }

    fn execute_raw(&self, sql: &str) -> Result<()> {
        trace!(sql, "executing raw batch");
        self.lock()
            .query_drop(sql)
            .map_err(|e| ConnectorError::driver("executing statement batch", e))
    }

    fn execute_params(&self, sql: &str, params: &[SqlParam]) -> Result<u64> {
        trace!(sql, "executing parameterized statement");
        let values: Vec<Value> = params.iter().map(param_to_mysql).collect();
        let mut conn = self.lock();
        conn.exec_drop(sql, values)
            .map_err(|e| ConnectorError::driver("executing parameterized statement", e))?;
        Ok(conn.affected_rows())
    }

    fn query_params(&self, sql: &str, params: &[SqlParam]) -> Result<Vec<SqlRow>> {
        trace!(sql, "executing parameterized query");
        let values: Vec<Value> = params.iter().map(param_to_mysql).collect();
        let rows: Vec<mysql::Row> = self
            .lock()
            .exec(sql, values)
            .map_err(|e| ConnectorError::driver("executing parameterized query", e))?;
        Ok(rows.iter().map(mysql_row_to_sql_row).collect())
    }

    fn introspect_tables(&self) -> Result<Vec<String>> {
        let mut conn = self.lock();
        let names: Vec<String> = conn
            .query(
                "SELECT table_name FROM information_schema.tables \
                 WHERE table_schema = DATABASE() AND table_name NOT LIKE '\\_nexus\\_%' \
                 ORDER BY table_name",
            )
            .map_err(|e| ConnectorError::driver("listing tables", e))?;
        debug!(count = names.len(), "introspected tables");
        Ok(names)
    }

    fn introspect_columns(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        let mut conn = self.lock();
        let rows: Vec<(String, String, String, Option<String>, String, String)> = conn
            .exec(
                "SELECT column_name, column_type, is_nullable, column_default, column_key, extra \
                 FROM information_schema.columns \
                 WHERE table_schema = DATABASE() AND table_name = ? \
                 ORDER BY ordinal_position",
                (table,),
            )
            .map_err(|e| ConnectorError::driver(format!("introspecting columns of '{table}'"), e))?;

        Ok(rows
            .into_iter()
            .map(|(name, data_type, is_nullable, default_expr, column_key, extra)| ColumnInfo {
                name,
                sql_type: data_type,
                nullable: is_nullable == "YES",
                primary_key: column_key == "PRI",
                unique: column_key == "UNI",
                default_expr,
                auto_increment: extra.contains("auto_increment"),
            })
            .collect())
    }

    fn introspect_indexes(&self, table: &str) -> Result<Vec<IndexInfo>> {
        let mut conn = self.lock();
        let rows: Vec<(String, i64, String, i64)> = conn
            .exec(
                "SELECT index_name, non_unique, column_name, seq_in_index \
                 FROM information_schema.statistics \
                 WHERE table_schema = DATABASE() AND table_name = ? AND index_name != 'PRIMARY' \
                 ORDER BY index_name, seq_in_index",
                (table,),
            )
            .map_err(|e| ConnectorError::driver(format!("introspecting indexes of '{table}'"), e))?;

        let mut by_name: std::collections::BTreeMap<String, (bool, Vec<(i64, String)>)> =
            std::collections::BTreeMap::new();
        for (name, non_unique, column, seq) in rows {
            let entry = by_name.entry(name).or_insert((non_unique == 0, Vec::new()));
            entry.1.push((seq, column));
        }
        Ok(by_name
            .into_iter()
            .map(|(name, (unique, mut cols))| {
                cols.sort_by_key(|(seq, _)| *seq);
                IndexInfo {
                    name,
                    unique,
                    columns: cols.into_iter().map(|(_, c)| c).collect(),
                }
            })
            .collect())
    }
}

fn param_to_mysql(param: &SqlParam) -> Value {
    match param {
        SqlParam::Text(s) => Value::Bytes(s.clone().into_bytes()),
        SqlParam::Int(i) => Value::Int(*i),
        SqlParam::Null => Value::NULL,
    }
}

fn mysql_value_to_sql_value(value: &Value) -> SqlValue {
    match value {
        Value::NULL => SqlValue::Null,
        Value::Int(i) => SqlValue::Int(*i),
        Value::UInt(u) => SqlValue::Int(*u as i64),
        Value::Bytes(bytes) => SqlValue::Text(String::from_utf8_lossy(bytes).into_owned()),
        other => SqlValue::Text(format!("{other:?}")),
    }
}

fn mysql_row_to_sql_row(row: &mysql::Row) -> SqlRow {
    (0..row.len())
        .map(|i| row.as_ref(i).map(mysql_value_to_sql_value).unwrap_or(SqlValue::Null))
        .collect()
}
