//! [`PostgresConnector`] -- PostgreSQL-backed [`SchemaConnector`]
//! implementation, built on the synchronous `postgres` crate.

use std::sync::Mutex;

use nexus_connector::{
    CanonicalType, ColumnInfo, ConnectorError, Dialect, IndexInfo, Result, SchemaConnector,
    SqlParam, SqlRow, SqlValue,
};
use nexus_schema::{DefaultValue, Field, Index};
use postgres::types::ToSql;
use postgres::Client;
use tracing::{debug, trace};

use crate::parse_sql_type::parse_sql_type;
use crate::type_mapping;

/// PostgreSQL-backed implementation of [`SchemaConnector`].
///
/// `postgres::Client::query` takes `&mut self`, so the client is kept
/// behind a `Mutex` for the same reason `SqliteConnector` wraps its
/// connection -- the trait's methods only borrow `&self`.
pub struct PostgresConnector {
    client: Mutex<Client>,
}

impl PostgresConnector {
    /// Wraps an existing PostgreSQL client.
    pub fn new(client: Client) -> Self {
        Self {
            client: Mutex::new(client),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Client> {
        self.client.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn column_def(&self, field: &Field) -> String {
        let mut parts = vec![format!("\"{}\" {}", field.name, self.type_mapping(field))];
        if !field.nullable {
            parts.push("NOT NULL".to_string());
        }
        if field.primary_key {
            parts.push("PRIMARY KEY".to_string());
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

impl SchemaConnector for PostgresConnector {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    fn driver_name(&self) -> &'static str {
        "postgres"
    }

    fn quote(&self, identifier: &str) -> String {
        format!("\"{identifier}\"")
    }

    fn placeholder(&self, i: u32) -> String {
        format!("${i}")
    }

    fn type_mapping(&self, field: &Field) -> String {
        type_mapping::postgres_type(field)
    }

    fn canonical_type(&self, sql_type: &str) -> CanonicalType {
        parse_sql_type(Dialect::Postgres, sql_type)
    }

    fn render_default(&self, default: &DefaultValue) -> String {
        type_mapping::render_default_postgres(default)
    }

    fn supports_returning(&self) -> bool {
        true
    }

    fn supports_upsert(&self) -> bool {
        true
    }

    fn supports_ddl_transactions(&self) -> bool {
        true
    }

    fn create_table_sql(&self, table: &str, fields: &[Field]) -> String {
        let cols: Vec<String> = fields.iter().map(|f| self.column_def(f)).collect();
        format!(
            "CREATE TABLE IF NOT EXISTS \"{table}\" (\n  {}\n)",
            cols.join(",\n  ")
        )
    }

    fn drop_table_sql(&self, table: &str) -> String {
        format!("DROP TABLE \"{table}\" CASCADE")
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
            .batch_execute(sql)
            .map_err(|e| ConnectorError::driver("executing statement batch", e))
    }

    fn execute_params(&self, sql: &str, params: &[SqlParam]) -> Result<u64> {
        trace!(sql, "executing parameterized statement");
        let boxed: Vec<Box<dyn ToSql + Sync>> = params.iter().map(param_to_postgres).collect();
        let refs: Vec<&(dyn ToSql + Sync)> = boxed.iter().map(|b| b.as_ref()).collect();
        self.lock()
            .execute(sql, refs.as_slice())
            .map_err(|e| ConnectorError::driver("executing parameterized statement", e))
    }

    fn query_params(&self, sql: &str, params: &[SqlParam]) -> Result<Vec<SqlRow>> {
        trace!(sql, "executing parameterized query");
        let boxed: Vec<Box<dyn ToSql + Sync>> = params.iter().map(param_to_postgres).collect();
        let refs: Vec<&(dyn ToSql + Sync)> = boxed.iter().map(|b| b.as_ref()).collect();
        let rows = self
            .lock()
            .query(sql, refs.as_slice())
            .map_err(|e| ConnectorError::driver("executing parameterized query", e))?;
        Ok(rows.iter().map(postgres_row_to_sql_row).collect())
    }

    fn introspect_tables(&self) -> Result<Vec<String>> {
        let mut client = self.lock();
        let rows = client
            .query(
                "SELECT tablename FROM pg_catalog.pg_tables \
                 WHERE schemaname = 'public' AND tablename NOT LIKE '\\_nexus\\_%' \
                 ORDER BY tablename",
                &[],
            )
            .map_err(|e| ConnectorError::driver("listing tables", e))?;
        let names: Vec<String> = rows.iter().map(|row| row.get(0)).collect();
        debug!(count = names.len(), "introspected tables");
        Ok(names)
    }

    fn introspect_columns(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        let mut client = self.lock();
        let rows = client
            .query(
                "SELECT column_name, data_type, is_nullable, column_default, \
                        character_maximum_length, numeric_precision, numeric_scale \
                 FROM information_schema.columns \
                 WHERE table_schema = 'public' AND table_name = $1 \
                 ORDER BY ordinal_position",
                &[&table],
            )
            .map_err(|e| ConnectorError::driver(format!("introspecting columns of '{table}'"), e))?;

        let pk_rows = client
            .query(
                "SELECT a.attname FROM pg_index i \
                 JOIN pg_attribute a ON a.attrelid = i.indrelid AND a.attnum = ANY(i.indkey) \
                 WHERE i.indrelid = $1::regclass AND i.indisprimary",
                &[&table],
            )
            .map_err(|e| ConnectorError::driver(format!("introspecting primary key of '{table}'"), e))?;
        let pk_names: std::collections::HashSet<String> =
            pk_rows.iter().map(|row| row.get::<_, String>(0)).collect();

        Ok(rows
            .iter()
            .map(|row| {
                let name: String = row.get(0);
                let data_type: String = row.get(1);
                let is_nullable: String = row.get(2);
                let default_expr: Option<String> = row.get(3);
                let char_len: Option<i32> = row.get(4);
                let num_precision: Option<i32> = row.get(5);
                let num_scale: Option<i32> = row.get(6);
                let auto_increment = default_expr
                    .as_deref()
                    .map(|d| d.starts_with("nextval("))
                    .unwrap_or(false);
                // `information_schema.columns.data_type` reports a bare type
                // name ("character varying", "numeric") with no size --
                // unlike MySQL's `column_type`, which already carries it --
                // so the size columns are appended here to keep
                // `parse_sql_type` comparing like with like against a
                // schema field's own canonicalized size.
                let sql_type = match (char_len, num_precision, num_scale) {
                    (Some(len), _, _) => format!("{data_type}({len})"),
                    (None, Some(p), Some(s)) => format!("{data_type}({p},{s})"),
                    (None, Some(p), None) => format!("{data_type}({p})"),
                    (None, None, _) => data_type,
                };
                ColumnInfo {
                    primary_key: pk_names.contains(&name),
                    name,
                    sql_type,
                    nullable: is_nullable == "YES",
                    unique: false,
                    default_expr,
                    auto_increment,
                }
            })
            .collect())
    }

    fn introspect_indexes(&self, table: &str) -> Result<Vec<IndexInfo>> {
        let mut client = self.lock();
        let rows = client
            .query(
                "SELECT ic.relname AS index_name, ix.indisunique, a.attname \
                 FROM pg_class t \
                 JOIN pg_index ix ON t.oid = ix.indrelid \
                 JOIN pg_class ic ON ic.oid = ix.indexrelid \
                 JOIN pg_attribute a ON a.attrelid = t.oid AND a.attnum = ANY(ix.indkey) \
                 WHERE t.relname = $1 AND NOT ix.indisprimary \
                 ORDER BY ic.relname",
                &[&table],
            )
            .map_err(|e| ConnectorError::driver(format!("introspecting indexes of '{table}'"), e))?;

        let mut by_name: std::collections::BTreeMap<String, (bool, Vec<String>)> =
            std::collections::BTreeMap::new();
        for row in rows {
            let name: String = row.get(0);
            let unique: bool = row.get(1);
            let col: String = row.get(2);
            let entry = by_name.entry(name).or_insert((unique, Vec::new()));
            entry.1.push(col);
        }
        Ok(by_name
            .into_iter()
            .map(|(name, (unique, columns))| IndexInfo { name, unique, columns })
            .collect())
    }
}

fn param_to_postgres(param: &SqlParam) -> Box<dyn ToSql + Sync> {
    match param {
        SqlParam::Text(s) => Box::new(s.clone()),
        SqlParam::Int(i) => Box::new(*i),
        SqlParam::Null => Box::new(None::<String>),
    }
}

/// Decodes a `postgres::Row` into a [`SqlRow`], branching on the column's
/// reported type since there is no single `FromSql` impl that covers every
/// column our bookkeeping tables use.
fn postgres_row_to_sql_row(row: &postgres::Row) -> SqlRow {
    use postgres::types::Type;
    (0..row.len())
        .map(|i| match *row.columns()[i].type_() {
            Type::INT8 => row.get::<_, Option<i64>>(i).map(SqlValue::Int).unwrap_or(SqlValue::Null),
            Type::INT4 => row
                .get::<_, Option<i32>>(i)
                .map(|v| SqlValue::Int(v as i64))
                .unwrap_or(SqlValue::Null),
            Type::INT2 => row
                .get::<_, Option<i16>>(i)
                .map(|v| SqlValue::Int(v as i64))
                .unwrap_or(SqlValue::Null),
            _ => row.get::<_, Option<String>>(i).map(SqlValue::Text).unwrap_or(SqlValue::Null),
        })
        .collect()
}
