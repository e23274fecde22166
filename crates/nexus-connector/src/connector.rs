//! The [`SchemaConnector`] capability set: one trait, three dialects.

use nexus_schema::Field;

use crate::canonical::CanonicalType;
use crate::change::SchemaChange;
use crate::error::Result;
use crate::exec::{SqlParam, SqlRow};
use crate::snapshot::DatabaseSnapshot;

/// Dialect identifier, matching spec §4.3's closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Postgres,
    Mysql,
    Sqlite,
}

impl Dialect {
    /// Canonical lowercase spelling, as used in `nexus.json` and CLI flags.
    pub fn name(self) -> &'static str {
        match self {
            Dialect::Postgres => "postgres",
            Dialect::Mysql => "mysql",
            Dialect::Sqlite => "sqlite",
        }
    }

    /// Parses a dialect identifier, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Some(Dialect::Postgres),
            "mysql" | "mariadb" => Some(Dialect::Mysql),
            "sqlite" | "sqlite3" => Some(Dialect::Sqlite),
            _ => None,
        }
    }
}

/// The dialect-adapter capability set of spec §4.3.
///
/// A `SchemaConnector` both generates DDL from the schema model and
/// introspects a live database into a [`DatabaseSnapshot`]. Implementations
/// borrow a connection; they neither open nor close it (spec §9,
/// "Ownership").
pub trait SchemaConnector {
    /// The dialect this adapter targets.
    fn dialect(&self) -> Dialect;

    /// Human-readable dialect name, e.g. `"postgres"`.
    fn name(&self) -> &'static str {
        self.dialect().name()
    }

    /// The underlying driver crate name, e.g. `"rusqlite"`.
    fn driver_name(&self) -> &'static str;

    /// Quotes an identifier for safe inclusion in DDL: `"x"` for Postgres
    /// and SQLite, `` `x` `` for MySQL.
    fn quote(&self, identifier: &str) -> String;

    /// The bind placeholder for the 1-based parameter index `i`: `$i` for
    /// Postgres, `?` for MySQL and SQLite.
    fn placeholder(&self, i: u32) -> String;

    /// Maps a field's semantic type (and flags/sizing) to this dialect's
    /// SQL type string, per the matrix in spec §4.3.
    fn type_mapping(&self, field: &Field) -> String;

    /// Canonicalizes a dialect-reported type string (from introspection) or
    /// a dialect type string this adapter itself produced, into a
    /// [`CanonicalType`] comparable across dialects of the *same* kind and,
    /// for `Other`, across any dialect.
    fn canonical_type(&self, sql_type: &str) -> CanonicalType;

    /// Canonicalizes a field's semantic type via `type_mapping` followed by
    /// `canonical_type`, so a field and an introspected column can be
    /// compared on equal footing.
    fn canonical_type_of_field(&self, field: &Field) -> CanonicalType {
        self.canonical_type(&self.type_mapping(field))
    }

    /// Rewrites a symbolic default expression (`NOW()`, `UUID()`) into this
    /// dialect's literal SQL, or passes through an arbitrary expression /
    /// literal unchanged.
    fn render_default(&self, default: &nexus_schema::DefaultValue) -> String;

    /// Whether `INSERT ... RETURNING` is supported.
    fn supports_returning(&self) -> bool;

    /// Whether an upsert (`ON CONFLICT` / `ON DUPLICATE KEY`) construct is
    /// supported.
    fn supports_upsert(&self) -> bool;

    /// Whether DDL statements participate in transactions on this dialect.
    /// `true` for Postgres; `false` for MySQL (no transactional DDL) and,
    /// by this implementation's choice (documented in `DESIGN.md`), for
    /// SQLite as well.
    fn supports_ddl_transactions(&self) -> bool;

    /// Renders `CREATE TABLE IF NOT EXISTS` DDL for a new table with the
    /// given fields.
    fn create_table_sql(&self, table: &str, fields: &[Field]) -> String;

    /// Renders `DROP TABLE` DDL. Postgres appends `CASCADE`.
    fn drop_table_sql(&self, table: &str) -> String;

    /// Renders `CREATE [UNIQUE] INDEX` DDL.
    fn create_index_sql(&self, table: &str, index: &nexus_schema::Index) -> String;

    /// Renders `DROP INDEX` DDL.
    fn drop_index_sql(&self, table: &str, index_name: &str) -> String;

    /// Renders `ALTER TABLE ... ADD COLUMN` DDL.
    fn add_column_sql(&self, table: &str, field: &Field) -> String;

    /// Renders `ALTER TABLE ... DROP COLUMN` DDL.
    fn drop_column_sql(&self, table: &str, column: &str) -> String;

    /// Renders `ALTER TABLE ... RENAME COLUMN` DDL.
    fn rename_column_sql(&self, table: &str, from: &str, to: &str) -> String;

    /// Lists user table names, excluding dialect internals and this
    /// toolkit's own `_nexus_*` tables.
    fn introspect_tables(&self) -> Result<Vec<String>>;

    /// Introspects the columns of a single table.
    fn introspect_columns(&self, table: &str) -> Result<Vec<crate::snapshot::ColumnInfo>>;

    /// Introspects the indexes of a single table.
    fn introspect_indexes(&self, table: &str) -> Result<Vec<crate::snapshot::IndexInfo>>;

    /// Executes a batch of one or more `;`-separated statements with no
    /// bound parameters and no result rows. Used by the migration engine
    /// to create its own history/lock tables and to run a migration's
    /// up-SQL or down-SQL body.
    fn execute_raw(&self, sql: &str) -> Result<()>;

    /// Executes a single parameterized statement, returning the number of
    /// affected rows. Used by the migration engine for history/lock-table
    /// inserts, updates, and deletes.
    fn execute_params(&self, sql: &str, params: &[SqlParam]) -> Result<u64>;

    /// Executes a single parameterized query, returning every result row.
    /// Used by the migration engine to read back history and lock rows.
    fn query_params(&self, sql: &str, params: &[SqlParam]) -> Result<Vec<SqlRow>>;

    /// Introspects the full live database into a [`DatabaseSnapshot`],
    /// built from repeated calls to `introspect_tables`,
    /// `introspect_columns`, and `introspect_indexes`.
    fn introspect(&self) -> Result<DatabaseSnapshot> {
        let mut snapshot = DatabaseSnapshot::empty();
        for table_name in self.introspect_tables()? {
            let mut table = crate::snapshot::TableInfo::new(table_name.clone());
            for col in self.introspect_columns(&table_name)? {
                table.columns.insert(col.name.clone(), col);
            }
            for idx in self.introspect_indexes(&table_name)? {
                table.indexes.insert(idx.name.clone(), idx);
            }
            snapshot.tables.insert(table_name, table);
        }
        Ok(snapshot)
    }

    /// Renders the DDL for a single [`SchemaChange`].
    fn render_change(&self, change: &SchemaChange) -> String {
        match change {
            SchemaChange::CreateTable { table, fields } => self.create_table_sql(table, fields),
            SchemaChange::DropTable { table } => self.drop_table_sql(table),
            SchemaChange::AddColumn { table, field } => self.add_column_sql(table, field),
            SchemaChange::DropColumn { table, column } => self.drop_column_sql(table, column),
            SchemaChange::CreateIndex { table, index } => self.create_index_sql(table, index),
            SchemaChange::DropIndex { table, index } => self.drop_index_sql(table, index),
        }
    }
}
