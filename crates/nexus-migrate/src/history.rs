//! The `_nexus_migrations` history table (spec §4.6.1).

use chrono::{DateTime, Utc};
use nexus_connector::{ConnectorError, Dialect, Result, SchemaConnector, SqlParam};
use tracing::debug;

/// The history table name. Excluded from introspection by every dialect's
/// `_nexus_%`/`_nexus_*` filter.
pub const TABLE: &str = "_nexus_migrations";

/// One row of the history table: a migration that has been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRow {
    /// Auto-assigned row id, used to determine "last applied" independent
    /// of migration id ordering.
    pub row_id: i64,
    /// The migration's timestamp identifier.
    pub migration_id: String,
    /// The migration's human-readable name.
    pub name: String,
    /// Hex-encoded SHA-256 checksum of the migration's up-SQL at the time
    /// it was applied.
    pub checksum: String,
    /// When the migration was applied, RFC 3339.
    pub applied_at: String,
}

/// Creates the history table if it does not already exist, per the
/// dialect-specific auto-increment/timestamp syntax.
pub fn ensure_table(connector: &dyn SchemaConnector) -> Result<()> {
    let ddl = match connector.dialect() {
        Dialect::Postgres => {
            "CREATE TABLE IF NOT EXISTS _nexus_migrations (\
                id SERIAL PRIMARY KEY, \
                migration_id TEXT UNIQUE NOT NULL, \
                name TEXT NOT NULL, \
                checksum TEXT NOT NULL, \
                applied_at TEXT NOT NULL)"
        }
        Dialect::Mysql => {
            "CREATE TABLE IF NOT EXISTS _nexus_migrations (\
                id INT AUTO_INCREMENT PRIMARY KEY, \
                migration_id VARCHAR(255) UNIQUE NOT NULL, \
                name VARCHAR(255) NOT NULL, \
                checksum VARCHAR(255) NOT NULL, \
                applied_at VARCHAR(64) NOT NULL)"
        }
        Dialect::Sqlite => {
            "CREATE TABLE IF NOT EXISTS _nexus_migrations (\
                id INTEGER PRIMARY KEY AUTOINCREMENT, \
                migration_id TEXT UNIQUE NOT NULL, \
                name TEXT NOT NULL, \
                checksum TEXT NOT NULL, \
                applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')))"
        }
    };
    connector.execute_raw(ddl)
}

/// Returns every applied migration, ordered by `migration_id` ascending --
/// the order the state machine reasons about pending-vs-applied in.
pub fn applied(connector: &dyn SchemaConnector) -> Result<Vec<HistoryRow>> {
    let rows = connector.query_params(
        "SELECT id, migration_id, name, checksum, applied_at FROM _nexus_migrations ORDER BY migration_id ASC",
        &[],
    )?;
    rows.iter().map(row_from_sql).collect()
}

/// Returns the most recently applied migration (by row id, i.e. insertion
/// order, not `migration_id`), if any. "Most recent" per spec §4.6.3's
/// `Down()` is insertion order: the last migration this engine instance
/// (or any other sharing this database) applied, not necessarily the one
/// with the lexicographically greatest id.
pub fn last_applied(connector: &dyn SchemaConnector) -> Result<Option<HistoryRow>> {
    let rows = connector.query_params(
        "SELECT id, migration_id, name, checksum, applied_at FROM _nexus_migrations ORDER BY id DESC",
        &[],
    )?;
    rows.first().map(row_from_sql).transpose()
}

/// Records a migration as applied.
pub fn insert(connector: &dyn SchemaConnector, migration_id: &str, name: &str, checksum: &str, now: &DateTime<Utc>) -> Result<()> {
    debug!(migration_id, "recording migration in history");
    connector.execute_params(
        "INSERT INTO _nexus_migrations (migration_id, name, checksum, applied_at) VALUES (?, ?, ?, ?)",
        &[
            SqlParam::from(migration_id),
            SqlParam::from(name),
            SqlParam::from(checksum),
            SqlParam::from(*now),
        ],
    )?;
    Ok(())
}

/// Deletes the history row for `migration_id`, used when rolling back.
pub fn delete(connector: &dyn SchemaConnector, migration_id: &str) -> Result<()> {
    debug!(migration_id, "removing migration from history");
    connector.execute_params(
        "DELETE FROM _nexus_migrations WHERE migration_id = ?",
        &[SqlParam::from(migration_id)],
    )?;
    Ok(())
}

fn row_from_sql(row: &nexus_connector::SqlRow) -> Result<HistoryRow> {
    let row_id = row
        .first()
        .and_then(|v| v.as_i64())
        .ok_or_else(|| ConnectorError::driver("reading history row", "missing id column"))?;
    let migration_id = row
        .get(1)
        .and_then(|v| v.as_str())
        .ok_or_else(|| ConnectorError::driver("reading history row", "missing migration_id column"))?
        .to_string();
    let name = row
        .get(2)
        .and_then(|v| v.as_str())
        .ok_or_else(|| ConnectorError::driver("reading history row", "missing name column"))?
        .to_string();
    let checksum = row
        .get(3)
        .and_then(|v| v.as_str())
        .ok_or_else(|| ConnectorError::driver("reading history row", "missing checksum column"))?
        .to_string();
    let applied_at = row
        .get(4)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    Ok(HistoryRow {
        row_id,
        migration_id,
        name,
        checksum,
        applied_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use nexus_sql::SqliteConnector;
    use pretty_assertions::assert_eq;
    use rusqlite::Connection;

    fn connector() -> SqliteConnector {
        SqliteConnector::new(Connection::open_in_memory().unwrap())
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn ensure_table_is_idempotent() {
        let c = connector();
        ensure_table(&c).unwrap();
        ensure_table(&c).unwrap();
    }

    #[test]
    fn insert_and_list_applied_in_id_order() {
        let c = connector();
        ensure_table(&c).unwrap();
        insert(&c, "20260102_000000", "second", "cksum2", &now()).unwrap();
        insert(&c, "20260101_000000", "first", "cksum1", &now()).unwrap();

        let rows = applied(&c).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].migration_id, "20260101_000000");
        assert_eq!(rows[1].migration_id, "20260102_000000");
    }

    #[test]
    fn last_applied_is_most_recent_insertion() {
        let c = connector();
        ensure_table(&c).unwrap();
        insert(&c, "20260102_000000", "second", "cksum2", &now()).unwrap();
        insert(&c, "20260101_000000", "first", "cksum1", &now()).unwrap();

        let last = last_applied(&c).unwrap().unwrap();
        assert_eq!(last.migration_id, "20260101_000000");
    }

    #[test]
    fn delete_removes_row() {
        let c = connector();
        ensure_table(&c).unwrap();
        insert(&c, "20260101_000000", "first", "cksum1", &now()).unwrap();
        delete(&c, "20260101_000000").unwrap();
        assert!(applied(&c).unwrap().is_empty());
    }
}
