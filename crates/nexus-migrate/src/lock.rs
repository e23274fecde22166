//! The `_nexus_migrations_lock` singleton table and advisory
//! mutual-exclusion protocol (spec §4.6.2).
//!
//! The lock is advisory: it does not block arbitrary SQL, only other
//! engine instances that honor this same protocol. Its scope is the
//! database, not the process, so two engines pointing at the same
//! database observe each other's lock.

use chrono::{DateTime, Duration, Utc};
use nexus_connector::{ConnectorError, Dialect, Result, SchemaConnector, SqlParam};
use tracing::{info, warn};

use crate::error::EngineError;

/// The lock table name.
pub const TABLE: &str = "_nexus_migrations_lock";

/// The fixed singleton row id every dialect's lock table uses.
pub const SINGLETON_ID: i64 = 1;

/// The default lock time-to-live, per spec §4.6.2.
pub const DEFAULT_TTL_SECONDS: i64 = 600;

/// A read lock row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockRow {
    /// When the lock was acquired, RFC 3339.
    pub locked_at: String,
    /// The identifier the holder registered itself under (hostname by
    /// default).
    pub locked_by: String,
    /// When the lock expires, RFC 3339.
    pub expires_at: String,
}

impl LockRow {
    /// `true` if `now` is past `expires_at`. Wall-clock based, per spec
    /// §4.6.2 -- implementations must not assume monotonic clocks.
    pub fn is_expired(&self, now: &DateTime<Utc>) -> bool {
        DateTime::parse_from_rfc3339(&self.expires_at)
            .map(|expires| *now > expires.with_timezone(&Utc))
            .unwrap_or(true)
    }
}

/// Creates the lock table if it does not already exist.
pub fn ensure_table(connector: &dyn SchemaConnector) -> Result<()> {
    let ddl = match connector.dialect() {
        Dialect::Postgres => {
            "CREATE TABLE IF NOT EXISTS _nexus_migrations_lock (\
                id INTEGER PRIMARY KEY, \
                locked_at TEXT, \
                locked_by TEXT, \
                expires_at TEXT)"
        }
        Dialect::Mysql => {
            "CREATE TABLE IF NOT EXISTS _nexus_migrations_lock (\
                id INT PRIMARY KEY, \
                locked_at VARCHAR(64), \
                locked_by VARCHAR(255), \
                expires_at VARCHAR(64))"
        }
        Dialect::Sqlite => {
            "CREATE TABLE IF NOT EXISTS _nexus_migrations_lock (\
                id INTEGER PRIMARY KEY, \
                locked_at TEXT, \
                locked_by TEXT, \
                expires_at TEXT)"
        }
    };
    connector.execute_raw(ddl)
}

/// Reads the singleton lock row, if present.
pub fn read(connector: &dyn SchemaConnector) -> Result<Option<LockRow>> {
    let rows = connector.query_params(
        "SELECT locked_at, locked_by, expires_at FROM _nexus_migrations_lock WHERE id = ?",
        &[SqlParam::Int(SINGLETON_ID)],
    )?;
    let Some(row) = rows.into_iter().next() else {
        return Ok(None);
    };
    let locked_at = row
        .first()
        .and_then(|v| v.as_str())
        .ok_or_else(|| ConnectorError::driver("reading lock row", "missing locked_at"))?
        .to_string();
    let locked_by = row
        .get(1)
        .and_then(|v| v.as_str())
        .ok_or_else(|| ConnectorError::driver("reading lock row", "missing locked_by"))?
        .to_string();
    let expires_at = row
        .get(2)
        .and_then(|v| v.as_str())
        .ok_or_else(|| ConnectorError::driver("reading lock row", "missing expires_at"))?
        .to_string();
    Ok(Some(LockRow {
        locked_at,
        locked_by,
        expires_at,
    }))
}

/// Acquires the lock for `holder`, per the protocol of spec §4.6.2:
/// ensure the table exists; if a live lock is present, fail; if an expired
/// one is present, delete it first; insert a fresh row with `now` and
/// `now + ttl`.
pub fn acquire(connector: &dyn SchemaConnector, holder: &str, ttl: Duration, now: &DateTime<Utc>) -> std::result::Result<(), EngineError> {
    ensure_table(connector)?;

    if let Some(existing) = read(connector)? {
        if !existing.is_expired(now) {
            return Err(EngineError::Locked {
                locked_by: existing.locked_by,
                locked_at: existing.locked_at,
                expires_at: existing.expires_at,
            });
        }
        warn!(locked_by = existing.locked_by, "clearing expired migration lock");
        release(connector)?;
    }

    let expires_at = *now + ttl;
    connector.execute_params(
        "INSERT INTO _nexus_migrations_lock (id, locked_at, locked_by, expires_at) VALUES (?, ?, ?, ?)",
        &[
            SqlParam::Int(SINGLETON_ID),
            SqlParam::from(*now),
            SqlParam::from(holder),
            SqlParam::from(expires_at),
        ],
    )?;
    info!(holder, "migration lock acquired");
    Ok(())
}

/// Releases the lock unconditionally (used both by a normal release and by
/// `force_unlock`).
pub fn release(connector: &dyn SchemaConnector) -> Result<()> {
    connector.execute_params(
        "DELETE FROM _nexus_migrations_lock WHERE id = ?",
        &[SqlParam::Int(SINGLETON_ID)],
    )?;
    Ok(())
}

/// A RAII guard releasing the lock on drop, so acquisition, the wrapped
/// closure, and release happen on every exit path -- including a panic
/// unwinding through the closure -- per spec §4.6.2's `WithLock`.
pub struct LockGuard<'a> {
    connector: &'a dyn SchemaConnector,
}

impl<'a> LockGuard<'a> {
    /// Acquires the lock and returns a guard that releases it on drop.
    pub fn acquire(connector: &'a dyn SchemaConnector, holder: &str, ttl: Duration, now: &DateTime<Utc>) -> std::result::Result<Self, EngineError> {
        acquire(connector, holder, ttl, now)?;
        Ok(Self { connector })
    }
}

impl Drop for LockGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = release(self.connector) {
            warn!(error = %e, "failed to release migration lock");
        }
    }
}
