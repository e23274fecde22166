//! The state machine and mutating operations of spec §4.6.3:
//! `Up`/`Down`/`DownTo`/`DownN`/`Reset`/`Status`, all guarded by the lock
//! protocol of §4.6.2.

use chrono::{DateTime, Duration, Utc};
use nexus_connector::{ConnectorError, Migration, SchemaConnector};
use tracing::{info, warn};

use crate::error::{EngineError, Result};
use crate::history::{self, HistoryRow};
use crate::lock::{self, LockGuard, DEFAULT_TTL_SECONDS};
use crate::validate::{self, ValidationResult};

/// What a single `Up()` call did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpReport {
    /// Ids of migrations applied in this batch, in application order.
    pub applied: Vec<String>,
}

/// What a single rollback call (`Down`, `DownTo`, `DownN`) did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownReport {
    /// Ids of migrations rolled back, in rollback order (most recent
    /// first).
    pub rolled_back: Vec<String>,
}

/// What `Reset()` did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResetReport {
    /// Ids rolled back, in rollback order.
    pub rolled_back: Vec<String>,
    /// Ids (re-)applied, in application order.
    pub applied: Vec<String>,
}

/// Per-migration status, as returned by [`MigrationEngine::status`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    /// The migration's id.
    pub id: String,
    /// The migration's human-readable name.
    pub name: String,
    /// Whether it has been applied.
    pub applied: bool,
    /// When it was applied, if it has been.
    pub applied_at: Option<String>,
}

/// Owns the loaded migration list and drives it against a live database
/// through a borrowed [`SchemaConnector`] (spec §9, "Ownership" -- the
/// engine neither opens nor closes the connection).
pub struct MigrationEngine<'a> {
    connector: &'a dyn SchemaConnector,
    migrations: Vec<Migration>,
    ttl: Duration,
    identifier: String,
}

impl<'a> MigrationEngine<'a> {
    /// Builds an engine over an already-loaded, id-sorted migration list.
    /// Use [`crate::file::load_from_dir`] to build `migrations` from disk.
    pub fn new(connector: &'a dyn SchemaConnector, migrations: Vec<Migration>) -> Self {
        Self {
            connector,
            migrations,
            ttl: Duration::seconds(DEFAULT_TTL_SECONDS),
            identifier: default_identifier(),
        }
    }

    /// Builder: overrides the lock TTL (default 10 minutes, per spec
    /// §4.6.2).
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Builder: overrides the identifier registered as `locked_by` (default
    /// a hostname-derived string).
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = identifier.into();
        self
    }

    /// The loaded migration list, in id order.
    pub fn migrations(&self) -> &[Migration] {
        &self.migrations
    }

    /// Validates every loaded migration, returning the first validation
    /// failure encountered, if any.
    pub fn validate_all(&self) -> Vec<(String, ValidationResult)> {
        self.migrations
            .iter()
            .map(|m| (m.id.clone(), validate::validate(m)))
            .collect()
    }

    /// Acquires the lock, or unconditionally clears a stale one first if
    /// `force` is set (spec §7, "Propagation policy").
    fn acquire(&self, force: bool, now: &DateTime<Utc>) -> std::result::Result<LockGuard<'a>, EngineError> {
        if force {
            lock::release(self.connector)?;
        }
        LockGuard::acquire(self.connector, &self.identifier, self.ttl, now)
    }

    /// `Up()` (spec §4.6.3): applies every pending migration, in id order,
    /// within a single lock acquisition. Any error aborts the batch, but
    /// migrations already applied in this batch stay applied.
    pub fn up(&self, force: bool, now: &DateTime<Utc>) -> Result<UpReport> {
        let _guard = self.acquire(force, now)?;
        self.up_locked(now)
    }

    fn up_locked(&self, now: &DateTime<Utc>) -> Result<UpReport> {
        history::ensure_table(self.connector)?;
        let applied_ids: std::collections::HashSet<String> = history::applied(self.connector)?
            .into_iter()
            .map(|r| r.migration_id)
            .collect();

        let mut report = UpReport::default();
        for migration in &self.migrations {
            if applied_ids.contains(&migration.id) {
                continue;
            }
            info!(id = %migration.id, name = %migration.name, "applying migration");
            self.execute(&migration.up_sql, migration)?;
            history::insert(self.connector, &migration.id, &migration.name, &migration.checksum, now)?;
            report.applied.push(migration.id.clone());
        }
        Ok(report)
    }

    /// `Down()`: rolls back exactly the most recently applied migration.
    pub fn down(&self, force: bool, now: &DateTime<Utc>) -> Result<DownReport> {
        let _guard = self.acquire(force, now)?;
        self.down_n_locked(1)
    }

    /// `DownN(n)`: rolls back exactly `n` applied migrations, or fewer if
    /// fewer remain; returns the count actually rolled back.
    pub fn down_n(&self, n: usize, force: bool, now: &DateTime<Utc>) -> Result<DownReport> {
        let _guard = self.acquire(force, now)?;
        self.down_n_locked(n)
    }

    fn down_n_locked(&self, n: usize) -> Result<DownReport> {
        let mut report = DownReport::default();
        for _ in 0..n {
            match self.rollback_last()? {
                Some(id) => report.rolled_back.push(id),
                None => break,
            }
        }
        Ok(report)
    }

    /// `DownTo(target_id)`: rolls back from the last applied migration
    /// down to, but not including, the one whose id has `target_id` as a
    /// prefix.
    pub fn down_to(&self, target_id: &str, force: bool, now: &DateTime<Utc>) -> Result<DownReport> {
        let _guard = self.acquire(force, now)?;
        let applied = history::applied(self.connector)?;
        if !applied.iter().any(|r| r.migration_id.starts_with(target_id)) {
            return Err(EngineError::NotFound(target_id.to_string()));
        }

        let mut report = DownReport::default();
        loop {
            let applied = history::applied(self.connector)?;
            let Some(last) = applied.last() else { break };
            if last.migration_id.starts_with(target_id) {
                break;
            }
            match self.rollback_last()? {
                Some(id) => report.rolled_back.push(id),
                None => break,
            }
        }
        Ok(report)
    }

    /// `Reset()`: rolls back every applied migration, swallowing the
    /// terminal "nothing left to roll back" condition, then re-applies
    /// everything via `Up`. Runs under a single lock acquisition so the
    /// internal rollback/apply loop never contends with itself.
    pub fn reset(&self, force: bool, now: &DateTime<Utc>) -> Result<ResetReport> {
        let _guard = self.acquire(force, now)?;
        let mut report = ResetReport::default();
        loop {
            match self.rollback_last() {
                Ok(Some(id)) => report.rolled_back.push(id),
                Ok(None) => break,
                Err(_) => break,
            }
        }
        let up_report = self.up_locked(now)?;
        report.applied = up_report.applied;
        Ok(report)
    }

    /// Rolls back the single most recently applied migration. Returns
    /// `Ok(None)` if nothing is applied.
    fn rollback_last(&self) -> Result<Option<String>> {
        history::ensure_table(self.connector)?;
        let Some(last) = history::last_applied(self.connector)? else {
            return Ok(None);
        };
        let migration = self
            .migrations
            .iter()
            .find(|m| m.id == last.migration_id)
            .ok_or_else(|| EngineError::NotFound(last.migration_id.clone()))?;

        if migration.is_irreversible() {
            return Err(EngineError::NoRollback(migration.id.clone()));
        }

        info!(id = %migration.id, name = %migration.name, "rolling back migration");
        self.execute(&migration.down_sql, migration)?;
        history::delete(self.connector, &migration.id)?;
        Ok(Some(migration.id.clone()))
    }

    /// Executes a migration's SQL body, wrapping it in a transaction when
    /// the dialect supports transactional DDL (spec §9,
    /// "DDL transactionality"; the per-migration-transaction capability
    /// named in `SPEC_FULL.md`'s ambient stack).
    fn execute(&self, sql: &str, migration: &Migration) -> Result<()> {
        let body = if self.connector.supports_ddl_transactions() {
            format!("BEGIN;\n{sql}\nCOMMIT;")
        } else {
            sql.to_string()
        };
        self.connector.execute_raw(&body).map_err(|source| EngineError::ApplyFailed {
            id: migration.id.clone(),
            source,
        })
    }

    /// `Status()`: outer-joins the loaded migration list against history,
    /// one [`MigrationStatus`] per loaded migration, in id order.
    pub fn status(&self) -> Result<Vec<MigrationStatus>> {
        history::ensure_table(self.connector)?;
        let applied: Vec<HistoryRow> = history::applied(self.connector)?;
        let by_id: std::collections::HashMap<&str, &HistoryRow> =
            applied.iter().map(|r| (r.migration_id.as_str(), r)).collect();

        Ok(self
            .migrations
            .iter()
            .map(|m| {
                let row = by_id.get(m.id.as_str());
                MigrationStatus {
                    id: m.id.clone(),
                    name: m.name.clone(),
                    applied: row.is_some(),
                    applied_at: row.map(|r| r.applied_at.clone()),
                }
            })
            .collect())
    }

    /// `AcquireLock`/`ForceUnlock`/`WithLock` exposed directly for callers
    /// (the CLI's `--force` handling, operator tooling) that want lock
    /// control outside a full mutating operation.
    pub fn force_unlock(&self) -> Result<()> {
        warn!("force-unlocking migration lock");
        lock::release(self.connector)
    }

    /// Runs `f` with the lock held, releasing on every exit path
    /// (including a panic unwinding through `f`), per spec §4.6.2's
    /// `WithLock`.
    pub fn with_lock<T>(&self, now: &DateTime<Utc>, f: impl FnOnce() -> std::result::Result<T, ConnectorError>) -> Result<T> {
        let _guard = LockGuard::acquire(self.connector, &self.identifier, self.ttl, now)?;
        Ok(f()?)
    }
}

/// A best-effort process identifier for `locked_by`: hostname (or
/// Windows' `COMPUTERNAME`) plus the process id, so two engine instances
/// on different hosts -- or two processes on the same host -- never
/// collide.
fn default_identifier() -> String {
    let host = std::env::var("HOSTNAME")
        .or_else(|_| std::env::var("COMPUTERNAME"))
        .unwrap_or_else(|_| "unknown-host".to_string());
    format!("{host}:{}", std::process::id())
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

    fn two_migrations() -> Vec<Migration> {
        vec![
            Migration::new("20260101_000000", "create_users", "CREATE TABLE users (id INTEGER PRIMARY KEY);", "DROP TABLE users;"),
            Migration::new("20260102_000000", "create_posts", "CREATE TABLE posts (id INTEGER PRIMARY KEY);", "DROP TABLE posts;"),
        ]
    }

    #[test]
    fn up_applies_all_pending_in_order() {
        let c = connector();
        let engine = MigrationEngine::new(&c, two_migrations());
        let report = engine.up(false, &now()).unwrap();
        assert_eq!(report.applied, vec!["20260101_000000", "20260102_000000"]);

        let status = engine.status().unwrap();
        assert!(status.iter().all(|s| s.applied));
    }

    #[test]
    fn up_is_idempotent_on_already_applied_migrations() {
        let c = connector();
        let engine = MigrationEngine::new(&c, two_migrations());
        engine.up(false, &now()).unwrap();
        let second = engine.up(false, &now()).unwrap();
        assert!(second.applied.is_empty());
    }

    #[test]
    fn down_rolls_back_the_last_applied_migration() {
        let c = connector();
        let engine = MigrationEngine::new(&c, two_migrations());
        engine.up(false, &now()).unwrap();
        let report = engine.down(false, &now()).unwrap();
        assert_eq!(report.rolled_back, vec!["20260102_000000"]);

        let status = engine.status().unwrap();
        assert!(status[0].applied);
        assert!(!status[1].applied);
    }

    #[test]
    fn down_with_empty_down_sql_fails() {
        let c = connector();
        let migrations = vec![Migration::new("20260101_000000", "irreversible", "CREATE TABLE t (id INTEGER);", "")];
        let engine = MigrationEngine::new(&c, migrations);
        engine.up(false, &now()).unwrap();
        let err = engine.down(false, &now()).unwrap_err();
        assert!(matches!(err, EngineError::NoRollback(_)));
    }

    #[test]
    fn down_to_rolls_back_down_to_but_not_including_target() {
        let c = connector();
        let migrations = vec![
            Migration::new("20260101_000000", "a", "CREATE TABLE a (id INTEGER);", "DROP TABLE a;"),
            Migration::new("20260102_000000", "b", "CREATE TABLE b (id INTEGER);", "DROP TABLE b;"),
            Migration::new("20260103_000000", "c", "CREATE TABLE c (id INTEGER);", "DROP TABLE c;"),
        ];
        let engine = MigrationEngine::new(&c, migrations);
        engine.up(false, &now()).unwrap();

        let report = engine.down_to("20260101_000000", false, &now()).unwrap();
        assert_eq!(report.rolled_back, vec!["20260103_000000", "20260102_000000"]);

        let status = engine.status().unwrap();
        assert!(status[0].applied);
        assert!(!status[1].applied);
        assert!(!status[2].applied);
    }

    #[test]
    fn down_to_the_latest_migration_rolls_back_nothing() {
        let c = connector();
        let migrations = vec![
            Migration::new("20260101_000000", "a", "CREATE TABLE a (id INTEGER);", "DROP TABLE a;"),
            Migration::new("20260102_000000", "b", "CREATE TABLE b (id INTEGER);", "DROP TABLE b;"),
            Migration::new("20260103_000000", "c", "CREATE TABLE c (id INTEGER);", "DROP TABLE c;"),
        ];
        let engine = MigrationEngine::new(&c, migrations);
        engine.up(false, &now()).unwrap();

        let report = engine.down_to("20260103_000000", false, &now()).unwrap();
        assert!(report.rolled_back.is_empty());
    }

    #[test]
    fn down_to_unknown_target_fails() {
        let c = connector();
        let engine = MigrationEngine::new(&c, two_migrations());
        engine.up(false, &now()).unwrap();
        let err = engine.down_to("99999999_999999", false, &now()).unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
    }

    #[test]
    fn reset_rolls_back_everything_then_reapplies() {
        let c = connector();
        let engine = MigrationEngine::new(&c, two_migrations());
        engine.up(false, &now()).unwrap();
        let report = engine.reset(false, &now()).unwrap();
        assert_eq!(report.rolled_back, vec!["20260102_000000", "20260101_000000"]);
        assert_eq!(report.applied, vec!["20260101_000000", "20260102_000000"]);

        let status = engine.status().unwrap();
        assert!(status.iter().all(|s| s.applied));
    }

    #[test]
    fn lock_contention_surfaces_holder_details() {
        let c = connector();
        let engine_a = MigrationEngine::new(&c, two_migrations()).with_identifier("engine-a");
        let engine_b = MigrationEngine::new(&c, Vec::new()).with_identifier("engine-b");

        let _guard = engine_a.acquire(false, &now()).unwrap();
        let err = engine_b.up(false, &now()).unwrap_err();
        assert!(matches!(err, EngineError::Locked { .. }));
    }

    #[test]
    fn force_clears_a_held_lock_before_reacquiring() {
        let c = connector();
        let engine = MigrationEngine::new(&c, two_migrations());
        lock::acquire(&c, "stale-holder", Duration::minutes(10), &now()).unwrap();

        let report = engine.up(true, &now()).unwrap();
        assert_eq!(report.applied.len(), 2);
    }

    #[test]
    fn status_reports_unapplied_and_applied_migrations() {
        let c = connector();
        let engine = MigrationEngine::new(&c, two_migrations());
        engine.up(false, &now()).unwrap();
        engine.down(false, &now()).unwrap();

        let status = engine.status().unwrap();
        assert_eq!(status.len(), 2);
        assert!(status[0].applied);
        assert!(status[0].applied_at.is_some());
        assert!(!status[1].applied);
        assert!(status[1].applied_at.is_none());
    }
}
