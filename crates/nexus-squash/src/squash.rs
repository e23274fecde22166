//! The squash pipeline itself (spec §4.5): range filter, statement split,
//! forward/reverse concatenation, pair cancellation, emit.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use nexus_connector::{format_id, Migration};
use tracing::{debug, info};

use crate::classify::{classify, Key, Kind};
use crate::error::{Result, SquashError};
use crate::statement::split_statements;

/// Inclusive id range plus the name for the resulting migration.
#[derive(Debug, Clone)]
pub struct SquashOptions {
    /// Lower bound on migration id, inclusive. `None` means open below.
    pub from_id: Option<String>,
    /// Upper bound on migration id, inclusive. `None` means open above.
    pub to_id: Option<String>,
    /// Human-readable name for the emitted migration.
    pub output_name: String,
}

/// Accounting for what a squash run did, surfaced to the caller (and, at
/// the CLI layer, the user) so a squash never looks like silent data loss.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SquashReport {
    /// How many migrations fell inside the requested range.
    pub original_count: usize,
    /// How many up-statements survived cancellation.
    pub optimized_count: usize,
    /// How many up-statements were eliminated by cancellation.
    pub removed_count: usize,
    /// Ids of every migration that was squashed, in order.
    pub original_ids: Vec<String>,
}

/// Runs the full squash pipeline over `migrations` (assumed already sorted
/// by id) and `options`, producing a single replacement migration and a
/// report describing the reduction. `now` supplies the fresh migration's
/// timestamp id so the function stays deterministic and testable.
pub fn squash(migrations: &[Migration], options: &SquashOptions, now: &DateTime<Utc>) -> Result<(Migration, SquashReport)> {
    let selected: Vec<&Migration> = migrations
        .iter()
        .filter(|m| in_range(&m.id, options))
        .collect();

    if selected.len() < 2 {
        return Err(SquashError::TooFewMigrations(selected.len()));
    }

    let original_count = selected.len();
    let original_ids: Vec<String> = selected.iter().map(|m| m.id.clone()).collect();

    let mut up_statements = Vec::new();
    for m in &selected {
        up_statements.extend(split_statements(&m.up_sql));
    }

    let mut down_statements = Vec::new();
    for m in selected.iter().rev() {
        down_statements.extend(split_statements(&m.down_sql));
    }

    let up_survivors = cancel_pairs(&up_statements);
    let down_survivors = cancel_pairs(&down_statements);

    debug!(
        original_count,
        up_before = up_statements.len(),
        up_after = up_survivors.len(),
        "squash cancellation complete"
    );

    if up_survivors.is_empty() {
        return Err(SquashError::EmptyResult);
    }

    let up_sql = emit(&up_survivors);
    let down_sql = if down_survivors.is_empty() {
        String::new()
    } else {
        emit(&down_survivors)
    };

    let id = format_id(now);
    let optimized_count = up_survivors.len();
    let removed_count = up_statements.len().saturating_sub(optimized_count);
    let migration = Migration::new(id, options.output_name.clone(), up_sql, down_sql);

    info!(
        original_count,
        optimized_count, removed_count, name = %migration.name, "squashed migrations"
    );

    Ok((
        migration,
        SquashReport {
            original_count,
            optimized_count,
            removed_count,
            original_ids,
        },
    ))
}

fn in_range(id: &str, options: &SquashOptions) -> bool {
    let above_from = options.from_id.as_deref().map_or(true, |from| id >= from);
    let below_to = options.to_id.as_deref().map_or(true, |to| id <= to);
    above_from && below_to
}

/// Pair cancellation (spec §4.5 step 4): a create is eliminated together
/// with the nearest later drop sharing its key. Ties among repeated
/// create/drop pairs for the same key resolve LIFO, matching each drop to
/// the most recently unmatched create.
fn cancel_pairs(statements: &[String]) -> Vec<String> {
    let kinds: Vec<Kind> = statements.iter().map(|s| classify(s)).collect();
    let mut eliminated = vec![false; statements.len()];
    let mut pending: HashMap<Key, Vec<usize>> = HashMap::new();

    for (i, kind) in kinds.iter().enumerate() {
        match kind {
            Kind::CreateTable(k) | Kind::AddColumn(k) | Kind::CreateIndex(k) => {
                pending.entry(k.clone()).or_default().push(i);
            }
            Kind::DropTable(k) | Kind::DropColumn(k) | Kind::DropIndex(k) => {
                if let Some(stack) = pending.get_mut(k) {
                    if let Some(create_idx) = stack.pop() {
                        eliminated[create_idx] = true;
                        eliminated[i] = true;
                    }
                }
            }
            Kind::Other => {}
        }
    }

    statements
        .iter()
        .enumerate()
        .filter(|(i, _)| !eliminated[*i])
        .map(|(_, s)| s.clone())
        .collect()
}

fn emit(statements: &[String]) -> String {
    format!("{};", statements.join(";\n\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn at(id: &str, up: &str, down: &str) -> Migration {
        Migration::new(id, "m", up, down)
    }

    fn opts() -> SquashOptions {
        SquashOptions {
            from_id: None,
            to_id: None,
            output_name: "optimized".to_string(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn rejects_ranges_with_fewer_than_two_migrations() {
        let migrations = vec![at("20260101_000000", "CREATE TABLE a (id INTEGER);", "DROP TABLE a;")];
        let err = squash(&migrations, &opts(), &now()).unwrap_err();
        assert!(matches!(err, SquashError::TooFewMigrations(1)));
    }

    #[test]
    fn cancels_create_and_drop_of_a_temporary_table() {
        let migrations = vec![
            at("20260101_000000", "CREATE TABLE temp (id INTEGER);", ""),
            at("20260101_000100", "CREATE TABLE users (id INTEGER);", ""),
            at("20260101_000200", "DROP TABLE temp;", ""),
        ];
        let (migration, report) = squash(&migrations, &opts(), &now()).unwrap();
        assert!(migration.up_sql.contains("CREATE TABLE users"));
        assert!(!migration.up_sql.to_uppercase().contains("TEMP"));
        assert_eq!(report.original_count, 3);
        assert_eq!(report.optimized_count, 1);
        assert_eq!(report.removed_count, 2);
    }

    #[test]
    fn down_statements_concatenate_in_reverse_migration_order() {
        let migrations = vec![
            at("20260101_000000", "CREATE TABLE a (id INTEGER);", "DROP TABLE a;"),
            at("20260101_000100", "CREATE TABLE b (id INTEGER);", "DROP TABLE b;"),
        ];
        let (migration, _) = squash(&migrations, &opts(), &now()).unwrap();
        let b_pos = migration.down_sql.find("DROP TABLE b").unwrap();
        let a_pos = migration.down_sql.find("DROP TABLE a").unwrap();
        assert!(b_pos < a_pos);
    }

    #[test]
    fn empty_result_after_cancellation_is_an_error() {
        let migrations = vec![
            at("20260101_000000", "CREATE TABLE temp (id INTEGER);", ""),
            at("20260101_000100", "DROP TABLE temp;", ""),
        ];
        let err = squash(&migrations, &opts(), &now()).unwrap_err();
        assert!(matches!(err, SquashError::EmptyResult));
    }

    #[test]
    fn range_filter_excludes_migrations_outside_bounds() {
        let migrations = vec![
            at("20260101_000000", "CREATE TABLE a (id INTEGER);", ""),
            at("20260102_000000", "CREATE TABLE b (id INTEGER);", ""),
            at("20260103_000000", "CREATE TABLE c (id INTEGER);", ""),
        ];
        let options = SquashOptions {
            from_id: Some("20260102_000000".to_string()),
            to_id: Some("20260103_000000".to_string()),
            output_name: "optimized".to_string(),
        };
        let (migration, report) = squash(&migrations, &options, &now()).unwrap();
        assert_eq!(report.original_count, 2);
        assert!(!migration.up_sql.contains("TABLE a"));
    }
}
