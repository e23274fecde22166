//! On-disk migration file layout (spec §4.6.1, §6): `migrations/<ID>_<name>.sql`,
//! `-- UP` / `-- DOWN` sections.

use std::fs;
use std::path::{Path, PathBuf};

use nexus_connector::Migration;
use tracing::debug;

use crate::error::{EngineError, Result};

/// Loads every migration file in `dir`, sorted by id ascending.
///
/// Non-`.sql` files are ignored. A `.sql` file whose name does not match
/// `<date>_<time>_<name>.sql` is rejected outright (spec §9,
/// "Identifier collisions") rather than silently skipped, since a
/// malformed file in the migrations directory is far more likely to be
/// operator error than an intentional non-migration artifact.
pub fn load_from_dir(dir: &Path) -> Result<Vec<Migration>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut migrations = Vec::new();
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("sql"))
        .collect();
    entries.sort();

    for path in entries {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| EngineError::InvalidFormat(path.display().to_string()))?;
        let (id, name) = Migration::parse_filename(filename)
            .ok_or_else(|| EngineError::InvalidFormat(format!("'{filename}' does not match <date>_<time>_<name>.sql")))?;
        let contents = fs::read_to_string(&path)?;
        let migration = Migration::parse_file(id, name, &contents)
            .ok_or_else(|| EngineError::InvalidFormat(format!("'{filename}' is missing a '-- DOWN' marker")))?;
        migrations.push(migration);
    }

    migrations.sort_by(|a, b| a.id.cmp(&b.id));
    debug!(count = migrations.len(), ?dir, "loaded migrations from directory");
    Ok(migrations)
}

/// Writes `migration` to `dir/<id>_<name>.sql`, creating `dir` if needed.
pub fn save_migration(dir: &Path, migration: &Migration) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(migration.filename());
    fs::write(&path, migration.to_file_contents())?;
    Ok(path)
}

/// Moves every migration file named in `ids` aside into
/// `dir/.squashed_backup/`, per spec §6's backup directory, used by
/// `migrate squash` unless `--keep-originals` is passed.
pub fn backup_originals(dir: &Path, migrations: &[Migration]) -> Result<PathBuf> {
    let backup_dir = dir.join(".squashed_backup");
    fs::create_dir_all(&backup_dir)?;
    for migration in migrations {
        let from = dir.join(migration.filename());
        let to = backup_dir.join(migration.filename());
        if from.exists() {
            fs::rename(&from, &to)?;
        }
    }
    Ok(backup_dir)
}

/// Deletes every migration file named in `ids` from `dir` outright (used
/// by `migrate squash` when `--keep-originals` is not passed and backup is
/// not requested either -- currently unused by the CLI, which always
/// backs up, but kept so callers that want hard deletion don't need to
/// reimplement file removal).
pub fn delete_originals(dir: &Path, migrations: &[Migration]) -> Result<()> {
    for migration in migrations {
        let path = dir.join(migration.filename());
        if path.exists() {
            fs::remove_file(&path)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nexus_connector::Migration;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn round_trips_save_and_load() {
        let dir = tempdir().unwrap();
        let m = Migration::new("20260101_000000", "create_users", "CREATE TABLE users (id INTEGER);", "DROP TABLE users;");
        save_migration(dir.path(), &m).unwrap();

        let loaded = load_from_dir(dir.path()).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, m.id);
        assert_eq!(loaded[0].up_sql, m.up_sql);
    }

    #[test]
    fn loads_sorted_by_id() {
        let dir = tempdir().unwrap();
        save_migration(dir.path(), &Migration::new("20260103_000000", "c", "SELECT 1;", "")).unwrap();
        save_migration(dir.path(), &Migration::new("20260101_000000", "a", "SELECT 1;", "")).unwrap();
        save_migration(dir.path(), &Migration::new("20260102_000000", "b", "SELECT 1;", "")).unwrap();

        let loaded = load_from_dir(dir.path()).unwrap();
        let ids: Vec<&str> = loaded.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["20260101_000000", "20260102_000000", "20260103_000000"]);
    }

    #[test]
    fn rejects_malformed_filename() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("not_a_migration.sql"), "-- UP\nSELECT 1;\n\n-- DOWN\n").unwrap();
        let err = load_from_dir(dir.path()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidFormat(_)));
    }

    #[test]
    fn missing_directory_yields_empty_list() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("does_not_exist");
        assert!(load_from_dir(&missing).unwrap().is_empty());
    }

    #[test]
    fn backup_moves_files_aside() {
        let dir = tempdir().unwrap();
        let m = Migration::new("20260101_000000", "a", "SELECT 1;", "");
        save_migration(dir.path(), &m).unwrap();
        let backup_dir = backup_originals(dir.path(), &[m.clone()]).unwrap();
        assert!(!dir.path().join(m.filename()).exists());
        assert!(backup_dir.join(m.filename()).exists());
    }
}
