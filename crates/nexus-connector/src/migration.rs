//! The [`Migration`] record and its on-disk file format.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

/// An immutable, identified pair of forward and reverse SQL bundles.
///
/// `id` is a `YYYYMMDD_HHMMSS` timestamp prefix; ordering across migrations
/// is lexicographic on `id`. `down_sql` may be empty for an irreversible
/// migration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    /// Timestamp identifier, `YYYYMMDD_HHMMSS`.
    pub id: String,
    /// Human-readable name, e.g. `"add_users_table"`.
    pub name: String,
    /// Forward SQL.
    pub up_sql: String,
    /// Reverse SQL; empty if this migration cannot be rolled back.
    pub down_sql: String,
    /// Hex-encoded SHA-256 of `up_sql`.
    pub checksum: String,
}

/// The literal marker separating the up-body from the down-body in a
/// migration file, per spec §4.6.1.
const DOWN_MARKER: &str = "-- DOWN";
/// The optional leading marker for the up-body.
const UP_MARKER: &str = "-- UP";

impl Migration {
    /// Builds a migration from its id, name, and SQL bodies, computing the
    /// checksum from `up_sql`.
    pub fn new(id: impl Into<String>, name: impl Into<String>, up_sql: impl Into<String>, down_sql: impl Into<String>) -> Self {
        let up_sql = up_sql.into();
        let checksum = checksum_of(&up_sql);
        Self {
            id: id.into(),
            name: name.into(),
            up_sql,
            down_sql: down_sql.into(),
            checksum,
        }
    }

    /// Returns `true` if this migration has no down-SQL and cannot be
    /// rolled back.
    pub fn is_irreversible(&self) -> bool {
        self.down_sql.trim().is_empty()
    }

    /// The on-disk filename for this migration: `<id>_<name>.sql`.
    pub fn filename(&self) -> String {
        format!("{}_{}.sql", self.id, self.name)
    }

    /// Renders the `-- UP` / `-- DOWN` file format of spec §4.6.1.
    pub fn to_file_contents(&self) -> String {
        format!(
            "{UP_MARKER}\n{}\n\n{DOWN_MARKER}\n{}\n",
            self.up_sql.trim(),
            self.down_sql.trim()
        )
    }

    /// Parses a migration file's contents, splitting on the literal
    /// `-- DOWN` marker. Everything before is stripped of a leading
    /// `-- UP` and trimmed; everything after is trimmed.
    ///
    /// `id` and `name` come from the caller (parsed from the filename),
    /// since the file body carries no identity of its own.
    pub fn parse_file(id: impl Into<String>, name: impl Into<String>, contents: &str) -> Option<Self> {
        let (up_part, down_part) = contents.split_once(DOWN_MARKER)?;
        let up_sql = up_part
            .trim()
            .strip_prefix(UP_MARKER)
            .unwrap_or(up_part)
            .trim()
            .to_string();
        let down_sql = down_part.trim().to_string();
        Some(Self::new(id, name, up_sql, down_sql))
    }

    /// Parses a migration filename of the form `<date>_<time>_<name>.sql`
    /// into its `(id, name)` parts. The id is the first two
    /// underscore-separated tokens joined back with `_`; the remainder
    /// (minus the `.sql` extension) is the name.
    ///
    /// Returns `None` if the filename does not have at least three
    /// underscore-separated segments or lacks a `.sql` extension, per the
    /// spec's requirement to reject non-matching names rather than
    /// silently absorb them.
    pub fn parse_filename(filename: &str) -> Option<(String, String)> {
        let stem = filename.strip_suffix(".sql")?;
        let mut parts = stem.splitn(3, '_');
        let date = parts.next()?;
        let time = parts.next()?;
        let name = parts.next()?;
        if date.len() != 8 || !date.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        if time.len() != 6 || !time.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        if name.is_empty() {
            return None;
        }
        Some((format!("{date}_{time}"), name.to_string()))
    }
}

/// Hex-encoded SHA-256 of `up_sql`.
pub fn checksum_of(up_sql: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(up_sql.as_bytes());
    hex::encode(hasher.finalize())
}

/// Formats `now` as a `YYYYMMDD_HHMMSS` migration id, the timestamp prefix
/// every fresh migration (whether from `migrate new`, diff generation, or
/// squash) is allocated. Takes an explicit instant rather than sampling the
/// clock itself so callers stay deterministic and testable.
pub fn format_id(now: &DateTime<Utc>) -> String {
    now.format("%Y%m%d_%H%M%S").to_string()
}

#[cfg(test)]
mod format_id_tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formats_utc_instant() {
        let dt = Utc.with_ymd_and_hms(2026, 1, 15, 9, 30, 0).unwrap();
        assert_eq!(format_id(&dt), "20260115_093000");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn round_trips_through_file_format() {
        let m = Migration::new(
            "20260101_120000",
            "create_users",
            "CREATE TABLE users (id INTEGER PRIMARY KEY);",
            "DROP TABLE users;",
        );
        let contents = m.to_file_contents();
        let parsed = Migration::parse_file(m.id.clone(), m.name.clone(), &contents).unwrap();
        assert_eq!(parsed.up_sql, m.up_sql);
        assert_eq!(parsed.down_sql, m.down_sql);
        assert_eq!(parsed.checksum, m.checksum);
    }

    #[test]
    fn parses_irreversible_migration() {
        let contents = "-- UP\nCREATE TABLE x (id INTEGER);\n\n-- DOWN\n";
        let parsed = Migration::parse_file("20260101_000000", "x", contents).unwrap();
        assert!(parsed.is_irreversible());
    }

    #[test]
    fn parses_filename_id_and_name() {
        let (id, name) = Migration::parse_filename("20260115_093000_add_users_table.sql").unwrap();
        assert_eq!(id, "20260115_093000");
        assert_eq!(name, "add_users_table");
    }

    #[test]
    fn rejects_malformed_filename() {
        assert!(Migration::parse_filename("not_a_migration.sql").is_none());
        assert!(Migration::parse_filename("20260115_badname.sql").is_none());
        assert!(Migration::parse_filename("20260115_093000_.sql").is_none());
    }

    #[test]
    fn filename_round_trips() {
        let m = Migration::new("20260115_093000", "add_users", "SELECT 1;", "");
        let filename = m.filename();
        let (id, name) = Migration::parse_filename(&filename).unwrap();
        assert_eq!(id, m.id);
        assert_eq!(name, m.name);
    }
}
