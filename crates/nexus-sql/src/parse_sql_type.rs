//! Resolves spec §9's open question: canonicalizing a dialect-reported SQL
//! type string into a [`CanonicalType`] so the diff engine never compares
//! dialect type strings textually.
//!
//! Each dialect reports type names differently for the same semantic type
//! (`character varying(255)` vs `VARCHAR(255)` vs bare `TEXT`), and
//! introspection strings don't always match what `type_mapping` would have
//! produced verbatim (Postgres reports `integer`, not `SERIAL`, even for a
//! serial column -- the auto-increment-ness is carried in `default_expr`
//! instead, see `ColumnInfo`). This module normalizes both directions
//! through the same parser so a field's semantic type and an introspected
//! column's reported type compare on equal footing.

use nexus_connector::{CanonicalType, Dialect};
use regex::Regex;
use std::sync::OnceLock;

fn sized_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([a-zA-Z_ ]+)\s*(?:\(([0-9]+)(?:\s*,\s*([0-9]+))?\))?$").unwrap())
}

/// Parses a dialect-reported (or dialect-produced) SQL type string into a
/// [`CanonicalType`], using `dialect` to disambiguate strings that mean
/// different things in different dialects (e.g. `TEXT` is a storage class
/// in SQLite but a distinct unbounded type in Postgres/MySQL -- both map to
/// [`CanonicalType::Text`] here, since neither carries a size).
pub fn parse_sql_type(dialect: Dialect, raw: &str) -> CanonicalType {
    let trimmed = raw.trim();
    let Some(caps) = sized_re().captures(trimmed) else {
        return CanonicalType::Other(trimmed.to_ascii_uppercase());
    };
    let base = caps
        .get(1)
        .map(|m| m.as_str().trim().to_ascii_uppercase())
        .unwrap_or_default();
    let size: Option<u32> = caps.get(2).and_then(|m| m.as_str().parse().ok());
    let scale: Option<u32> = caps.get(3).and_then(|m| m.as_str().parse().ok());

    match (dialect, base.as_str()) {
        (_, "INTEGER") | (_, "INT") | (_, "INT4") | (_, "SERIAL") => CanonicalType::Integer,
        (_, "BIGINT") | (_, "BIGSERIAL") | (_, "INT8") => CanonicalType::BigInteger,
        (_, "TINYINT") if size == Some(1) => CanonicalType::Boolean,
        (_, "BOOLEAN") | (_, "BOOL") => CanonicalType::Boolean,
        (_, "VARCHAR") | (_, "CHARACTER VARYING") | (_, "NVARCHAR") => CanonicalType::Varchar(size),
        (_, "CHAR") if dialect == Dialect::Mysql && size == Some(36) => CanonicalType::Uuid,
        (_, "TEXT") | (_, "CLOB") | (_, "LONGTEXT") | (_, "MEDIUMTEXT") | (_, "TINYTEXT") => {
            CanonicalType::Text
        }
        (_, "DOUBLE") | (_, "DOUBLE PRECISION") | (_, "FLOAT8") | (_, "REAL") if dialect != Dialect::Sqlite => {
            CanonicalType::Double
        }
        (Dialect::Sqlite, "REAL") => CanonicalType::Double,
        (_, "NUMERIC") | (_, "DECIMAL") => CanonicalType::Numeric(size, scale),
        (_, "TIMESTAMP") | (_, "TIMESTAMPTZ") | (_, "TIMESTAMP WITH TIME ZONE")
        | (_, "TIMESTAMP WITHOUT TIME ZONE") | (_, "DATETIME") => CanonicalType::Timestamp,
        (_, "DATE") => CanonicalType::Date,
        (_, "TIME") => CanonicalType::Time,
        (_, "JSON") | (_, "JSONB") => CanonicalType::Json,
        (_, "BYTEA") | (_, "BLOB") | (_, "LONGBLOB") | (_, "VARBINARY") => CanonicalType::Blob,
        (_, "UUID") => CanonicalType::Uuid,
        _ => CanonicalType::Other(base),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn postgres_character_varying_matches_varchar() {
        assert_eq!(
            parse_sql_type(Dialect::Postgres, "character varying(255)"),
            parse_sql_type(Dialect::Postgres, "VARCHAR(255)")
        );
    }

    #[test]
    fn sqlite_real_is_double() {
        assert_eq!(parse_sql_type(Dialect::Sqlite, "REAL"), CanonicalType::Double);
    }

    #[test]
    fn mysql_char36_is_uuid() {
        assert_eq!(parse_sql_type(Dialect::Mysql, "char(36)"), CanonicalType::Uuid);
    }

    #[test]
    fn unknown_type_is_opaque_other() {
        assert_eq!(
            parse_sql_type(Dialect::Postgres, "tsvector"),
            CanonicalType::Other("TSVECTOR".to_string())
        );
    }

    #[test]
    fn numeric_precision_and_scale_preserved() {
        assert_eq!(
            parse_sql_type(Dialect::Postgres, "numeric(10,2)"),
            CanonicalType::Numeric(Some(10), Some(2))
        );
    }
}
