//! Minimal bound-parameter execution, added to [`crate::SchemaConnector`]
//! so `nexus-migrate` can manage its own history/lock tables and run a
//! migration's up/down SQL bodies without depending on any one driver.
//!
//! This is deliberately not a query builder (spec §1 Non-goals): three
//! variants, no expression tree, no row-to-struct mapping. It exists only
//! for the engine's own bookkeeping SQL, which touches exactly two tables
//! with a handful of columns each.

/// A bound parameter for a [`crate::SchemaConnector`] statement.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    /// A text value, including ISO-8601 timestamps (spec §4.6.1's
    /// `applied_at`/`locked_at`/`expires_at` columns are declared as
    /// `TEXT`/`VARCHAR` -- not a native timestamp type -- by the PG, MySQL,
    /// and SQLite DDL in `history.rs`/`lock.rs`, specifically so an RFC
    /// 3339 string binds and reads back without a driver-side type
    /// mismatch on any of the three dialects).
    Text(String),
    /// An integer value.
    Int(i64),
    /// SQL `NULL`.
    Null,
}

impl From<&str> for SqlParam {
    fn from(s: &str) -> Self {
        SqlParam::Text(s.to_string())
    }
}

impl From<String> for SqlParam {
    fn from(s: String) -> Self {
        SqlParam::Text(s)
    }
}

impl From<i64> for SqlParam {
    fn from(i: i64) -> Self {
        SqlParam::Int(i)
    }
}

impl From<chrono::DateTime<chrono::Utc>> for SqlParam {
    fn from(dt: chrono::DateTime<chrono::Utc>) -> Self {
        SqlParam::Text(dt.to_rfc3339())
    }
}

/// A single returned column value.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// A text value, or a dialect's native rendering of a timestamp.
    Text(String),
    /// An integer value.
    Int(i64),
    /// SQL `NULL`.
    Null,
}

impl SqlValue {
    /// Borrows the text value, if this is [`SqlValue::Text`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SqlValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// The integer value, if this is [`SqlValue::Int`].
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SqlValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Parses this value as an RFC 3339 timestamp, per the convention that
    /// every timestamp column in the engine's own tables is written as
    /// text by [`SqlParam::from`].
    pub fn as_timestamp(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.as_str()
            .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&chrono::Utc))
    }
}

/// One returned row, as an ordered list of column values.
pub type SqlRow = Vec<SqlValue>;
