//! Canonicalization of dialect-reported SQL type strings.
//!
//! Resolves the open question of spec §9 ("Dialect type comparison"): rather
//! than comparing `"character varying(255)"` against `"VARCHAR(255)"`
//! textually, each dialect parses its own introspected strings (and its own
//! semantic-to-SQL mapping) into this common, size-aware enum. The diff
//! engine compares `CanonicalType` values, never raw strings.

use serde::{Deserialize, Serialize};

/// A dialect-independent normal form for a SQL column type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CanonicalType {
    Integer,
    BigInteger,
    Varchar(Option<u32>),
    Text,
    Boolean,
    Double,
    Numeric(Option<u32>, Option<u32>),
    Timestamp,
    Date,
    Time,
    Json,
    Blob,
    Uuid,
    /// A type string no dialect-specific rule recognized; compared as an
    /// opaque, case-normalized string so unknown-but-identical types still
    /// compare equal.
    Other(String),
}
