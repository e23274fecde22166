//! Classifies a single DDL statement into a cancellation key (spec §4.5
//! step 4), using coarse case-insensitive regex extraction of the unquoted
//! identifier -- not a SQL parser. Identifier casing is normalized to
//! upper-case so `users` and `Users` cancel against each other.

use regex::Regex;
use std::sync::OnceLock;

/// The key two statements must share to be eligible for cancellation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Table(String),
    Column(String, String),
    Index(String),
}

/// What kind of DDL a statement was recognized as, paired with its
/// cancellation key. `Other` statements never participate in cancellation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Kind {
    CreateTable(Key),
    DropTable(Key),
    AddColumn(Key),
    DropColumn(Key),
    CreateIndex(Key),
    DropIndex(Key),
    Other,
}

fn ident() -> &'static str {
    r#"["'`]?([A-Za-z_][A-Za-z0-9_]*)["'`]?"#
}

macro_rules! regex_fn {
    ($name:ident, $pattern:expr) => {
        fn $name() -> &'static Regex {
            static RE: OnceLock<Regex> = OnceLock::new();
            RE.get_or_init(|| Regex::new(&$pattern).unwrap())
        }
    };
}

regex_fn!(create_table_re, format!(r"(?i)^\s*CREATE\s+TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?{}", ident()));
regex_fn!(drop_table_re, format!(r"(?i)^\s*DROP\s+TABLE\s+(?:IF\s+EXISTS\s+)?{}", ident()));
regex_fn!(
    add_column_re,
    format!(r"(?i)^\s*ALTER\s+TABLE\s+{}\s+ADD\s+COLUMN\s+{}", ident(), ident())
);
regex_fn!(
    drop_column_re,
    format!(r"(?i)^\s*ALTER\s+TABLE\s+{}\s+DROP\s+COLUMN\s+{}", ident(), ident())
);
regex_fn!(create_index_re, format!(r"(?i)^\s*CREATE\s+(?:UNIQUE\s+)?INDEX\s+{}", ident()));
regex_fn!(drop_index_re, format!(r"(?i)^\s*DROP\s+INDEX\s+{}", ident()));

/// Classifies `statement`, trying each DDL shape in turn. The first match
/// wins; a statement matching none of them is `Kind::Other`.
pub fn classify(statement: &str) -> Kind {
    if let Some(caps) = add_column_re().captures(statement) {
        return Kind::AddColumn(Key::Column(upper(&caps[1]), upper(&caps[2])));
    }
    if let Some(caps) = drop_column_re().captures(statement) {
        return Kind::DropColumn(Key::Column(upper(&caps[1]), upper(&caps[2])));
    }
    if let Some(caps) = create_table_re().captures(statement) {
        return Kind::CreateTable(Key::Table(upper(&caps[1])));
    }
    if let Some(caps) = drop_table_re().captures(statement) {
        return Kind::DropTable(Key::Table(upper(&caps[1])));
    }
    if let Some(caps) = create_index_re().captures(statement) {
        return Kind::CreateIndex(Key::Index(upper(&caps[1])));
    }
    if let Some(caps) = drop_index_re().captures(statement) {
        return Kind::DropIndex(Key::Index(upper(&caps[1])));
    }
    Kind::Other
}

fn upper(s: &str) -> String {
    s.to_ascii_uppercase()
}
