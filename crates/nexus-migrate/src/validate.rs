//! SQL safety validation of spec §4.6.4: errors block execution, warnings
//! are a courtesy reminder only.

use nexus_connector::Migration;
use regex::Regex;
use std::sync::OnceLock;

/// The severity of a single [`Finding`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Blocks execution.
    Error,
    /// Printed as a reminder; does not block execution.
    Warning,
}

/// A single validation finding against a migration's SQL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    /// Whether this finding blocks execution.
    pub severity: Severity,
    /// Human-readable description.
    pub message: String,
}

/// The aggregated result of validating a migration's up-SQL (and down-SQL,
/// if non-empty).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    /// Every finding, in discovery order.
    pub findings: Vec<Finding>,
}

impl ValidationResult {
    /// `true` if any finding is an [`Severity::Error`].
    pub fn has_errors(&self) -> bool {
        self.findings.iter().any(|f| f.severity == Severity::Error)
    }

    /// `true` if any finding is a [`Severity::Warning`].
    pub fn has_warnings(&self) -> bool {
        self.findings.iter().any(|f| f.severity == Severity::Warning)
    }

    /// Every error-severity finding.
    pub fn errors(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.severity == Severity::Error)
    }

    /// Every warning-severity finding.
    pub fn warnings(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.severity == Severity::Warning)
    }
}

/// Validates a migration's up-SQL, and its down-SQL if non-empty, per spec
/// §4.6.4.
pub fn validate(migration: &Migration) -> ValidationResult {
    let mut findings = Vec::new();

    if migration.up_sql.trim().is_empty() {
        findings.push(error("up-SQL is empty"));
        return ValidationResult { findings };
    }

    check_sql(&migration.up_sql, &mut findings);
    if !migration.down_sql.trim().is_empty() {
        check_sql(&migration.down_sql, &mut findings);
    }

    ValidationResult { findings }
}

fn check_sql(sql: &str, findings: &mut Vec<Finding>) {
    if let Some(msg) = unbalanced_quotes(sql) {
        findings.push(error(msg));
    }
    if let Some(msg) = unbalanced_parens(sql) {
        findings.push(error(msg));
    }
    check_warnings(sql, findings);
}

/// Scans for unterminated single- or double-quoted strings, treating a
/// doubled quote (`''`, `""`) as an escaped literal quote rather than a
/// terminator.
fn unbalanced_quotes(sql: &str) -> Option<String> {
    let mut chars = sql.chars().peekable();
    let mut in_single = false;
    let mut in_double = false;

    while let Some(c) = chars.next() {
        match c {
            '\'' if !in_double => {
                if in_single && chars.peek() == Some(&'\'') {
                    chars.next();
                    continue;
                }
                in_single = !in_single;
            }
            '"' if !in_single => {
                if in_double && chars.peek() == Some(&'"') {
                    chars.next();
                    continue;
                }
                in_double = !in_double;
            }
            _ => {}
        }
    }

    if in_single {
        Some("unbalanced single quote".to_string())
    } else if in_double {
        Some("unbalanced double quote".to_string())
    } else {
        None
    }
}

/// Scans for unbalanced parentheses, ignoring anything inside a string
/// literal.
fn unbalanced_parens(sql: &str) -> Option<String> {
    let mut depth: i64 = 0;
    let mut in_single = false;
    let mut in_double = false;
    let mut chars = sql.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' if !in_double => {
                if in_single && chars.peek() == Some(&'\'') {
                    chars.next();
                    continue;
                }
                in_single = !in_single;
            }
            '"' if !in_single => {
                if in_double && chars.peek() == Some(&'"') {
                    chars.next();
                    continue;
                }
                in_double = !in_double;
            }
            '(' if !in_single && !in_double => depth += 1,
            ')' if !in_single && !in_double => depth -= 1,
            _ => {}
        }
        if depth < 0 {
            return Some("unbalanced parentheses: unexpected ')'".to_string());
        }
    }

    if depth != 0 {
        Some("unbalanced parentheses".to_string())
    } else {
        None
    }
}

fn check_warnings(sql: &str, findings: &mut Vec<Finding>) {
    if drop_database_re().is_match(sql) {
        findings.push(warning("contains DROP DATABASE"));
    }
    if drop_schema_re().is_match(sql) {
        findings.push(warning("contains DROP SCHEMA"));
    }
    if truncate_re().is_match(sql) {
        findings.push(warning("contains TRUNCATE TABLE"));
    }
    if drop_table_re().is_match(sql) {
        findings.push(warning("contains DROP TABLE"));
    }
    for m in delete_re().captures_iter(sql) {
        let rest = &sql[m.get(0).unwrap().end()..];
        if !has_where_before_next_statement(rest) {
            findings.push(warning(format!("DELETE FROM {} has no WHERE clause", &m[1])));
        }
    }
    for m in update_re().captures_iter(sql) {
        let rest = &sql[m.get(0).unwrap().end()..];
        if !has_where_before_next_statement(rest) {
            findings.push(warning(format!("UPDATE {} has no WHERE clause", &m[1])));
        }
    }
}

/// `true` if a `WHERE` keyword appears before the next statement
/// terminator (`;`) or the end of the string.
fn has_where_before_next_statement(rest: &str) -> bool {
    let boundary = rest.find(';').unwrap_or(rest.len());
    let clause = &rest[..boundary];
    clause.to_ascii_uppercase().contains("WHERE")
}

fn error(message: impl Into<String>) -> Finding {
    Finding {
        severity: Severity::Error,
        message: message.into(),
    }
}

fn warning(message: impl Into<String>) -> Finding {
    Finding {
        severity: Severity::Warning,
        message: message.into(),
    }
}

fn drop_database_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bDROP\s+DATABASE\b").unwrap())
}

fn drop_schema_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bDROP\s+SCHEMA\b").unwrap())
}

fn truncate_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bTRUNCATE\s+TABLE\b").unwrap())
}

fn drop_table_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bDROP\s+TABLE\b").unwrap())
}

fn delete_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?i)\bDELETE\s+FROM\s+["`]?([A-Za-z_][A-Za-z0-9_]*)["`]?"#).unwrap())
}

fn update_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?i)\bUPDATE\s+["`]?([A-Za-z_][A-Za-z0-9_]*)["`]?\s+SET\b"#).unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn migration(up: &str) -> Migration {
        Migration::new("20260101_000000", "m", up, "")
    }

    #[test]
    fn empty_up_sql_is_an_error() {
        let result = validate(&migration(""));
        assert!(result.has_errors());
    }

    #[test]
    fn balanced_sql_has_no_findings() {
        let result = validate(&migration("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT DEFAULT 'it''s fine');"));
        assert!(!result.has_errors());
        assert!(!result.has_warnings());
    }

    #[test]
    fn unterminated_quote_is_an_error() {
        let result = validate(&migration("INSERT INTO t VALUES ('unterminated);"));
        assert!(result.has_errors());
    }

    #[test]
    fn unbalanced_parens_is_an_error() {
        let result = validate(&migration("CREATE TABLE t (id INTEGER;"));
        assert!(result.has_errors());
    }

    #[test]
    fn delete_without_where_warns() {
        let result = validate(&migration("DELETE FROM users;"));
        assert!(!result.has_errors());
        assert!(result.has_warnings());
        assert!(result.warnings().next().unwrap().message.contains("DELETE FROM users"));
    }

    #[test]
    fn delete_with_where_does_not_warn() {
        let result = validate(&migration("DELETE FROM users WHERE id = 1;"));
        assert!(!result.has_warnings());
    }

    #[test]
    fn drop_table_is_a_courtesy_warning_not_an_error() {
        let result = validate(&migration("DROP TABLE users;"));
        assert!(!result.has_errors());
        assert!(result.has_warnings());
    }
}
