//! Statement-level tokenization (spec §4.5 step 2): strips comments, then
//! splits a SQL body into individual statements on `;` outside of quoted
//! strings.
//!
//! This is deliberately not a SQL parser -- it knows about `--` and `/* */`
//! comments and single/double-quoted strings, nothing else.

/// Strips `--` line comments and `/* ... */` block comments from `sql`,
/// respecting single- and double-quoted strings so a quoted `--` or `/*`
/// is left alone.
fn strip_comments(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut chars = sql.char_indices().peekable();
    let mut in_single = false;
    let mut in_double = false;

    while let Some((_, c)) = chars.next() {
        if in_single {
            out.push(c);
            if c == '\'' {
                in_single = false;
            }
            continue;
        }
        if in_double {
            out.push(c);
            if c == '"' {
                in_double = false;
            }
            continue;
        }
        match c {
            '\'' => {
                in_single = true;
                out.push(c);
            }
            '"' => {
                in_double = true;
                out.push(c);
            }
            '-' if chars.peek().map(|(_, n)| *n) == Some('-') => {
                chars.next();
                for (_, n) in chars.by_ref() {
                    if n == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek().map(|(_, n)| *n) == Some('*') => {
                chars.next();
                let mut prev = '\0';
                for (_, n) in chars.by_ref() {
                    if prev == '*' && n == '/' {
                        break;
                    }
                    prev = n;
                }
            }
            _ => out.push(c),
        }
    }
    out
}

/// Splits `sql` into trimmed, non-empty statements, breaking on `;` outside
/// of single- or double-quoted strings. Comments are stripped first.
pub fn split_statements(sql: &str) -> Vec<String> {
    let stripped = strip_comments(sql);
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut in_single = false;
    let mut in_double = false;

    for c in stripped.chars() {
        match c {
            '\'' if !in_double => {
                in_single = !in_single;
                current.push(c);
            }
            '"' if !in_single => {
                in_double = !in_double;
                current.push(c);
            }
            ';' if !in_single && !in_double => {
                statements.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    if !current.trim().is_empty() {
        statements.push(current.trim().to_string());
    }
    statements.retain(|s| !s.is_empty());
    statements
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn splits_on_semicolons() {
        let stmts = split_statements("CREATE TABLE a (id INTEGER); CREATE TABLE b (id INTEGER);");
        assert_eq!(stmts, vec!["CREATE TABLE a (id INTEGER)", "CREATE TABLE b (id INTEGER)"]);
    }

    #[test]
    fn ignores_semicolons_inside_quotes() {
        let stmts = split_statements("INSERT INTO a VALUES ('a;b'); SELECT 1;");
        assert_eq!(stmts, vec!["INSERT INTO a VALUES ('a;b')", "SELECT 1"]);
    }

    #[test]
    fn strips_line_comments() {
        let stmts = split_statements("CREATE TABLE a (id INTEGER); -- trailing note\nDROP TABLE a;");
        assert_eq!(stmts, vec!["CREATE TABLE a (id INTEGER)", "DROP TABLE a"]);
    }

    #[test]
    fn strips_block_comments() {
        let stmts = split_statements("CREATE /* temp */ TABLE a (id INTEGER);");
        assert_eq!(stmts, vec!["CREATE  TABLE a (id INTEGER)"]);
    }

    #[test]
    fn handles_trailing_statement_without_final_semicolon() {
        let stmts = split_statements("CREATE TABLE a (id INTEGER)");
        assert_eq!(stmts, vec!["CREATE TABLE a (id INTEGER)"]);
    }

    #[test]
    fn empty_body_yields_no_statements() {
        assert!(split_statements("   \n  ").is_empty());
    }
}
