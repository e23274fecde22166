//! Parses the inner text of `@default(...)` into a [`DefaultValue`].

use nexus_schema::DefaultValue;

/// Parses a default literal or expression per spec §4.2's "Defaults" rules.
///
/// - Single/double-quoted strings become literal strings.
/// - `true`/`false` become booleans.
/// - Integer and floating literals parse as such.
/// - `now()` / `current_timestamp` becomes the symbolic expression `NOW()`.
/// - `uuid()` / `gen_random_uuid()` becomes `UUID()`.
/// - Any other `name()` call is kept verbatim as an expression.
pub fn parse_default(text: &str) -> DefaultValue {
    let trimmed = text.trim();

    if let Some(inner) = strip_matching_quotes(trimmed, '\'') {
        return DefaultValue::String(inner.to_string());
    }
    if let Some(inner) = strip_matching_quotes(trimmed, '"') {
        return DefaultValue::String(inner.to_string());
    }

    match trimmed.to_ascii_lowercase().as_str() {
        "true" => return DefaultValue::Bool(true),
        "false" => return DefaultValue::Bool(false),
        "now()" | "current_timestamp" => return DefaultValue::Expression("NOW()".to_string()),
        "uuid()" | "gen_random_uuid()" => return DefaultValue::Expression("UUID()".to_string()),
        _ => {}
    }

    if let Ok(i) = trimmed.parse::<i64>() {
        return DefaultValue::Int(i);
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        return DefaultValue::Float(f);
    }

    // Any other bare `name()` call (or otherwise-unrecognized text) is kept
    // verbatim as a symbolic expression.
    DefaultValue::Expression(trimmed.to_string())
}

/// If `text` is fully wrapped in a matching pair of `quote`, returns the
/// inner content; otherwise `None`.
fn strip_matching_quotes(text: &str, quote: char) -> Option<&str> {
    let bytes = text.as_bytes();
    if bytes.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
        Some(&text[quote.len_utf8()..text.len() - quote.len_utf8()])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_string_literal() {
        assert_eq!(parse_default("'hello'"), DefaultValue::String("hello".into()));
        assert_eq!(parse_default("\"hello\""), DefaultValue::String("hello".into()));
    }

    #[test]
    fn parses_booleans() {
        assert_eq!(parse_default("true"), DefaultValue::Bool(true));
        assert_eq!(parse_default("false"), DefaultValue::Bool(false));
    }

    #[test]
    fn parses_numbers() {
        assert_eq!(parse_default("42"), DefaultValue::Int(42));
        assert_eq!(parse_default("3.14"), DefaultValue::Float(3.14));
    }

    #[test]
    fn parses_symbolic_now_and_uuid() {
        assert_eq!(parse_default("now()"), DefaultValue::Expression("NOW()".into()));
        assert_eq!(
            parse_default("current_timestamp"),
            DefaultValue::Expression("NOW()".into())
        );
        assert_eq!(parse_default("uuid()"), DefaultValue::Expression("UUID()".into()));
        assert_eq!(
            parse_default("gen_random_uuid()"),
            DefaultValue::Expression("UUID()".into())
        );
    }

    #[test]
    fn keeps_other_calls_verbatim() {
        assert_eq!(
            parse_default("nextval('users_id_seq')"),
            DefaultValue::Expression("nextval('users_id_seq')".into())
        );
    }
}
