//! Tokenizes the `@modifier` tail of a field line, respecting parenthesized
//! arguments (which may themselves contain commas, spaces, and quotes).

/// A single parsed modifier token, e.g. `@default("now()")`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifierToken {
    /// The modifier name, without the leading `@`, e.g. `"default"`.
    pub name: String,
    /// The raw text inside the parentheses, if any (not further unquoted).
    pub arg: Option<String>,
}

/// Splits the modifier tail of a field line into tokens.
///
/// Malformed fragments (stray text not starting with `@`) are folded into
/// a token with an empty name so the caller can report `invalid-modifier`
/// without panicking on unexpected input.
pub fn tokenize(rest: &str) -> Vec<ModifierToken> {
    let chars: Vec<char> = rest.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        if chars[i].is_whitespace() {
            i += 1;
            continue;
        }
        if chars[i] != '@' {
            let start = i;
            while i < chars.len() && !chars[i].is_whitespace() {
                i += 1;
            }
            tokens.push(ModifierToken {
                name: String::new(),
                arg: Some(chars[start..i].iter().collect()),
            });
            continue;
        }

        i += 1; // consume '@'
        let name_start = i;
        while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
            i += 1;
        }
        let name: String = chars[name_start..i].iter().collect();

        let arg = if i < chars.len() && chars[i] == '(' {
            let arg_start = i + 1;
            i += 1;
            let mut depth = 1;
            let mut in_quote: Option<char> = None;
            while i < chars.len() && depth > 0 {
                let c = chars[i];
                if let Some(q) = in_quote {
                    if c == q {
                        in_quote = None;
                    }
                } else if c == '\'' || c == '"' {
                    in_quote = Some(c);
                } else if c == '(' {
                    depth += 1;
                } else if c == ')' {
                    depth -= 1;
                }
                i += 1;
            }
            let arg_end = if depth == 0 { i - 1 } else { i };
            Some(chars[arg_start..arg_end].iter().collect())
        } else {
            None
        };

        tokens.push(ModifierToken { name, arg });
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_flags_without_args() {
        let tokens = tokenize("@id @unique @autoincrement");
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].name, "id");
        assert_eq!(tokens[0].arg, None);
    }

    #[test]
    fn tokenizes_arg_with_nested_parens_and_commas() {
        let tokens = tokenize(r#"@default("now()") @precision(10,2)"#);
        assert_eq!(tokens[0].name, "default");
        assert_eq!(tokens[0].arg.as_deref(), Some(r#""now()""#));
        assert_eq!(tokens[1].name, "precision");
        assert_eq!(tokens[1].arg.as_deref(), Some("10,2"));
    }

    #[test]
    fn tokenizes_string_arg_with_space_and_comma() {
        let tokens = tokenize(r#"@map("column, name")"#);
        assert_eq!(tokens[0].arg.as_deref(), Some(r#""column, name""#));
    }
}
