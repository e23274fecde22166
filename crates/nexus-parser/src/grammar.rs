//! The line-oriented DSL grammar: `model <PascalName> { <fieldName> <Type>... }`.

use nexus_schema::{Field, FieldType, Model, Relation, Schema, ValidationError};

use crate::default_value::parse_default;
use crate::diagnostic::{ErrorCode, ParseError};
use crate::levenshtein;
use crate::modifiers::{self, ModifierToken};

/// The result of parsing a schema source file: the (possibly partial)
/// schema plus every diagnostic accumulated along the way.
///
/// Parsing never stops at the first error (spec §4.2); a non-empty
/// `errors` list does not mean `schema` is empty, only that it should not
/// be trusted for downstream use until the caller has inspected the
/// diagnostics.
#[derive(Debug, Default)]
pub struct ParseOutcome {
    /// The schema built so far, including fields for which later modifiers
    /// were rejected.
    pub schema: Schema,
    /// Every diagnostic accumulated during parsing and the subsequent
    /// validation pass, in discovery order.
    pub errors: Vec<ParseError>,
}

impl ParseOutcome {
    /// `true` iff no diagnostics were recorded.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Parses `source` as a schema DSL file.
pub fn parse(source: &str) -> ParseOutcome {
    let mut schema = Schema::new();
    let mut errors = Vec::new();
    let mut current_model: Option<Model> = None;

    for (idx, raw_line) in source.lines().enumerate() {
        let line_no = idx + 1;
        let code_part = strip_comment(raw_line);
        let trimmed = code_part.trim();
        if trimmed.is_empty() {
            continue;
        }

        match current_model.as_mut() {
            None => match parse_model_header(trimmed) {
                Some(name) => current_model = Some(Model::new(name)),
                None => errors.push(
                    ParseError::new(
                        ErrorCode::InvalidModel,
                        format!("expected 'model <Name> {{', found: '{trimmed}'"),
                    )
                    .at_line(line_no, raw_line.to_string()),
                ),
            },
            Some(model) => {
                if trimmed == "}" {
                    schema.insert_model(current_model.take().unwrap());
                } else {
                    parse_field_line(trimmed, line_no, raw_line, model, &mut errors);
                }
            }
        }
    }

    if let Some(model) = current_model.take() {
        errors.push(ParseError::new(
            ErrorCode::InvalidModel,
            format!("model '{}' is missing a closing '}}'", model.name),
        ));
        schema.insert_model(model);
    }

    for verr in schema.validate().errors {
        let code = match &verr {
            ValidationError::MissingPrimaryKey { .. } => ErrorCode::MissingPrimaryKey,
            ValidationError::DuplicateField { .. } => ErrorCode::DuplicateField,
            ValidationError::DanglingRelation { .. } | ValidationError::UnknownIndexField { .. } => {
                ErrorCode::Validation
            }
        };
        errors.push(ParseError::new(code, verr.to_string()));
    }

    ParseOutcome { schema, errors }
}

/// Matches `model <PascalName> {` on a single (already comment-stripped,
/// trimmed) line.
fn parse_model_header(trimmed: &str) -> Option<String> {
    let rest = trimmed.strip_prefix("model")?;
    if rest == trimmed {
        return None;
    }
    let rest = rest.trim_start();
    let rest = rest.strip_suffix('{')?;
    let name = rest.trim();
    if name.is_empty() || !is_pascal_case(name) {
        return None;
    }
    Some(name.to_string())
}

/// How an identifier in type position resolved.
enum TypeResolution {
    /// One of the closed built-in types.
    Builtin(FieldType),
    /// An unrecognized PascalCase identifier, treated as a placeholder
    /// relation reference to the named model.
    Relation(String),
    /// An unresolvable type; a diagnostic has already been recorded.
    Invalid,
}

/// Resolves a type token, per spec §4.2: exact match against the closed
/// set; else a near-miss (Levenshtein distance <= 3) is reported as a typo
/// with a suggestion; else a PascalCase identifier is treated as a
/// relation reference; else it's a hard unknown-type error.
fn resolve_type(type_str: &str, line_no: usize, raw_line: &str, errors: &mut Vec<ParseError>) -> TypeResolution {
    if let Some(ft) = FieldType::parse(type_str) {
        return TypeResolution::Builtin(ft);
    }

    let candidates: Vec<&str> = FieldType::ALL.iter().map(|t| t.name()).collect();
    if let Some((closest, dist)) = levenshtein::closest(type_str, candidates) {
        if dist <= 3 {
            errors.push(
                ParseError::new(ErrorCode::UnknownType, format!("unknown type '{type_str}'"))
                    .at_line(line_no, raw_line.to_string())
                    .with_suggestion(format!("Did you mean '{closest}'?")),
            );
            return TypeResolution::Invalid;
        }
    }

    if is_pascal_case(type_str) {
        return TypeResolution::Relation(type_str.to_string());
    }

    errors.push(
        ParseError::new(ErrorCode::UnknownType, format!("unknown type '{type_str}'"))
            .at_line(line_no, raw_line.to_string()),
    );
    TypeResolution::Invalid
}

/// Parses one `<fieldName> <Type>[?][[]] [@modifier]*` line and mutates
/// `model` accordingly. Relation-array fields (`Target[]`) are not added as
/// fields; a has-many relation with a best-effort foreign key guess is
/// installed on `model` instead (spec §4.2: "the relation is carried in
/// schema-level metadata").
fn parse_field_line(trimmed: &str, line_no: usize, raw_line: &str, model: &mut Model, errors: &mut Vec<ParseError>) {
    let mut head = trimmed.splitn(2, char::is_whitespace);
    let field_name = head.next().unwrap_or("");
    let remainder = head.next().unwrap_or("").trim_start();

    if field_name.is_empty() {
        errors.push(
            ParseError::new(ErrorCode::InvalidField, "expected a field name")
                .at_line(line_no, raw_line.to_string()),
        );
        return;
    }
    if remainder.is_empty() {
        errors.push(
            ParseError::new(ErrorCode::InvalidField, format!("field '{field_name}' has no type"))
                .at_line(line_no, raw_line.to_string()),
        );
        return;
    }

    let mut type_parts = remainder.splitn(2, char::is_whitespace);
    let type_token = type_parts.next().unwrap_or("");
    let modifier_tail = type_parts.next().unwrap_or("").trim_start();

    let mut type_str = type_token;
    let mut is_array = false;
    let mut nullable = false;

    if let Some(stripped) = type_str.strip_suffix("[]") {
        is_array = true;
        type_str = stripped;
    }
    if let Some(stripped) = type_str.strip_suffix('?') {
        nullable = true;
        type_str = stripped;
    }
    if !is_array {
        if let Some(stripped) = type_str.strip_suffix("[]") {
            is_array = true;
            type_str = stripped;
        }
    }

    if is_array {
        match resolve_type(type_str, line_no, raw_line, errors) {
            TypeResolution::Relation(target) => {
                let foreign_key = format!("{}_id", model.name.to_lowercase());
                model.add_relation(Relation::has_many(field_name.to_string(), target, foreign_key, "id"));
            }
            TypeResolution::Builtin(_) => {
                errors.push(
                    ParseError::new(
                        ErrorCode::InvalidField,
                        format!("field '{field_name}' cannot be an array of a built-in type"),
                    )
                    .at_line(line_no, raw_line.to_string()),
                );
            }
            TypeResolution::Invalid => {}
        }
        return;
    }

    let field_type = match resolve_type(type_str, line_no, raw_line, errors) {
        TypeResolution::Builtin(ft) => ft,
        TypeResolution::Relation(target) => {
            let mut field = Field::new(field_name, FieldType::String);
            if nullable {
                field = field.nullable();
            }
            field.references = Some(target.clone());
            model.add_field(field);
            model.add_relation(Relation::belongs_to(
                format!("{field_name}_relation"),
                target,
                field_name.to_string(),
                "id",
            ));
            return;
        }
        TypeResolution::Invalid => return,
    };

    let mut field = Field::new(field_name, field_type);
    if nullable {
        field = field.nullable();
    }

    for tok in modifiers::tokenize(modifier_tail) {
        apply_modifier(&tok, &mut field, line_no, raw_line, errors);
    }

    model.add_field(field);
}

/// Applies one parsed `@modifier` token to `field`, recording a diagnostic
/// for anything malformed or unrecognized.
fn apply_modifier(tok: &ModifierToken, field: &mut Field, line_no: usize, raw_line: &str, errors: &mut Vec<ParseError>) {
    match tok.name.as_str() {
        "id" => field.primary_key = true,
        "unique" => field.unique = true,
        "autoincrement" | "auto" => field.auto_increment = true,
        "default" => match &tok.arg {
            Some(arg) => field.default = Some(parse_default(arg)),
            None => errors.push(
                ParseError::new(ErrorCode::InvalidModifier, "'@default' requires an argument")
                    .at_line(line_no, raw_line.to_string()),
            ),
        },
        "length" | "size" => match tok.arg.as_deref().map(str::trim).map(str::parse::<u32>) {
            Some(Ok(n)) => field.length = Some(n),
            _ => errors.push(
                ParseError::new(ErrorCode::InvalidModifier, "'@length' requires an integer argument")
                    .at_line(line_no, raw_line.to_string()),
            ),
        },
        "precision" => {
            let parsed = tok.arg.as_deref().and_then(|arg| {
                let mut parts = arg.split(',').map(str::trim);
                let p = parts.next()?.parse::<u32>().ok()?;
                let s = parts.next()?.parse::<u32>().ok()?;
                if parts.next().is_some() {
                    return None;
                }
                Some((p, s))
            });
            match parsed {
                Some((p, s)) => {
                    field.precision = Some(p);
                    field.scale = Some(s);
                }
                None => errors.push(
                    ParseError::new(
                        ErrorCode::InvalidModifier,
                        "'@precision' requires '(precision,scale)' integer arguments",
                    )
                    .at_line(line_no, raw_line.to_string()),
                ),
            }
        }
        "db" | "relation" | "map" => {
            // Accepted and ignored per spec §4.2.
        }
        "" => errors.push(
            ParseError::new(
                ErrorCode::InvalidModifier,
                format!(
                    "expected a '@modifier', found '{}'",
                    tok.arg.as_deref().unwrap_or_default()
                ),
            )
            .at_line(line_no, raw_line.to_string()),
        ),
        other => errors.push(
            ParseError::new(ErrorCode::InvalidModifier, format!("unknown modifier '@{other}'"))
                .at_line(line_no, raw_line.to_string()),
        ),
    }
}

/// Strips a trailing `// ...` line comment, respecting single- and
/// double-quoted string content so a `//` inside a default literal is not
/// mistaken for a comment marker.
fn strip_comment(line: &str) -> &str {
    let bytes = line.as_bytes();
    let mut in_quote: Option<u8> = None;
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        if let Some(q) = in_quote {
            if c == q {
                in_quote = None;
            }
        } else if c == b'\'' || c == b'"' {
            in_quote = Some(c);
        } else if c == b'/' && i + 1 < bytes.len() && bytes[i + 1] == b'/' {
            return &line[..i];
        }
        i += 1;
    }
    line
}

/// `true` if `s` starts with an ASCII uppercase letter and is otherwise
/// alphanumeric (PascalCase model/relation-target identifiers).
fn is_pascal_case(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_uppercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_two_model_schema_clean() {
        let source = r#"
            model User {
              id Int @id @autoincrement
              email String @unique
              name String?
              createdAt DateTime @default(now())
            }

            model Post {
              id Int @id @autoincrement
              title String
              content String?
              authorId Int
            }
        "#;
        let outcome = parse(source);
        assert!(outcome.is_ok(), "{:?}", outcome.errors);
        assert_eq!(outcome.schema.models().len(), 2);
        let user = outcome.schema.model("User").unwrap();
        assert_eq!(user.fields.len(), 4);
        assert!(user.field("email").unwrap().unique);
        assert!(user.field("name").unwrap().nullable);
    }

    #[test]
    fn strips_line_comments() {
        let source = "model User {\n  // a comment\n  id Int @id\n}\n";
        let outcome = parse(source);
        assert!(outcome.is_ok(), "{:?}", outcome.errors);
        assert_eq!(outcome.schema.model("User").unwrap().fields.len(), 1);
    }

    #[test]
    fn reports_unknown_type_with_suggestion() {
        let source = "model User {\n  id Sting @id\n}\n";
        let outcome = parse(source);
        let err = outcome
            .errors
            .iter()
            .find(|e| e.code == ErrorCode::UnknownType)
            .expect("expected an unknown-type diagnostic");
        assert_eq!(err.suggestion.as_deref(), Some("Did you mean 'String'?"));
    }

    #[test]
    fn treats_unmatched_pascal_case_as_relation_reference() {
        let source = "model Post {\n  id Int @id\n  author Author\n}\n";
        let outcome = parse(source);
        assert!(outcome.errors.is_empty(), "{:?}", outcome.errors);
        let post = outcome.schema.model("Post").unwrap();
        assert_eq!(post.field("author").unwrap().references.as_deref(), Some("Author"));
        assert_eq!(post.relations.len(), 1);
    }

    #[test]
    fn relation_array_field_is_skipped_but_relation_installed() {
        let source = "model User {\n  id Int @id\n  posts Post[]\n}\n";
        let outcome = parse(source);
        assert!(outcome.errors.is_empty(), "{:?}", outcome.errors);
        let user = outcome.schema.model("User").unwrap();
        assert!(user.field("posts").is_none());
        assert_eq!(user.relations.len(), 1);
        assert_eq!(user.relations[0].target_model, "Post");
    }

    #[test]
    fn reports_invalid_modifier() {
        let source = "model User {\n  id Int @id @bogus\n}\n";
        let outcome = parse(source);
        assert!(outcome.errors.iter().any(|e| e.code == ErrorCode::InvalidModifier));
    }

    #[test]
    fn reports_missing_primary_key_via_validation_pass() {
        let source = "model User {\n  name String\n}\n";
        let outcome = parse(source);
        assert!(outcome.errors.iter().any(|e| e.code == ErrorCode::MissingPrimaryKey));
    }

    #[test]
    fn parses_precision_scale_modifier() {
        let source = "model Invoice {\n  id Int @id\n  amount Decimal @precision(10,2)\n}\n";
        let outcome = parse(source);
        assert!(outcome.is_ok(), "{:?}", outcome.errors);
        let field = outcome.schema.model("Invoice").unwrap().field("amount").unwrap();
        assert_eq!(field.precision, Some(10));
        assert_eq!(field.scale, Some(2));
    }

    #[test]
    fn rejects_malformed_model_header() {
        let source = "model lowercase {\n  id Int @id\n}\n";
        let outcome = parse(source);
        assert!(outcome.errors.iter().any(|e| e.code == ErrorCode::InvalidModel));
    }
}
