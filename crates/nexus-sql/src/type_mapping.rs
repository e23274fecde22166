//! The semantic-type-to-SQL-type matrix and default-expression rewriting of
//! spec §4.3, factored out so the three dialect adapters agree on the same
//! table instead of re-deriving it independently.

use nexus_schema::{DefaultValue, Field, FieldType};

/// Renders `field`'s semantic type as a PostgreSQL type string.
pub fn postgres_type(field: &Field) -> String {
    use FieldType::*;
    match field.field_type {
        Int => {
            if field.auto_increment {
                "SERIAL".to_string()
            } else {
                "INTEGER".to_string()
            }
        }
        BigInt => {
            if field.auto_increment {
                "BIGSERIAL".to_string()
            } else {
                "BIGINT".to_string()
            }
        }
        String => format!("VARCHAR({})", field.length.unwrap_or(255)),
        Text => "TEXT".to_string(),
        Bool => "BOOLEAN".to_string(),
        Float => "DOUBLE PRECISION".to_string(),
        Decimal => format!(
            "NUMERIC({},{})",
            field.precision.unwrap_or(10),
            field.scale.unwrap_or(2)
        ),
        DateTime => "TIMESTAMPTZ".to_string(),
        Date => "DATE".to_string(),
        Time => "TIME".to_string(),
        Json => "JSONB".to_string(),
        Bytes => "BYTEA".to_string(),
        Uuid => "UUID".to_string(),
    }
}

/// Renders `field`'s semantic type as a MySQL type string.
pub fn mysql_type(field: &Field) -> String {
    use FieldType::*;
    match field.field_type {
        Int => {
            if field.auto_increment {
                "INT AUTO_INCREMENT".to_string()
            } else {
                "INT".to_string()
            }
        }
        BigInt => {
            if field.auto_increment {
                "BIGINT AUTO_INCREMENT".to_string()
            } else {
                "BIGINT".to_string()
            }
        }
        String => format!("VARCHAR({})", field.length.unwrap_or(255)),
        Text => "TEXT".to_string(),
        Bool => "TINYINT(1)".to_string(),
        Float => "DOUBLE".to_string(),
        Decimal => format!(
            "DECIMAL({},{})",
            field.precision.unwrap_or(10),
            field.scale.unwrap_or(2)
        ),
        DateTime => "DATETIME".to_string(),
        Date => "DATE".to_string(),
        Time => "TIME".to_string(),
        Json => "JSON".to_string(),
        Bytes => "BLOB".to_string(),
        Uuid => "CHAR(36)".to_string(),
    }
}

/// Renders `field`'s semantic type as a SQLite type string. SQLite's type
/// affinity system means most semantic types collapse onto a handful of
/// storage classes; `AUTOINCREMENT` is attached at the column-definition
/// level (see `sqlite_adapter`), not in this string.
pub fn sqlite_type(field: &Field) -> String {
    use FieldType::*;
    match field.field_type {
        Int | BigInt | Bool => "INTEGER".to_string(),
        String | Text | DateTime | Date | Time | Uuid | Json => "TEXT".to_string(),
        Float | Decimal => "REAL".to_string(),
        Bytes => "BLOB".to_string(),
    }
}

/// Rewrites a boolean literal default for `dialect`, per spec §4.3:
/// `TRUE`/`FALSE` for Postgres, `1`/`0` elsewhere.
fn render_bool(dialect_uses_true_false: bool, value: bool) -> String {
    if dialect_uses_true_false {
        if value { "TRUE".to_string() } else { "FALSE".to_string() }
    } else if value {
        "1".to_string()
    } else {
        "0".to_string()
    }
}

/// Renders a [`DefaultValue`] as PostgreSQL literal/expression SQL.
pub fn render_default_postgres(default: &DefaultValue) -> String {
    match default {
        DefaultValue::String(s) => format!("'{}'", s.replace('\'', "''")),
        DefaultValue::Int(i) => i.to_string(),
        DefaultValue::Float(f) => f.to_string(),
        DefaultValue::Bool(b) => render_bool(true, *b),
        DefaultValue::Expression(expr) => match expr.as_str() {
            "NOW()" => "NOW()".to_string(),
            "UUID()" => "gen_random_uuid()".to_string(),
            other => other.to_string(),
        },
    }
}

/// Renders a [`DefaultValue`] as MySQL literal/expression SQL.
pub fn render_default_mysql(default: &DefaultValue) -> String {
    match default {
        DefaultValue::String(s) => format!("'{}'", s.replace('\'', "''")),
        DefaultValue::Int(i) => i.to_string(),
        DefaultValue::Float(f) => f.to_string(),
        DefaultValue::Bool(b) => render_bool(false, *b),
        DefaultValue::Expression(expr) => match expr.as_str() {
            "NOW()" => "CURRENT_TIMESTAMP".to_string(),
            "UUID()" => "(UUID())".to_string(),
            other => other.to_string(),
        },
    }
}

/// Renders a [`DefaultValue`] as SQLite literal/expression SQL. SQLite has
/// no native `UUID()` builtin, so the symbolic `UUID()` default lowers to
/// an inline random-blob v4 construction built from `randomblob`/`hex`.
pub fn render_default_sqlite(default: &DefaultValue) -> String {
    match default {
        DefaultValue::String(s) => format!("'{}'", s.replace('\'', "''")),
        DefaultValue::Int(i) => i.to_string(),
        DefaultValue::Float(f) => f.to_string(),
        DefaultValue::Bool(b) => render_bool(false, *b),
        DefaultValue::Expression(expr) => match expr.as_str() {
            "NOW()" => "CURRENT_TIMESTAMP".to_string(),
            "UUID()" => {
                "(lower(hex(randomblob(4)) || '-' || hex(randomblob(2)) || '-4' || \
                 substr(hex(randomblob(2)),2) || '-' || \
                 substr('89ab',abs(random()) % 4 + 1, 1) || \
                 substr(hex(randomblob(2)),2) || '-' || hex(randomblob(6)))"
                    .to_string()
            }
            other => other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nexus_schema::Field;

    #[test]
    fn postgres_maps_auto_increment_int_to_serial() {
        let f = Field::new("id", FieldType::Int).primary_key().auto_increment();
        assert_eq!(postgres_type(&f), "SERIAL");
    }

    #[test]
    fn mysql_maps_bool_to_tinyint() {
        let f = Field::new("active", FieldType::Bool);
        assert_eq!(mysql_type(&f), "TINYINT(1)");
    }

    #[test]
    fn sqlite_collapses_string_family_to_text() {
        let f = Field::new("email", FieldType::String).length(255);
        assert_eq!(sqlite_type(&f), "TEXT");
    }

    #[test]
    fn bool_default_rendering_differs_by_dialect() {
        assert_eq!(render_default_postgres(&DefaultValue::Bool(true)), "TRUE");
        assert_eq!(render_default_mysql(&DefaultValue::Bool(true)), "1");
        assert_eq!(render_default_sqlite(&DefaultValue::Bool(false)), "0");
    }

    #[test]
    fn symbolic_now_rewrites_per_dialect() {
        let now = DefaultValue::Expression("NOW()".to_string());
        assert_eq!(render_default_postgres(&now), "NOW()");
        assert_eq!(render_default_mysql(&now), "CURRENT_TIMESTAMP");
        assert_eq!(render_default_sqlite(&now), "CURRENT_TIMESTAMP");
    }

    #[test]
    fn arbitrary_expression_passes_through_verbatim() {
        let expr = DefaultValue::Expression("nextval('users_id_seq')".to_string());
        assert_eq!(render_default_postgres(&expr), "nextval('users_id_seq')");
    }
}
