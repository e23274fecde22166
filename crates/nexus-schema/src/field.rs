//! Field types, flags, and default-value representation.

use serde::{Deserialize, Serialize};

/// The closed set of semantic field types a [`crate::Field`] can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    Int,
    BigInt,
    String,
    Text,
    Bool,
    Float,
    Decimal,
    DateTime,
    Date,
    Time,
    Json,
    Bytes,
    Uuid,
}

impl FieldType {
    /// All variants, in a stable order used for "did you mean" suggestions.
    pub const ALL: [FieldType; 13] = [
        FieldType::Int,
        FieldType::BigInt,
        FieldType::String,
        FieldType::Text,
        FieldType::Bool,
        FieldType::Float,
        FieldType::Decimal,
        FieldType::DateTime,
        FieldType::Date,
        FieldType::Time,
        FieldType::Json,
        FieldType::Bytes,
        FieldType::Uuid,
    ];

    /// The canonical DSL spelling of this type, e.g. `Int`, `DateTime`.
    pub fn name(self) -> &'static str {
        match self {
            FieldType::Int => "Int",
            FieldType::BigInt => "BigInt",
            FieldType::String => "String",
            FieldType::Text => "Text",
            FieldType::Bool => "Bool",
            FieldType::Float => "Float",
            FieldType::Decimal => "Decimal",
            FieldType::DateTime => "DateTime",
            FieldType::Date => "Date",
            FieldType::Time => "Time",
            FieldType::Json => "JSON",
            FieldType::Bytes => "Bytes",
            FieldType::Uuid => "UUID",
        }
    }

    /// Parses a DSL type name, case-sensitively, returning `None` if it is
    /// not one of the closed set.
    pub fn parse(name: &str) -> Option<FieldType> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }
}

/// A field default: either a literal value or a symbolic expression such as
/// `NOW()` that the dialect adapter rewrites at DDL-generation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DefaultValue {
    /// A literal string value.
    String(String),
    /// A literal integer value.
    Int(i64),
    /// A literal floating-point value.
    Float(f64),
    /// A literal boolean value.
    Bool(bool),
    /// A symbolic expression, e.g. `NOW()`, `UUID()`, or an arbitrary
    /// `name()` call kept verbatim.
    Expression(String),
}

/// A single field declared on a [`crate::Model`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Field name, unique within its model.
    pub name: String,
    /// The semantic type of the field.
    pub field_type: FieldType,
    /// Whether the field may hold `NULL`.
    pub nullable: bool,
    /// Whether this field is (part of) the model's primary key.
    pub primary_key: bool,
    /// Whether this field has a uniqueness constraint.
    pub unique: bool,
    /// Whether this field auto-increments (only meaningful for integer
    /// types).
    pub auto_increment: bool,
    /// Declared length, e.g. for `String(255)`.
    pub length: Option<u32>,
    /// Declared precision, for `Decimal(p, s)`.
    pub precision: Option<u32>,
    /// Declared scale, for `Decimal(p, s)`.
    pub scale: Option<u32>,
    /// The field's default value, if any.
    pub default: Option<DefaultValue>,
    /// If this field is a foreign key, the name of the model it references.
    pub references: Option<String>,
}

impl Field {
    /// Creates a new field with the given name and type, all flags unset.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            nullable: false,
            primary_key: false,
            unique: false,
            auto_increment: false,
            length: None,
            precision: None,
            scale: None,
            default: None,
            references: None,
        }
    }

    /// Builder: marks the field nullable.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Builder: marks the field as the primary key.
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Builder: marks the field unique.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Builder: marks the field auto-incrementing.
    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    /// Builder: sets a default value.
    pub fn default_value(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }

    /// Builder: sets the declared length.
    pub fn length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    /// Builder: sets declared precision and scale.
    pub fn precision_scale(mut self, precision: u32, scale: u32) -> Self {
        self.precision = Some(precision);
        self.scale = Some(scale);
        self
    }

    /// Builder: sets the foreign-key target model name.
    pub fn references(mut self, model: impl Into<String>) -> Self {
        self.references = Some(model.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_type_names() {
        assert_eq!(FieldType::parse("Int"), Some(FieldType::Int));
        assert_eq!(FieldType::parse("JSON"), Some(FieldType::Json));
        assert_eq!(FieldType::parse("Nope"), None);
    }

    #[test]
    fn field_builder_chains() {
        let f = Field::new("email", FieldType::String)
            .unique()
            .length(255);
        assert!(f.unique);
        assert_eq!(f.length, Some(255));
        assert!(!f.primary_key);
    }
}
