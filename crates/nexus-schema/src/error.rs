//! Validation error types for the schema model.

use std::fmt;

/// A single validation failure discovered by [`crate::Schema::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A model does not have exactly one primary-key field.
    MissingPrimaryKey {
        /// The model missing a primary key.
        model: String,
    },
    /// A relation's target model does not exist in the schema.
    DanglingRelation {
        /// The model declaring the relation.
        model: String,
        /// The relation's target model name.
        target: String,
    },
    /// An index references a field that does not exist on its model.
    UnknownIndexField {
        /// The model the index belongs to.
        model: String,
        /// The index name.
        index: String,
        /// The unresolved field name.
        field: String,
    },
    /// Two fields on the same model share a name.
    DuplicateField {
        /// The model containing the duplicate.
        model: String,
        /// The repeated field name.
        field: String,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingPrimaryKey { model } => {
                write!(f, "model '{model}' has no primary-key field")
            }
            Self::DanglingRelation { model, target } => {
                write!(
                    f,
                    "model '{model}' declares a relation to unknown model '{target}'"
                )
            }
            Self::UnknownIndexField {
                model,
                index,
                field,
            } => write!(
                f,
                "index '{index}' on model '{model}' references unknown field '{field}'"
            ),
            Self::DuplicateField { model, field } => {
                write!(f, "model '{model}' has duplicate field '{field}'")
            }
        }
    }
}

/// Aggregated validation report. Non-empty iff the schema is invalid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// All validation errors discovered, in deterministic discovery order.
    pub errors: Vec<ValidationError>,
}

impl ValidationReport {
    /// Returns `true` if no errors were recorded.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{e}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationReport {}
