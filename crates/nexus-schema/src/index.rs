//! Index declarations on a [`crate::Model`].

use serde::{Deserialize, Serialize};

/// A named index over one or more fields of a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    /// Index name, unique within the schema.
    pub name: String,
    /// Ordered list of field names the index covers.
    pub fields: Vec<String>,
    /// Whether the index enforces uniqueness.
    pub unique: bool,
}

impl Index {
    /// Creates a new, non-unique index over the given fields.
    pub fn new(name: impl Into<String>, fields: Vec<String>) -> Self {
        Self {
            name: name.into(),
            fields,
            unique: false,
        }
    }

    /// Builder: marks the index unique.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}
