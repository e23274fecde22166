//! A named table with fields, indexes, and relations.

use serde::{Deserialize, Serialize};

use crate::field::Field;
use crate::index::Index;
use crate::relation::Relation;

/// A model maps to one table. Fields, indexes, and relations are kept in
/// definition order so DDL emission is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Model {
    /// The model (table) name.
    pub name: String,
    /// Fields in declaration order.
    pub fields: Vec<Field>,
    /// Indexes in declaration order.
    pub indexes: Vec<Index>,
    /// Relations in declaration order.
    pub relations: Vec<Relation>,
}

impl Model {
    /// Creates an empty model with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            indexes: Vec::new(),
            relations: Vec::new(),
        }
    }

    /// Appends a field, preserving declaration order.
    pub fn add_field(&mut self, field: Field) -> &mut Self {
        self.fields.push(field);
        self
    }

    /// Appends an index, preserving declaration order.
    pub fn add_index(&mut self, index: Index) -> &mut Self {
        self.indexes.push(index);
        self
    }

    /// Appends a relation, preserving declaration order.
    pub fn add_relation(&mut self, relation: Relation) -> &mut Self {
        self.relations.push(relation);
        self
    }

    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns the single primary-key field, if exactly one is marked.
    pub fn primary_key_field(&self) -> Option<&Field> {
        let mut pk = self.fields.iter().filter(|f| f.primary_key);
        let first = pk.next()?;
        if pk.next().is_some() {
            None
        } else {
            Some(first)
        }
    }
}
