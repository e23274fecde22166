//! The schema: an ordered collection of models plus a by-name index.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, ValidationReport};
use crate::field::FieldType;
use crate::model::Model;
use crate::relation::Relation;

/// Ordered collection of models. Model order is significant: it drives
/// deterministic DDL emission in the diff engine and dialect adapters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schema {
    models: Vec<Model>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl Schema {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a model, configuring it via the given closure, and appends it
    /// in definition order. Replaces any prior model of the same name.
    pub fn add_model(&mut self, name: impl Into<String>, configure: impl FnOnce(&mut Model)) {
        let name = name.into();
        let mut model = Model::new(name.clone());
        configure(&mut model);
        self.insert_model(model);
    }

    /// Inserts an already-built model, appending in definition order.
    /// Replaces any prior model of the same name (its original position is
    /// kept).
    pub fn insert_model(&mut self, model: Model) {
        if let Some(&pos) = self.index.get(&model.name) {
            self.models[pos] = model;
        } else {
            self.index.insert(model.name.clone(), self.models.len());
            self.models.push(model);
        }
    }

    /// Returns all models in definition order.
    pub fn models(&self) -> &[Model] {
        &self.models
    }

    /// Looks up a model by name.
    pub fn model(&self, name: &str) -> Option<&Model> {
        self.index.get(name).map(|&i| &self.models[i])
    }

    /// Looks up a model by name, mutably.
    pub fn model_mut(&mut self, name: &str) -> Option<&mut Model> {
        let i = *self.index.get(name)?;
        Some(&mut self.models[i])
    }

    /// Returns `true` if a model with this name exists.
    pub fn has_model(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Validates the schema, aggregating every violation rather than
    /// stopping at the first.
    ///
    /// Checks, in this order: duplicate field names within each model,
    /// exactly-one primary key per model, relation targets resolve, and
    /// index field references resolve.
    pub fn validate(&self) -> ValidationReport {
        let mut errors = Vec::new();

        for model in &self.models {
            let mut seen = std::collections::HashSet::new();
            for field in &model.fields {
                if !seen.insert(field.name.as_str()) {
                    errors.push(ValidationError::DuplicateField {
                        model: model.name.clone(),
                        field: field.name.clone(),
                    });
                }
            }

            if model.primary_key_field().is_none() {
                errors.push(ValidationError::MissingPrimaryKey {
                    model: model.name.clone(),
                });
            }

            for relation in &model.relations {
                if !self.has_model(&relation.target_model) {
                    errors.push(ValidationError::DanglingRelation {
                        model: model.name.clone(),
                        target: relation.target_model.clone(),
                    });
                }
            }

            for index in &model.indexes {
                for field_name in &index.fields {
                    if model.field(field_name).is_none() {
                        errors.push(ValidationError::UnknownIndexField {
                            model: model.name.clone(),
                            index: index.name.clone(),
                            field: field_name.clone(),
                        });
                    }
                }
            }
        }

        ValidationReport { errors }
    }

    /// Best-effort relation detection: for every integer field whose name
    /// ends in `_id` or `Id` and whose prefix matches an existing model
    /// name, sets `references` on the field and installs a belongs-to
    /// relation on the owning model plus the reverse has-many on the
    /// target. Idempotent and never overrides an explicit reference.
    pub fn detect_relations(&mut self) {
        // Collect candidate (owner, field, target) triples first: we can't
        // mutate two models at once while borrowing the by-name index.
        let model_names: Vec<String> = self.models.iter().map(|m| m.name.clone()).collect();
        let mut candidates: Vec<(String, String, String)> = Vec::new();

        for model in &self.models {
            for field in &model.fields {
                if field.references.is_some() {
                    continue;
                }
                if !matches!(field.field_type, FieldType::Int | FieldType::BigInt) {
                    continue;
                }
                let Some(prefix) = strip_id_suffix(&field.name) else {
                    continue;
                };
                if let Some(target) = model_names.iter().find(|n| names_match(prefix, n)) {
                    if target == &model.name && field.name == "id" {
                        // A field literally named `id` never self-references.
                        continue;
                    }
                    candidates.push((model.name.clone(), field.name.clone(), target.clone()));
                }
            }
        }

        for (owner, field_name, target) in candidates {
            let relation_name = format!("{}_{}", owner.to_lowercase(), field_name);
            let already_detected = self
                .model(&owner)
                .map(|m| m.relations.iter().any(|r| r.foreign_key == field_name))
                .unwrap_or(false);
            if already_detected {
                continue;
            }

            if let Some(m) = self.model_mut(&owner) {
                if let Some(f) = m.fields.iter_mut().find(|f| f.name == field_name) {
                    f.references = Some(target.clone());
                }
                m.add_relation(Relation::belongs_to(
                    relation_name.clone(),
                    target.clone(),
                    field_name.clone(),
                    "id",
                ));
            }

            if let Some(t) = self.model_mut(&target) {
                let reverse_name = format!("{}s", owner.to_lowercase());
                if !t.relations.iter().any(|r| r.foreign_key == field_name && r.target_model == owner)
                {
                    t.add_relation(Relation::has_many(reverse_name, owner, field_name, "id"));
                }
            }
        }
    }
}

/// Splits `field_name` into its prefix if it ends with a recognized
/// foreign-key suffix (`_id` snake-case, or `Id` camel-case).
fn strip_id_suffix(field_name: &str) -> Option<&str> {
    if field_name.len() > 3 && field_name.ends_with("_id") {
        Some(&field_name[..field_name.len() - 3])
    } else if field_name.len() > 2
        && field_name.ends_with("Id")
        && !field_name.ends_with("_Id")
        && field_name.as_bytes()[field_name.len() - 3].is_ascii_lowercase()
    {
        Some(&field_name[..field_name.len() - 2])
    } else {
        None
    }
}

/// Compares a field-name prefix against a model name ignoring case and
/// underscores, e.g. `"user"` matches `"User"` and `"author"` matches
/// `"Author"`.
fn names_match(prefix: &str, model_name: &str) -> bool {
    let norm = |s: &str| s.chars().filter(|c| *c != '_').collect::<String>().to_lowercase();
    norm(prefix) == norm(model_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Field;
    use pretty_assertions::assert_eq;

    fn user_post_schema() -> Schema {
        let mut schema = Schema::new();
        schema.add_model("User", |m| {
            m.add_field(Field::new("id", FieldType::Int).primary_key().auto_increment());
            m.add_field(Field::new("email", FieldType::String).unique());
        });
        schema.add_model("Post", |m| {
            m.add_field(Field::new("id", FieldType::Int).primary_key().auto_increment());
            m.add_field(Field::new("author_id", FieldType::Int));
        });
        schema
    }

    #[test]
    fn validates_clean_schema() {
        let schema = user_post_schema();
        let report = schema.validate();
        assert!(report.is_ok(), "{report}");
    }

    #[test]
    fn detects_missing_primary_key() {
        let mut schema = Schema::new();
        schema.add_model("Orphan", |m| {
            m.add_field(Field::new("name", FieldType::String));
        });
        let report = schema.validate();
        assert_eq!(report.errors.len(), 1);
        assert!(matches!(
            report.errors[0],
            ValidationError::MissingPrimaryKey { .. }
        ));
    }

    #[test]
    fn detects_dangling_relation() {
        let mut schema = Schema::new();
        schema.add_model("Post", |m| {
            m.add_field(Field::new("id", FieldType::Int).primary_key());
            m.add_relation(Relation::belongs_to("author", "Ghost", "author_id", "id"));
        });
        let report = schema.validate();
        assert!(report
            .errors
            .iter()
            .any(|e| matches!(e, ValidationError::DanglingRelation { .. })));
    }

    #[test]
    fn detect_relations_is_idempotent_and_adds_both_sides() {
        let mut schema = user_post_schema();
        schema.detect_relations();

        let post = schema.model("Post").unwrap();
        assert_eq!(post.field("author_id").unwrap().references.as_deref(), Some("User"));
        assert_eq!(post.relations.len(), 1);

        let user = schema.model("User").unwrap();
        assert_eq!(user.relations.len(), 1);

        // Running twice must not duplicate relations.
        schema.detect_relations();
        assert_eq!(schema.model("Post").unwrap().relations.len(), 1);
        assert_eq!(schema.model("User").unwrap().relations.len(), 1);
    }

    #[test]
    fn detect_relations_never_overrides_explicit_reference() {
        let mut schema = Schema::new();
        schema.add_model("Team", |m| {
            m.add_field(Field::new("id", FieldType::Int).primary_key());
        });
        schema.add_model("Account", |m| {
            m.add_field(Field::new("id", FieldType::Int).primary_key());
        });
        schema.add_model("Widget", |m| {
            m.add_field(Field::new("id", FieldType::Int).primary_key());
            m.add_field(Field::new("team_id", FieldType::Int).references("Account"));
        });
        schema.detect_relations();
        assert_eq!(
            schema.model("Widget").unwrap().field("team_id").unwrap().references.as_deref(),
            Some("Account")
        );
    }
}
