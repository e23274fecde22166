//! Relations between models.

use serde::{Deserialize, Serialize};

/// The kind of relation a [`Relation`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelationKind {
    BelongsTo,
    HasOne,
    HasMany,
    ManyToMany,
}

/// The action taken on the referencing row when the referenced row is
/// deleted or updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ReferentialAction {
    #[default]
    NoAction,
    Cascade,
    SetNull,
    Restrict,
}

/// Metadata describing the junction table of a many-to-many relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JunctionInfo {
    /// Name of the junction table.
    pub table: String,
    /// Foreign-key column on the junction table pointing back at the
    /// owning model.
    pub owner_key: String,
    /// Foreign-key column on the junction table pointing at the target
    /// model.
    pub target_key: String,
}

/// A relation declared on a [`crate::Model`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    /// Relation name, unique within the owning model.
    pub name: String,
    /// The kind of relation.
    pub kind: RelationKind,
    /// The name of the related model.
    pub target_model: String,
    /// The foreign-key field name (on the owning side for belongs-to;
    /// on the target side for has-one/has-many).
    pub foreign_key: String,
    /// The referenced key field name, usually the target's primary key.
    pub reference_key: String,
    /// Junction metadata, present only for [`RelationKind::ManyToMany`].
    pub junction: Option<JunctionInfo>,
    /// Action on delete of the referenced row.
    pub on_delete: ReferentialAction,
    /// Action on update of the referenced row.
    pub on_update: ReferentialAction,
}

impl Relation {
    /// Creates a belongs-to relation: the owning model holds the foreign
    /// key and points at the target's primary key.
    pub fn belongs_to(
        name: impl Into<String>,
        target_model: impl Into<String>,
        foreign_key: impl Into<String>,
        reference_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: RelationKind::BelongsTo,
            target_model: target_model.into(),
            foreign_key: foreign_key.into(),
            reference_key: reference_key.into(),
            junction: None,
            on_delete: ReferentialAction::NoAction,
            on_update: ReferentialAction::NoAction,
        }
    }

    /// Creates the reverse has-many relation for a belongs-to.
    pub fn has_many(
        name: impl Into<String>,
        target_model: impl Into<String>,
        foreign_key: impl Into<String>,
        reference_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: RelationKind::HasMany,
            target_model: target_model.into(),
            foreign_key: foreign_key.into(),
            reference_key: reference_key.into(),
            junction: None,
            on_delete: ReferentialAction::NoAction,
            on_update: ReferentialAction::NoAction,
        }
    }

    /// Creates a has-one relation.
    pub fn has_one(
        name: impl Into<String>,
        target_model: impl Into<String>,
        foreign_key: impl Into<String>,
        reference_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: RelationKind::HasOne,
            target_model: target_model.into(),
            foreign_key: foreign_key.into(),
            reference_key: reference_key.into(),
            junction: None,
            on_delete: ReferentialAction::NoAction,
            on_update: ReferentialAction::NoAction,
        }
    }

    /// Creates a many-to-many relation with explicit junction metadata.
    pub fn many_to_many(
        name: impl Into<String>,
        target_model: impl Into<String>,
        junction: JunctionInfo,
    ) -> Self {
        Self {
            name: name.into(),
            kind: RelationKind::ManyToMany,
            target_model: target_model.into(),
            foreign_key: junction.owner_key.clone(),
            reference_key: junction.target_key.clone(),
            junction: Some(junction),
            on_delete: ReferentialAction::NoAction,
            on_update: ReferentialAction::NoAction,
        }
    }

    /// Builder: sets the on-delete action.
    pub fn on_delete(mut self, action: ReferentialAction) -> Self {
        self.on_delete = action;
        self
    }

    /// Builder: sets the on-update action.
    pub fn on_update(mut self, action: ReferentialAction) -> Self {
        self.on_update = action;
        self
    }
}
