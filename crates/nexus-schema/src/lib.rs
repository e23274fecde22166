//! Canonical in-memory schema model.
//!
//! A [`Schema`] is an ordered collection of [`Model`]s, each with fields,
//! indexes, and relations. This crate owns construction (builder API),
//! lookup, validation, and best-effort relation detection. It has no
//! knowledge of SQL dialects or the textual DSL — those live in
//! `nexus-sql` and `nexus-parser` respectively.

mod error;
mod field;
mod index;
mod model;
mod relation;
mod schema;

pub use error::{ValidationError, ValidationReport};
pub use field::{DefaultValue, Field, FieldType};
pub use index::Index;
pub use model::Model;
pub use relation::{JunctionInfo, ReferentialAction, Relation, RelationKind};
pub use schema::Schema;
