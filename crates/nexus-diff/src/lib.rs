//! The Diff Engine (spec §4.4): structural comparison of a
//! [`nexus_schema::Schema`] against a [`nexus_connector::DatabaseSnapshot`],
//! producing an ordered, deterministic list of [`SchemaChange`]s and the
//! forward/reverse SQL for a [`nexus_connector::Migration`] built from them.

mod describe;
mod diff;
mod generate;
mod invert;

pub use describe::describe_changes;
pub use diff::diff;
pub use generate::generate_migration_from_diff;

use nexus_connector::SchemaChange;

/// `true` iff `changes` is non-empty.
pub fn has_changes(changes: &[SchemaChange]) -> bool {
    !changes.is_empty()
}
