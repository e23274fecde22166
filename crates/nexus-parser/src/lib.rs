//! The Schema Parser (spec §4.2): a line-oriented textual DSL translated
//! into a [`nexus_schema::Schema`] with structured, located diagnostics.
//!
//! Parsing never aborts on the first malformed line -- [`parse`] returns a
//! [`ParseOutcome`] carrying both the (possibly partial) schema and every
//! diagnostic accumulated along the way, so a caller can report every
//! mistake in one pass instead of a fix-rerun-fix loop.

mod default_value;
mod diagnostic;
mod grammar;
mod levenshtein;
mod modifiers;

pub use diagnostic::{ErrorCode, ParseError};
pub use grammar::{parse, ParseOutcome};
