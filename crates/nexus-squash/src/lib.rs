//! The Squash Optimizer (spec §4.5): reduces an ordered sequence of
//! migrations into one by statement-level cancellation, with no semantic
//! SQL parsing and no constraint-aware reordering.

mod classify;
mod error;
mod squash;
mod statement;

pub use error::{Result, SquashError};
pub use squash::{squash, SquashOptions, SquashReport};
