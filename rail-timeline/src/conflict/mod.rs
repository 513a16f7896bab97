//! Pairwise conflict detection and labelling.
//!
//! Two trains conflict when they are due at the same station within a short
//! window. The oracle decides which of them should proceed first, and the
//! pair generator turns a whole timeline into labelled training examples.

mod config;
pub mod oracle;
mod pairs;

pub use config::ConflictConfig;
pub use oracle::{Contender, priority_class};
pub use pairs::{ConflictPair, generate_pairs, shuffle_pairs};
