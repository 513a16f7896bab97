//! Online movement decisions.
//!
//! A live snapshot of a train's situation is discretised into an
//! [`OperationalState`] and looked up in a precomputed [`PolicyTable`].

mod action;
mod error;
mod state;
mod table;

pub use action::Action;
pub use error::PolicyError;
pub use state::{
    BUFFER_THRESHOLD_MINS, DELAY_THRESHOLD_MINS, InvalidCategory, OperationalSnapshot,
    OperationalState, SectionType, TrackAvailability,
};
pub use table::{Decision, DecisionSource, PolicyEntry, PolicyTable};
