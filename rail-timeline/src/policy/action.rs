//! Movement decisions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// What to do with a train at a contended point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Allow,
    Hold,
    Reroute,
}

impl Action {
    /// All actions, in the order policy scores are listed.
    pub const ALL: [Action; 3] = [Action::Allow, Action::Hold, Action::Reroute];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Allow => "Allow",
            Action::Hold => "Hold",
            Action::Reroute => "Reroute",
        }
    }

    /// Operator-facing instruction for `train_id`.
    pub fn message(&self, train_id: &str) -> String {
        match self {
            Action::Allow => format!("Allow Train {train_id} to go first."),
            Action::Hold => format!("Hold Train {train_id}."),
            Action::Reroute => format!("Reroute Train {train_id}."),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
