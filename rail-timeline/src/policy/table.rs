//! Tabulated decision policy.
//!
//! The table maps each known operational state to one score per action. The
//! highest score wins. States the table has never seen get a uniformly random
//! action, flagged as a fallback so callers can report lower confidence.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::action::Action;
use super::error::PolicyError;
use super::state::{OperationalState, SectionType, TrackAvailability};
use crate::domain::TrainType;

/// One row of a policy table file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyEntry {
    pub train_type: TrainType,
    pub track_availability: TrackAvailability,
    pub section_type: SectionType,
    pub delay_bucket: u8,
    pub buffer_bucket: u8,
    /// Scores for Allow, Hold and Reroute, in that order.
    pub scores: [f64; 3],
}

impl PolicyEntry {
    fn state(&self) -> OperationalState {
        OperationalState {
            train_type: self.train_type.clone(),
            track_availability: self.track_availability,
            section_type: self.section_type,
            delay_bucket: self.delay_bucket,
            buffer_bucket: self.buffer_bucket,
        }
    }
}

/// Where a decision came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionSource {
    Table,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub action: Action,
    pub source: DecisionSource,
}

/// Immutable state-to-scores mapping.
#[derive(Debug, Clone, Default)]
pub struct PolicyTable {
    scores: HashMap<OperationalState, [f64; 3]>,
}

impl PolicyTable {
    /// Build a table, rejecting duplicate states and non-finite scores.
    pub fn from_entries(entries: Vec<PolicyEntry>) -> Result<Self, PolicyError> {
        let mut scores = HashMap::with_capacity(entries.len());
        for entry in entries {
            let state = entry.state();
            if entry.scores.iter().any(|s| !s.is_finite()) {
                return Err(PolicyError::NonFiniteScore(state.to_string()));
            }
            match scores.entry(state) {
                Entry::Occupied(e) => return Err(PolicyError::DuplicateState(e.key().to_string())),
                Entry::Vacant(e) => {
                    e.insert(entry.scores);
                }
            }
        }
        Ok(Self { scores })
    }

    pub fn from_json_str(json: &str) -> Result<Self, PolicyError> {
        let entries: Vec<PolicyEntry> = serde_json::from_str(json)?;
        Self::from_entries(entries)
    }

    pub fn load(path: &Path) -> Result<Self, PolicyError> {
        let contents = std::fs::read_to_string(path).map_err(|source| PolicyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_json_str(&contents)?;
        info!(path = %path.display(), states = table.len(), "loaded policy table");
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// The tabulated best action, if the state is known.
    ///
    /// Ties go to the action listed first.
    pub fn best_action(&self, state: &OperationalState) -> Option<Action> {
        let scores = self.scores.get(state)?;
        let mut best = 0;
        for (idx, score) in scores.iter().enumerate().skip(1) {
            if *score > scores[best] {
                best = idx;
            }
        }
        Some(Action::ALL[best])
    }

    /// Decide for `state`, drawing from `rng` when the state is unknown.
    pub fn decide<R: Rng>(&self, state: &OperationalState, rng: &mut R) -> Decision {
        match self.best_action(state) {
            Some(action) => Decision {
                action,
                source: DecisionSource::Table,
            },
            None => {
                let action = Action::ALL[rng.gen_range(0..Action::ALL.len())];
                debug!(%state, %action, "state not in policy table, random fallback");
                Decision {
                    action,
                    source: DecisionSource::Fallback,
                }
            }
        }
    }
}
