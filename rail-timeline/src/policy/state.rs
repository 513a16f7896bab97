//! Discretised operational state, the key into the policy table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::TrainType;

/// Delays above this many minutes count as "delayed".
pub const DELAY_THRESHOLD_MINS: i64 = 10;

/// Buffers below this many minutes count as "tight".
pub const BUFFER_THRESHOLD_MINS: i64 = 10;

/// Error returned when a category name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognised {kind}: {value:?}")]
pub struct InvalidCategory {
    kind: &'static str,
    value: String,
}

/// Whether the track ahead is clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackAvailability {
    Free,
    Occupied,
}

impl FromStr for TrackAvailability {
    type Err = InvalidCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(TrackAvailability::Free),
            "occupied" => Ok(TrackAvailability::Occupied),
            _ => Err(InvalidCategory {
                kind: "track availability",
                value: s.to_string(),
            }),
        }
    }
}

/// Layout of the section ahead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SectionType {
    #[serde(rename = "Double-line")]
    DoubleLine,
    #[serde(rename = "Single-line")]
    SingleLine,
}

impl FromStr for SectionType {
    type Err = InvalidCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "double-line" | "double" => Ok(SectionType::DoubleLine),
            "single-line" | "single" => Ok(SectionType::SingleLine),
            _ => Err(InvalidCategory {
                kind: "section type",
                value: s.to_string(),
            }),
        }
    }
}

/// Policy table key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperationalState {
    pub train_type: TrainType,
    pub track_availability: TrackAvailability,
    pub section_type: SectionType,
    /// 1 if delayed beyond the threshold
    pub delay_bucket: u8,
    /// 1 if the buffer is below the threshold
    pub buffer_bucket: u8,
}

impl fmt::Display for OperationalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {:?}, {:?}, {}, {})",
            self.train_type,
            self.track_availability,
            self.section_type,
            self.delay_bucket,
            self.buffer_bucket
        )
    }
}

/// Live operational fields for one train, before discretisation.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationalSnapshot {
    pub train_type: TrainType,
    pub track_availability: TrackAvailability,
    pub section_type: SectionType,
    pub delay_mins: i64,
    pub buffer_mins: i64,
}

impl OperationalSnapshot {
    pub fn state(&self) -> OperationalState {
        OperationalState {
            train_type: self.train_type.clone(),
            track_availability: self.track_availability,
            section_type: self.section_type,
            delay_bucket: u8::from(self.delay_mins > DELAY_THRESHOLD_MINS),
            buffer_bucket: u8::from(self.buffer_mins < BUFFER_THRESHOLD_MINS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(delay_mins: i64, buffer_mins: i64) -> OperationalSnapshot {
        OperationalSnapshot {
            train_type: TrainType::Freight,
            track_availability: TrackAvailability::Occupied,
            section_type: SectionType::SingleLine,
            delay_mins,
            buffer_mins,
        }
    }

    #[test]
    fn bucket_thresholds() {
        assert_eq!(snapshot(10, 10).state().delay_bucket, 0);
        assert_eq!(snapshot(11, 10).state().delay_bucket, 1);
        assert_eq!(snapshot(0, 10).state().buffer_bucket, 0);
        assert_eq!(snapshot(0, 9).state().buffer_bucket, 1);
        assert_eq!(snapshot(0, -5).state().buffer_bucket, 1);
    }

    #[test]
    fn state_keeps_categories() {
        let state = snapshot(15, 5).state();
        assert_eq!(state.train_type, TrainType::Freight);
        assert_eq!(state.track_availability, TrackAvailability::Occupied);
        assert_eq!(state.section_type, SectionType::SingleLine);
        assert_eq!(state.to_string(), "(Freight, Occupied, SingleLine, 1, 1)");
    }

    #[test]
    fn categories_from_str() {
        assert_eq!("occupied".parse(), Ok(TrackAvailability::Occupied));
        assert_eq!("Single-line".parse(), Ok(SectionType::SingleLine));
        assert_eq!("double".parse(), Ok(SectionType::DoubleLine));

        let err = "triple".parse::<SectionType>().unwrap_err();
        assert_eq!(err.to_string(), "unrecognised section type: \"triple\"");
    }

    #[test]
    fn section_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&SectionType::DoubleLine).unwrap(),
            "\"Double-line\""
        );
        let s: SectionType = serde_json::from_str("\"Single-line\"").unwrap();
        assert_eq!(s, SectionType::SingleLine);
    }
}
