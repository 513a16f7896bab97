//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::domain::TrainType;
use crate::policy::{Action, DecisionSource, OperationalSnapshot, SectionType, TrackAvailability};

/// How the train calls along its route. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoppingPattern {
    #[serde(rename = "All Stops")]
    AllStops,
    Skip,
}

/// Request for a movement decision.
#[derive(Debug, Clone, Deserialize)]
pub struct RescheduleRequest {
    pub train_id: String,
    pub train_type: TrainType,
    /// Current position (station or block), informational
    pub current_pos: String,
    /// Minutes behind schedule
    pub delay: i64,
    /// Minutes of slack to the next conflicting movement
    pub buffer: i64,
    pub track_avail: TrackAvailability,
    pub stopping_pattern: StoppingPattern,
    pub section_type: SectionType,
    /// Informational
    pub speed_limit: i64,
}

impl RescheduleRequest {
    pub fn snapshot(&self) -> OperationalSnapshot {
        OperationalSnapshot {
            train_type: self.train_type.clone(),
            track_availability: self.track_avail,
            section_type: self.section_type,
            delay_mins: self.delay,
            buffer_mins: self.buffer,
        }
    }
}

/// Movement decision for one train.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RescheduleResponse {
    pub decision: Action,
    pub message: String,
    /// `table` for a tabulated decision, `fallback` for a random one
    pub confidence: DecisionSource,
}

#[derive(Debug, Deserialize)]
pub struct TrainScheduleQuery {
    pub train_number: String,
}

#[derive(Debug, Deserialize)]
pub struct StationScheduleQuery {
    pub station_code: String,
}

#[derive(Debug, Deserialize)]
pub struct JunctionScheduleQuery {
    pub junction: String,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_from_frontend_json() {
        let json = r#"{
            "train_id": "12760",
            "train_type": "Freight",
            "current_pos": "KZJ",
            "delay": 15,
            "buffer": 5,
            "track_avail": "Occupied",
            "stopping_pattern": "All Stops",
            "section_type": "Single-line",
            "speed_limit": 80
        }"#;

        let req: RescheduleRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.stopping_pattern, StoppingPattern::AllStops);

        let state = req.snapshot().state();
        assert_eq!(state.train_type, TrainType::Freight);
        assert_eq!(state.delay_bucket, 1);
        assert_eq!(state.buffer_bucket, 1);
    }

    #[test]
    fn response_json_shape() {
        let resp = RescheduleResponse {
            decision: Action::Hold,
            message: Action::Hold.message("12760"),
            confidence: DecisionSource::Fallback,
        };

        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["decision"], "Hold");
        assert_eq!(json["message"], "Hold Train 12760.");
        assert_eq!(json["confidence"], "fallback");
    }
}
