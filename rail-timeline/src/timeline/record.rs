//! Flat timeline rows for export, reload and queries.

use serde::{Deserialize, Serialize};

use super::builder::TrainTimeline;
use crate::domain::{RailTime, StationCode, StopStatus, TimelineStop, TrainNumber, TrainType};

/// One stop of one train, flattened for tabular output.
///
/// Field order is the column order of the CSV export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineRecord {
    pub train_number: TrainNumber,
    pub stop_index: usize,
    pub station_code: StationCode,
    pub station_name: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub scheduled_arrival: Option<RailTime>,
    pub scheduled_departure: Option<RailTime>,
    pub day_offset: u32,
    pub segment_distance_km: Option<f64>,
    pub dwell_seconds: Option<i64>,
    pub segment_travel_seconds: Option<i64>,
    pub theoretical_speed_kmph: Option<f64>,
    pub status: StopStatus,
    pub train_type: Option<TrainType>,
    pub max_speed_kmph: f64,
    #[serde(default)]
    pub train_name: Option<String>,
}

impl TimelineRecord {
    pub fn from_stop(train_number: &TrainNumber, train_name: Option<&str>, stop: &TimelineStop) -> Self {
        Self {
            train_number: train_number.clone(),
            stop_index: stop.stop_index,
            station_code: stop.station_code.clone(),
            station_name: stop.station_name.clone(),
            lat: stop.lat,
            lon: stop.lon,
            scheduled_arrival: stop.scheduled_arrival,
            scheduled_departure: stop.scheduled_departure,
            day_offset: stop.day_offset,
            segment_distance_km: stop.segment_distance_km,
            dwell_seconds: stop.dwell_seconds,
            segment_travel_seconds: stop.segment_travel_seconds,
            theoretical_speed_kmph: stop.theoretical_speed_kmph,
            status: stop.status,
            train_type: stop.train_type.clone(),
            max_speed_kmph: stop.max_speed_kmph,
            train_name: train_name.map(str::to_string),
        }
    }
}

impl TrainTimeline {
    /// Flatten into records in `stop_index` order.
    pub fn records(&self) -> Vec<TimelineRecord> {
        self.stops
            .iter()
            .map(|stop| TimelineRecord::from_stop(&self.train_number, self.train_name.as_deref(), stop))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn stop(idx: usize) -> TimelineStop {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        TimelineStop {
            stop_index: idx,
            station_code: StationCode::parse("SC").unwrap(),
            station_name: Some("Secunderabad Jn".into()),
            lat: Some(17.4337),
            lon: Some(78.5016),
            scheduled_arrival: Some(RailTime::parse_clock("07:55", date).unwrap()),
            scheduled_departure: None,
            day_offset: 1,
            segment_distance_km: None,
            dwell_seconds: None,
            segment_travel_seconds: None,
            theoretical_speed_kmph: None,
            status: StopStatus::Scheduled,
            train_type: Some(TrainType::Passenger),
            max_speed_kmph: 60.0,
        }
    }

    #[test]
    fn records_carry_train_identity() {
        let timeline = TrainTimeline {
            train_number: TrainNumber::parse("47154").unwrap(),
            train_name: Some("FM-SC MMTS".into()),
            stops: vec![stop(0), stop(1)],
        };

        let records = timeline.records();

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].stop_index, 1);
        assert_eq!(records[0].train_number.as_str(), "47154");
        assert_eq!(records[0].train_name.as_deref(), Some("FM-SC MMTS"));
        assert_eq!(records[0].station_code.as_str(), "SC");
        assert_eq!(records[0].train_type, Some(TrainType::Passenger));
    }

    #[test]
    fn json_uses_iso_times() {
        let record = TimelineRecord::from_stop(&TrainNumber::parse("1").unwrap(), None, &stop(0));
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["scheduled_arrival"], "2024-03-15T07:55:00");
        assert!(json["scheduled_departure"].is_null());
        assert_eq!(json["status"], "SCHEDULED");
        assert_eq!(json["train_type"], "Passenger");
    }
}
