//! Raw and enriched timetable stops.
//!
//! A [`Stop`] is what the schedule source gives us: a station code and
//! whatever times survived data entry. A [`TimelineStop`] is the same stop
//! after the timeline builder has ordered it, repaired its times and derived
//! travel metrics.

use serde::{Deserialize, Serialize};

use super::{DomainError, RailTime, StationCode, TrainType};

/// A raw stop record for one train.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stop {
    pub station_code: StationCode,
    pub arrival: Option<RailTime>,
    pub departure: Option<RailTime>,
    /// Day of the run this stop falls on, starting at 1.
    pub day_offset: u32,
}

impl Stop {
    /// Create a stop with no times.
    pub fn new(station_code: StationCode, day_offset: u32) -> Result<Self, DomainError> {
        if day_offset == 0 {
            return Err(DomainError::InvalidDayOffset(0));
        }
        Ok(Self {
            station_code,
            arrival: None,
            departure: None,
            day_offset,
        })
    }

    pub fn with_arrival(mut self, arrival: RailTime) -> Self {
        self.arrival = Some(arrival);
        self
    }

    pub fn with_departure(mut self, departure: RailTime) -> Self {
        self.departure = Some(departure);
        self
    }

    /// Arrival, falling back to departure. Used to order stops.
    pub fn sort_time(&self) -> Option<RailTime> {
        self.arrival.or(self.departure)
    }
}

/// Lifecycle status of a timeline stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StopStatus {
    Scheduled,
}

impl StopStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StopStatus::Scheduled => "SCHEDULED",
        }
    }
}

/// A stop in a built timeline, with repaired times and derived metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineStop {
    pub stop_index: usize,
    pub station_code: StationCode,
    pub station_name: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub scheduled_arrival: Option<RailTime>,
    pub scheduled_departure: Option<RailTime>,
    pub day_offset: u32,
    /// Great-circle distance from the previous stop; `None` when unknown.
    pub segment_distance_km: Option<f64>,
    pub dwell_seconds: Option<i64>,
    pub segment_travel_seconds: Option<i64>,
    pub theoretical_speed_kmph: Option<f64>,
    pub status: StopStatus,
    pub train_type: Option<TrainType>,
    pub max_speed_kmph: f64,
}
