//! Timeline reconstruction for a single train.
//!
//! Raw stop lists are unordered and riddled with missing times. The builder
//! orders them, attaches station metadata, and then fills gaps in two scans:
//!
//! 1. A forward scan that projects each gap from the previous departure using
//!    the segment distance and the train's speed.
//! 2. A backward scan that projects leading gaps from the next arrival.
//!
//! Every inferred stop is given a fixed dwell. Finally dwell, segment travel
//! time and implied speed are derived for each stop.

use chrono::Duration;
use tracing::{debug, warn};

use super::config::TimelineConfig;
use crate::domain::{
    RailTime, StationDirectory, Stop, StopStatus, TimelineStop, TrainMetadata, TrainNumber,
};
use crate::geo::Coordinates;

/// Errors that abort the timeline of one train.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TimelineError {
    /// Neither the train nor the configuration provides a usable speed
    #[error("no usable speed for travel-time inference (got {0} km/h)")]
    InvalidSpeed(f64),

    /// An inferred time fell outside the representable date range
    #[error("time arithmetic overflowed at stop {stop_index}")]
    TimeOverflow { stop_index: usize },
}

/// The reconstructed timeline of one train.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainTimeline {
    pub train_number: TrainNumber,
    pub train_name: Option<String>,
    /// Stops in ascending `stop_index` order, starting at 0.
    pub stops: Vec<TimelineStop>,
}

impl TrainTimeline {
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }
}

/// Builds timelines for individual trains against shared station metadata.
pub struct TimelineBuilder<'a> {
    config: &'a TimelineConfig,
    stations: &'a StationDirectory,
}

impl<'a> TimelineBuilder<'a> {
    pub fn new(config: &'a TimelineConfig, stations: &'a StationDirectory) -> Self {
        Self { config, stations }
    }

    /// Build the timeline for one train.
    ///
    /// Returns `Ok(None)` for a train with no stops.
    pub fn build(
        &self,
        train_number: &TrainNumber,
        stops: &[Stop],
        meta: &TrainMetadata,
    ) -> Result<Option<TrainTimeline>, TimelineError> {
        if stops.is_empty() {
            warn!(train = %train_number, "skipping train with no stops");
            return Ok(None);
        }

        let speed = self.effective_speed(meta)?;
        let dwell = self.config.fixed_dwell();

        // Stable sort: equal keys keep input order
        let mut ordered: Vec<&Stop> = stops.iter().collect();
        ordered.sort_by_key(|s| (s.day_offset, s.sort_time()));

        let mut timeline: Vec<TimelineStop> = ordered
            .into_iter()
            .enumerate()
            .map(|(stop_index, stop)| self.attach_metadata(stop_index, stop, meta, speed))
            .collect();

        repair_single_sided(&mut timeline);
        fill_segment_distances(&mut timeline);
        forward_pass(&mut timeline, speed, dwell)?;
        backward_pass(&mut timeline, speed, dwell)?;
        derive_metrics(&mut timeline);

        let unresolved = timeline
            .iter()
            .filter(|s| s.scheduled_arrival.is_none())
            .count();
        debug!(
            train = %train_number,
            stops = timeline.len(),
            unresolved,
            speed_kmph = speed,
            "built timeline"
        );

        Ok(Some(TrainTimeline {
            train_number: train_number.clone(),
            train_name: meta.name.clone(),
            stops: timeline,
        }))
    }

    /// The train's own speed when usable, otherwise the configured default.
    fn effective_speed(&self, meta: &TrainMetadata) -> Result<f64, TimelineError> {
        let speed = meta
            .usable_speed()
            .unwrap_or(self.config.default_speed_kmph);
        if speed.is_finite() && speed > 0.0 {
            Ok(speed)
        } else {
            Err(TimelineError::InvalidSpeed(speed))
        }
    }

    fn attach_metadata(
        &self,
        stop_index: usize,
        stop: &Stop,
        meta: &TrainMetadata,
        speed: f64,
    ) -> TimelineStop {
        let station = self.stations.get(&stop.station_code);
        if station.is_none() {
            debug!(station = %stop.station_code, "station not in directory");
        }

        TimelineStop {
            stop_index,
            station_code: stop.station_code.clone(),
            station_name: station.and_then(|s| s.name.clone()),
            lat: station.and_then(|s| s.lat),
            lon: station.and_then(|s| s.lon),
            scheduled_arrival: stop.arrival,
            scheduled_departure: stop.departure,
            day_offset: stop.day_offset,
            segment_distance_km: None,
            dwell_seconds: None,
            segment_travel_seconds: None,
            theoretical_speed_kmph: None,
            status: StopStatus::Scheduled,
            train_type: meta.train_type.clone(),
            max_speed_kmph: speed,
        }
    }
}

fn coordinates(stop: &TimelineStop) -> Option<Coordinates> {
    Some(Coordinates::new(stop.lat?, stop.lon?))
}

/// Time to cover `distance_km` at `speed_kmph`, truncated to whole seconds.
fn travel_time(distance_km: f64, speed_kmph: f64, stop_index: usize) -> Result<Duration, TimelineError> {
    let secs = (distance_km * 3600.0 / speed_kmph) as i64;
    Duration::try_seconds(secs).ok_or(TimelineError::TimeOverflow { stop_index })
}

fn later(time: RailTime, by: Duration, stop_index: usize) -> Result<RailTime, TimelineError> {
    time.checked_add(by)
        .ok_or(TimelineError::TimeOverflow { stop_index })
}

fn earlier(time: RailTime, by: Duration, stop_index: usize) -> Result<RailTime, TimelineError> {
    time.checked_sub(by)
        .ok_or(TimelineError::TimeOverflow { stop_index })
}

/// Zero-dwell placeholder: a stop with one known time gets it on both sides.
fn repair_single_sided(stops: &mut [TimelineStop]) {
    for stop in stops.iter_mut() {
        match (stop.scheduled_arrival, stop.scheduled_departure) {
            (None, Some(dep)) => stop.scheduled_arrival = Some(dep),
            (Some(arr), None) => stop.scheduled_departure = Some(arr),
            _ => {}
        }
    }
}

fn fill_segment_distances(stops: &mut [TimelineStop]) {
    for idx in 1..stops.len() {
        let distance = match (coordinates(&stops[idx - 1]), coordinates(&stops[idx])) {
            (Some(prev), Some(here)) => Some(prev.distance_km(&here)),
            _ => None,
        };
        stops[idx].segment_distance_km = distance;
    }
}

/// Fill gaps from the previous departure, in ascending index order.
fn forward_pass(stops: &mut [TimelineStop], speed: f64, dwell: Duration) -> Result<(), TimelineError> {
    for idx in 0..stops.len() {
        match (stops[idx].scheduled_arrival, stops[idx].scheduled_departure) {
            (None, None) => {
                if idx == 0 {
                    continue;
                }
                let (Some(prev_departure), Some(distance)) = (
                    stops[idx - 1].scheduled_departure,
                    stops[idx].segment_distance_km,
                ) else {
                    continue;
                };
                let arrival = later(prev_departure, travel_time(distance, speed, idx)?, idx)?;
                stops[idx].scheduled_arrival = Some(arrival);
                stops[idx].scheduled_departure = Some(later(arrival, dwell, idx)?);
            }
            (Some(arrival), None) => {
                stops[idx].scheduled_departure = Some(later(arrival, dwell, idx)?);
            }
            (None, Some(departure)) => {
                stops[idx].scheduled_arrival = Some(earlier(departure, dwell, idx)?);
            }
            (Some(_), Some(_)) => {}
        }
    }
    Ok(())
}

/// Fill gaps the forward scan could not reach from the next arrival, in
/// descending index order.
fn backward_pass(stops: &mut [TimelineStop], speed: f64, dwell: Duration) -> Result<(), TimelineError> {
    for idx in (0..stops.len().saturating_sub(1)).rev() {
        if stops[idx].scheduled_arrival.is_some() {
            continue;
        }
        let (Some(next_arrival), Some(distance)) = (
            stops[idx + 1].scheduled_arrival,
            stops[idx + 1].segment_distance_km,
        ) else {
            continue;
        };
        let departure = earlier(next_arrival, travel_time(distance, speed, idx)?, idx)?;
        stops[idx].scheduled_departure = Some(departure);
        stops[idx].scheduled_arrival = Some(earlier(departure, dwell, idx)?);
    }
    Ok(())
}

fn derive_metrics(stops: &mut [TimelineStop]) {
    for idx in 0..stops.len() {
        let arrival = stops[idx].scheduled_arrival;

        stops[idx].dwell_seconds = match (arrival, stops[idx].scheduled_departure) {
            (Some(arr), Some(dep)) => Some(dep.signed_duration_since(arr).num_seconds()),
            _ => None,
        };

        let prev_departure = idx
            .checked_sub(1)
            .and_then(|prev| stops[prev].scheduled_departure);

        let (travel, speed) = match (stops[idx].segment_distance_km, prev_departure, arrival) {
            (Some(distance), Some(prev_dep), Some(arr)) => {
                let secs = arr.signed_duration_since(prev_dep).num_seconds();
                // Non-positive travel time has no meaningful speed
                let speed = (secs > 0).then(|| distance / (secs as f64 / 3600.0));
                (Some(secs), speed)
            }
            _ => (None, None),
        };
        stops[idx].segment_travel_seconds = travel;
        stops[idx].theoretical_speed_kmph = speed;
    }
}
