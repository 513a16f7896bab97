//! Labelled conflict pairs for offline policy training.
//!
//! Stops are grouped by station. Within a station, every ordered pair of
//! distinct rows whose arrivals fall within the conflict window becomes one
//! example, labelled by the precedence oracle.

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::config::ConflictConfig;
use super::oracle::{self, Contender};
use crate::domain::{RailTime, StationCode, TrainNumber};
use crate::timeline::TimelineRecord;

/// One labelled training example.
///
/// Field order is the column order of the CSV export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictPair {
    pub station_code: StationCode,
    pub train_a: TrainNumber,
    pub train_b: TrainNumber,
    pub priority_a: u8,
    pub priority_b: u8,
    pub speed_a: f64,
    pub speed_b: f64,
    pub time_a_min: u32,
    pub time_b_min: u32,
    pub dist_a_km: f64,
    pub dist_b_km: f64,
    pub station_capacity: usize,
    pub priority_diff: i16,
    pub speed_diff: f64,
    pub time_diff: i64,
    pub dist_diff: f64,
    /// 1 when train A should proceed first
    pub label: u8,
}

struct Candidate<'a> {
    record: &'a TimelineRecord,
    arrival: RailTime,
    contender: Contender,
    distance_km: f64,
}

impl<'a> Candidate<'a> {
    fn new(record: &'a TimelineRecord, arrival: RailTime) -> Self {
        let speed = finite_or_zero(Some(record.max_speed_kmph));
        Self {
            record,
            arrival,
            contender: Contender::new(record.train_type.as_ref(), speed, arrival.minute_of_day()),
            distance_km: finite_or_zero(record.segment_distance_km),
        }
    }
}

/// Missing or unusable numeric features contribute 0.0
fn finite_or_zero(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Build every labelled pair from an aggregated timeline.
///
/// Output is grouped by station code in ascending order. Within a station,
/// rows are taken in arrival order.
pub fn generate_pairs(records: &[TimelineRecord], config: &ConflictConfig) -> Vec<ConflictPair> {
    let mut by_station: BTreeMap<&StationCode, Vec<Candidate<'_>>> = BTreeMap::new();
    for record in records {
        // Rows without an arrival cannot conflict
        if let Some(arrival) = record.scheduled_arrival {
            by_station
                .entry(&record.station_code)
                .or_default()
                .push(Candidate::new(record, arrival));
        }
    }

    let mut pairs = Vec::new();
    for (station, mut group) in by_station {
        if group.len() < 2 {
            continue;
        }
        group.sort_by_key(|c| c.arrival);
        let capacity = config.station_capacity(group.len());
        let before = pairs.len();

        for (i, a) in group.iter().enumerate() {
            for (j, b) in group.iter().enumerate() {
                if i == j {
                    continue;
                }
                if a.contender.arrival_minute.abs_diff(b.contender.arrival_minute) > config.window_mins {
                    continue;
                }
                pairs.push(make_pair(station, a, b, capacity, config.speed_epsilon));
            }
        }

        debug!(
            station = %station,
            rows = group.len(),
            pairs = pairs.len() - before,
            "station pairs"
        );
    }

    info!(pairs = pairs.len(), "generated conflict pairs");
    pairs
}

fn make_pair(
    station: &StationCode,
    a: &Candidate<'_>,
    b: &Candidate<'_>,
    station_capacity: usize,
    speed_epsilon: f64,
) -> ConflictPair {
    let (ca, cb) = (&a.contender, &b.contender);
    ConflictPair {
        station_code: station.clone(),
        train_a: a.record.train_number.clone(),
        train_b: b.record.train_number.clone(),
        priority_a: ca.priority,
        priority_b: cb.priority,
        speed_a: ca.speed_kmph,
        speed_b: cb.speed_kmph,
        time_a_min: ca.arrival_minute,
        time_b_min: cb.arrival_minute,
        dist_a_km: a.distance_km,
        dist_b_km: b.distance_km,
        station_capacity,
        priority_diff: i16::from(ca.priority) - i16::from(cb.priority),
        speed_diff: ca.speed_kmph - cb.speed_kmph,
        time_diff: i64::from(ca.arrival_minute) - i64::from(cb.arrival_minute),
        dist_diff: a.distance_km - b.distance_km,
        label: oracle::label(ca, cb, speed_epsilon),
    }
}

/// Shuffle pairs reproducibly.
pub fn shuffle_pairs(pairs: &mut [ConflictPair], seed: u64) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    pairs.shuffle(&mut rng);
}
