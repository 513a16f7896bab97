//! Lenient loaders for schedule, train and station JSON files.
//!
//! Source data is hand-maintained and inconsistent. A bad stop, train or
//! station is logged and dropped; only a file that is not JSON of the right
//! overall shape is an error.
//!
//! ```json
//! // schedules_clean.json
//! {"47154": [{"station_code": "FM", "arrival": "07:55:00", "departure": "07:57:00", "day": 1}]}
//! // trains.json
//! {"47154": {"type": "Passenger", "max_speed_kmph": 60, "name": "FM-SC MMTS"}}
//! // stations.json
//! {"FM": {"name": "Falaknuma", "lat": 17.3312, "lon": 78.4785}}
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{info, warn};

use super::error::FormatError;
use crate::domain::{
    Station, StationCode, StationDirectory, Stop, TrainMetadata, TrainNumber, TrainType,
    parse_lenient, service_day,
};
use crate::timeline::ScheduleInput;

/// A scalar field of whatever JSON type the file happened to use.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Lenient {
    Number(f64),
    Text(String),
    Other(Value),
}

impl Lenient {
    /// Numbers, and strings holding a number.
    fn as_f64(&self) -> Option<f64> {
        match self {
            Lenient::Number(n) => Some(*n),
            Lenient::Text(s) => s.trim().parse().ok(),
            Lenient::Other(_) => None,
        }
    }

    /// Only strings; any other type is logged and treated as missing.
    fn into_text(self, field: &'static str) -> Option<String> {
        match self {
            Lenient::Text(s) => Some(s),
            Lenient::Number(n) => {
                warn!(field, value = n, "expected a string, ignoring");
                None
            }
            Lenient::Other(v) => {
                warn!(field, value = %v, "expected a string, ignoring");
                None
            }
        }
    }
}

fn text(field: &'static str, value: Option<Lenient>) -> Option<String> {
    value.and_then(|v| v.into_text(field))
}

/// A coordinate, accepting numeric strings. Anything else is logged and dropped.
fn coordinate(field: &'static str, value: Option<&Lenient>) -> Option<f64> {
    let value = value?;
    match value.as_f64().filter(|v| v.is_finite()) {
        Some(v) => Some(v),
        None => {
            warn!(field, value = ?value, "unusable coordinate, ignoring");
            None
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawStop {
    station_code: Option<Lenient>,
    station: Option<Lenient>,
    arrival: Option<Lenient>,
    departure: Option<Lenient>,
    day: Option<Lenient>,
}

impl RawStop {
    /// Day of the run, counting from 1. Missing, zero and junk values mean day 1.
    fn day_offset(&self) -> u32 {
        match self.day.as_ref().and_then(Lenient::as_f64) {
            Some(d) if d >= 1.0 && d <= f64::from(u32::MAX) => d as u32,
            Some(d) if d != 0.0 => {
                warn!(day = d, "invalid day offset, assuming day 1");
                1
            }
            _ => 1,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawTrain {
    #[serde(rename = "type")]
    train_type: Option<Lenient>,
    max_speed_kmph: Option<Lenient>,
    max_speed: Option<Lenient>,
    name: Option<Lenient>,
}

#[derive(Debug, Default, Deserialize)]
struct RawStation {
    name: Option<Lenient>,
    station_name: Option<Lenient>,
    lat: Option<Lenient>,
    lon: Option<Lenient>,
}

/// Deserialize one record, logging and dropping it if it has the wrong shape.
fn record<T: DeserializeOwned>(kind: &'static str, key: &str, value: Value) -> Option<T> {
    match T::deserialize(value) {
        Ok(raw) => Some(raw),
        Err(e) => {
            warn!(kind, key, error = %e, "dropping malformed record");
            None
        }
    }
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Parse `schedules_clean.json`.
///
/// Stop times are anchored on `service_date` advanced by the stop's day
/// offset.
pub fn parse_schedule(
    json: &str,
    service_date: NaiveDate,
) -> Result<BTreeMap<TrainNumber, Vec<Stop>>, serde_json::Error> {
    let raw: BTreeMap<String, Vec<Value>> = serde_json::from_str(json)?;
    let mut schedule = BTreeMap::new();

    for (raw_number, raw_stops) in raw {
        let train_number = match TrainNumber::parse(&raw_number) {
            Ok(n) => n,
            Err(e) => {
                warn!(train = %raw_number, error = %e, "skipping train");
                continue;
            }
        };

        let stops: Vec<Stop> = raw_stops
            .into_iter()
            .filter_map(|value| record::<RawStop>("stop", &raw_number, value))
            .filter_map(|raw| convert_stop(&train_number, raw, service_date))
            .collect();
        schedule.insert(train_number, stops);
    }

    Ok(schedule)
}

fn convert_stop(train: &TrainNumber, raw: RawStop, service_date: NaiveDate) -> Option<Stop> {
    let day_offset = raw.day_offset();
    let Some(code) = non_empty(text("station_code", raw.station_code))
        .or_else(|| non_empty(text("station", raw.station)))
    else {
        warn!(%train, "dropping stop without station code");
        return None;
    };
    let code = match StationCode::parse_normalized(&code) {
        Ok(c) => c,
        Err(e) => {
            warn!(%train, station = %code, error = %e, "dropping stop");
            return None;
        }
    };
    let Some(date) = service_day(service_date, day_offset) else {
        warn!(%train, day_offset, "day offset out of calendar range, dropping stop");
        return None;
    };

    let mut stop = match Stop::new(code, day_offset) {
        Ok(s) => s,
        Err(e) => {
            warn!(%train, error = %e, "dropping stop");
            return None;
        }
    };
    stop.arrival = parse_lenient(text("arrival", raw.arrival).as_deref(), date);
    stop.departure = parse_lenient(text("departure", raw.departure).as_deref(), date);
    Some(stop)
}

/// Parse `trains.json`.
pub fn parse_trains(json: &str) -> Result<BTreeMap<TrainNumber, TrainMetadata>, serde_json::Error> {
    let raw: BTreeMap<String, Value> = serde_json::from_str(json)?;
    let mut trains = BTreeMap::new();

    for (raw_number, value) in raw {
        let Ok(train_number) = TrainNumber::parse(&raw_number) else {
            warn!(train = %raw_number, "skipping train metadata with invalid number");
            continue;
        };
        let Some(raw) = record::<RawTrain>("train", &raw_number, value) else {
            continue;
        };

        let usable = |v: &Option<Lenient>| {
            v.as_ref()
                .and_then(Lenient::as_f64)
                .filter(|s| s.is_finite() && *s > 0.0)
        };
        let meta = TrainMetadata {
            train_type: non_empty(text("type", raw.train_type)).map(|t| TrainType::parse(&t)),
            max_speed_kmph: usable(&raw.max_speed_kmph).or(usable(&raw.max_speed)),
            name: non_empty(text("name", raw.name)),
        };
        trains.insert(train_number, meta);
    }

    Ok(trains)
}

/// Parse `stations.json`.
pub fn parse_stations(json: &str) -> Result<StationDirectory, serde_json::Error> {
    let raw: BTreeMap<String, Value> = serde_json::from_str(json)?;
    let mut directory = StationDirectory::new();

    for (raw_code, value) in raw {
        let code = match StationCode::parse_normalized(&raw_code) {
            Ok(c) => c,
            Err(e) => {
                warn!(station = %raw_code, error = %e, "skipping station");
                continue;
            }
        };
        let Some(raw) = record::<RawStation>("station", &raw_code, value) else {
            continue;
        };
        directory.insert(Station {
            code,
            name: non_empty(text("name", raw.name))
                .or_else(|| non_empty(text("station_name", raw.station_name))),
            lat: coordinate("lat", raw.lat.as_ref()),
            lon: coordinate("lon", raw.lon.as_ref()),
        });
    }

    Ok(directory)
}

fn read(path: &Path) -> Result<String, FormatError> {
    std::fs::read_to_string(path).map_err(|e| FormatError::io(path, e))
}

/// Load stations from a file.
pub fn load_stations(path: &Path) -> Result<StationDirectory, FormatError> {
    parse_stations(&read(path)?).map_err(|e| FormatError::json(path, e))
}

/// Write stations back out in the same shape they are loaded from.
pub fn write_stations(path: &Path, stations: &StationDirectory) -> Result<(), FormatError> {
    let json = serde_json::to_string_pretty(stations).map_err(|e| FormatError::json(path, e))?;
    std::fs::write(path, json).map_err(|e| FormatError::io(path, e))
}

/// Load all three input files.
pub fn load_schedule_input(
    schedule_path: &Path,
    trains_path: &Path,
    stations_path: &Path,
    service_date: NaiveDate,
) -> Result<ScheduleInput, FormatError> {
    let schedule =
        parse_schedule(&read(schedule_path)?, service_date).map_err(|e| FormatError::json(schedule_path, e))?;
    let trains = parse_trains(&read(trains_path)?).map_err(|e| FormatError::json(trains_path, e))?;
    let stations = load_stations(stations_path)?;

    info!(
        trains = schedule.len(),
        catalogue = trains.len(),
        stations = stations.len(),
        "loaded schedule input"
    );

    Ok(ScheduleInput {
        schedule,
        trains,
        stations,
    })
}
