//! Timeline simulation across a whole schedule.
//!
//! Each train is built independently. A train that fails is logged and
//! reported, and the rest of the batch carries on.

use std::collections::BTreeMap;
use std::thread;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use super::builder::{TimelineBuilder, TimelineError, TrainTimeline};
use super::config::TimelineConfig;
use super::quality;
use super::record::TimelineRecord;
use crate::domain::{StationDirectory, Stop, TrainMetadata, TrainNumber};

/// Everything needed to simulate a schedule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleInput {
    /// Raw stops per train.
    pub schedule: BTreeMap<TrainNumber, Vec<Stop>>,
    /// Train catalogue. Trains missing here get empty metadata.
    pub trains: BTreeMap<TrainNumber, TrainMetadata>,
    pub stations: StationDirectory,
}

/// A train excluded from the output because its timeline could not be built.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedTrain {
    pub train_number: TrainNumber,
    pub error: TimelineError,
}

/// Outcome of a batch simulation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationReport {
    /// Built timelines, ordered by train number.
    pub timelines: Vec<TrainTimeline>,
    pub skipped: Vec<SkippedTrain>,
    /// Trains with no stops.
    pub empty: Vec<TrainNumber>,
}

impl SimulationReport {
    /// All stops of all trains, sorted by `(train_number, stop_index)`.
    pub fn records(&self) -> Vec<TimelineRecord> {
        let mut records: Vec<TimelineRecord> =
            self.timelines.iter().flat_map(TrainTimeline::records).collect();
        records.sort_by(|a, b| {
            a.train_number
                .cmp(&b.train_number)
                .then(a.stop_index.cmp(&b.stop_index))
        });
        records
    }

    pub fn stop_count(&self) -> usize {
        self.timelines.iter().map(TrainTimeline::len).sum()
    }

    fn extend(&mut self, other: SimulationReport) {
        self.timelines.extend(other.timelines);
        self.skipped.extend(other.skipped);
        self.empty.extend(other.empty);
    }
}

/// Simulate every train in the schedule on the current thread.
pub fn simulate_schedule(input: &ScheduleInput, config: &TimelineConfig) -> SimulationReport {
    let trains: Vec<(&TrainNumber, &Vec<Stop>)> = input.schedule.iter().collect();
    let report = simulate_trains(&trains, input, config);
    log_summary(&report);
    report
}

/// Simulate every train, spreading trains over `workers` threads.
///
/// Trains are split into contiguous chunks in train-number order and the
/// chunk reports are concatenated in the same order, so the result is
/// identical to [`simulate_schedule`].
pub fn simulate_schedule_parallel(
    input: &ScheduleInput,
    config: &TimelineConfig,
    workers: usize,
) -> SimulationReport {
    let trains: Vec<(&TrainNumber, &Vec<Stop>)> = input.schedule.iter().collect();
    let chunk_size = trains.len().div_ceil(workers.max(1)).max(1);

    let report = thread::scope(|scope| {
        let handles: Vec<_> = trains
            .chunks(chunk_size)
            .map(|chunk| scope.spawn(move || simulate_trains(chunk, input, config)))
            .collect();

        let mut report = SimulationReport::default();
        for handle in handles {
            match handle.join() {
                Ok(partial) => report.extend(partial),
                Err(panic) => std::panic::resume_unwind(panic),
            }
        }
        report
    });

    log_summary(&report);
    report
}

fn simulate_trains(
    trains: &[(&TrainNumber, &Vec<Stop>)],
    input: &ScheduleInput,
    config: &TimelineConfig,
) -> SimulationReport {
    let builder = TimelineBuilder::new(config, &input.stations);
    let no_metadata = TrainMetadata::default();
    let mut report = SimulationReport::default();

    for &(train_number, stops) in trains {
        let meta = input.trains.get(train_number).unwrap_or(&no_metadata);

        match builder.build(train_number, stops, meta) {
            Ok(Some(timeline)) => {
                let issues = quality::inspect(&timeline);
                if !issues.is_empty() {
                    warn!(
                        train = %train_number,
                        issues = issues.len(),
                        first = %issues[0],
                        "timeline has data quality issues"
                    );
                }
                report.timelines.push(timeline);
            }
            Ok(None) => report.empty.push(train_number.clone()),
            Err(err) => {
                error!(train = %train_number, error = %err, "failed to simulate train");
                report.skipped.push(SkippedTrain {
                    train_number: train_number.clone(),
                    error: err,
                });
            }
        }
    }

    report
}

fn log_summary(report: &SimulationReport) {
    info!(
        trains = report.timelines.len(),
        stops = report.stop_count(),
        skipped = report.skipped.len(),
        empty = report.empty.len(),
        "simulation complete"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RailTime, Station, StationCode, TrainType};
    use chrono::NaiveDate;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    fn code(s: &str) -> StationCode {
        StationCode::parse(s).unwrap()
    }

    fn train(s: &str) -> TrainNumber {
        TrainNumber::parse(s).unwrap()
    }

    fn stop(station: &str, arr: Option<&str>, dep: Option<&str>) -> Stop {
        let mut stop = Stop::new(code(station), 1).unwrap();
        stop.arrival = arr.map(|s| RailTime::parse_clock(s, date()).unwrap());
        stop.departure = dep.map(|s| RailTime::parse_clock(s, date()).unwrap());
        stop
    }

    fn input() -> ScheduleInput {
        let stations: StationDirectory = [
            Station::new(code("FM")).with_name("Falaknuma").with_coordinates(17.3312, 78.4785),
            Station::new(code("HYB")).with_name("Hyderabad Deccan").with_coordinates(17.3924, 78.4676),
            Station::new(code("SC")).with_name("Secunderabad Jn").with_coordinates(17.4337, 78.5016),
        ]
        .into_iter()
        .collect();

        let mut schedule = BTreeMap::new();
        schedule.insert(
            train("47154"),
            vec![
                stop("HYB", None, None),
                stop("FM", Some("07:55"), Some("07:57")),
                stop("SC", Some("08:40"), Some("08:42")),
            ],
        );
        schedule.insert(train("12760"), vec![stop("SC", Some("08:35"), Some("08:45"))]);
        schedule.insert(train("00000"), vec![]);
        schedule.insert(train("99999"), vec![stop("FM", Some("06:00"), None)]);

        let mut trains = BTreeMap::new();
        trains.insert(train("12760"), TrainMetadata::new(Some(TrainType::Express), Some(110.0)));
        // Unusable speed with an unusable default below fails this train
        trains.insert(train("99999"), TrainMetadata::new(None, Some(-1.0)));

        ScheduleInput {
            schedule,
            trains,
            stations,
        }
    }

    #[test]
    fn empty_and_failing_trains_do_not_stop_the_batch() {
        let config = TimelineConfig::default()
            .with_service_date(date())
            .with_default_speed(f64::NAN);

        let report = simulate_schedule(&input(), &config);

        // Only 12760 has a usable speed of its own
        let built: Vec<&str> = report.timelines.iter().map(|t| t.train_number.as_str()).collect();
        assert_eq!(built, vec!["12760"]);
        assert_eq!(report.empty, vec![train("00000")]);

        let skipped: Vec<&str> = report.skipped.iter().map(|s| s.train_number.as_str()).collect();
        assert_eq!(skipped, vec!["47154", "99999"]);
        assert!(matches!(report.skipped[0].error, TimelineError::InvalidSpeed(_)));
    }

    #[test]
    fn records_sorted_by_train_then_index() {
        let config = TimelineConfig::default().with_service_date(date());
        let report = simulate_schedule(&input(), &config);

        let keys: Vec<(String, usize)> = report
            .records()
            .iter()
            .map(|r| (r.train_number.to_string(), r.stop_index))
            .collect();

        assert_eq!(
            keys,
            vec![
                ("12760".to_string(), 0),
                ("47154".to_string(), 0),
                ("47154".to_string(), 1),
                ("47154".to_string(), 2),
                ("99999".to_string(), 0),
            ]
        );
        assert_eq!(report.stop_count(), 5);
    }

    #[test]
    fn leading_gap_is_filled_backwards() {
        let config = TimelineConfig::default().with_service_date(date());
        let report = simulate_schedule(&input(), &config);

        let mmts = report
            .timelines
            .iter()
            .find(|t| t.train_number.as_str() == "47154")
            .unwrap();

        // Sorted first (no time), then filled from the FM arrival
        assert_eq!(mmts.stops[0].station_code.as_str(), "HYB");
        let hyb_dep = mmts.stops[0].scheduled_departure.unwrap();
        let fm_arr = mmts.stops[1].scheduled_arrival.unwrap();
        assert!(hyb_dep < fm_arr);
        assert_eq!(mmts.stops[0].dwell_seconds, Some(120));
        assert_eq!(mmts.stops[0].station_name.as_deref(), Some("Hyderabad Deccan"));
    }

    #[test]
    fn parallel_matches_sequential() {
        let config = TimelineConfig::default().with_service_date(date());
        let input = input();

        let sequential = simulate_schedule(&input, &config);
        for workers in [0, 1, 2, 3, 8] {
            let parallel = simulate_schedule_parallel(&input, &config, workers);
            assert_eq!(parallel, sequential, "workers = {workers}");
        }
    }

    #[test]
    fn empty_schedule() {
        let report = simulate_schedule(&ScheduleInput::default(), &TimelineConfig::default());
        assert!(report.timelines.is_empty());
        assert!(report.records().is_empty());

        let report = simulate_schedule_parallel(&ScheduleInput::default(), &TimelineConfig::default(), 4);
        assert_eq!(report, SimulationReport::default());
    }
}
