//! Post-build checks on timelines.
//!
//! The builder never fixes inconsistent source data, so a raw departure that
//! precedes its arrival survives as negative dwell. These checks surface such
//! rows without altering them.

use std::fmt;

use super::builder::TrainTimeline;
use crate::domain::StationCode;

/// A single suspect row in a built timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QualityIssue {
    /// Departure earlier than arrival
    NegativeDwell { stop_index: usize, dwell_seconds: i64 },

    /// Arrival at or before the previous departure over a known distance
    NonPositiveTravel {
        stop_index: usize,
        travel_seconds: i64,
    },

    /// First stop index is not 0
    IndexNotZeroBased { first: usize },

    /// Stop index does not increase
    IndexNotIncreasing { previous: usize, stop_index: usize },

    /// Neither arrival nor departure could be inferred
    NoTimes {
        stop_index: usize,
        station_code: StationCode,
    },
}

impl fmt::Display for QualityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualityIssue::NegativeDwell {
                stop_index,
                dwell_seconds,
            } => write!(f, "stop {stop_index}: negative dwell of {dwell_seconds}s"),
            QualityIssue::NonPositiveTravel {
                stop_index,
                travel_seconds,
            } => write!(f, "stop {stop_index}: travel time of {travel_seconds}s"),
            QualityIssue::IndexNotZeroBased { first } => {
                write!(f, "first stop index is {first}, expected 0")
            }
            QualityIssue::IndexNotIncreasing {
                previous,
                stop_index,
            } => write!(f, "stop index {stop_index} follows {previous}"),
            QualityIssue::NoTimes {
                stop_index,
                station_code,
            } => write!(f, "stop {stop_index} ({station_code}): no times"),
        }
    }
}

/// Check one timeline. An empty result means nothing suspect was found.
pub fn inspect(timeline: &TrainTimeline) -> Vec<QualityIssue> {
    let mut issues = Vec::new();

    if let Some(first) = timeline.stops.first()
        && first.stop_index != 0
    {
        issues.push(QualityIssue::IndexNotZeroBased {
            first: first.stop_index,
        });
    }

    for pair in timeline.stops.windows(2) {
        if pair[1].stop_index <= pair[0].stop_index {
            issues.push(QualityIssue::IndexNotIncreasing {
                previous: pair[0].stop_index,
                stop_index: pair[1].stop_index,
            });
        }
    }

    for stop in &timeline.stops {
        if let Some(dwell_seconds) = stop.dwell_seconds
            && dwell_seconds < 0
        {
            issues.push(QualityIssue::NegativeDwell {
                stop_index: stop.stop_index,
                dwell_seconds,
            });
        }

        if stop.segment_distance_km.is_some()
            && let Some(travel_seconds) = stop.segment_travel_seconds
            && travel_seconds <= 0
        {
            issues.push(QualityIssue::NonPositiveTravel {
                stop_index: stop.stop_index,
                travel_seconds,
            });
        }

        if stop.scheduled_arrival.is_none() && stop.scheduled_departure.is_none() {
            issues.push(QualityIssue::NoTimes {
                stop_index: stop.stop_index,
                station_code: stop.station_code.clone(),
            });
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RailTime, StopStatus, TimelineStop, TrainNumber};
    use chrono::NaiveDate;

    fn stop(idx: usize, arr: Option<&str>, dep: Option<&str>) -> TimelineStop {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let time = |s: &str| RailTime::parse_clock(s, date).unwrap();
        let arrival = arr.map(time);
        let departure = dep.map(time);
        TimelineStop {
            stop_index: idx,
            station_code: StationCode::parse("SC").unwrap(),
            station_name: None,
            lat: None,
            lon: None,
            scheduled_arrival: arrival,
            scheduled_departure: departure,
            day_offset: 1,
            segment_distance_km: None,
            dwell_seconds: arrival
                .zip(departure)
                .map(|(a, d)| d.signed_duration_since(a).num_seconds()),
            segment_travel_seconds: None,
            theoretical_speed_kmph: None,
            status: StopStatus::Scheduled,
            train_type: None,
            max_speed_kmph: 60.0,
        }
    }

    fn timeline(stops: Vec<TimelineStop>) -> TrainTimeline {
        TrainTimeline {
            train_number: TrainNumber::parse("12760").unwrap(),
            train_name: None,
            stops,
        }
    }

    #[test]
    fn clean_timeline_has_no_issues() {
        let t = timeline(vec![
            stop(0, Some("07:55"), Some("07:57")),
            stop(1, Some("09:37"), Some("09:39")),
        ]);
        assert!(inspect(&t).is_empty());
    }

    #[test]
    fn flags_negative_dwell() {
        let t = timeline(vec![stop(0, Some("08:10"), Some("08:00"))]);
        assert_eq!(
            inspect(&t),
            vec![QualityIssue::NegativeDwell {
                stop_index: 0,
                dwell_seconds: -600
            }]
        );
    }

    #[test]
    fn flags_non_positive_travel_only_with_distance() {
        let mut with_distance = stop(1, Some("08:00"), Some("08:02"));
        with_distance.segment_distance_km = Some(12.0);
        with_distance.segment_travel_seconds = Some(0);

        let mut without_distance = stop(2, Some("08:00"), Some("08:02"));
        without_distance.segment_travel_seconds = Some(-60);

        let t = timeline(vec![
            stop(0, Some("08:00"), Some("08:00")),
            with_distance,
            without_distance,
        ]);

        assert_eq!(
            inspect(&t),
            vec![QualityIssue::NonPositiveTravel {
                stop_index: 1,
                travel_seconds: 0
            }]
        );
    }

    #[test]
    fn flags_index_problems() {
        let t = timeline(vec![
            stop(1, Some("08:00"), Some("08:02")),
            stop(1, Some("09:00"), Some("09:02")),
        ]);

        let issues = inspect(&t);
        assert!(issues.contains(&QualityIssue::IndexNotZeroBased { first: 1 }));
        assert!(issues.contains(&QualityIssue::IndexNotIncreasing {
            previous: 1,
            stop_index: 1
        }));
    }

    #[test]
    fn flags_unresolved_stops() {
        let t = timeline(vec![stop(0, None, None)]);
        let issues = inspect(&t);

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].to_string(), "stop 0 (SC): no times");
    }
}
