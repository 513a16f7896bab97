//! Lookups over an aggregated timeline.

use serde::{Deserialize, Serialize};

use super::record::TimelineRecord;
use crate::domain::RailTime;

/// Default number of rows returned by a query.
pub const DEFAULT_LIMIT: usize = 15;

/// What to look up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleQuery {
    /// Exact train number
    Train(String),
    /// Station code, case-insensitive
    Station(String),
    /// Fragment of a station name, case-insensitive
    Junction(String),
}

impl ScheduleQuery {
    /// The search term with surrounding whitespace removed.
    pub fn term(&self) -> &str {
        match self {
            ScheduleQuery::Train(s) | ScheduleQuery::Station(s) | ScheduleQuery::Junction(s) => {
                s.trim()
            }
        }
    }

    pub fn is_blank(&self) -> bool {
        self.term().is_empty()
    }

    fn matches(&self, record: &TimelineRecord) -> bool {
        let term = self.term();
        match self {
            ScheduleQuery::Train(_) => record.train_number.as_str() == term,
            ScheduleQuery::Station(_) => record.station_code.as_str().eq_ignore_ascii_case(term),
            ScheduleQuery::Junction(_) => record
                .station_name
                .as_deref()
                .is_some_and(|name| name.to_lowercase().contains(&term.to_lowercase())),
        }
    }
}

/// Matching records in their original order, at most `limit` of them.
pub fn query<'a>(
    records: &'a [TimelineRecord],
    query: &ScheduleQuery,
    limit: usize,
) -> Vec<&'a TimelineRecord> {
    records
        .iter()
        .filter(|r| query.matches(r))
        .take(limit)
        .collect()
}

/// Display projection of a timeline record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub train_number: String,
    pub train_name: Option<String>,
    pub station_code: String,
    pub station_name: Option<String>,
    /// `HH:MM`, or `NA` when unknown
    pub scheduled_arrival: String,
    pub scheduled_departure: String,
}

fn display_time(time: Option<RailTime>) -> String {
    time.map_or_else(|| "NA".to_string(), |t| t.to_string())
}

impl From<&TimelineRecord> for ScheduleRow {
    fn from(record: &TimelineRecord) -> Self {
        Self {
            train_number: record.train_number.to_string(),
            train_name: record.train_name.clone(),
            station_code: record.station_code.to_string(),
            station_name: record.station_name.clone(),
            scheduled_arrival: display_time(record.scheduled_arrival),
            scheduled_departure: display_time(record.scheduled_departure),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{StationCode, StopStatus, TrainNumber};
    use chrono::NaiveDate;

    fn record(train: &str, idx: usize, code: &str, name: Option<&str>, arr: Option<&str>) -> TimelineRecord {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        TimelineRecord {
            train_number: TrainNumber::parse(train).unwrap(),
            stop_index: idx,
            station_code: StationCode::parse(code).unwrap(),
            station_name: name.map(str::to_string),
            lat: None,
            lon: None,
            scheduled_arrival: arr.map(|s| RailTime::parse_clock(s, date).unwrap()),
            scheduled_departure: None,
            day_offset: 1,
            segment_distance_km: None,
            dwell_seconds: None,
            segment_travel_seconds: None,
            theoretical_speed_kmph: None,
            status: StopStatus::Scheduled,
            train_type: None,
            max_speed_kmph: 60.0,
            train_name: None,
        }
    }

    fn records() -> Vec<TimelineRecord> {
        vec![
            record("12760", 0, "SC", Some("Secunderabad Jn"), Some("08:35")),
            record("12760", 1, "KZJ", Some("Kazipet Jn"), Some("10:10")),
            record("47154", 0, "FM", Some("Falaknuma"), Some("07:55")),
            record("47154", 1, "SC", Some("Secunderabad Jn"), None),
            record("47154", 2, "XX-UNK", None, None),
        ]
    }

    #[test]
    fn by_train_is_exact() {
        let records = records();
        let hits = query(&records, &ScheduleQuery::Train("47154".into()), DEFAULT_LIMIT);
        assert_eq!(hits.len(), 3);

        let hits = query(&records, &ScheduleQuery::Train("4715".into()), DEFAULT_LIMIT);
        assert!(hits.is_empty());
    }

    #[test]
    fn by_station_ignores_case() {
        let records = records();
        let hits = query(&records, &ScheduleQuery::Station(" sc ".into()), DEFAULT_LIMIT);

        let trains: Vec<&str> = hits.iter().map(|r| r.train_number.as_str()).collect();
        assert_eq!(trains, vec!["12760", "47154"]);

        // Codes match whole, not by prefix
        let hits = query(&records, &ScheduleQuery::Station("S".into()), DEFAULT_LIMIT);
        assert!(hits.is_empty());
    }

    #[test]
    fn by_junction_matches_name_fragment() {
        let records = records();
        let hits = query(&records, &ScheduleQuery::Junction("JN".into()), DEFAULT_LIMIT);
        assert_eq!(hits.len(), 3);

        // Nameless rows never match
        let hits = query(&records, &ScheduleQuery::Junction("x".into()), DEFAULT_LIMIT);
        assert!(hits.is_empty());
    }

    #[test]
    fn limit_is_respected() {
        let records = records();
        let hits = query(&records, &ScheduleQuery::Train("47154".into()), 2);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[1].stop_index, 1);
    }

    #[test]
    fn blank_terms() {
        assert!(ScheduleQuery::Station("  ".into()).is_blank());
        assert!(!ScheduleQuery::Junction("Kazi".into()).is_blank());
    }

    #[test]
    fn rows_format_times() {
        let records = records();
        let row = ScheduleRow::from(&records[0]);
        assert_eq!(row.scheduled_arrival, "08:35");
        assert_eq!(row.scheduled_departure, "NA");
        assert_eq!(row.station_code, "SC");
    }
}
