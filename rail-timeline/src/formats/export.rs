//! Timeline and conflict-pair export.
//!
//! The format is chosen from the file extension: `.csv` gets a CSV file with
//! a header row, anything else a JSON array of records.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use tracing::info;

use super::error::FormatError;
use crate::conflict::ConflictPair;
use crate::timeline::TimelineRecord;

/// Tabular file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Json,
}

impl TableFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => TableFormat::Csv,
            _ => TableFormat::Json,
        }
    }
}

fn create(path: &Path) -> Result<BufWriter<File>, FormatError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| FormatError::io(path, e))?;
    }
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| FormatError::io(path, e))
}

fn open(path: &Path) -> Result<BufReader<File>, FormatError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|e| FormatError::io(path, e))
}

fn write_csv<W: Write, T: serde::Serialize>(writer: W, rows: &[T]) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write timeline records, choosing the format from the extension.
pub fn write_timeline(path: &Path, records: &[TimelineRecord]) -> Result<(), FormatError> {
    let mut writer = create(path)?;
    match TableFormat::from_path(path) {
        TableFormat::Csv => write_csv(&mut writer, records).map_err(|e| FormatError::csv(path, e))?,
        TableFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, records).map_err(|e| FormatError::json(path, e))?
        }
    }
    writer.flush().map_err(|e| FormatError::io(path, e))?;

    info!(path = %path.display(), rows = records.len(), "saved timeline");
    Ok(())
}

/// Read timeline records written by [`write_timeline`].
pub fn read_timeline(path: &Path) -> Result<Vec<TimelineRecord>, FormatError> {
    let reader = open(path)?;
    match TableFormat::from_path(path) {
        TableFormat::Csv => csv::Reader::from_reader(reader)
            .deserialize()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| FormatError::csv(path, e)),
        TableFormat::Json => serde_json::from_reader(reader).map_err(|e| FormatError::json(path, e)),
    }
}

/// Write labelled pairs as CSV.
pub fn write_pairs_csv(path: &Path, pairs: &[ConflictPair]) -> Result<(), FormatError> {
    let mut writer = create(path)?;
    write_csv(&mut writer, pairs).map_err(|e| FormatError::csv(path, e))?;
    writer.flush().map_err(|e| FormatError::io(path, e))?;

    info!(path = %path.display(), rows = pairs.len(), "saved conflict pairs");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conflict::{ConflictConfig, generate_pairs};
    use crate::domain::{RailTime, StationCode, StopStatus, TrainNumber, TrainType};
    use chrono::NaiveDate;
    use std::path::PathBuf;

    fn records() -> Vec<TimelineRecord> {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let time = |s: &str| RailTime::parse_clock(s, date).unwrap();
        vec![
            TimelineRecord {
                train_number: TrainNumber::parse("47154").unwrap(),
                stop_index: 0,
                station_code: StationCode::parse("FM").unwrap(),
                station_name: Some("Falaknuma".into()),
                lat: Some(17.3312),
                lon: Some(78.4785),
                scheduled_arrival: Some(time("07:55")),
                scheduled_departure: Some(time("07:57")),
                day_offset: 1,
                segment_distance_km: None,
                dwell_seconds: Some(120),
                segment_travel_seconds: None,
                theoretical_speed_kmph: None,
                status: StopStatus::Scheduled,
                train_type: Some(TrainType::Passenger),
                max_speed_kmph: 60.0,
                train_name: Some("FM-SC MMTS".into()),
            },
            TimelineRecord {
                train_number: TrainNumber::parse("12760").unwrap(),
                stop_index: 0,
                station_code: StationCode::parse("FM").unwrap(),
                station_name: None,
                lat: None,
                lon: None,
                scheduled_arrival: Some(time("08:00")),
                scheduled_departure: None,
                day_offset: 1,
                segment_distance_km: Some(6.9),
                dwell_seconds: None,
                segment_travel_seconds: Some(-60),
                theoretical_speed_kmph: None,
                status: StopStatus::Scheduled,
                train_type: None,
                max_speed_kmph: 110.0,
                train_name: None,
            },
        ]
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(TableFormat::from_path(&PathBuf::from("t.csv")), TableFormat::Csv);
        assert_eq!(TableFormat::from_path(&PathBuf::from("t.CSV")), TableFormat::Csv);
        assert_eq!(TableFormat::from_path(&PathBuf::from("t.json")), TableFormat::Json);
        assert_eq!(TableFormat::from_path(&PathBuf::from("timeline")), TableFormat::Json);
    }

    #[test]
    fn csv_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("timeline.csv");

        write_timeline(&path, &records()).unwrap();
        let loaded = read_timeline(&path).unwrap();

        assert_eq!(loaded, records());

        let text = std::fs::read_to_string(&path).unwrap();
        let header = text.lines().next().unwrap();
        assert!(header.starts_with("train_number,stop_index,station_code,station_name,lat,lon"));
        assert!(text.contains("2024-03-15T07:55:00"));
        assert!(text.contains("SCHEDULED"));
    }

    #[test]
    fn json_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("timeline.json");

        write_timeline(&path, &records()).unwrap();
        assert_eq!(read_timeline(&path).unwrap(), records());
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_timeline(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, FormatError::Io { .. }));
    }

    #[test]
    fn pairs_csv_has_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pairs.csv");
        let pairs = generate_pairs(&records(), &ConflictConfig::default());
        assert_eq!(pairs.len(), 2);

        write_pairs_csv(&path, &pairs).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(&headers[0], "station_code");
        assert_eq!(&headers[headers.len() - 1], "label");

        let rows: Vec<ConflictPair> = reader.deserialize().collect::<Result<_, _>>().unwrap();
        assert_eq!(rows, pairs);
    }
}
