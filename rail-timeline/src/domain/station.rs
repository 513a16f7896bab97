//! Station codes and the station directory.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geo::Coordinates;

/// Maximum length of a station code, including dummy prefixes like `XX-`.
const MAX_CODE_LEN: usize = 16;

/// Error returned when parsing an invalid station code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid station code: {reason}")]
pub struct InvalidStationCode {
    reason: &'static str,
}

/// A station code such as `NDLS` or `XX-BECE`.
///
/// Codes are uppercase ASCII letters, digits and hyphens. This type guarantees
/// that any `StationCode` value is valid by construction.
///
/// # Examples
///
/// ```
/// use rail_timeline::domain::StationCode;
///
/// let hyb = StationCode::parse("HYB").unwrap();
/// assert_eq!(hyb.as_str(), "HYB");
///
/// // Lowercase is rejected by `parse` but accepted by `parse_normalized`
/// assert!(StationCode::parse("hyb").is_err());
/// assert_eq!(StationCode::parse_normalized(" hyb ").unwrap(), hyb);
///
/// assert!(StationCode::parse("").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StationCode(String);

impl StationCode {
    /// Parse a station code from a string.
    pub fn parse(s: &str) -> Result<Self, InvalidStationCode> {
        if s.is_empty() {
            return Err(InvalidStationCode {
                reason: "must not be empty",
            });
        }

        if s.len() > MAX_CODE_LEN {
            return Err(InvalidStationCode {
                reason: "too long",
            });
        }

        if !s
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'-')
        {
            return Err(InvalidStationCode {
                reason: "must be uppercase ASCII letters, digits or '-'",
            });
        }

        Ok(StationCode(s.to_string()))
    }

    /// Parse after trimming whitespace and uppercasing.
    pub fn parse_normalized(s: &str) -> Result<Self, InvalidStationCode> {
        Self::parse(&s.trim().to_ascii_uppercase())
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Placeholder codes used in the source data for unnamed halts.
    pub fn is_dummy(&self) -> bool {
        self.0.starts_with("XX-") || self.0.starts_with("YY-")
    }
}

impl TryFrom<String> for StationCode {
    type Error = InvalidStationCode;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<StationCode> for String {
    fn from(value: StationCode) -> Self {
        value.0
    }
}

impl fmt::Debug for StationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StationCode({})", self.0)
    }
}

impl fmt::Display for StationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Static metadata for one station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub code: StationCode,
    pub name: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl Station {
    pub fn new(code: StationCode) -> Self {
        Self {
            code,
            name: None,
            lat: None,
            lon: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_coordinates(mut self, lat: f64, lon: f64) -> Self {
        self.lat = Some(lat);
        self.lon = Some(lon);
        self
    }

    /// Usable coordinates, present only when both latitude and longitude are.
    pub fn coordinates(&self) -> Option<Coordinates> {
        Some(Coordinates::new(self.lat?, self.lon?))
    }
}

/// All known stations, keyed by code.
///
/// Backed by an ordered map so iteration (and anything fingerprinted from it)
/// is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StationDirectory(BTreeMap<StationCode, Station>);

impl StationDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a station, replacing any previous entry with the same code.
    pub fn insert(&mut self, station: Station) -> Option<Station> {
        self.0.insert(station.code.clone(), station)
    }

    pub fn get(&self, code: &StationCode) -> Option<&Station> {
        self.0.get(code)
    }

    pub fn get_mut(&mut self, code: &StationCode) -> Option<&mut Station> {
        self.0.get_mut(code)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Stations in code order.
    pub fn iter(&self) -> impl Iterator<Item = &Station> {
        self.0.values()
    }

    /// Codes of stations lacking usable coordinates, in code order.
    pub fn missing_coordinates(&self) -> Vec<StationCode> {
        self.0
            .values()
            .filter(|s| s.coordinates().is_none())
            .map(|s| s.code.clone())
            .collect()
    }
}

impl FromIterator<Station> for StationDirectory {
    fn from_iter<I: IntoIterator<Item = Station>>(iter: I) -> Self {
        let mut directory = Self::new();
        for station in iter {
            directory.insert(station);
        }
        directory
    }
}
