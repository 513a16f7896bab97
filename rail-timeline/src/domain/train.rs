//! Train identity and metadata.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an invalid train number.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid train number: {reason}")]
pub struct InvalidTrainNumber {
    reason: &'static str,
}

/// A train number such as `12723` or `47154`.
///
/// Kept as a string: some numbers carry leading zeros or letter suffixes.
///
/// ```
/// use rail_timeline::domain::TrainNumber;
///
/// let n = TrainNumber::parse(" 47154 ").unwrap();
/// assert_eq!(n.as_str(), "47154");
/// assert!(TrainNumber::parse("").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TrainNumber(String);

impl TrainNumber {
    /// Parse a train number, trimming surrounding whitespace.
    pub fn parse(s: &str) -> Result<Self, InvalidTrainNumber> {
        let s = s.trim();
        if s.is_empty() {
            return Err(InvalidTrainNumber {
                reason: "must not be empty",
            });
        }
        if s.chars().any(char::is_whitespace) {
            return Err(InvalidTrainNumber {
                reason: "must not contain whitespace",
            });
        }
        Ok(TrainNumber(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TrainNumber {
    type Error = InvalidTrainNumber;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TrainNumber> for String {
    fn from(value: TrainNumber) -> Self {
        value.0
    }
}

impl fmt::Debug for TrainNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TrainNumber({})", self.0)
    }
}

impl fmt::Display for TrainNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Service category of a train.
///
/// Recognised categories parse case-insensitively; anything else is kept
/// verbatim as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TrainType {
    Express,
    Mail,
    Passenger,
    Freight,
    Other(String),
}

impl TrainType {
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "express" => TrainType::Express,
            "mail" => TrainType::Mail,
            "passenger" => TrainType::Passenger,
            "freight" => TrainType::Freight,
            _ => TrainType::Other(s.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TrainType::Express => "Express",
            TrainType::Mail => "Mail",
            TrainType::Passenger => "Passenger",
            TrainType::Freight => "Freight",
            TrainType::Other(s) => s,
        }
    }
}

impl From<String> for TrainType {
    fn from(value: String) -> Self {
        TrainType::parse(&value)
    }
}

impl From<TrainType> for String {
    fn from(value: TrainType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for TrainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-train metadata from the train catalogue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainMetadata {
    pub train_type: Option<TrainType>,
    pub max_speed_kmph: Option<f64>,
    pub name: Option<String>,
}

impl TrainMetadata {
    pub fn new(train_type: Option<TrainType>, max_speed_kmph: Option<f64>) -> Self {
        Self {
            train_type,
            max_speed_kmph,
            name: None,
        }
    }

    /// The configured maximum speed, if it is usable for travel-time inference.
    ///
    /// Zero, negative and non-finite values count as unset.
    pub fn usable_speed(&self) -> Option<f64> {
        self.max_speed_kmph.filter(|v| v.is_finite() && *v > 0.0)
    }
}
