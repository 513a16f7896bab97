//! Date-aware timetable times.
//!
//! Raw schedules carry times as "HH:MM:SS" strings plus a day offset counted
//! from the train's origin day. This module anchors them on a service date so
//! that overnight runs order and subtract correctly.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// Fully-dated formats accepted in raw schedule data, tried in order.
const DATED_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%d-%m-%Y %H:%M:%S",
];

/// A date-aware time for timetable stops, with second precision.
///
/// Two stops at "01:30" may be on different days of a long-distance run, so
/// every time carries its calendar date.
///
/// # Examples
///
/// ```
/// use rail_timeline::domain::RailTime;
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
/// let time = RailTime::parse_clock("14:30:15", date).unwrap();
/// assert_eq!(time.to_string(), "14:30");
/// assert_eq!(time.to_iso(), "2024-03-15T14:30:15");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct RailTime {
    date: NaiveDate,
    time: NaiveTime,
}

impl RailTime {
    /// Create a new RailTime from date and time components.
    pub fn new(date: NaiveDate, time: NaiveTime) -> Self {
        Self { date, time }
    }

    /// Create a RailTime from a combined date-time.
    pub fn from_datetime(dt: NaiveDateTime) -> Self {
        Self {
            date: dt.date(),
            time: dt.time(),
        }
    }

    /// Parse a clock time in "HH:MM" or "HH:MM:SS" format on the given date.
    ///
    /// A single-digit hour ("7:55", "7:55:00") is also accepted.
    ///
    /// # Examples
    ///
    /// ```
    /// use rail_timeline::domain::RailTime;
    /// use chrono::NaiveDate;
    ///
    /// let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
    ///
    /// assert!(RailTime::parse_clock("00:00", date).is_ok());
    /// assert!(RailTime::parse_clock("23:59:59", date).is_ok());
    /// assert!(RailTime::parse_clock("7:55:00", date).is_ok());
    ///
    /// assert!(RailTime::parse_clock("1430", date).is_err());
    /// assert!(RailTime::parse_clock("14:3", date).is_err());
    /// assert!(RailTime::parse_clock("25:00", date).is_err());
    /// ```
    pub fn parse_clock(s: &str, date: NaiveDate) -> Result<Self, TimeError> {
        let padded;
        let s = if matches!(s.len(), 4 | 7) && s.as_bytes()[1] == b':' {
            padded = format!("0{s}");
            padded.as_str()
        } else {
            s
        };

        // HH:MM or HH:MM:SS
        if s.len() != 5 && s.len() != 8 {
            return Err(TimeError::new("expected HH:MM or HH:MM:SS format"));
        }

        let bytes = s.as_bytes();

        if bytes[2] != b':' {
            return Err(TimeError::new("expected colon at position 2"));
        }

        let hour =
            parse_two_digits(&bytes[0..2]).ok_or_else(|| TimeError::new("invalid hour digits"))?;
        if hour > 23 {
            return Err(TimeError::new("hour must be 0-23"));
        }

        let minute = parse_two_digits(&bytes[3..5])
            .ok_or_else(|| TimeError::new("invalid minute digits"))?;
        if minute > 59 {
            return Err(TimeError::new("minute must be 0-59"));
        }

        let second = if bytes.len() == 8 {
            if bytes[5] != b':' {
                return Err(TimeError::new("expected colon at position 5"));
            }
            let second = parse_two_digits(&bytes[6..8])
                .ok_or_else(|| TimeError::new("invalid second digits"))?;
            if second > 59 {
                return Err(TimeError::new("second must be 0-59"));
            }
            second
        } else {
            0
        };

        let time = NaiveTime::from_hms_opt(hour, minute, second)
            .ok_or_else(|| TimeError::new("invalid time"))?;

        Ok(Self { date, time })
    }

    /// Parse any timestamp format found in raw schedules.
    ///
    /// Fully-dated strings keep their own date; bare clock times are placed
    /// on `date`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rail_timeline::domain::RailTime;
    /// use chrono::NaiveDate;
    ///
    /// let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
    ///
    /// let t = RailTime::parse_timestamp("07:55:00", date).unwrap();
    /// assert_eq!(t.date(), date);
    ///
    /// let t = RailTime::parse_timestamp("2024-03-16T01:10:00", date).unwrap();
    /// assert_eq!(t.date(), NaiveDate::from_ymd_opt(2024, 3, 16).unwrap());
    /// ```
    pub fn parse_timestamp(s: &str, date: NaiveDate) -> Result<Self, TimeError> {
        let s = s.trim();
        if s.len() <= 8 {
            return Self::parse_clock(s, date);
        }

        DATED_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
            .map(|dt| Self::from_datetime(dt.with_nanosecond(0).unwrap_or(dt)))
            .ok_or_else(|| TimeError::new("unrecognised timestamp format"))
    }

    /// Parse a timestamp in the ISO form produced by [`RailTime::to_iso`].
    pub fn parse_iso(s: &str) -> Result<Self, TimeError> {
        NaiveDateTime::parse_from_str(s.trim(), "%Y-%m-%dT%H:%M:%S")
            .map(Self::from_datetime)
            .map_err(|_| TimeError::new("expected YYYY-MM-DDTHH:MM:SS"))
    }

    /// Returns the date component.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Returns the time component.
    pub fn time(&self) -> NaiveTime {
        self.time
    }

    /// Returns the hour (0-23).
    pub fn hour(&self) -> u32 {
        self.time.hour()
    }

    /// Returns the minute (0-59).
    pub fn minute(&self) -> u32 {
        self.time.minute()
    }

    /// Returns the second (0-59).
    pub fn second(&self) -> u32 {
        self.time.second()
    }

    /// Minutes since midnight, ignoring the date.
    pub fn minute_of_day(&self) -> u32 {
        self.hour() * 60 + self.minute()
    }

    /// Converts to a NaiveDateTime.
    pub fn to_datetime(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }

    /// Renders as `YYYY-MM-DDTHH:MM:SS`.
    pub fn to_iso(&self) -> String {
        self.to_datetime().format("%Y-%m-%dT%H:%M:%S").to_string()
    }

    /// Add a duration to this time.
    ///
    /// This properly handles crossing midnight by advancing the date.
    ///
    /// # Examples
    ///
    /// ```
    /// use rail_timeline::domain::RailTime;
    /// use chrono::{Duration, NaiveDate};
    ///
    /// let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
    /// let time = RailTime::parse_clock("23:30", date).unwrap();
    ///
    /// let later = time.checked_add(Duration::hours(1)).unwrap();
    /// assert_eq!(later.to_string(), "00:30");
    /// assert_eq!(later.date(), NaiveDate::from_ymd_opt(2024, 3, 16).unwrap());
    /// ```
    pub fn checked_add(&self, duration: Duration) -> Option<Self> {
        let dt = self.to_datetime().checked_add_signed(duration)?;
        Some(Self::from_datetime(dt))
    }

    /// Subtract a duration from this time.
    pub fn checked_sub(&self, duration: Duration) -> Option<Self> {
        let dt = self.to_datetime().checked_sub_signed(duration)?;
        Some(Self::from_datetime(dt))
    }

    /// Returns the duration between two times.
    ///
    /// Returns a negative duration if `other` is after `self`.
    pub fn signed_duration_since(&self, other: Self) -> Duration {
        self.to_datetime()
            .signed_duration_since(other.to_datetime())
    }
}

impl Ord for RailTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_datetime().cmp(&other.to_datetime())
    }
}

impl PartialOrd for RailTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for RailTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RailTime({} {:02}:{:02}:{:02})",
            self.date,
            self.hour(),
            self.minute(),
            self.second()
        )
    }
}

impl fmt::Display for RailTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl Serialize for RailTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_iso())
    }
}

impl<'de> Deserialize<'de> for RailTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        RailTime::parse_iso(&s).map_err(serde::de::Error::custom)
    }
}

/// Parse two ASCII digit bytes into a u32.
fn parse_two_digits(bytes: &[u8]) -> Option<u32> {
    if bytes.len() != 2 {
        return None;
    }
    let d1 = (bytes[0] as char).to_digit(10)?;
    let d2 = (bytes[1] as char).to_digit(10)?;
    Some(d1 * 10 + d2)
}

/// The calendar date of the given day of a run.
///
/// Day 1 is the service date itself. Returns `None` for day 0 or on date
/// overflow.
///
/// ```
/// use rail_timeline::domain::service_day;
/// use chrono::NaiveDate;
///
/// let base = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
/// assert_eq!(service_day(base, 1), Some(base));
/// assert_eq!(service_day(base, 3), NaiveDate::from_ymd_opt(2024, 3, 17));
/// assert_eq!(service_day(base, 0), None);
/// ```
pub fn service_day(base: NaiveDate, day_offset: u32) -> Option<NaiveDate> {
    let days = day_offset.checked_sub(1)?;
    base.checked_add_days(chrono::Days::new(u64::from(days)))
}

/// Parse an optional raw time field, treating anything unusable as missing.
///
/// `None`, blank strings and the literal `"None"` are missing values.
/// Malformed strings are logged and also become `None`: the timeline builder
/// tries to repair them later.
pub fn parse_lenient(raw: Option<&str>, date: NaiveDate) -> Option<RailTime> {
    let raw = raw?.trim();
    if raw.is_empty() || raw == "None" {
        return None;
    }
    match RailTime::parse_timestamp(raw, date) {
        Ok(time) => Some(time),
        Err(e) => {
            tracing::warn!("could not parse timestamp {raw:?}: {e}");
            None
        }
    }
}
