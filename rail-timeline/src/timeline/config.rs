//! Configuration for timeline inference.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Parameters for reconstructing train timelines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineConfig {
    /// Speed used for trains without a usable configured maximum (km/h).
    pub default_speed_kmph: f64,

    /// Dwell assumed at stops whose times are inferred (seconds).
    pub fixed_dwell_secs: i64,

    /// Date of day 1 of every run. Stop times are anchored on this date
    /// plus their day offset.
    pub service_date: NaiveDate,
}

impl TimelineConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(default_speed_kmph: f64, fixed_dwell_secs: i64, service_date: NaiveDate) -> Self {
        Self {
            default_speed_kmph,
            fixed_dwell_secs,
            service_date,
        }
    }

    pub fn with_default_speed(mut self, kmph: f64) -> Self {
        self.default_speed_kmph = kmph;
        self
    }

    pub fn with_service_date(mut self, date: NaiveDate) -> Self {
        self.service_date = date;
        self
    }

    /// Returns the fixed dwell as a Duration.
    pub fn fixed_dwell(&self) -> Duration {
        Duration::seconds(self.fixed_dwell_secs)
    }
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            default_speed_kmph: 60.0,
            fixed_dwell_secs: 120, // 2 minutes
            service_date: NaiveDate::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = TimelineConfig::default();

        assert_eq!(config.default_speed_kmph, 60.0);
        assert_eq!(config.fixed_dwell_secs, 120);
        assert_eq!(config.fixed_dwell(), Duration::minutes(2));
        assert_eq!(
            config.service_date,
            NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()
        );
    }

    #[test]
    fn builder_setters() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let config = TimelineConfig::default()
            .with_default_speed(80.0)
            .with_service_date(date);

        assert_eq!(config.default_speed_kmph, 80.0);
        assert_eq!(config.service_date, date);
    }

    #[test]
    fn custom_config() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let config = TimelineConfig::new(45.0, 300, date);

        assert_eq!(config.default_speed_kmph, 45.0);
        assert_eq!(config.fixed_dwell(), Duration::minutes(5));
    }
}
