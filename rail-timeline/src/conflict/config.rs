//! Configuration for conflict pair generation.

use serde::{Deserialize, Serialize};

/// Parameters for finding and labelling conflicting stops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictConfig {
    /// Two arrivals at a station conflict when their minute-of-day values
    /// differ by at most this much.
    pub window_mins: u32,

    /// Speeds closer than this count as equal (km/h).
    pub speed_epsilon: f64,

    /// Trains per additional unit of station capacity.
    pub capacity_divisor: usize,

    /// Upper bound on the capacity proxy.
    pub max_capacity: usize,

    /// Seed for shuffling pairs before export.
    pub shuffle_seed: u64,
}

impl ConflictConfig {
    pub fn new(window_mins: u32, speed_epsilon: f64) -> Self {
        Self {
            window_mins,
            speed_epsilon,
            ..Self::default()
        }
    }

    pub fn with_window(mut self, mins: u32) -> Self {
        self.window_mins = mins;
        self
    }

    pub fn with_shuffle_seed(mut self, seed: u64) -> Self {
        self.shuffle_seed = seed;
        self
    }

    /// Capacity proxy for a station seeing `trains` arrivals.
    ///
    /// Always between 1 and `max_capacity` (inclusive).
    pub fn station_capacity(&self, trains: usize) -> usize {
        let raw = trains / self.capacity_divisor.max(1) + 1;
        raw.min(self.max_capacity).max(1)
    }
}

impl Default for ConflictConfig {
    fn default() -> Self {
        Self {
            window_mins: 10,
            speed_epsilon: 1e-6,
            capacity_divisor: 50,
            max_capacity: 6,
            shuffle_seed: 42,
        }
    }
}
