//! Application state for the web layer.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::policy::PolicyTable;
use crate::timeline::TimelineRecord;

/// Where the server listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
        }
    }
}

/// Shared application state.
///
/// Contains the read-only policy table and timeline, plus the random source
/// used for fallback decisions.
#[derive(Clone)]
pub struct AppState {
    pub policy: Arc<PolicyTable>,

    /// Aggregated timeline served by the schedule endpoints
    pub timeline: Arc<Vec<TimelineRecord>>,

    pub rng: Arc<Mutex<ChaCha8Rng>>,
}

impl AppState {
    /// Create a new app state with a fixed RNG seed.
    pub fn new(policy: PolicyTable, timeline: Vec<TimelineRecord>, seed: u64) -> Self {
        Self {
            policy: Arc::new(policy),
            timeline: Arc::new(timeline),
            rng: Arc::new(Mutex::new(ChaCha8Rng::seed_from_u64(seed))),
        }
    }
}
