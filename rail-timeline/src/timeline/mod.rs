//! Timeline inference.
//!
//! Reconstructs complete, ordered timetables from sparse stop records:
//! - `builder`: per-train ordering, gap filling and metrics
//! - `batch`: the whole schedule, with per-train failure isolation
//! - `quality`: flags suspect rows in built timelines
//! - `query`: lookups over the flattened result

mod batch;
mod builder;
mod config;
pub mod quality;
pub mod query;
mod record;

pub use batch::{
    ScheduleInput, SimulationReport, SkippedTrain, simulate_schedule, simulate_schedule_parallel,
};
pub use builder::{TimelineBuilder, TimelineError, TrainTimeline};
pub use config::TimelineConfig;
pub use quality::QualityIssue;
pub use query::{DEFAULT_LIMIT, ScheduleQuery, ScheduleRow};
pub use record::TimelineRecord;
