//! Domain types for the timeline engine.
//!
//! This module contains the core domain model types that represent
//! validated timetable data. All types enforce their invariants at
//! construction time, so code that receives these types can trust their
//! validity.

mod error;
mod station;
mod stop;
mod time;
mod train;

pub use error::DomainError;
pub use station::{InvalidStationCode, Station, StationCode, StationDirectory};
pub use stop::{Stop, StopStatus, TimelineStop};
pub use time::{RailTime, TimeError, parse_lenient, service_day};
pub use train::{InvalidTrainNumber, TrainMetadata, TrainNumber, TrainType};
