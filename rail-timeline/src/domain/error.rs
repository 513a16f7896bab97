//! Domain error types.
//!
//! These errors represent validation failures in the domain layer. They are
//! distinct from IO and format errors.

use super::{InvalidStationCode, InvalidTrainNumber};

/// Domain-level errors for validation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DomainError {
    /// Station code failed validation
    #[error(transparent)]
    StationCode(#[from] InvalidStationCode),

    /// Train number failed validation
    #[error(transparent)]
    TrainNumber(#[from] InvalidTrainNumber),

    /// Stop day offsets count from 1
    #[error("day offset must be at least 1, got {0}")]
    InvalidDayOffset(i64),
}
