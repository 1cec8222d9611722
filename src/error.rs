//! Error taxonomy shared by the record model, persistence and controller.
//!
//! Nothing here is fatal: every variant is either reported to the user or
//! logged, and the app keeps running in a possibly degraded mode.

use crate::workout::WorkoutId;
use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

/// What was wrong with a numeric form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputProblem {
    NotFinite,
    NotPositive,
    Negative,
    TooLarge,
}

impl fmt::Display for InputProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputProblem::NotFinite => write!(f, "not a finite number"),
            InputProblem::NotPositive => write!(f, "must be positive"),
            InputProblem::Negative => write!(f, "must not be negative"),
            InputProblem::TooLarge => write!(f, "is too large"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid {field}: {problem}")]
    InvalidInput {
        field: &'static str,
        problem: InputProblem,
    },

    #[error("Could not get your position: {0}")]
    GeolocationDenied(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Storage quota exceeded")]
    QuotaExceeded,

    #[error("Stored workouts are corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("Stored workouts use unsupported schema version {0}")]
    UnsupportedSchema(u32),

    #[error("No workout with id {0}")]
    RecordNotFound(WorkoutId),

    #[error("Click on the map to choose where the workout happened")]
    NoPendingLocation,
}

impl Error {
    pub(crate) fn invalid(field: &'static str, problem: InputProblem) -> Self {
        Error::InvalidInput { field, problem }
    }
}
