use thiserror::Error;

use crate::models::CycleStatus;

/// Errors that can occur while estimating and reconciling feed consumption.
#[derive(Error, Debug)]
pub enum FeedModelError {
    #[error("Invalid growth curve: {0}")]
    InvalidCurve(String),

    #[error("Concentrate reserve shortfall on day {day}: reserve would be {reserve_kg:.3} kg")]
    ReserveShortfall { day: u32, reserve_kg: f64 },

    #[error("Mortality of {mortality} on day {day} exceeds current population of {current}")]
    MortalityExceedsPopulation {
        day: u32,
        mortality: u32,
        current: u32,
    },

    #[error("Cannot {operation} a {status} cycle")]
    InvalidTransition {
        operation: &'static str,
        status: CycleStatus,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Analysis error: {0}")]
    AnalysisError(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),
}

impl FeedModelError {
    /// True for conditions a caller may choose to accept with a warning.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, FeedModelError::ReserveShortfall { .. })
    }
}
