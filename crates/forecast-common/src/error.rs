//! Error types for the forecast map planner.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::step::StepError;

/// Result type alias using CommonError.
pub type CommonResult<T> = Result<T, CommonError>;

/// Broad class of a failure, used when reporting failed work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad configuration; fatal for whatever it configures, never retried.
    Configuration,
    /// A value had the right type but the wrong content or unit.
    Value,
}

/// Primary error type for shared value types.
#[derive(Debug, Error)]
pub enum CommonError {
    #[error("Invalid step: {0}")]
    Step(#[from] StepError),

    #[error("Invalid BBOX: {0}")]
    InvalidBbox(String),

    #[error("Invalid instant: {0}")]
    InvalidInstant(String),

    #[error("Invalid zoom level {zoom}: must be at most {max}")]
    InvalidZoom { zoom: u32, max: u32 },
}

impl CommonError {
    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CommonError::Step(e) => e.kind(),
            CommonError::InvalidBbox(_)
            | CommonError::InvalidInstant(_)
            | CommonError::InvalidZoom { .. } => ErrorKind::Configuration,
        }
    }
}
