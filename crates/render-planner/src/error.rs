//! Error types for the render planner.

use std::path::PathBuf;

use thiserror::Error;

use forecast_common::{CommonError, ErrorKind, StepError};

/// Errors that can occur while loading configuration or planning orders.
#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Failed to read {path:?}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path:?}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error(transparent)]
    Common(#[from] CommonError),

    #[error("Invalid step: {0}")]
    Step(#[from] StepError),

    #[error("Duplicate definition of input '{input}' for {instant}")]
    DuplicateInput { input: String, instant: String },

    #[error("Duplicate recipe '{0}'")]
    DuplicateRecipe(String),

    #[error("Duplicate flavour '{0}'")]
    DuplicateFlavour(String),

    #[error("Recipe '{recipe}' defines step id '{step}' more than once")]
    DuplicateStepId { recipe: String, step: String },

    #[error("Incomplete tile spec for flavour '{flavour}': missing '{field}'")]
    IncompleteTileSpec {
        flavour: String,
        field: &'static str,
    },

    #[error("Invalid tile spec for flavour '{flavour}': {message}")]
    InvalidTileSpec { flavour: String, message: String },

    #[error("Invalid tile group size {width}x{height}: both sides must be at least 1")]
    InvalidGroupSize { width: u32, height: u32 },

    #[error("Invalid recipe filter pattern {pattern:?}: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl PlanError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PlanError::Common(e) => e.kind(),
            PlanError::Step(e) => e.kind(),
            _ => ErrorKind::Configuration,
        }
    }
}

/// Result type for planner operations.
pub type Result<T> = std::result::Result<T, PlanError>;
