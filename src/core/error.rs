use thiserror::Error;

use crate::core::types::UnitId;

#[derive(Error, Debug)]
pub enum EngageError {
    #[error("No opposing unit with health remaining")]
    EmptyRoster,

    #[error("No round in progress")]
    NoActiveRound,

    #[error("No enemy unit selected")]
    NoEnemySelected,

    #[error("Unit not available for engagement: {0}")]
    UnknownUnit(UnitId),

    #[error("Action {action} is not allowed during {phase}")]
    InvalidTransition {
        phase: &'static str,
        action: &'static str,
    },

    #[error("Unit {0} has no health remaining")]
    UnitOutOfAction(UnitId),

    #[error("{0} must be calculated before leaving this phase")]
    CalculationPending(&'static str),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Round outcome violates invariants: {0}")]
    InvariantViolation(String),

    #[error("Round has not reached the summary phase")]
    RoundIncomplete,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

impl From<reqwest::Error> for EngageError {
    fn from(e: reqwest::Error) -> Self {
        EngageError::Transport(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EngageError>;
