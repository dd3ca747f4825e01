use thiserror::Error;

/// Failures surfaced by the table. None of them are fatal: a rejected action
/// leaves the hand untouched and the room carries on.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Illegal action: {reason}")]
    IllegalAction { reason: String },
    #[error("It's not seat {actual}'s turn (expected seat {expected})")]
    NotPlayersTurn { expected: usize, actual: usize },
    #[error("No hand in progress")]
    NoHandInProgress,
    #[error("Need at least 2 seats with chips to deal, have {available}")]
    InsufficientActors { available: usize },
    #[error("No seat at index {0}")]
    UnknownSeat(usize),
    #[error("Invalid card: {0:?}")]
    InvalidCard(String),
}

impl GameError {
    pub fn illegal(reason: impl Into<String>) -> Self {
        GameError::IllegalAction {
            reason: reason.into(),
        }
    }
}
