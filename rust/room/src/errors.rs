//! Room-level failures and the structured form the transport layer sends.

use crate::events::RoomId;
use crate::settings::SettingsError;
use felt_engine::errors::GameError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RoomError {
    #[error("Room not found: {0}")]
    NotFound(RoomId),
    #[error("Seat {seat_id} is not in room {room_id}")]
    SeatNotFound { room_id: RoomId, seat_id: String },
    #[error("Room {room_id} is full ({max_seats} seats)")]
    RoomFull { room_id: RoomId, max_seats: usize },
    #[error(transparent)]
    Game(#[from] GameError),
    #[error("Room storage poisoned")]
    StoragePoisoned,
    #[error("Failed to write hand history: {0}")]
    History(#[from] std::io::Error),
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// Error classification for logging levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Rejected request, room state untouched
    Client,
    /// Room continues but something outside the table failed
    Server,
    /// Room state can no longer be trusted
    Critical,
}

impl RoomError {
    /// Machine-readable code for the transport layer.
    pub fn error_code(&self) -> &'static str {
        match self {
            RoomError::NotFound(_) => "room_not_found",
            RoomError::SeatNotFound { .. } => "seat_not_found",
            RoomError::RoomFull { .. } => "room_full",
            RoomError::Game(GameError::NotPlayersTurn { .. }) => "not_your_turn",
            RoomError::Game(GameError::NoHandInProgress) => "no_hand_in_progress",
            RoomError::Game(GameError::InsufficientActors { .. }) => "insufficient_players",
            RoomError::Game(_) => "illegal_action",
            RoomError::StoragePoisoned => "room_storage_error",
            RoomError::History(_) => "history_write_failed",
            RoomError::Settings(_) => "invalid_settings",
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            RoomError::StoragePoisoned => ErrorSeverity::Critical,
            RoomError::History(_) | RoomError::Settings(_) => ErrorSeverity::Server,
            _ => ErrorSeverity::Client,
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            RoomError::NotFound(id) => Some(serde_json::json!({ "room_id": id })),
            RoomError::SeatNotFound { room_id, seat_id } => Some(serde_json::json!({
                "room_id": room_id,
                "seat_id": seat_id,
            })),
            RoomError::Game(GameError::NotPlayersTurn { expected, actual }) => {
                Some(serde_json::json!({ "expected": expected, "actual": actual }))
            }
            _ => None,
        }
    }

    /// Logs at the level matching [`RoomError::severity`] and builds the payload.
    pub fn to_error_response(&self) -> ErrorResponse {
        let response = ErrorResponse {
            error: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        };
        match self.severity() {
            ErrorSeverity::Client => {
                tracing::info!(code = %response.error, "{}", response.message)
            }
            ErrorSeverity::Server => {
                tracing::error!(code = %response.error, "{}", response.message)
            }
            ErrorSeverity::Critical => {
                tracing::error!(code = %response.error, critical = true, "{}", response.message)
            }
        }
        response
    }
}

/// Error payload handed to clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Machine-readable error code (e.g., "room_not_found")
    pub error: String,
    /// Human-readable error message
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
        }
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl From<&RoomError> for ErrorResponse {
    fn from(err: &RoomError) -> Self {
        err.to_error_response()
    }
}
