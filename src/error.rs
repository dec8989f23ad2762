//! Typed error taxonomy of the game lifecycle engine and its mapping to HTTP
//! responses.

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::dao::storage::StorageError;

/// Failures surfaced by the engine. Every variant is a client-input or
/// state-precondition error except [`EngineError::Storage`], which reports
/// the snapshot store itself being unavailable. Validation always happens
/// before any mutation, so a returned error implies no state change.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The game id does not refer to a known game (for this quiz).
    #[error("game id does not refer to a valid game")]
    InvalidGameId,
    /// The player id is not part of any game.
    #[error("player id does not refer to a player in any game")]
    InvalidPlayerId,
    /// A join was attempted with an unusable display name.
    #[error("{0}")]
    InvalidPlayerName(String),
    /// The action token is not part of the action vocabulary at all.
    #[error("action provided is not a valid action token")]
    InvalidAction,
    /// A recognised action (or read) is not legal in the current state.
    #[error("{0}")]
    IncompatibleState(String),
    /// The question position is out of range or not the current question.
    #[error("{0}")]
    InvalidPosition(String),
    /// Submitted answer ids are empty, duplicated, or unknown.
    #[error("{0}")]
    InvalidAnswerIds(String),
    /// The owning quiz already has 10 games that are not in END state.
    #[error("10 games that are not in END state already exist for this quiz")]
    TooManyActiveGames,
    /// The quiz snapshot contains no questions.
    #[error("the quiz does not have any questions in it")]
    EmptyQuiz,
    /// The requested auto-start threshold exceeds the allowed maximum.
    #[error("auto start number cannot be greater than 50")]
    InvalidAutoStart,
    /// The snapshot store failed to load or persist.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl EngineError {
    /// Stable error code exposed on the wire alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::InvalidGameId => "INVALID_GAME_ID",
            EngineError::InvalidPlayerId => "INVALID_PLAYER_ID",
            EngineError::InvalidPlayerName(_) => "INVALID_PLAYER_NAME",
            EngineError::InvalidAction => "INVALID_ACTION",
            EngineError::IncompatibleState(_) => "INCOMPATIBLE_GAME_STATE",
            EngineError::InvalidPosition(_) => "INVALID_POSITION",
            EngineError::InvalidAnswerIds(_) => "INVALID_ANSWER_IDS",
            EngineError::TooManyActiveGames => "MAX_ACTIVE_GAMES",
            EngineError::EmptyQuiz => "QUIZ_IS_EMPTY",
            EngineError::InvalidAutoStart => "INVALID_AUTO_START",
            EngineError::Storage(_) => "STORAGE_UNAVAILABLE",
        }
    }
}

/// Application-level errors converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// An engine validation or precondition failure.
    #[error(transparent)]
    Engine(#[from] EngineError),
    /// A structurally invalid request body.
    #[error("bad request: {0}")]
    BadRequest(String),
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("validation failed: {err}"))
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, code) = match &self {
            AppError::Engine(EngineError::Storage(_)) => {
                (StatusCode::SERVICE_UNAVAILABLE, "STORAGE_UNAVAILABLE")
            }
            AppError::Engine(engine) => (StatusCode::BAD_REQUEST, engine.code()),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
        };

        let payload = Json(ErrorBody {
            error: code.into(),
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_taxonomy_variant_has_a_stable_code() {
        assert_eq!(EngineError::InvalidGameId.code(), "INVALID_GAME_ID");
        assert_eq!(EngineError::InvalidPlayerId.code(), "INVALID_PLAYER_ID");
        assert_eq!(EngineError::InvalidAction.code(), "INVALID_ACTION");
        assert_eq!(
            EngineError::IncompatibleState("x".into()).code(),
            "INCOMPATIBLE_GAME_STATE"
        );
        assert_eq!(EngineError::TooManyActiveGames.code(), "MAX_ACTIVE_GAMES");
        assert_eq!(EngineError::EmptyQuiz.code(), "QUIZ_IS_EMPTY");
        assert_eq!(EngineError::InvalidAutoStart.code(), "INVALID_AUTO_START");
    }
}
