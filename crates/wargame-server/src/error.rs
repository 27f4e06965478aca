//! Error types for the HTTP API.
//!
//! [`ApiError`] carries an HTTP status class and a message, and converts
//! into a JSON response via [`IntoResponse`]. Engine errors are mapped to
//! a status in one place, the [`From<GameError>`] impl below.

use axum::extract::FromRequest;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use wargame_core::game::GameError;
use wargame_core::intents::IntentError;
use wargame_core::players::PlayerError;
use wargame_core::queries::QueryError;
use wargame_world::{PathError, WorldError};

/// Errors that can occur in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed input.
    #[error("{0}")]
    BadRequest(String),

    /// Missing or unknown session.
    #[error("{0}")]
    Unauthorized(String),

    /// The caller may not do this.
    #[error("{0}")]
    Forbidden(String),

    /// The requested resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The input is well-formed but cannot be satisfied.
    #[error("{0}")]
    Unprocessable(String),

    /// The request conflicts with work in progress.
    #[error("{0}")]
    Conflict(String),

    /// Something went wrong on our side.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// JSON request body whose rejections answer with the [`ApiError`] body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

fn from_route(err: &PathError) -> ApiError {
    match err {
        PathError::Unreachable { .. } => ApiError::Unprocessable(err.to_string()),
        PathError::OffMap(_) | PathError::SameCell(_) => ApiError::BadRequest(err.to_string()),
    }
}

fn from_world(err: &WorldError) -> ApiError {
    let message = err.to_string();
    match err {
        WorldError::TileNotFound(_) | WorldError::NoTileAt(_) | WorldError::UnknownGood(_) => {
            ApiError::NotFound(message)
        }
        WorldError::InvalidGoodName(_) => ApiError::BadRequest(message),
        _ => ApiError::Internal(message),
    }
}

fn from_player(err: &PlayerError) -> ApiError {
    let message = err.to_string();
    match err {
        PlayerError::NameTaken(_) | PlayerError::InvalidName(_) | PlayerError::InvalidColor(_) => {
            ApiError::BadRequest(message)
        }
        PlayerError::NotFound(_) => ApiError::NotFound(message),
        PlayerError::Ledger(_) => ApiError::Internal(message),
    }
}

impl From<GameError> for ApiError {
    fn from(err: GameError) -> Self {
        let message = err.to_string();
        match &err {
            GameError::UnknownSession(_) => Self::Unauthorized(message),
            GameError::NotPrivileged(_) => Self::Forbidden(message),
            GameError::CycleInProgress => Self::Conflict(message),
            GameError::TileNotFound(_) => Self::NotFound(message),
            GameError::Intent(IntentError::Route(route)) | GameError::Query(QueryError::Route(route)) => {
                from_route(route)
            }
            GameError::Intent(IntentError::NotFound(_) | IntentError::UnknownPlayer(_))
            | GameError::Query(QueryError::UnknownTile(_)) => Self::NotFound(message),
            GameError::Intent(IntentError::Store(_)) | GameError::Query(QueryError::World(_)) => {
                Self::Internal(message)
            }
            GameError::Intent(_) => Self::BadRequest(message),
            GameError::Query(QueryError::Player(player)) | GameError::Player(player) => {
                from_player(player)
            }
            GameError::World(world) => from_world(world),
            GameError::Resolution(_) => Self::Internal(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wargame_types::{ActionId, Coord, PlayerId};

    #[test]
    fn engine_errors_map_to_status_classes() {
        let cases = [
            (GameError::CycleInProgress, StatusCode::CONFLICT),
            (
                GameError::NotPrivileged(PlayerId::new()),
                StatusCode::FORBIDDEN,
            ),
            (
                GameError::Intent(IntentError::ZeroQuantity),
                StatusCode::BAD_REQUEST,
            ),
            (
                GameError::Intent(IntentError::NotFound(ActionId::new())),
                StatusCode::NOT_FOUND,
            ),
            (
                GameError::Query(QueryError::Route(PathError::Unreachable {
                    from: Coord::new(0, 0),
                    to: Coord::new(5, 5),
                })),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                GameError::World(WorldError::InvalidGoodName(String::new())),
                StatusCode::BAD_REQUEST,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status(), expected);
        }
    }
}
