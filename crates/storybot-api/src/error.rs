//! Storybot — API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use storybot_core::error::DomainError;
use thiserror::Error;

/// Startup errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Database connection or pool error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A schema migration failed.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),

    /// The story catalog could not be loaded.
    #[error("content error: {0}")]
    Content(DomainError),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Recovery classification: `user_input`, `content_integrity` or
    /// `persistence`.
    pub kind: &'static str,
    /// Human-readable error message.
    pub message: String,
}

/// HTTP-layer wrapper around `DomainError` that implements `IntoResponse`.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match &self.0 {
            DomainError::OptionOutOfRange { .. } => {
                (StatusCode::BAD_REQUEST, "option_out_of_range")
            }
            DomainError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "invalid_input"),
            DomainError::ContentNotFound { .. } => (StatusCode::NOT_FOUND, "content_not_found"),
            DomainError::UnknownStoryline(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "unknown_storyline")
            }
            DomainError::PositionOutOfRange { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "position_out_of_range")
            }
            DomainError::UnknownAchievement(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "unknown_achievement")
            }
            DomainError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error"),
            DomainError::StaleEvent => (StatusCode::CONFLICT, "stale_event"),
            DomainError::ConcurrencyConflict { .. } => {
                (StatusCode::CONFLICT, "concurrency_conflict")
            }
            DomainError::Infrastructure(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "infrastructure_error")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.status_and_code();

        let body = ErrorBody {
            error: error_code,
            kind: self.0.kind().as_str(),
            message: self.0.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn status_of(err: DomainError) -> StatusCode {
        let response = ApiError(err).into_response();
        response.status()
    }

    #[test]
    fn test_user_input_errors_map_to_400() {
        assert_eq!(
            status_of(DomainError::OptionOutOfRange {
                index: 3,
                available: 2
            }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(DomainError::InvalidInput("no story is chosen".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_content_not_found_maps_to_404() {
        assert_eq!(
            status_of(DomainError::ContentNotFound {
                story_id: 4,
                chapter_id: Some(1)
            }),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_broken_cursor_maps_to_422() {
        assert_eq!(
            status_of(DomainError::UnknownStoryline("attic".into())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(DomainError::PositionOutOfRange {
                storyline: "Ending".into(),
                position: 9
            }),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(DomainError::UnknownAchievement(4)),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_stale_event_and_concurrency_conflict_map_to_409() {
        assert_eq!(status_of(DomainError::StaleEvent), StatusCode::CONFLICT);
        assert_eq!(
            status_of(DomainError::ConcurrencyConflict {
                user_id: 5,
                expected: 1,
                actual: 2,
            }),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_infrastructure_maps_to_500() {
        assert_eq!(
            status_of(DomainError::Infrastructure("db down".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_body_carries_code_and_kind() {
        // Arrange
        let response = ApiError(DomainError::OptionOutOfRange {
            index: 4,
            available: 2,
        })
        .into_response();

        // Act
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        // Assert
        assert_eq!(json["error"], "option_out_of_range");
        assert_eq!(json["kind"], "user_input");
        assert!(json["message"].as_str().unwrap().contains("option 4"));
    }
}
