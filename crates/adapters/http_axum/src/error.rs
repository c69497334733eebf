//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use eventbot_domain::error::EventBotError;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`EventBotError`] to an HTTP response with appropriate status code.
pub struct ApiError(EventBotError);

impl From<EventBotError> for ApiError {
    fn from(err: EventBotError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            EventBotError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            EventBotError::Authorization(err) => (StatusCode::FORBIDDEN, err.to_string()),
            EventBotError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
            EventBotError::Conflict(err) => (StatusCode::CONFLICT, err.to_string()),
            EventBotError::Storage(err) => {
                tracing::error!(error = %err, "storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
