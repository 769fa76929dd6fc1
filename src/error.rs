// Error types for the marketplace client and the gateway handlers

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

// Everything that can go wrong talking to the marketplace API.
// The Display text is what ends up in the user-facing banner.
#[derive(Debug, Error)]
pub enum ApiError {
    // Network or transport failure (DNS, refused connection, timeout, ...)
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    // Non-2xx response with the server's message
    #[error("{message}")]
    Status { status: StatusCode, message: String },

    // Client-side validation blocked the request before it was sent
    #[error("{0}")]
    Validation(String),

    // 2xx response whose body did not have the expected shape
    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status(),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

// Friendlier wording for the banner
pub fn humanize_api_error(error: &ApiError) -> String {
    humanize_message(&error.to_string())
}

pub fn humanize_message(message: &str) -> String {
    if message.trim().is_empty() {
        return "Something went wrong".to_string();
    }
    if message.to_lowercase().contains("unauthorized") {
        return "Session expired. Please login again.".to_string();
    }
    message.to_string()
}

// --- Gateway errors ---

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Internal Server Error")]
    InternalServerError(#[from] anyhow::Error),

    #[error("{0}")]
    Unauthorized(String),

    #[error(transparent)]
    Upstream(#[from] ApiError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InternalServerError(e) => {
                tracing::error!("Internal server error: {:?}", e);
                // Don't expose internal details to the client
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
            AppError::Unauthorized(message) => {
                tracing::warn!("Unauthorized access attempt: {}", message);
                (StatusCode::UNAUTHORIZED, message)
            }
            AppError::Upstream(ApiError::Status { status, message }) => {
                tracing::warn!(status = %status, "Marketplace API rejected request: {}", message);
                (status, message)
            }
            AppError::Upstream(ApiError::Validation(message)) => (StatusCode::BAD_REQUEST, message),
            AppError::Upstream(e) => {
                tracing::error!("Marketplace API unavailable: {:?}", e);
                (StatusCode::BAD_GATEWAY, e.to_string())
            }
        };

        (status, Json(json!({ "error": error_message }))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_messages_are_humanized() {
        assert_eq!(humanize_message("Unauthorized"), "Session expired. Please login again.");
        assert_eq!(humanize_message("jwt UNAUTHORIZED here"), "Session expired. Please login again.");
        assert_eq!(humanize_message(""), "Something went wrong");
        assert_eq!(humanize_message("Phone already used"), "Phone already used");
    }

    #[test]
    fn status_errors_expose_code() {
        let err = ApiError::Status {
            status: StatusCode::NOT_FOUND,
            message: "Cannot GET /cars/mine".into(),
        };
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Cannot GET /cars/mine");
        assert_eq!(ApiError::Validation("x".into()).status(), None);
    }

    #[test]
    fn upstream_status_is_passed_through() {
        let response = AppError::from(ApiError::Status {
            status: StatusCode::FORBIDDEN,
            message: "Admins only".into(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = AppError::from(ApiError::Validation("Please fill: Brand.".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
