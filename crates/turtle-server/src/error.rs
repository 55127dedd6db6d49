//! Error types for the HTTP layer.
//!
//! [`ObserverError`] unifies all request failure modes into a single enum
//! that converts into an Axum response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use turtle_core::{FieldError, IngressError};

/// Errors that can occur while handling a request.
#[derive(Debug, thiserror::Error)]
pub enum ObserverError {
    /// A query string could not be parsed.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// A request body could not be parsed.
    #[error("invalid body: {0}")]
    InvalidBody(String),

    /// One or more update fields were out of range.
    #[error("validation failed")]
    Validation(Vec<FieldError>),

    /// The caller's identity could not be derived from the request.
    #[error("identity error: {0}")]
    Identity(String),
}

impl From<IngressError> for ObserverError {
    fn from(err: IngressError) -> Self {
        match err {
            IngressError::Validation(fields) => Self::Validation(fields),
            IngressError::Identity(e) => Self::Identity(e.to_string()),
        }
    }
}

impl IntoResponse for ObserverError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::InvalidQuery(msg) | Self::InvalidBody(msg) | Self::Identity(msg) => {
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            Self::Validation(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation failed".to_owned(),
            ),
        };

        let mut body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });
        if let Self::Validation(fields) = &self {
            body["errors"] = serde_json::json!(fields);
        }

        (status, axum::Json(body)).into_response()
    }
}
