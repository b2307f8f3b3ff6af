//! Unified server error type.
//!
//! Every handler returns `Result<T, ServerError>`, which implements
//! [`axum::response::IntoResponse`] so errors are converted to the relay's
//! JSON envelope `{"error": <message>, "code": "<status>"}`.
//!
//! Database and internal errors are logged with full detail but only a
//! generic message is returned to the caller.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use topview_client::TopViewError;
use tracing::error;

/// All errors that can occur in the avatar-relay request lifecycle.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Vendor credentials (or other required settings) are absent.
    #[error("{0}")]
    Configuration(String),

    /// Missing, malformed or rejected caller token.
    #[error("Unauthorized")]
    Unauthorized,

    /// The caller sent an invalid or malformed request.
    #[error("{0}")]
    BadRequest(String),

    /// The caller referenced a resource that does not exist (or is not theirs).
    #[error("{0}")]
    NotFound(String),

    /// Another request holding the same idempotency key is still running.
    #[error("{0}")]
    Conflict(String),

    /// The request body exceeds the route's limit.
    #[error("{0}")]
    PayloadTooLarge(String),

    /// The vendor could not be reached or answered with garbage.
    #[error("{0}")]
    Vendor(TopViewError),

    /// The identity provider could not be reached.
    #[error("identity provider error: {0}")]
    Identity(String),

    /// Propagated from the SQLite store.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// An unclassified internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<TopViewError> for ServerError {
    fn from(e: TopViewError) -> Self {
        match e {
            TopViewError::MissingCredentials => Self::Configuration(e.to_string()),
            TopViewError::InvalidInput(m) => Self::BadRequest(m),
            other => Self::Vendor(other),
        }
    }
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Configuration(_)
            | Self::Vendor(_)
            | Self::Identity(_)
            | Self::Database(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let client_message = match &self {
            // Client-facing errors: expose the message directly.
            Self::Unauthorized
            | Self::BadRequest(_)
            | Self::NotFound(_)
            | Self::Conflict(_)
            | Self::PayloadTooLarge(_) => self.to_string(),

            Self::Configuration(m) => {
                error!(message = %m, "configuration error");
                m.clone()
            }
            Self::Vendor(e) => {
                error!(error = %e, "TopView call failed");
                e.to_string()
            }
            Self::Identity(m) => {
                error!(message = %m, "identity provider call failed");
                "identity provider unavailable".to_owned()
            }
            Self::Database(e) => {
                error!(error = %e, "database error");
                "internal server error".to_owned()
            }
            Self::Internal(m) => {
                error!(message = %m, "internal server error");
                "internal server error".to_owned()
            }
        };
        (
            status,
            Json(json!({ "error": client_message, "code": status.as_str() })),
        )
            .into_response()
    }
}

impl From<anyhow::Error> for ServerError {
    fn from(e: anyhow::Error) -> Self {
        error!(error = ?e, "converting anyhow error to ServerError::Internal");
        Self::Internal(e.to_string())
    }
}
