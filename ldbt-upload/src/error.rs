//! Error types for ldbt-upload
//!
//! - [`FormError`]: what the user sees inline next to a form
//! - [`SubmitError`]: why a submission never ran at all
//! - [`ApiError`]: malformed HTTP requests to the web UI

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

/// User-facing form errors
///
/// `Display` is the exact inline message rendered next to the form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    /// No archive selected (or a zero-byte one)
    #[error("Please select .zip archive")]
    FileRequired,

    /// Archive exceeds the upload limit
    #[error("Maximum file size {}Mb", .limit_bytes / 1_000_000)]
    FileTooLarge { size_bytes: u64, limit_bytes: u64 },

    /// Email field left blank
    #[error("Please enter your email address")]
    EmailRequired,

    /// Email does not look like local-part@domain
    #[error("Invalid email address")]
    InvalidEmail,

    /// Transport failure or non-2xx response, message verbatim
    #[error("{0}")]
    NetworkOrServer(String),

    /// Another request for this session has not resolved yet
    #[error("A request is already in progress, please wait")]
    RequestInFlight,

    /// Action not available from the current state
    #[error("Cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },
}

impl FormError {
    /// True when the submission was refused and the session state is unchanged
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            FormError::RequestInFlight | FormError::InvalidTransition { .. }
        )
    }
}

/// Why a controller submission did not run
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    /// Session expired or never existed
    #[error("Session not found: {0}")]
    SessionNotFound(Uuid),

    /// State machine refused the action; state unchanged
    #[error(transparent)]
    Rejected(FormError),
}

/// Web UI request errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Request body over the configured limit (413)
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(err.body_text())
        } else {
            ApiError::BadRequest(err.body_text())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", msg)
            }
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}
