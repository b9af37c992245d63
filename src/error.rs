//! Error types and HTTP error response handling.
//!
//! Votes never produce errors; conflicting votes are resolved by the chain. The
//! variants here cover misuse of the chain and rejections that a bundled scheme
//! answers itself.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Crate-wide error type.
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// A handler asked for the authorization context outside of a chain.
    ///
    /// This is a wiring bug. Returns HTTP 500.
    #[error("authorization context missing: handler is not running inside an authorization chain")]
    MissingContext,

    /// API key is unknown or revoked.
    ///
    /// Returns HTTP 401 Unauthorized.
    #[error("Invalid API key")]
    InvalidApiKey,

    /// Credentials were present but did not verify.
    ///
    /// Returns HTTP 401 Unauthorized.
    #[error("Invalid credentials")]
    InvalidCredentials,
}

/// Convert AuthzError into an HTTP response.
///
/// # Response Format
///
/// ```json
/// {
///   "error": {
///     "code": "error_type",
///     "message": "Human-readable error message"
///   }
/// }
/// ```
///
/// `MissingContext` hides its details from the client.
impl IntoResponse for AuthzError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AuthzError::MissingContext => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "An internal error occurred".to_string(),
            ),
            AuthzError::InvalidApiKey => (
                StatusCode::UNAUTHORIZED,
                "invalid_api_key",
                self.to_string(),
            ),
            AuthzError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
                self.to_string(),
            ),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
