//! Protected resource, reachable only with a positive verdict.

use axum::{Extension, Json};
use serde::Serialize;

use crate::models::principal::{Principal, Scheme};

#[derive(Debug, Serialize)]
pub struct GreetingResponse {
    pub message: String,
    pub scheme: Scheme,
}

/// Greets the authenticated caller.
///
/// # Endpoint
///
/// `POST /api/protected-resource/post`
///
/// # Arguments
///
/// * `Extension(principal)` - Caller identity (injected by the scheme that authorized the request)
pub async fn greet(Extension(principal): Extension<Principal>) -> Json<GreetingResponse> {
    Json(GreetingResponse {
        message: format!(
            "Hello {} you are authenticated successfully!",
            principal.subject
        ),
        scheme: principal.scheme,
    })
}
