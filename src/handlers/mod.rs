//! HTTP request handlers for the demo server.
/// Liveness endpoint
pub mod health;
/// Endpoint behind the authorization chain
pub mod protected;
