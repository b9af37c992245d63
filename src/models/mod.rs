//! Data models shared by the bundled authentication schemes.

/// API key records and the in-memory key store
pub mod api_key;
/// Authenticated caller identity
pub mod principal;
