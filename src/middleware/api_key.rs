//! API key authentication middleware.
//!
//! This middleware votes on every request carrying an `X-Api-Key` header:
//! 1. Hash the key and look it up in the [`ApiKeyStore`]
//! 2. On a match, authorize and inject a [`Principal`] into the request
//! 3. Otherwise deny and answer with a JSON 401 right away
//!
//! Requests without the header are left to the other chain members.

use std::sync::Arc;

use axum::{
    extract::Request,
    response::{IntoResponse, Response},
};

use crate::{
    chain::{AuthzContext, Handler},
    error::AuthzError,
    middleware::{Next, from_fn},
    models::{
        api_key::ApiKeyStore,
        principal::{Principal, Scheme},
    },
};

/// Header carrying the plaintext API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// API key chain member backed by `store`.
///
/// # Flow
///
/// 1. No `X-Api-Key` header: abstain, call the next middleware
/// 2. Hash the key using SHA-256 and look for an active record
/// 3. If found: authorize, insert `Principal`, call the next middleware
/// 4. If not found: deny and return `AuthzError::InvalidApiKey` (401 with JSON body)
///
/// Because step 4 answers the request itself, the chain's unauthorized handler
/// is skipped for bad keys.
pub fn api_key_auth(store: ApiKeyStore) -> impl Fn(Handler) -> Handler + Clone + Send + Sync + 'static {
    let store = Arc::new(store);

    from_fn(move |request: Request, next: Next| {
        let store = store.clone();
        async move { authenticate(&store, request, next).await }
    })
}

async fn authenticate(store: &ApiKeyStore, mut request: Request, next: Next) -> Response {
    let key = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::to_owned);

    let Some(key) = key else {
        return next.run(request).await;
    };

    let ctx = AuthzContext::get(&request);

    let Some(record) = store.find_active(&key) else {
        tracing::warn!("rejected unknown or revoked API key");
        ctx.unauthorize();
        return AuthzError::InvalidApiKey.into_response();
    };

    tracing::debug!(owner = %record.owner, "API key accepted");
    ctx.authorize();

    // Route handlers can extract this using Extension<Principal>
    let principal = Principal::new(record.owner.clone(), Scheme::ApiKey);
    request.extensions_mut().insert(principal);

    next.run(request).await
}
