//! Demo router: one public route and one route behind the authorization chain.

use std::convert::Infallible;

use axum::{
    Router,
    extract::Request,
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower::service_fn;

use crate::{
    chain::Chain,
    config::Config,
    error::AuthzError,
    handlers,
    middleware::{
        api_key::api_key_auth,
        basic::basic_auth,
        bearer::{StaticTokens, bearer_auth},
    },
    models::api_key::ApiKeyStore,
};

/// Build the authorization chain from the configured schemes.
///
/// Order: Basic, then Bearer, then API key. Schemes without configuration are
/// left out; an empty chain rejects every request.
pub fn authorization_chain(config: &Config) -> Chain {
    let mut chain = Chain::new();

    if let Some((username, password)) = config.basic_credentials() {
        chain.push(basic_auth(username, password));
    }

    let mut tokens = StaticTokens::new();
    for (subject, token) in config.bearer_token_pairs() {
        tokens.insert(token, subject);
    }
    if !tokens.is_empty() {
        chain.push(bearer_auth(tokens));
    }

    let mut keys = ApiKeyStore::new();
    for (owner, key) in config.api_key_pairs() {
        keys.insert(key, owner);
    }
    if !keys.is_empty() {
        chain.push(api_key_auth(keys));
    }

    chain.unauthorized_handler(service_fn(challenge));
    chain
}

/// JSON 401 advertising the accepted schemes.
async fn challenge(_request: Request) -> Result<Response, Infallible> {
    let mut response = AuthzError::InvalidCredentials.into_response();
    response.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"authz-chain\", Bearer"),
    );
    Ok(response)
}

/// Assemble the demo application.
pub fn router(config: &Config) -> Router {
    let chain = authorization_chain(config);
    if chain.is_empty() {
        tracing::warn!("no authentication scheme configured, protected routes reject everything");
    } else {
        tracing::info!(members = chain.len(), "authorization chain configured");
    }

    // Apply the authorization chain to all routes in this group
    let protected_routes = Router::new()
        .route(
            "/api/protected-resource/post",
            post(handlers::protected::greet),
        )
        .route_layer(chain.build());

    Router::new()
        // Public routes (no authorization required)
        .route("/health", get(handlers::health::health_check))
        .merge(protected_routes)
}
