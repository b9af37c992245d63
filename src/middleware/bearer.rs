//! Bearer token authentication middleware.
//!
//! Token validation is pluggable through [`TokenVerifier`]; a JWT library or a
//! remote introspection call slots in there. [`StaticTokens`] covers fixed tokens.

use std::{future::Future, sync::Arc};

use axum::{extract::Request, response::Response};

use crate::{
    chain::{AuthzContext, Handler, unwritten},
    middleware::{Next, constant_time_eq, credentials, from_fn},
    models::principal::{Principal, Scheme},
};

/// Resolves a bearer token to the caller it belongs to.
pub trait TokenVerifier: Send + Sync + 'static {
    /// `None` means the token is invalid.
    fn verify(&self, token: &str) -> impl Future<Output = Option<Principal>> + Send;
}

/// Fixed set of tokens, each mapped to a subject.
#[derive(Debug, Clone, Default)]
pub struct StaticTokens {
    tokens: Vec<(String, String)>,
}

impl StaticTokens {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, token: impl Into<String>, subject: impl Into<String>) -> &mut Self {
        self.tokens.push((token.into(), subject.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl TokenVerifier for StaticTokens {
    async fn verify(&self, token: &str) -> Option<Principal> {
        // Scan every entry so timing does not reveal which token matched.
        let mut found = None;
        for (candidate, subject) in &self.tokens {
            if constant_time_eq(candidate.as_bytes(), token.as_bytes()) && found.is_none() {
                found = Some(Principal::new(subject.clone(), Scheme::Bearer));
            }
        }
        found
    }
}

/// Bearer chain member.
///
/// - Not a bearer request: abstain and call the next middleware
/// - Token verified: authorize, insert `Principal`, call the next middleware
/// - Token rejected: deny and stop the chain without answering
pub fn bearer_auth<V>(verifier: V) -> impl Fn(Handler) -> Handler + Clone + Send + Sync + 'static
where
    V: TokenVerifier,
{
    let verifier = Arc::new(verifier);

    from_fn(move |request: Request, next: Next| {
        let verifier = verifier.clone();
        async move { authenticate(verifier.as_ref(), request, next).await }
    })
}

async fn authenticate<V: TokenVerifier>(verifier: &V, mut request: Request, next: Next) -> Response {
    let Some(token) = credentials(&request, "Bearer").map(str::to_owned) else {
        return next.run(request).await;
    };

    let ctx = AuthzContext::get(&request);

    match verifier.verify(&token).await {
        Some(principal) => {
            tracing::debug!(subject = %principal.subject, "bearer token accepted");
            ctx.authorize();
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        None => {
            tracing::warn!("bearer token rejected");
            ctx.unauthorize();
            unwritten()
        }
    }
}
