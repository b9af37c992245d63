//! Per-request authorization decision and its request-scoped registry.
//!
//! Every request entering an [`AuthzService`](super::AuthzService) gets a fresh
//! [`Decision`]. Middleware reach it through the request's extension map, vote on it,
//! and the chain resolves the votes once the pipeline returns.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use axum::{extract::FromRequestParts, http::Request, http::request::Parts};

use crate::error::AuthzError;

/// Resolved state of a [`Decision`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionState {
    /// Nobody voted yet.
    Pending,
    /// At least one authorization vote and no denial.
    Authorized,
    /// At least one denial, regardless of authorization votes.
    Denied,
}

/// Authorization votes collected for a single request.
///
/// Both flags only ever move from `false` to `true`. A denial always beats an
/// authorization, so `verdict()` is `authorized && !denied`.
///
/// The atomics exist so the handle can live in request extensions (which must be
/// `Send + Sync`); middleware of one request still run strictly one after another.
#[derive(Debug, Default)]
pub struct Decision {
    authorized: AtomicBool,
    denied: AtomicBool,

    /// Set by the terminal step right before the downstream handler runs.
    forwarded: AtomicBool,
}

impl Decision {
    /// Vote to authorize the request. Idempotent.
    pub fn authorize(&self) {
        self.authorized.store(true, Ordering::Relaxed);
    }

    /// Vote to deny the request. Idempotent and permanent.
    pub fn unauthorize(&self) {
        self.denied.store(true, Ordering::Relaxed);
    }

    /// `true` only when someone authorized and nobody denied.
    pub fn verdict(&self) -> bool {
        self.state() == DecisionState::Authorized
    }

    pub fn is_denied(&self) -> bool {
        self.denied.load(Ordering::Relaxed)
    }

    pub fn is_pending(&self) -> bool {
        self.state() == DecisionState::Pending
    }

    pub fn state(&self) -> DecisionState {
        match (
            self.authorized.load(Ordering::Relaxed),
            self.denied.load(Ordering::Relaxed),
        ) {
            (_, true) => DecisionState::Denied,
            (true, false) => DecisionState::Authorized,
            (false, false) => DecisionState::Pending,
        }
    }

    pub(crate) fn mark_forwarded(&self) {
        self.forwarded.store(true, Ordering::Relaxed);
    }

    pub(crate) fn was_forwarded(&self) -> bool {
        self.forwarded.load(Ordering::Relaxed)
    }
}

/// Shared handle to the [`Decision`] of the request currently in the chain.
///
/// Middleware obtain it with [`AuthzContext::get`], [`lookup`], or as an axum
/// extractor when written with `axum::middleware::from_fn`.
#[derive(Debug, Clone, Default)]
pub struct AuthzContext(Arc<Decision>);

impl AuthzContext {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Fetch the context attached to `request`.
    ///
    /// # Panics
    ///
    /// Panics when the request is not travelling through an authorization chain.
    /// That is a wiring bug, never bad client input.
    pub fn get<B>(request: &Request<B>) -> Self {
        lookup(request).unwrap_or_else(|err| panic!("{err}"))
    }
}

impl std::ops::Deref for AuthzContext {
    type Target = Decision;

    fn deref(&self) -> &Decision {
        &self.0
    }
}

/// Return `request` carrying `ctx`.
pub fn attach<B>(mut request: Request<B>, ctx: AuthzContext) -> Request<B> {
    request.extensions_mut().insert(ctx);
    request
}

/// Retrieve the context attached to `request`.
///
/// # Errors
///
/// [`AuthzError::MissingContext`] when nothing was attached.
pub fn lookup<B>(request: &Request<B>) -> Result<AuthzContext, AuthzError> {
    request
        .extensions()
        .get::<AuthzContext>()
        .cloned()
        .ok_or(AuthzError::MissingContext)
}

/// Return `request` with the context association removed.
pub fn detach<B>(mut request: Request<B>) -> Request<B> {
    request.extensions_mut().remove::<AuthzContext>();
    request
}

impl<S> FromRequestParts<S> for AuthzContext
where
    S: Send + Sync,
{
    type Rejection = AuthzError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<AuthzContext>().cloned().ok_or_else(|| {
            tracing::error!(uri = %parts.uri, "authorization context requested outside of a chain");
            AuthzError::MissingContext
        })
    }
}
