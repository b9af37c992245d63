//! Tracks whether any middleware answered a request.
//!
//! axum handlers return their response instead of writing into a sink, so "nothing
//! was written" is represented by a placeholder response tagged with [`Unwritten`].
//! The chain's terminal step hands that placeholder back whenever it refuses to
//! forward, and middleware that stop the chain without answering return it too.
//!
//! Answering means returning a different response. Changing the placeholder's
//! status or body in place does not count and is discarded when the unauthorized
//! handler runs. Headers stamped on the placeholder are kept and carried over to
//! the unauthorized handler's response.

use axum::{
    body::Body,
    http::HeaderMap,
    response::Response,
};

#[derive(Debug, Clone, Copy)]
struct Unwritten;

/// A response that stands for "nothing written yet".
///
/// Return this from a middleware that stops the chain without answering; the
/// chain then falls back to its unauthorized handler. To answer, return any
/// other response instead.
pub fn unwritten() -> Response {
    let mut response = Response::new(Body::empty());
    response.extensions_mut().insert(Unwritten);
    response
}

/// Response returned by a chain pipeline, with write detection.
#[derive(Debug)]
pub struct ObservedResponse {
    inner: Response,
}

impl ObservedResponse {
    pub fn new(inner: Response) -> Self {
        Self { inner }
    }

    /// `true` once some middleware returned its own response instead of the
    /// placeholder.
    pub fn was_written(&self) -> bool {
        self.inner.extensions().get::<Unwritten>().is_none()
    }

    /// Headers stamped on the response so far.
    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    pub fn into_inner(mut self) -> Response {
        self.inner.extensions_mut().remove::<Unwritten>();
        self.inner
    }
}

/// Copy headers from `stamped` into `response` unless `response` already sets
/// the same name.
pub(crate) fn carry_headers(stamped: &HeaderMap, response: &mut Response) {
    for name in stamped.keys() {
        if response.headers().contains_key(name) {
            continue;
        }
        for value in stamped.get_all(name) {
            response.headers_mut().append(name.clone(), value.clone());
        }
    }
}
