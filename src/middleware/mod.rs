//! Chain middleware.
//!
//! A chain member is any `Fn(Handler) -> Handler`. [`from_fn`] builds one from an
//! async function, the same way `axum::middleware::from_fn` does for routers:
//! - Vote through [`AuthzContext`](crate::chain::AuthzContext)
//! - Forward with [`Next::run`]
//! - Answer directly, or stop silently with [`unwritten`](crate::chain::unwritten)

/// API key authentication
pub mod api_key;

/// HTTP Basic authentication
pub mod basic;

/// Bearer token authentication
pub mod bearer;

use std::{convert::Infallible, future::Future};

use axum::{
    extract::Request,
    response::{IntoResponse, Response},
};
use tower::{ServiceExt, service_fn};

use crate::chain::Handler;

/// The rest of the chain after the current middleware.
#[derive(Clone)]
pub struct Next {
    inner: Handler,
}

impl Next {
    /// Hand the request to the next chain member.
    pub async fn run(self, request: Request) -> Response {
        self.inner
            .oneshot(request)
            .await
            .unwrap_or_else(|never| match never {})
    }
}

/// Turn an async function into a chain member.
///
/// ```ignore
/// chain.push(from_fn(|request: Request, next: Next| async move {
///     if request.headers().contains_key("x-internal") {
///         AuthzContext::get(&request).authorize();
///     }
///     next.run(request).await
/// }));
/// ```
pub fn from_fn<F, Fut, R>(f: F) -> impl Fn(Handler) -> Handler + Clone + Send + Sync + 'static
where
    F: Fn(Request, Next) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + 'static,
{
    move |inner: Handler| {
        let f = f.clone();
        Handler::new(service_fn(move |request: Request| {
            let fut = f(request, Next { inner: inner.clone() });
            async move { Ok::<_, Infallible>(fut.await.into_response()) }
        }))
    }
}

/// Value of `Authorization` when it uses `scheme`, compared case-insensitively.
pub(crate) fn credentials<'a>(request: &'a Request, scheme: &str) -> Option<&'a str> {
    let value = request
        .headers()
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?;

    let (given, rest) = value.split_once(' ')?;
    given
        .eq_ignore_ascii_case(scheme)
        .then(|| rest.trim_start())
}

pub(crate) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    use subtle::ConstantTimeEq;

    a.ct_eq(b).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::header};

    fn with_authorization(value: &str) -> Request {
        Request::builder()
            .header(header::AUTHORIZATION, value)
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn credentials_match_scheme_case_insensitively() {
        let request = with_authorization("bearer abc.def");
        assert_eq!(credentials(&request, "Bearer"), Some("abc.def"));
        assert_eq!(credentials(&request, "Basic"), None);
    }

    #[test]
    fn credentials_without_header() {
        let request = Request::new(Body::empty());
        assert_eq!(credentials(&request, "Bearer"), None);
    }

    #[test]
    fn constant_time_eq_compares_contents() {
        assert!(constant_time_eq(b"secret", b"secret"));
        assert!(!constant_time_eq(b"secret", b"secreT"));
        assert!(!constant_time_eq(b"secret", b"secret2"));
    }
}
