//! Authorization chain: composes voting middleware into a single tower layer.
//!
//! # Flow
//!
//! 1. A request enters [`AuthzService`], which attaches a fresh [`AuthzContext`]
//! 2. Middleware run in registration order, each free to vote, answer, or stop
//! 3. The terminal step forwards to the downstream service only on a positive verdict,
//!    after detaching the context
//! 4. Back in [`AuthzService`], a negative verdict with no answer from any middleware
//!    is handed to the unauthorized handler
//!
//! # Example
//!
//! ```ignore
//! let mut chain = Chain::new();
//! chain.push(basic_auth("admin", "admin123"));
//! chain.push(bearer_auth(tokens));
//!
//! let app = Router::new()
//!     .route("/protected", post(handler))
//!     .route_layer(chain.build());
//! ```

pub mod decision;
pub mod observe;

use std::{
    convert::Infallible,
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use axum::{
    body::Body,
    extract::Request,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tower::{Layer, Service, ServiceExt, service_fn, util::BoxCloneSyncService};

pub use decision::{AuthzContext, Decision, DecisionState, attach, detach, lookup};
pub use observe::{ObservedResponse, unwritten};

use observe::carry_headers;

/// Type-erased request handler every chain member wraps.
pub type Handler = BoxCloneSyncService<Request, Response, Infallible>;

type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// A registered chain member: turns the next handler into a new handler.
#[derive(Clone)]
pub struct Middleware(Arc<dyn Fn(Handler) -> Handler + Send + Sync>);

impl Middleware {
    pub fn new<F>(wrap: F) -> Self
    where
        F: Fn(Handler) -> Handler + Send + Sync + 'static,
    {
        Self(Arc::new(wrap))
    }

    fn wrap(&self, next: Handler) -> Handler {
        (self.0)(next)
    }
}

/// Ordered list of authorization middleware plus the handler used on denial.
///
/// Register everything during setup; [`Chain::build`] snapshots the list, so
/// layers built earlier never observe later registrations.
#[derive(Clone)]
pub struct Chain {
    middleware: Vec<Middleware>,
    unauthorized: Handler,
}

impl Default for Chain {
    fn default() -> Self {
        Self::new()
    }
}

impl Chain {
    /// Empty chain using [`default_unauthorized_handler`].
    pub fn new() -> Self {
        Self {
            middleware: Vec::new(),
            unauthorized: default_unauthorized_handler(),
        }
    }

    /// Append one middleware. Duplicates are allowed.
    pub fn push<F>(&mut self, middleware: F) -> &mut Self
    where
        F: Fn(Handler) -> Handler + Send + Sync + 'static,
    {
        self.middleware.push(Middleware::new(middleware));
        self
    }

    /// Append several middleware, keeping their order.
    pub fn extend<I>(&mut self, middleware: I) -> &mut Self
    where
        I: IntoIterator<Item = Middleware>,
    {
        self.middleware.extend(middleware);
        self
    }

    /// Append any tower layer as a chain member.
    pub fn push_layer<L>(&mut self, layer: L) -> &mut Self
    where
        L: Layer<Handler> + Send + Sync + 'static,
        L::Service: Service<Request, Response = Response, Error = Infallible>
            + Clone
            + Send
            + Sync
            + 'static,
        <L::Service as Service<Request>>::Future: Send + 'static,
    {
        self.push(move |next| Handler::new(layer.layer(next)))
    }

    /// Replace the handler invoked when the verdict is negative and no middleware
    /// answered. It receives the request head as it arrived, with an empty body.
    pub fn unauthorized_handler<S>(&mut self, handler: S) -> &mut Self
    where
        S: Service<Request, Response = Response, Error = Infallible> + Clone + Send + Sync + 'static,
        S::Future: Send + 'static,
    {
        self.unauthorized = Handler::new(handler);
        self
    }

    pub fn len(&self) -> usize {
        self.middleware.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middleware.is_empty()
    }

    /// Snapshot the chain into a layer that can wrap any number of services.
    pub fn build(&self) -> AuthzLayer {
        AuthzLayer {
            middleware: self.middleware.clone().into(),
            unauthorized: self.unauthorized.clone(),
        }
    }
}

/// Responds with a bare `401 Unauthorized`.
pub fn default_unauthorized_handler() -> Handler {
    Handler::new(service_fn(|_request: Request| async {
        Ok::<_, Infallible>(StatusCode::UNAUTHORIZED.into_response())
    }))
}

/// Layer produced by [`Chain::build`].
#[derive(Clone)]
pub struct AuthzLayer {
    middleware: Arc<[Middleware]>,
    unauthorized: Handler,
}

impl<S> Layer<S> for AuthzLayer
where
    S: Service<Request, Response = Response, Error = Infallible> + Clone + Send + Sync + 'static,
    S::Future: Send + 'static,
{
    type Service = AuthzService;

    fn layer(&self, downstream: S) -> AuthzService {
        let terminal = terminal(Handler::new(downstream));

        // Wrap innermost first so the first registered middleware runs first.
        let pipeline = self
            .middleware
            .iter()
            .rev()
            .fold(terminal, |next, middleware| middleware.wrap(next));

        AuthzService {
            pipeline,
            unauthorized: self.unauthorized.clone(),
        }
    }
}

/// Last step of the pipeline: forwards only on a positive verdict.
fn terminal(downstream: Handler) -> Handler {
    Handler::new(service_fn(move |request: Request| {
        let downstream = downstream.clone();
        async move {
            let authorized = match lookup(&request) {
                Ok(ctx) if ctx.verdict() => {
                    ctx.mark_forwarded();
                    true
                }
                _ => false,
            };

            if !authorized {
                return Ok(unwritten());
            }

            downstream.oneshot(detach(request)).await
        }
    }))
}

/// Service wrapping a downstream service with the authorization chain.
#[derive(Clone)]
pub struct AuthzService {
    pipeline: Handler,
    unauthorized: Handler,
}

impl Service<Request> for AuthzService {
    type Response = Response;
    type Error = Infallible;
    type Future = BoxFuture<Result<Response, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let pipeline = self.pipeline.clone();
        let unauthorized = self.unauthorized.clone();

        Box::pin(async move {
            let original = clone_head(&request);
            let ctx = AuthzContext::new();

            tracing::debug!(method = %request.method(), uri = %request.uri(), "entering authorization chain");

            let response = pipeline.oneshot(attach(request, ctx.clone())).await?;
            let response = ObservedResponse::new(response);

            if ctx.was_forwarded() || ctx.verdict() {
                return Ok(response.into_inner());
            }

            if response.was_written() {
                tracing::debug!(pending = ctx.is_pending(), "request answered inside the chain");
                return Ok(response.into_inner());
            }

            if ctx.is_denied() {
                tracing::warn!(uri = %original.uri(), "request denied");
            } else {
                tracing::warn!(uri = %original.uri(), "no chain member authorized the request");
            }

            let mut answer = unauthorized.oneshot(original).await?;
            carry_headers(response.headers(), &mut answer);
            Ok(answer)
        })
    }
}

/// Copy of the request head, taken before the chain attaches its state.
fn clone_head(request: &Request) -> Request {
    let mut head = Request::new(Body::empty());
    *head.method_mut() = request.method().clone();
    *head.uri_mut() = request.uri().clone();
    *head.version_mut() = request.version();
    *head.headers_mut() = request.headers().clone();
    *head.extensions_mut() = request.extensions().clone();
    head
}
