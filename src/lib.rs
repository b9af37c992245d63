//! Composable request authorization for axum and tower.
//!
//! Independent authentication schemes are registered on a [`Chain`]. Each one votes
//! on the request through its [`AuthzContext`]; the chain forwards to the protected
//! service only when somebody authorized and nobody denied. Requests that end up
//! unauthorized get the chain's unauthorized handler, unless a middleware already
//! answered them.
//!
//! - [`chain`]: decision state, chain builder, tower layer
//! - [`middleware`]: `from_fn` adapter and the bundled Basic, Bearer and API key schemes
//! - [`app`]: router used by the demo binary

pub mod app;
pub mod chain;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;

pub use chain::{
    AuthzContext, AuthzLayer, AuthzService, Chain, Decision, DecisionState, Handler, Middleware,
    default_unauthorized_handler, unwritten,
};
pub use error::AuthzError;
pub use middleware::{Next, from_fn};
