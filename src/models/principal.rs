//! Identity of an authenticated caller.

use serde::Serialize;

/// Which scheme authenticated the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scheme {
    Basic,
    Bearer,
    ApiKey,
}

/// Authenticated caller, inserted into request extensions by the scheme that
/// authorized the request.
///
/// Route handlers extract it with `Extension<Principal>`. When several schemes
/// authorize the same request, the last one to run wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    /// Username, token subject, or key owner
    pub subject: String,

    pub scheme: Scheme,
}

impl Principal {
    pub fn new(subject: impl Into<String>, scheme: Scheme) -> Self {
        Self {
            subject: subject.into(),
            scheme,
        }
    }
}
