//! HTTP Basic authentication middleware.

use std::sync::Arc;

use axum::{extract::Request, response::Response};
use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::{
    chain::{AuthzContext, Handler, unwritten},
    middleware::{Next, constant_time_eq, credentials, from_fn},
    models::principal::{Principal, Scheme},
};

#[derive(Debug)]
struct Expected {
    username: String,
    password: String,
}

/// Basic auth chain member accepting a single username/password pair.
///
/// - No `Authorization: Basic` header: abstain and call the next middleware
/// - Matching credentials: authorize, insert `Principal`, call the next middleware
/// - Anything else: deny and stop the chain without answering, so the chain's
///   unauthorized handler responds
pub fn basic_auth(
    username: impl Into<String>,
    password: impl Into<String>,
) -> impl Fn(Handler) -> Handler + Clone + Send + Sync + 'static {
    let expected = Arc::new(Expected {
        username: username.into(),
        password: password.into(),
    });

    from_fn(move |request: Request, next: Next| {
        let expected = expected.clone();
        async move { authenticate(&expected, request, next).await }
    })
}

async fn authenticate(expected: &Expected, mut request: Request, next: Next) -> Response {
    let Some(encoded) = credentials(&request, "Basic").map(str::to_owned) else {
        return next.run(request).await;
    };

    let ctx = AuthzContext::get(&request);

    match decode(&encoded) {
        Some((username, password))
            if constant_time_eq(username.as_bytes(), expected.username.as_bytes())
                & constant_time_eq(password.as_bytes(), expected.password.as_bytes()) =>
        {
            ctx.authorize();
            request
                .extensions_mut()
                .insert(Principal::new(username, Scheme::Basic));
            next.run(request).await
        }
        _ => {
            tracing::warn!("basic credentials rejected");
            ctx.unauthorize();
            unwritten()
        }
    }
}

/// Decode `base64(username:password)`.
fn decode(encoded: &str) -> Option<(String, String)> {
    let bytes = STANDARD.decode(encoded).ok()?;
    let pair = String::from_utf8(bytes).ok()?;
    let (username, password) = pair.split_once(':')?;

    Some((username.to_owned(), password.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_user_and_password() {
        let encoded = STANDARD.encode("admin:pa:ss");
        assert_eq!(
            decode(&encoded),
            Some(("admin".to_owned(), "pa:ss".to_owned()))
        );
    }

    #[test]
    fn rejects_malformed_payloads() {
        assert_eq!(decode("not base64!"), None);
        assert_eq!(decode(&STANDARD.encode("no-colon")), None);
    }
}
