use authz_chain::{app, config::Config};
use axum::{
    Router,
    body::{Body, to_bytes},
    extract::Request,
    http::{StatusCode, header},
    response::Response,
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde_json::Value;
use tower::ServiceExt;

const PROTECTED: &str = "/api/protected-resource/post";

fn demo() -> Router {
    app::router(&Config {
        server_port: 3000,
        basic_username: Some("admin".into()),
        basic_password: Some("admin123".into()),
        api_keys: vec!["acme=sk_live_1".into()],
        bearer_tokens: vec!["alice=token-a".into()],
    })
}

fn post(headers: &[(&str, &str)]) -> Request {
    let mut builder = Request::builder().method("POST").uri(PROTECTED);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(Body::empty()).unwrap()
}

async fn json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let response = demo()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json(response).await["status"], "healthy");
}

#[tokio::test]
async fn anonymous_request_gets_challenge() {
    let response = demo().oneshot(post(&[])).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));
    assert_eq!(json(response).await["error"]["code"], "invalid_credentials");
}

#[tokio::test]
async fn basic_credentials_authorize() {
    let credentials = format!("Basic {}", STANDARD.encode("admin:admin123"));
    let response = demo()
        .oneshot(post(&[("authorization", credentials.as_str())]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json(response).await;
    assert_eq!(
        body["message"],
        "Hello admin you are authenticated successfully!"
    );
    assert_eq!(body["scheme"], "basic");
}

#[tokio::test]
async fn wrong_basic_password_is_denied() {
    let credentials = format!("Basic {}", STANDARD.encode("admin:nope"));
    let response = demo()
        .oneshot(post(&[("authorization", credentials.as_str())]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json(response).await["error"]["code"], "invalid_credentials");
}

#[tokio::test]
async fn bearer_token_authorizes() {
    let response = demo()
        .oneshot(post(&[("authorization", "Bearer token-a")]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json(response).await["scheme"], "bearer");
}

#[tokio::test]
async fn bad_api_key_answers_itself() {
    let response = demo()
        .oneshot(post(&[("x-api-key", "sk_wrong")]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(!response.headers().contains_key(header::WWW_AUTHENTICATE));
    assert_eq!(json(response).await["error"]["code"], "invalid_api_key");
}

#[tokio::test]
async fn denial_beats_a_valid_scheme() {
    let response = demo()
        .oneshot(post(&[
            ("authorization", "Bearer token-a"),
            ("x-api-key", "sk_wrong"),
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json(response).await["error"]["code"], "invalid_api_key");
}

#[tokio::test]
async fn api_key_authorizes() {
    let response = demo()
        .oneshot(post(&[("x-api-key", "sk_live_1")]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json(response).await;
    assert_eq!(body["scheme"], "api_key");
    assert_eq!(
        body["message"],
        "Hello acme you are authenticated successfully!"
    );
}
