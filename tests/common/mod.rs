#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
    response::Response,
};
use http_body_util::BodyExt;
use newspaper::{AppState, Config, init_state, router};
use serde_json::{Value, json};
use tower::ServiceExt;

pub fn test_config() -> Config {
    let mut config = Config::new("integration-test-secret");
    config.bcrypt_cost = 4;
    config
}

pub fn test_app() -> (AppState, Router) {
    test_app_with(test_config())
}

pub fn test_app_with(config: Config) -> (AppState, Router) {
    let state = init_state(config).expect("bootstrap should succeed");
    let app = router(state.clone());
    (state, app)
}

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request should build"),
        None => builder.body(Body::empty()).expect("request should build"),
    };

    app.clone()
        .oneshot(request)
        .await
        .expect("router should respond")
}

pub async fn json_body(response: Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("collect body")
        .to_bytes();
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

pub async fn get_json(app: &Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    let response = send(app, Method::GET, uri, token, None).await;
    let status = response.status();
    (status, json_body(response).await)
}

pub async fn post_json(
    app: &Router,
    uri: &str,
    token: Option<&str>,
    body: Value,
) -> (StatusCode, Value) {
    let response = send(app, Method::POST, uri, token, Some(body)).await;
    let status = response.status();
    (status, json_body(response).await)
}

/// Registers a user and returns its token.
pub async fn signup(app: &Router, username: &str) -> String {
    let (status, body) = post_json(
        app,
        "/auth/signup",
        None,
        json!({
            "email": format!("{}@example.com", username),
            "username": username,
            "password": "password123",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "signup failed: {}", body);
    body["token"].as_str().expect("token").to_string()
}

/// Registers a user and joins the `authors` group.
pub async fn signup_author(app: &Router, username: &str) -> String {
    let token = signup(app, username).await;
    let response = send(app, Method::POST, "/become-author/", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    token
}

pub async fn create_post(app: &Router, token: &str, collection: &str, body: Value) -> Value {
    let (status, body) =
        post_json(app, &format!("/{}/create/", collection), Some(token), body).await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {}", body);
    body
}
