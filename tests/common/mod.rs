use axum::{
    body::Body,
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use user_sessions::{
    build_router,
    config::Config,
    repositories::{
        session::{MemorySessionStore, SessionStore},
        user::MemoryUserStore,
    },
    AppState,
};

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    /// The `session-id` value set by this response, if any.
    pub fn session_cookie(&self) -> Option<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(|cookie| {
                let pair = cookie.split(';').next()?;
                pair.strip_prefix("session-id=").map(str::to_string)
            })
    }

    pub fn set_cookie_headers(&self) -> Vec<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok().map(str::to_string))
            .collect()
    }
}

pub fn test_config(session_ttl_secs: u64) -> Config {
    Config {
        database_url: String::new(),
        redis_url: String::new(),
        session_ttl_secs,
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        cors_origins: Vec::new(),
        secure_cookies: false,
    }
}

pub fn app_with_ttl(session_ttl_secs: u64) -> Router {
    app_with_sessions(session_ttl_secs, Arc::new(MemorySessionStore::new()))
}

pub fn app() -> Router {
    app_with_ttl(60)
}

pub fn app_with_sessions(session_ttl_secs: u64, sessions: Arc<dyn SessionStore>) -> Router {
    let state = AppState::with_stores(
        test_config(session_ttl_secs),
        Arc::new(MemoryUserStore::new()),
        sessions,
    );
    build_router(state)
}

pub async fn send(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes().to_vec();
    TestResponse { status, headers, body }
}

pub fn json_request(method: &str, uri: &str, body: Value, session_id: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(id) = session_id {
        builder = builder.header(header::COOKIE, format!("session-id={}", id));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn bare_request(method: &str, uri: &str, session_id: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(id) = session_id {
        builder = builder.header(header::COOKIE, format!("session-id={}", id));
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn register(app: &Router, name: &str, email: &str, password: &str) -> TestResponse {
    send(
        app,
        json_request(
            "POST",
            "/user",
            serde_json::json!({ "name": name, "email": email, "password": password }),
            None,
        ),
    )
    .await
}
