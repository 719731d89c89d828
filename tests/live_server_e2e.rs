//! Smoke test against a running server backed by real PostgreSQL and Redis.
//!
//! Start the server, then run `cargo test --test live_server_e2e -- --ignored`.
//! `TEST_BASE_URL` overrides the default `http://127.0.0.1:3000`.

use std::time::{SystemTime, UNIX_EPOCH};
use serde_json::{json, Value};
use once_cell::sync::Lazy;

static BASE_URL: Lazy<String> = Lazy::new(|| {
    std::env::var("TEST_BASE_URL").unwrap_or_else(|_| "http://127.0.0.1:3000".to_string())
});

// Shared test context
struct TestContext {
    client: reqwest::Client,
}

impl TestContext {
    fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .cookie_store(true)
                .build()
                .unwrap(),
        }
    }

    fn url(path: &str) -> String {
        format!("{}{}", *BASE_URL, path)
    }

    fn get_timestamp() -> u128 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    }
}

#[tokio::test]
#[ignore = "needs a running server with PostgreSQL and Redis"]
async fn test_register_sign_out_and_sign_in() {
    let context = TestContext::new();
    let email = format!("user_{}@example.com", TestContext::get_timestamp());

    // Step 1: Registration
    let reg_response = context.client.post(TestContext::url("/user"))
        .json(&json!({
            "name": "Test User",
            "email": email,
            "password": "SecurePass123!@#"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(reg_response.status().as_u16(), 201, "Registration failed");
    let reg_body: Value = reg_response.json().await.unwrap();
    assert!(reg_body["user"].get("password").is_none());
    let user_id = reg_body["user"]["id"].clone();

    // Step 2: Session lookup through the cookie jar
    let me: Value = context.client.get(TestContext::url("/user"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(me["id"], user_id);

    // Step 3: Sign out, twice
    for _ in 0..2 {
        let out = context.client.delete(TestContext::url("/user/session"))
            .send()
            .await
            .unwrap();
        assert_eq!(out.status().as_u16(), 204, "Sign-out failed");
    }

    let me: Value = context.client.get(TestContext::url("/user"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(me, Value::Null);

    // Step 4: Sign in again
    let login_response = context.client.post(TestContext::url("/user/signin"))
        .json(&json!({
            "email": email,
            "password": "SecurePass123!@#"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(login_response.status().as_u16(), 200, "Sign-in failed");
    assert!(login_response.cookies().any(|c| c.name() == "session-id"));
    let login_body: Value = login_response.json().await.unwrap();
    assert_eq!(login_body["id"], user_id);
}
