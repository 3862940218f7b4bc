use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::Duration;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use book_tracker_api::auth::{mint_token, Claims};
use book_tracker_api::routes::{app, AppState};
use book_tracker_api::store::InMemoryStore;

pub const TEST_SECRET: &str = "test-signing-secret";

/// Router over an in-memory store, plus a handle to the store so tests
/// can assert on side effects directly.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryStore>,
}

pub fn test_app() -> TestApp {
    let store = Arc::new(InMemoryStore::new());
    let state = AppState::new(store.clone(), TEST_SECRET, vec![]);

    TestApp {
        router: app(state),
        store,
    }
}

/// Mints a valid token for the given user.
pub fn token_for(user_id: &str) -> String {
    mint_token(&Claims::new(user_id, Duration::hours(1)), TEST_SECRET).expect("mint token")
}

/// Sends one request through the router and returns status plus parsed
/// JSON body (Null when the body is empty).
pub async fn request(
    router: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    };

    let response = router.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = response.into_body().collect().await.expect("body").to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };

    (status, json)
}
