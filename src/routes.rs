use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers::books;
use crate::middleware::require_auth;
use crate::store::StoreClient;

/// Shared state handed to every request. The store client is injected so
/// tests can swap the remote store for the in-memory one.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn StoreClient>,
    pub jwt_secret: String,
    pub cors_origins: Vec<String>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn StoreClient>,
        jwt_secret: impl Into<String>,
        cors_origins: Vec<String>,
    ) -> Self {
        Self {
            store,
            jwt_secret: jwt_secret.into(),
            cors_origins,
        }
    }
}

pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.cors_origins);

    Router::new()
        // Public liveness probe
        .route("/", get(root))
        // Protected resource routes
        .merge(book_routes(state))
        // Global middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn book_routes(state: AppState) -> Router {
    use axum::routing::{patch, post};

    Router::new()
        .route("/books", post(books::create).get(books::list))
        .route("/books/:id", patch(books::update).delete(books::delete))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Book Tracker API is running!" }))
}
