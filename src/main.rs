use std::sync::Arc;

use anyhow::Context;

use book_tracker_api::config::AppConfig;
use book_tracker_api::routes::{app, AppState};
use book_tracker_api::store::PostgrestStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up SUPABASE_URL and friends.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    // Fatal when the store endpoint, store key or signing secret is missing.
    let config = AppConfig::from_env()?;

    let store = Arc::new(PostgrestStore::new(
        config.store_url.clone(),
        config.store_key.clone(),
    ));
    let state = AppState::new(store, config.jwt_secret.clone(), config.cors_origins.clone());

    let app = app(state);

    let bind_addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Book Tracker API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server")?;

    Ok(())
}
