use std::env;

use anyhow::{bail, Context, Result};
use url::Url;

const DEFAULT_PORT: u16 = 8000;

/// Runtime configuration, read once at startup. The store endpoint, store
/// access key and token signing secret are required; the process refuses
/// to serve traffic without them.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store_url: Url,
    pub store_key: String,
    pub jwt_secret: String,
    pub cors_origins: Vec<String>,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let raw_url = require_var("SUPABASE_URL")?;
        let store_url = Url::parse(&raw_url)
            .with_context(|| format!("SUPABASE_URL is not a valid URL: {}", raw_url))?;
        let store_key = require_var("SUPABASE_ANON_KEY")?;
        let jwt_secret = require_var("SUPABASE_JWT_SECRET")?;

        let cors_origins = env::var("CORS_ORIGINS")
            .map(|v| parse_origins(&v))
            .unwrap_or_else(|_| vec!["http://localhost:3000".to_string()]);

        let port = env::var("PORT")
            .ok()
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        Ok(Self {
            store_url,
            store_key,
            jwt_secret,
            cors_origins,
            port,
        })
    }
}

fn require_var(name: &str) -> Result<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => bail!("Missing required environment variable: {}", name),
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
