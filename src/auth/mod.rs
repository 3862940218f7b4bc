use axum::http::HeaderMap;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Audience every accepted token must carry.
pub const EXPECTED_AUDIENCE: &str = "authenticated";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    pub aud: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: impl Into<String>, expires_in: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: Some(user_id.into()),
            aud: EXPECTED_AUDIENCE.to_string(),
            exp: (now + expires_in).timestamp(),
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing Authorization header")]
    MissingHeader,
    #[error("Invalid Authorization header format")]
    InvalidHeader,
    #[error("Authorization header must use Bearer token format")]
    NotBearer,
    #[error("Empty JWT token")]
    EmptyToken,
    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),
    #[error("Token has no subject claim")]
    MissingSubject,
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
}

/// Extract the bearer token from the Authorization header
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get("authorization")
        .ok_or(AuthError::MissingHeader)?;

    let auth_str = auth_header.to_str().map_err(|_| AuthError::InvalidHeader)?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or(AuthError::NotBearer)?;

    if token.trim().is_empty() {
        return Err(AuthError::EmptyToken);
    }

    Ok(token)
}

/// Verify an HS256-signed token and extract the caller's user id from the
/// subject claim. The algorithm is fixed; tokens signed any other way fail.
pub fn verify_token(token: &str, secret: &str) -> Result<String, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[EXPECTED_AUDIENCE]);
    validation.set_required_spec_claims(&["exp", "aud"]);

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

    match token_data.claims.sub {
        Some(sub) if !sub.is_empty() => Ok(sub),
        _ => Err(AuthError::MissingSubject),
    }
}

pub fn mint_token(claims: &Claims, secret: &str) -> Result<String, AuthError> {
    let encoding_key = EncodingKey::from_secret(secret.as_bytes());

    encode(&Header::new(Algorithm::HS256), claims, &encoding_key)
        .map_err(|e| AuthError::TokenGeneration(e.to_string()))
}
