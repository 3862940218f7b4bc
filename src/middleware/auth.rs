use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth::{bearer_token, verify_token};
use crate::error::ApiError;
use crate::routes::AppState;

/// Authenticated user context extracted from the verified JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: String,
}

/// JWT authentication middleware that validates the bearer token and
/// injects the caller's identity into the request. The subject claim is
/// the only source of the user id; nothing from the body, query string
/// or other headers is trusted for identity.
pub async fn require_auth(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&headers)?;
    let user_id = verify_token(token, &state.jwt_secret)?;

    request.extensions_mut().insert(AuthUser { user_id });

    Ok(next.run(request).await)
}
