//! Middleware for bearer token validation

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};

use crate::{AppState, error::ApiError};

/// Extract and validate the bearer token from the Authorization header
///
/// On success the caller's [`UserInfo`](crate::models::UserInfo) is added to
/// the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(ApiError::Unauthorized("Authorization header required"))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(ApiError::Unauthorized("Bearer token required"))?
        .to_string();

    let user = state.auth_service.validate_token(&token)?;
    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}
