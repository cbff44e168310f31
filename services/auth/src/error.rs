//! Error types for the auth service and its HTTP layer

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use identity::StoreError;
use thiserror::Error;

use crate::jwt::TokenError;
use crate::models::ErrorResponse;

/// Error kinds surfaced by the auth service
///
/// Failures from the hashing and signing primitives never escape raw; they
/// are wrapped in [`AuthError::Internal`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Email, username or identifier already taken
    #[error("user already exists")]
    AlreadyExists,

    /// No such user
    #[error("user not found")]
    NotFound,

    /// Unknown email, wrong password or inactive account
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Bad signature, wrong algorithm, malformed, or subject no longer valid
    #[error("invalid token")]
    InvalidToken,

    /// Signature valid but the token has expired
    #[error("token expired")]
    TokenExpired,

    /// A cryptographic primitive failed
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::AlreadyExists => AuthError::AlreadyExists,
            StoreError::NotFound => AuthError::NotFound,
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => AuthError::TokenExpired,
            TokenError::Invalid => AuthError::InvalidToken,
        }
    }
}

/// Type alias for auth service results
pub type AuthResult<T> = Result<T, AuthError>;

/// Error type for HTTP handlers
#[derive(Error, Debug)]
pub enum ApiError {
    /// Auth service failure
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Request failed validation
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// No usable bearer token on the request
    #[error("Unauthorized: {0}")]
    Unauthorized(&'static str),

    /// Internal server error
    #[error("Internal server error")]
    InternalServerError,
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            ApiError::Auth(AuthError::AlreadyExists) => (
                StatusCode::CONFLICT,
                "already_exists",
                "User already exists".to_string(),
            ),
            ApiError::Auth(AuthError::NotFound) => (
                StatusCode::NOT_FOUND,
                "not_found",
                "User not found".to_string(),
            ),
            ApiError::Auth(AuthError::InvalidCredentials) => (
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
                "Invalid email or password".to_string(),
            ),
            ApiError::Auth(AuthError::InvalidToken) => (
                StatusCode::UNAUTHORIZED,
                "invalid_token",
                "Invalid token".to_string(),
            ),
            ApiError::Auth(AuthError::TokenExpired) => (
                StatusCode::UNAUTHORIZED,
                "token_expired",
                "Token expired".to_string(),
            ),
            ApiError::Auth(AuthError::Internal(_)) | ApiError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Internal server error".to_string(),
            ),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "validation_error", msg.clone()),
            ApiError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, "unauthorized", msg.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = self.parts();

        let body = Json(ErrorResponse {
            error: error.to_string(),
            message,
            code: status.as_u16(),
        });

        (status, body).into_response()
    }
}

/// Type alias for handler results
pub type ApiResult<T> = Result<T, ApiError>;
