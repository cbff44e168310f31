//! HTTP routes for the login-app

use std::time::Duration;

use axum::{
    Extension, Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{HeaderValue, Method, StatusCode, header},
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{error, info};

use crate::{
    AppState,
    error::{ApiError, ApiResult, AuthResult},
    middleware::auth_middleware,
    models::{LoginRequest, RegisterRequest, SuccessResponse, UserInfo},
    service::AuthService,
};

/// Create the router for the login-app
pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/auth/profile", get(profile))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let router = Router::new()
        .route("/health", get(health_check))
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .merge(protected)
        .with_state(state);

    with_http_layers(router)
}

/// Upper bound on handling a single request
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Wrap a router with the process-wide HTTP layers
///
/// Outermost first: request tracing, security headers, CORS, request
/// timeout, panic recovery. Preflights answered by CORS and 500s from a
/// recovered panic still carry the security headers.
fn with_http_layers(router: Router) -> Router {
    router
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(cors_layer())
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_XSS_PROTECTION,
            HeaderValue::from_static("1; mode=block"),
        ))
        // Spans and responses are emitted at DEBUG.
        .layer(TraceLayer::new_for_http())
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::ORIGIN, header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "login-app"
    }))
}

/// User registration endpoint
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(payload) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    payload.validate().map_err(ApiError::BadRequest)?;

    let response = blocking(state.auth_service, move |service| service.register(&payload)).await?;

    Ok((
        StatusCode::CREATED,
        Json(SuccessResponse::new("User registered successfully", response)),
    ))
}

/// User login endpoint
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(payload) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    payload.validate().map_err(ApiError::BadRequest)?;

    let response = blocking(state.auth_service, move |service| service.login(&payload)).await?;

    Ok(Json(SuccessResponse::new("Login successful", response)))
}

/// Logout endpoint
///
/// Tokens are stateless; the client discards its copy.
pub async fn logout() -> impl IntoResponse {
    info!("Logout request");
    Json(SuccessResponse::message("Logout successful"))
}

/// Profile of the caller identified by the bearer token
pub async fn profile(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
) -> ApiResult<impl IntoResponse> {
    let profile = state.auth_service.get_profile(&user.id)?;
    Ok(Json(SuccessResponse::new(
        "Profile retrieved successfully",
        profile,
    )))
}

/// Run a hashing-heavy service call off the async runtime
async fn blocking<T, F>(service: AuthService, f: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce(AuthService) -> AuthResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(move || f(service))
        .await
        .map_err(|e| {
            error!("Blocking auth task failed: {}", e);
            ApiError::InternalServerError
        })?
        .map_err(ApiError::from)
}
