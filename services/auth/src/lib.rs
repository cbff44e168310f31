//! Authentication service for the login-app
//!
//! Registration, login and JWT session handling over an
//! [`identity::UserStore`], plus the thin HTTP layer that exposes them.

pub mod config;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod routes;
pub mod service;
pub mod validation;

pub use service::AuthService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
}
