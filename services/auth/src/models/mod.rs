//! Request, response and view models for the auth service

pub mod response;
pub mod user;

// Re-export for convenience
pub use response::{ErrorResponse, SuccessResponse};
pub use user::{AuthResponse, LoginRequest, RegisterRequest, UserInfo};
