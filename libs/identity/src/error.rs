//! Error types for the identity store
//!
//! Every store operation fails with exactly one of these kinds. Callers
//! decide how a kind is surfaced; the store never maps them to transport
//! statuses itself.

use thiserror::Error;

/// Error type for user store operations
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    /// The identifier, email or username is already taken by another record
    #[error("user already exists")]
    AlreadyExists,

    /// No record matches the requested identifier, email or username
    #[error("user not found")]
    NotFound,
}

/// Type alias for Result with StoreError
pub type StoreResult<T> = Result<T, StoreError>;
