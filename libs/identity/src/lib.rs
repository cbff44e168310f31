//! Identity store for the login-app
//!
//! This crate owns the user record, the [`UserStore`] contract the auth
//! service depends on, and the in-memory implementation used by the
//! service. A durable backend only has to implement [`UserStore`].

pub mod error;
pub mod models;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use models::{NewUser, User};
pub use store::{MemoryUserStore, UserStore};
