//! Authentication service
//!
//! Orchestrates registration, credential checks and the token lifecycle on
//! top of a [`UserStore`]. No store lock is held while hashing or signing;
//! the service only ever works on the copies the store hands out.

use std::sync::Arc;

use anyhow::Result;
use identity::{NewUser, StoreError, User, UserStore};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::{AuthError, AuthResult};
use crate::jwt::JwtService;
use crate::models::{AuthResponse, LoginRequest, RegisterRequest, UserInfo};
use crate::password::PasswordService;

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn UserStore>,
    passwords: PasswordService,
    jwt: JwtService,
}

impl AuthService {
    /// Create a new auth service over the given store
    pub fn new(store: Arc<dyn UserStore>, config: &AuthConfig) -> Result<Self> {
        Ok(Self {
            store,
            passwords: PasswordService::new(config.hash_cost)?,
            jwt: JwtService::new(&config.jwt_secret, config.token_duration),
        })
    }

    /// Register a new user and issue its first token
    ///
    /// Fails with `AlreadyExists` on any email or username collision. A
    /// record deleted between creation and token issuance surfaces as
    /// `Internal`.
    pub fn register(&self, request: &RegisterRequest) -> AuthResult<AuthResponse> {
        // Advisory only: skips hashing for obvious duplicates. The store's
        // own check in `create` is what enforces uniqueness.
        if self.store.get_by_email(&request.email).is_ok()
            || self.store.get_by_username(&request.username).is_ok()
        {
            warn!(username = %request.username, "registration rejected: user exists");
            return Err(AuthError::AlreadyExists);
        }

        let password_hash = self.passwords.hash(&request.password).map_err(internal)?;
        let id = generate_id();

        self.store
            .create(NewUser {
                id: id.clone(),
                email: request.email.clone(),
                username: request.username.clone(),
                password_hash,
                first_name: request.first_name.clone(),
                last_name: request.last_name.clone(),
            })
            .inspect_err(|_| {
                warn!(username = %request.username, "registration lost a race: user exists")
            })?;

        let user = self.store.get_by_id(&id).map_err(|_| {
            warn!(user_id = %id, "registered user removed before token issuance");
            AuthError::Internal("registered user no longer exists".to_string())
        })?;
        info!(user_id = %user.id, username = %user.username, "user registered");
        self.respond_with_token(&user)
    }

    /// Check credentials and issue a token
    ///
    /// Unknown email, inactive account and wrong password are
    /// indistinguishable to the caller.
    pub fn login(&self, request: &LoginRequest) -> AuthResult<AuthResponse> {
        let user = match self.store.get_by_email(&request.email) {
            Ok(user) => user,
            Err(StoreError::NotFound) => {
                warn!("login rejected: unknown email");
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => return Err(e.into()),
        };

        if !user.is_active {
            warn!(user_id = %user.id, "login rejected: account inactive");
            return Err(AuthError::InvalidCredentials);
        }

        if !self.passwords.verify(&request.password, &user.password_hash) {
            warn!(user_id = %user.id, "login rejected: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        info!(user_id = %user.id, "user logged in");
        self.respond_with_token(&user)
    }

    /// Validate a token and resolve its subject's current public view
    ///
    /// The subject is re-read from the store, so deactivating or deleting a
    /// user revokes every token it holds.
    pub fn validate_token(&self, token: &str) -> AuthResult<UserInfo> {
        let claims = self.jwt.validate(token)?;

        let user = self.store.get_by_id(&claims.sub).map_err(|_| {
            warn!(user_id = %claims.sub, "token rejected: subject no longer exists");
            AuthError::InvalidToken
        })?;

        if !user.is_active {
            warn!(user_id = %user.id, "token rejected: subject inactive");
            return Err(AuthError::InvalidToken);
        }

        Ok(UserInfo::from(&user))
    }

    /// Get a user's public profile
    pub fn get_profile(&self, id: &str) -> AuthResult<UserInfo> {
        let user = self.store.get_by_id(id)?;
        Ok(UserInfo::from(&user))
    }

    /// Activate or deactivate a user
    pub fn set_active(&self, id: &str, active: bool) -> AuthResult<UserInfo> {
        let mut user = self.store.get_by_id(id)?;
        user.is_active = active;
        self.store.update(user)?;

        info!(user_id = %id, active, "user activation changed");
        self.get_profile(id)
    }

    /// Delete a user
    pub fn delete_user(&self, id: &str) -> AuthResult<()> {
        self.store.delete(id)?;
        info!(user_id = %id, "user deleted");
        Ok(())
    }

    /// Public views of every user
    pub fn list_users(&self) -> AuthResult<Vec<UserInfo>> {
        Ok(self.store.list()?.iter().map(UserInfo::from).collect())
    }

    fn respond_with_token(&self, user: &User) -> AuthResult<AuthResponse> {
        let (token, expires_at) = self.jwt.issue(user).map_err(internal)?;
        Ok(AuthResponse {
            token,
            user: UserInfo::from(user),
            expires_at,
        })
    }
}

/// Random 128-bit identifier as 32 hex characters
fn generate_id() -> String {
    Uuid::new_v4().simple().to_string()
}

fn internal(err: anyhow::Error) -> AuthError {
    error!("Auth primitive failed: {:#}", err);
    AuthError::Internal(err.to_string())
}
