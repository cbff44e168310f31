//! JWT service for token issuance and validation
//!
//! Tokens are signed with a shared HMAC secret using HS256 only. Validation
//! rejects every other algorithm, so a token re-signed under a different
//! algorithm never verifies. Expiry is checked with zero leeway.

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use identity::User;

/// Issuer tag stamped into and required from every token
pub const ISSUER: &str = "login-app";

const ALGORITHM: Algorithm = Algorithm::HS256;

/// JWT claims structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user ID
    pub sub: String,
    /// User ID
    pub user_id: String,
    pub email: String,
    pub username: String,
    /// Issued at time
    pub iat: u64,
    /// Not valid before
    pub nbf: u64,
    /// Expiration time
    pub exp: u64,
    /// Issuer
    pub iss: String,
}

/// Why a token was rejected
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    /// Signature is valid but the token is past its expiry
    #[error("token expired")]
    Expired,

    /// Malformed, wrongly signed, wrong algorithm, wrong issuer or not yet valid
    #[error("invalid token")]
    Invalid,
}

/// JWT service
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    token_duration: Duration,
}

impl JwtService {
    /// Initialize a new JWT service
    pub fn new(secret: &str, token_duration: Duration) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.validate_aud = false;
        validation.set_issuer(&[ISSUER]);
        validation.set_required_spec_claims(&["exp", "nbf", "iss", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            token_duration,
        }
    }

    /// Issue a token for a user, returning it with its absolute expiry
    pub fn issue(&self, user: &User) -> Result<(String, DateTime<Utc>)> {
        let now = Utc::now();
        let expires_at = chrono::Duration::from_std(self.token_duration)
            .ok()
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .context("token lifetime overflows the expiry timestamp")?;
        let issued = unix_seconds(now);

        let claims = Claims {
            sub: user.id.clone(),
            user_id: user.id.clone(),
            email: user.email.clone(),
            username: user.username.clone(),
            iat: issued,
            nbf: issued,
            exp: unix_seconds(expires_at),
            iss: ISSUER.to_string(),
        };

        let token = encode(&Header::new(ALGORITHM), &claims, &self.encoding_key)?;
        debug!(user_id = %user.id, "jwt issued");
        Ok((token, expires_at))
    }

    /// Validate a token and return the claims
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            debug!(reason = ?e.kind(), "jwt rejected");
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            }
        })?;
        Ok(data.claims)
    }
}

fn unix_seconds(at: DateTime<Utc>) -> u64 {
    u64::try_from(at.timestamp()).unwrap_or(0)
}
