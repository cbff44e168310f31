//! User record and creation payload

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User record as held by a store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_active: bool,
}

/// New user creation payload
///
/// Timestamps and the active flag are owned by the store, so they are not
/// part of the payload.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: String,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
}

impl NewUser {
    /// Materialize the record a store keeps for this payload
    pub(crate) fn into_user(self, now: DateTime<Utc>) -> User {
        User {
            id: self.id,
            email: self.email,
            username: self.username,
            password_hash: self.password_hash,
            first_name: self.first_name,
            last_name: self.last_name,
            created_at: now,
            updated_at: now,
            is_active: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_is_never_serialized() {
        let user = NewUser {
            id: "abc".to_string(),
            email: "a@x.com".to_string(),
            username: "alice".to_string(),
            password_hash: "$argon2id$secret-material".to_string(),
            first_name: "A".to_string(),
            last_name: "A".to_string(),
        }
        .into_user(Utc::now());

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("secret-material"));
        assert!(json.contains("a@x.com"));
    }

    #[test]
    fn test_into_user_stamps_store_owned_fields() {
        let now = Utc::now();
        let user = NewUser {
            id: "abc".to_string(),
            email: "a@x.com".to_string(),
            username: "alice".to_string(),
            password_hash: "hash".to_string(),
            first_name: "A".to_string(),
            last_name: "B".to_string(),
        }
        .into_user(now);

        assert!(user.is_active);
        assert_eq!(user.created_at, now);
        assert_eq!(user.updated_at, now);
    }
}
