//! User store contract and its in-memory implementation
//!
//! [`MemoryUserStore`] keeps the record map and both uniqueness indexes
//! behind one reader-writer lock, so readers never observe an index that
//! disagrees with the records.

use std::collections::HashMap;

use chrono::Utc;
use parking_lot::RwLock;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::models::{NewUser, User};

/// Storage contract for user records
///
/// Every method is atomic with respect to the whole store. Returned records
/// are copies; mutating them has no effect on stored state.
pub trait UserStore: Send + Sync {
    /// Create a new user
    fn create(&self, new_user: NewUser) -> StoreResult<()>;

    /// Find a user by ID
    fn get_by_id(&self, id: &str) -> StoreResult<User>;

    /// Find a user by email
    fn get_by_email(&self, email: &str) -> StoreResult<User>;

    /// Find a user by username
    fn get_by_username(&self, username: &str) -> StoreResult<User>;

    /// Replace an existing user, keyed by its ID
    fn update(&self, user: User) -> StoreResult<()>;

    /// Delete a user by ID
    fn delete(&self, id: &str) -> StoreResult<()>;

    /// Snapshot of all users, in no particular order
    fn list(&self) -> StoreResult<Vec<User>>;
}

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<String, User>,
    by_email: HashMap<String, String>,
    by_username: HashMap<String, String>,
}

impl Inner {
    fn resolve(&self, index: &HashMap<String, String>, key: &str) -> StoreResult<User> {
        index
            .get(key)
            .and_then(|id| self.users.get(id))
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    /// True when `key` is indexed and points at a record other than `id`
    fn taken_by_other(index: &HashMap<String, String>, key: &str, id: &str) -> bool {
        index.get(key).is_some_and(|owner| owner != id)
    }
}

/// In-memory user store
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    inner: RwLock<Inner>,
}

impl MemoryUserStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.inner.read().users.len()
    }

    /// Whether the store holds no records
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl UserStore for MemoryUserStore {
    fn create(&self, new_user: NewUser) -> StoreResult<()> {
        let mut inner = self.inner.write();

        if inner.users.contains_key(&new_user.id)
            || inner.by_email.contains_key(&new_user.email)
            || inner.by_username.contains_key(&new_user.username)
        {
            return Err(StoreError::AlreadyExists);
        }

        let user = new_user.into_user(Utc::now());
        inner.by_email.insert(user.email.clone(), user.id.clone());
        inner.by_username.insert(user.username.clone(), user.id.clone());
        debug!(user_id = %user.id, "user record created");
        inner.users.insert(user.id.clone(), user);

        Ok(())
    }

    fn get_by_id(&self, id: &str) -> StoreResult<User> {
        self.inner
            .read()
            .users
            .get(id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    fn get_by_email(&self, email: &str) -> StoreResult<User> {
        let inner = self.inner.read();
        inner.resolve(&inner.by_email, email)
    }

    fn get_by_username(&self, username: &str) -> StoreResult<User> {
        let inner = self.inner.read();
        inner.resolve(&inner.by_username, username)
    }

    fn update(&self, mut user: User) -> StoreResult<()> {
        let mut inner = self.inner.write();

        let existing = inner.users.get(&user.id).ok_or(StoreError::NotFound)?;
        let old_email = existing.email.clone();
        let old_username = existing.username.clone();
        let created_at = existing.created_at;

        // Reject before touching either index.
        if Inner::taken_by_other(&inner.by_email, &user.email, &user.id)
            || Inner::taken_by_other(&inner.by_username, &user.username, &user.id)
        {
            return Err(StoreError::AlreadyExists);
        }

        if old_email != user.email {
            inner.by_email.remove(&old_email);
            inner.by_email.insert(user.email.clone(), user.id.clone());
        }
        if old_username != user.username {
            inner.by_username.remove(&old_username);
            inner.by_username.insert(user.username.clone(), user.id.clone());
        }

        user.created_at = created_at;
        user.updated_at = Utc::now();
        debug!(user_id = %user.id, active = user.is_active, "user record updated");
        inner.users.insert(user.id.clone(), user);

        Ok(())
    }

    fn delete(&self, id: &str) -> StoreResult<()> {
        let mut inner = self.inner.write();

        let user = inner.users.remove(id).ok_or(StoreError::NotFound)?;
        inner.by_email.remove(&user.email);
        inner.by_username.remove(&user.username);
        debug!(user_id = %id, "user record deleted");

        Ok(())
    }

    fn list(&self) -> StoreResult<Vec<User>> {
        Ok(self.inner.read().users.values().cloned().collect())
    }
}
