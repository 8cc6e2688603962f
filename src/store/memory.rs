//! In-memory user store

use parking_lot::RwLock;

use super::{StoredUser, UserStore};
use crate::enrollment::User;
use crate::error::{Error, Result};

/// Keeps users in memory only; used for dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<Vec<StoredUser>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserStore for MemoryStore {
    fn insert_user(&self, user: &User) -> Result<StoredUser> {
        let mut users = self.users.write();
        if users.iter().any(|u| u.email == user.email) {
            return Err(Error::DuplicateUser {
                email: user.email.clone(),
            });
        }
        let stored = StoredUser::from_user(user);
        users.push(stored.clone());
        Ok(stored)
    }

    fn list_users(&self) -> Result<Vec<StoredUser>> {
        Ok(self.users.read().clone())
    }
}
