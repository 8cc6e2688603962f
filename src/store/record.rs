//! Stored user records and the store trait

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::enrollment::User;
use crate::error::Result;

/// A user as kept by a store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredUser {
    /// Unique identifier assigned on insert
    pub id: Uuid,

    pub name: String,

    /// Normalized e-mail, unique within a store
    pub email: String,

    /// Hex SHA-256 of `salt || password`
    pub password_hash: String,

    pub salt: String,

    #[serde(default)]
    pub preferences: Vec<String>,

    pub created_at: DateTime<Utc>,
}

impl StoredUser {
    /// Build the stored form of a user with a fresh id and salt
    pub fn from_user(user: &User) -> Self {
        let salt = Uuid::new_v4().simple().to_string();
        Self {
            id: Uuid::new_v4(),
            name: user.name.clone(),
            email: user.email.clone(),
            password_hash: hash_password(&salt, &user.password),
            salt,
            preferences: user.initial_preferences.clone(),
            created_at: Utc::now(),
        }
    }
}

/// Salted password digest
pub fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Where enrolled users end up
pub trait UserStore {
    /// Persist a user; an e-mail that is already present is `DuplicateUser`.
    fn insert_user(&self, user: &User) -> Result<StoredUser>;

    /// All users in insertion order
    fn list_users(&self) -> Result<Vec<StoredUser>>;

    /// Look a user up by (normalized) e-mail
    fn find_by_email(&self, email: &str) -> Result<Option<StoredUser>> {
        Ok(self.list_users()?.into_iter().find(|u| u.email == email))
    }
}
