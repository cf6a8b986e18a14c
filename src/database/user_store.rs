use async_trait::async_trait;
use std::fmt;

use crate::models::{NewUser, User, UserUpdate};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    DuplicateEmail(String),
    Backend(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::DuplicateEmail(email) => write!(f, "A user with email {} already exists", email),
            StoreError::Backend(msg) => write!(f, "Storage error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

/// Persistence port for user records. Backends are swapped at startup.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, new_user: NewUser) -> Result<User, StoreError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// All users, newest first.
    async fn find_all(&self) -> Result<Vec<User>, StoreError>;

    /// Returns the updated record, or `None` when the id is unknown.
    async fn update(&self, id: &str, update: UserUpdate) -> Result<Option<User>, StoreError>;

    /// Returns whether a record was removed.
    async fn delete(&self, id: &str) -> Result<bool, StoreError>;

    async fn count(&self) -> Result<u64, StoreError>;

    fn backend_name(&self) -> &'static str;

    async fn close(&self) {}
}
