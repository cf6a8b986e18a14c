use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::user_store::{StoreError, UserStore};
use crate::models::{NewUser, User, UserUpdate};

/// Process-local store; contents are lost on restart.
#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn email_taken(users: &HashMap<String, User>, email: &str, except_id: Option<&str>) -> bool {
    users
        .values()
        .any(|u| u.email == email && Some(u.id.as_str()) != except_id)
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create(&self, new_user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if email_taken(&users, &new_user.email, None) {
            return Err(StoreError::DuplicateEmail(new_user.email));
        }

        let user = User::create(Uuid::new_v4().to_string(), new_user, Utc::now());
        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_all(&self) -> Result<Vec<User>, StoreError> {
        let mut all: Vec<User> = self.users.read().await.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn update(&self, id: &str, update: UserUpdate) -> Result<Option<User>, StoreError> {
        let mut users = self.users.write().await;

        if let Some(email) = update.email.as_deref() {
            if email_taken(&users, email, Some(id)) {
                return Err(StoreError::DuplicateEmail(email.to_string()));
            }
        }

        Ok(users.get_mut(id).map(|user| {
            user.apply(update, Utc::now());
            user.clone()
        }))
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.users.write().await.remove(id).is_some())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.users.read().await.len() as u64)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
