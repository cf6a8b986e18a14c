use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub name: Option<String>,
}

impl User {
    pub fn create(id: String, new_user: NewUser, now: DateTime<Utc>) -> Self {
        Self {
            id,
            email: new_user.email,
            name: new_user.name,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, update: UserUpdate, now: DateTime<Utc>) {
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(name) = update.name {
            self.name = name;
        }
        self.updated_at = now;
    }
}
