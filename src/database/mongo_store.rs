use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::bson::{doc, DateTime as BsonDateTime};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::ReturnDocument;
use mongodb::Collection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user_store::{StoreError, UserStore};
use super::{MongoDB, USERS_COLLECTION};
use crate::models::{NewUser, User, UserUpdate};

const DUPLICATE_KEY: i32 = 11000;

/// Stored shape of a user; ids are UUID strings kept in `_id`.
#[derive(Debug, Serialize, Deserialize, Clone)]
struct UserDocument {
    #[serde(rename = "_id")]
    id: String,
    email: String,
    name: String,
    created_at: BsonDateTime,
    updated_at: BsonDateTime,
}

impl From<&User> for UserDocument {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            created_at: to_bson(user.created_at),
            updated_at: to_bson(user.updated_at),
        }
    }
}

impl From<UserDocument> for User {
    fn from(document: UserDocument) -> Self {
        Self {
            id: document.id,
            email: document.email,
            name: document.name,
            created_at: from_bson(document.created_at),
            updated_at: from_bson(document.updated_at),
        }
    }
}

fn to_bson(at: DateTime<Utc>) -> BsonDateTime {
    BsonDateTime::from_millis(at.timestamp_millis())
}

fn from_bson(at: BsonDateTime) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(at.timestamp_millis()).unwrap_or_default()
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => write_error.code == DUPLICATE_KEY,
        ErrorKind::Command(command_error) => command_error.code == DUPLICATE_KEY,
        _ => false,
    }
}

pub struct MongoUserStore {
    db: MongoDB,
}

impl MongoUserStore {
    pub fn new(db: MongoDB) -> Self {
        Self { db }
    }

    fn users(&self) -> Collection<UserDocument> {
        self.db.collection::<UserDocument>(USERS_COLLECTION)
    }
}

#[async_trait]
impl UserStore for MongoUserStore {
    async fn create(&self, new_user: NewUser) -> Result<User, StoreError> {
        let email = new_user.email.clone();
        let user = User::create(Uuid::new_v4().to_string(), new_user, Utc::now());

        match self.users().insert_one(UserDocument::from(&user)).await {
            Ok(_) => Ok(user),
            Err(e) if is_duplicate_key(&e) => Err(StoreError::DuplicateEmail(email)),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        let found = self.users().find_one(doc! { "_id": id }).await?;
        Ok(found.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let found = self.users().find_one(doc! { "email": email }).await?;
        Ok(found.map(User::from))
    }

    async fn find_all(&self) -> Result<Vec<User>, StoreError> {
        let cursor = self
            .users()
            .find(doc! {})
            .sort(doc! { "created_at": -1 })
            .await?;

        let documents: Vec<UserDocument> = cursor.try_collect().await?;
        Ok(documents.into_iter().map(User::from).collect())
    }

    async fn update(&self, id: &str, update: UserUpdate) -> Result<Option<User>, StoreError> {
        let mut set = doc! { "updated_at": to_bson(Utc::now()) };
        if let Some(name) = &update.name {
            set.insert("name", name.clone());
        }
        if let Some(email) = &update.email {
            set.insert("email", email.clone());
        }

        let result = self
            .users()
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await;

        match result {
            Ok(found) => Ok(found.map(User::from)),
            Err(e) if is_duplicate_key(&e) => Err(StoreError::DuplicateEmail(update.email.unwrap_or_default())),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let result = self.users().delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.users().count_documents(doc! {}).await?)
    }

    fn backend_name(&self) -> &'static str {
        "mongodb"
    }

    async fn close(&self) {
        self.db.shutdown().await;
        log::info!("✅ Disconnected from MongoDB");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_round_trip_keeps_millis() {
        let now = DateTime::<Utc>::from_timestamp_millis(1_714_564_800_123).unwrap();
        let user = User::create(
            "id-1".to_string(),
            NewUser {
                email: "ana@example.com".to_string(),
                name: "Ana".to_string(),
            },
            now,
        );

        let back = User::from(UserDocument::from(&user));
        assert_eq!(back, user);
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_mongodb_user_lifecycle() {
        dotenv::dotenv().ok();
        let uri = std::env::var("MONGODB_URI").unwrap_or_else(|_| "mongodb://localhost:27017".to_string());

        let db = MongoDB::new(&uri, "hello_service_test").await.unwrap();
        let store = MongoUserStore::new(db);

        let email = format!("{}@example.com", Uuid::new_v4());
        let created = store
            .create(NewUser {
                email: email.clone(),
                name: "Ana".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(store.find_by_email(&email).await.unwrap().map(|u| u.id), Some(created.id.clone()));
        assert!(store.delete(&created.id).await.unwrap());
        store.close().await;
    }
}
