pub mod memory_store;
pub mod mongo_store;
pub mod user_store;

pub use memory_store::InMemoryUserStore;
pub use mongo_store::MongoUserStore;
pub use user_store::{StoreError, UserStore};

use mongodb::bson::doc;
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Collection, Database, IndexModel};
use std::sync::Arc;
use std::time::Duration;

use crate::config::StorageConfig;

pub const USERS_COLLECTION: &str = "users";

#[derive(Clone)]
pub struct MongoDB {
    client: Client,
    db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str, database: &str) -> Result<Self, mongodb::error::Error> {
        let mut client_options = ClientOptions::parse(uri).await?;

        client_options.max_pool_size = Some(10);
        client_options.server_selection_timeout = Some(Duration::from_secs(5));
        client_options.connect_timeout = Some(Duration::from_secs(5));
        client_options.max_idle_time = Some(Duration::from_secs(300));

        let client = Client::with_options(client_options)?;
        let db = client.database(database);

        // Test connection
        db.run_command(doc! { "ping": 1 }).await?;

        let mongodb = Self { client, db };
        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    /// Unique index on users(email), the only lookup besides `_id`.
    /// Duplicate-email detection relies on it, so a failure aborts startup.
    async fn ensure_indexes(&self) -> Result<(), mongodb::error::Error> {
        let users = self.collection::<mongodb::bson::Document>(USERS_COLLECTION);

        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        if let Err(e) = users.create_index(email_index).await {
            log::error!("   ❌ Unique index users(email) could not be created: {}", e);
            return Err(e);
        }
        log::info!("   ✅ Index ready: users(email)");

        Ok(())
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }

    pub async fn shutdown(&self) {
        self.client.clone().shutdown().await;
    }
}

/// Builds the user store selected by configuration.
pub async fn connect(storage: &StorageConfig) -> Result<Arc<dyn UserStore>, StoreError> {
    match storage {
        StorageConfig::Memory => {
            log::info!("💾 Using in-memory user store");
            Ok(Arc::new(InMemoryUserStore::new()))
        }
        StorageConfig::Mongo { uri, database } => {
            log::info!("🔄 Connecting to MongoDB (database: {})...", database);
            let db = MongoDB::new(uri, database).await?;
            log::info!("✅ MongoDB connected successfully");
            Ok(Arc::new(MongoUserStore::new(db)))
        }
    }
}
