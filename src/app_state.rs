use std::sync::Arc;
use std::time::Instant;

use crate::config::AppConfig;
use crate::database::{InMemoryUserStore, UserStore};

/// Shared, read-only state handed to every worker.
pub struct AppState {
    pub config: AppConfig,
    pub started_at: Instant,
    pub users: Arc<dyn UserStore>,
}

impl AppState {
    pub fn new(config: AppConfig, users: Arc<dyn UserStore>) -> Self {
        Self {
            config,
            started_at: Instant::now(),
            users,
        }
    }

    /// State backed by the in-memory store, used by tests and local runs.
    pub fn in_memory(config: AppConfig) -> Self {
        Self::new(config, Arc::new(InMemoryUserStore::new()))
    }

    pub fn uptime_secs(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }
}
