use super::api::{ApiError, HelloSource};
use crate::models::HelloResponse;

pub const CONNECTING_LABEL: &str = "Connecting...";
pub const FAILED_LABEL: &str = "Error connecting to the backend";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Loading,
    Success { message: String },
    Error { message: String },
}

/// Connection status screen: `Loading` moves to `Success` or `Error`, and
/// `Error` offers a retry that goes back through `Loading`.
#[derive(Debug, Clone)]
pub struct ConnectionStatus {
    state: ConnectionState,
    backend_message: String,
}

impl Default for ConnectionStatus {
    fn default() -> Self {
        Self {
            state: ConnectionState::Loading,
            backend_message: CONNECTING_LABEL.to_string(),
        }
    }
}

impl ConnectionStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn backend_message(&self) -> &str {
        &self.backend_message
    }

    pub fn is_loading(&self) -> bool {
        self.state == ConnectionState::Loading
    }

    pub fn can_retry(&self) -> bool {
        matches!(self.state, ConnectionState::Error { .. })
    }

    pub fn begin(&mut self) {
        self.state = ConnectionState::Loading;
    }

    pub fn finish(&mut self, result: Result<HelloResponse, ApiError>) {
        match result {
            Ok(response) => {
                self.backend_message = response.message.clone();
                self.state = ConnectionState::Success {
                    message: response.message,
                };
            }
            Err(err) => {
                log::warn!("❌ Backend unreachable: {} (status {})", err.message, err.status);
                self.backend_message = FAILED_LABEL.to_string();
                self.state = ConnectionState::Error { message: err.message };
            }
        }
    }

    /// Runs one fetch cycle. Overlapping calls are not guarded against.
    pub async fn load<S>(&mut self, source: &S)
    where
        S: HelloSource + ?Sized,
    {
        self.begin();
        let result = source.fetch_hello().await;
        self.finish(result);
    }

    /// Re-runs the fetch from the error state. Returns `false` when there is
    /// nothing to retry.
    pub async fn retry<S>(&mut self, source: &S) -> bool
    where
        S: HelloSource + ?Sized,
    {
        if !self.can_retry() {
            return false;
        }
        self.load(source).await;
        true
    }

    pub fn render(&self) -> String {
        match &self.state {
            ConnectionState::Loading => "⏳ Connecting to the backend...".to_string(),
            ConnectionState::Error { message } => {
                format!("❌ {}\n🔄 Retry: press Enter (q to quit)", message)
            }
            ConnectionState::Success { .. } => format!("✅ {}", self.backend_message),
        }
    }
}
