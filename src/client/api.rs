use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

use crate::models::{HelloRequest, HelloResponse};

pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";
pub const CONNECTION_ERROR_MESSAGE: &str = "Connection error";
pub const INVALID_RESPONSE_MESSAGE: &str = "Invalid server response";

/// Every client-side failure: `status` is the HTTP status, or 0 when no
/// response was received at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub message: String,
    pub status: u16,
}

impl ApiError {
    pub fn new(message: impl Into<String>, status: u16) -> Self {
        Self {
            message: message.into(),
            status,
        }
    }

    pub fn connection() -> Self {
        Self::new(CONNECTION_ERROR_MESSAGE, 0)
    }

    pub fn is_network(&self) -> bool {
        self.status == 0
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

/// Thin JSON client for the hello service.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    /// Base URL from `API_URL`, then `VITE_API_URL`, then the local default.
    pub fn from_env() -> Self {
        let base_url = std::env::var("API_URL")
            .or_else(|_| std::env::var("VITE_API_URL"))
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        Self::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        self.send(self.http.get(self.url(endpoint))).await
    }

    pub async fn post<T, B>(&self, endpoint: &str, body: Option<&B>) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let mut request = self.http.post(self.url(endpoint));
        if let Some(body) = body {
            request = request.json(body);
        }
        self.send(request).await
    }

    pub async fn put<T, B>(&self, endpoint: &str, body: Option<&B>) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let mut request = self.http.put(self.url(endpoint));
        if let Some(body) = body {
            request = request.json(body);
        }
        self.send(request).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        self.send(self.http.delete(self.url(endpoint))).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request
            .header(CONTENT_TYPE, "application/json")
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| {
                log::debug!("Request failed before a response arrived: {}", e);
                ApiError::connection()
            })?;

        handle_response(response).await
    }

    pub async fn get_hello(&self) -> Result<HelloResponse, ApiError> {
        self.get("/hello").await
    }

    pub async fn get_hello_time(&self) -> Result<HelloResponse, ApiError> {
        self.get("/hello/time").await
    }

    pub async fn post_hello(&self, request: &HelloRequest) -> Result<HelloResponse, ApiError> {
        self.post("/hello", Some(request)).await
    }
}

async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();

    if !status.is_success() {
        let message = format!(
            "Error {}: {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown")
        );
        return Err(ApiError::new(message, status.as_u16()));
    }

    response
        .json::<T>()
        .await
        .map_err(|_| ApiError::new(INVALID_RESPONSE_MESSAGE, status.as_u16()))
}

/// The single fetch the connection status screen depends on.
#[async_trait]
pub trait HelloSource: Send + Sync {
    async fn fetch_hello(&self) -> Result<HelloResponse, ApiError>;
}

#[async_trait]
impl HelloSource for ApiClient {
    async fn fetch_hello(&self) -> Result<HelloResponse, ApiError> {
        self.get_hello().await
    }
}
