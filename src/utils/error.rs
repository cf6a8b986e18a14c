use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use std::backtrace::Backtrace;
use std::fmt;

use crate::database::StoreError;
use crate::utils::time::iso_now;

pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";
pub const MALFORMED_JSON_MESSAGE: &str = "Invalid JSON in request body";

/// Error raised by handlers and middleware.
///
/// Operational errors are expected conditions whose status and message are
/// safe to show to the caller. Anything else is collapsed to a generic 500
/// before it leaves the service.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    operational: bool,
    backtrace: Backtrace,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            operational: true,
            backtrace: Backtrace::capture(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
            operational: false,
            backtrace: Backtrace::capture(),
        }
    }

    pub fn not_found(method: &str, url: &str) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            format!("Endpoint {} {} not found", method, url),
        )
    }

    pub fn malformed_json() -> Self {
        Self::new(StatusCode::BAD_REQUEST, MALFORMED_JSON_MESSAGE)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_operational(&self) -> bool {
        self.operational
    }

    /// Status and message as the caller is allowed to see them.
    pub fn public_parts(&self) -> (StatusCode, String) {
        if self.operational {
            (self.status, self.message.clone())
        } else {
            (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE.to_string())
        }
    }

    /// Headline plus the backtrace captured at construction.
    pub fn stack(&self) -> String {
        format!("AppError: {}\n{}", self.message, self.backtrace)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.status.as_u16())
    }
}

impl std::error::Error for AppError {}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::internal(format!("Serialization error: {}", err))
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail(_) => AppError::new(StatusCode::CONFLICT, err.to_string()),
            StoreError::Backend(_) => AppError::internal(err.to_string()),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.public_parts().0
    }

    // Fallback body when the error escapes the ErrorHandler middleware, so it
    // carries no request context and never a stack.
    fn error_response(&self) -> HttpResponse {
        let (status, message) = self.public_parts();
        HttpResponse::build(status).json(ErrorEnvelope::new(status, message))
    }
}

/// Uniform JSON body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    pub error: bool,
    pub message: String,
    pub status_code: u16,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl ErrorEnvelope {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            error: true,
            message: message.into(),
            status_code: status.as_u16(),
            timestamp: iso_now(),
            path: None,
            method: None,
            stack: None,
        }
    }

    pub fn with_request(mut self, method: &str, path: &str) -> Self {
        self.method = Some(method.to_string());
        self.path = Some(path.to_string());
        self
    }

    pub fn with_stack(mut self, stack: String) -> Self {
        self.stack = Some(stack);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn test_operational_error_keeps_status_and_message() {
        let err = AppError::new(StatusCode::CONFLICT, "already there");
        assert!(err.is_operational());
        assert_eq!(err.public_parts(), (StatusCode::CONFLICT, "already there".to_string()));
    }

    #[test]
    fn test_internal_error_is_redacted() {
        let err = AppError::internal("connection pool exhausted at 10.0.0.3");
        assert!(!err.is_operational());
        assert_eq!(
            err.public_parts(),
            (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE.to_string())
        );
        assert_eq!(err.message(), "connection pool exhausted at 10.0.0.3");
    }

    #[test]
    fn test_not_found_message() {
        let err = AppError::not_found("GET", "/nope?x=1");
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.message(), "Endpoint GET /nope?x=1 not found");
    }

    #[test]
    fn test_stack_starts_with_headline() {
        let err = AppError::malformed_json();
        assert!(err.stack().starts_with("AppError: Invalid JSON in request body"));
    }

    #[test]
    fn test_store_errors_map_to_status() {
        let dup: AppError = StoreError::DuplicateEmail("a@b.c".to_string()).into();
        assert_eq!(dup.status(), StatusCode::CONFLICT);
        assert!(dup.is_operational());

        let backend: AppError = StoreError::Backend("socket closed".to_string()).into();
        assert!(!backend.is_operational());
    }

    #[actix_web::test]
    async fn test_fallback_response_never_leaks() {
        let response = AppError::internal("secret detail").error_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = to_bytes(response.into_body()).await.unwrap();
        let envelope: ErrorEnvelope = serde_json::from_slice(&bytes).unwrap();
        assert!(envelope.error);
        assert_eq!(envelope.message, INTERNAL_ERROR_MESSAGE);
        assert_eq!(envelope.status_code, 500);
        assert!(envelope.stack.is_none());
    }
}
