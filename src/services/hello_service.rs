use chrono::{DateTime, Utc};

use crate::models::{HelloEcho, HelloRequest, HelloResponse};
use crate::utils::error::AppError;
use crate::utils::time::iso_timestamp;

pub const HELLO_MESSAGE: &str = "Hello from the backend! 🎉 The connection works correctly.";
pub const HELLO_TIME_MESSAGE: &str = "Hello from the backend with a timestamp!";
pub const GENERIC_GREETING: &str = "Hello! Message received by the backend.";
pub const SERVER_RESPONSE: &str = "Data processed successfully";

pub fn greeting() -> HelloResponse {
    HelloResponse::message(HELLO_MESSAGE)
}

pub fn greeting_with_time(now: DateTime<Utc>) -> HelloResponse {
    HelloResponse {
        message: HELLO_TIME_MESSAGE.to_string(),
        timestamp: Some(iso_timestamp(now)),
        data: None,
    }
}

/// Greets by name when one is present and echoes the request back in `data`.
pub fn personalized_greeting(request: HelloRequest, now: DateTime<Utc>) -> Result<HelloResponse, AppError> {
    let message = match request.greeting_name() {
        Some(name) => format!("Hello {}! Message received by the backend.", name),
        None => GENERIC_GREETING.to_string(),
    };

    let echo = HelloEcho {
        received_message: request.message,
        received_name: request.name,
        server_response: SERVER_RESPONSE.to_string(),
    };

    Ok(HelloResponse {
        message,
        timestamp: Some(iso_timestamp(now)),
        data: Some(serde_json::to_value(echo)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_greeting_is_not_empty() {
        let response = greeting();
        assert!(!response.message.is_empty());
        assert!(response.timestamp.is_none());
        assert!(response.data.is_none());
    }

    #[test]
    fn test_greeting_with_time() {
        let response = greeting_with_time(fixed_now());
        assert_eq!(response.timestamp.as_deref(), Some("2024-05-01T12:00:00.000Z"));
    }

    #[test]
    fn test_personalized_greeting_uses_name() {
        let request = HelloRequest::new(Some("Ana"), Some("hi there"));
        let response = personalized_greeting(request, fixed_now()).unwrap();

        assert!(response.message.contains("Ana"));
        assert_eq!(
            response.data,
            Some(json!({
                "receivedMessage": "hi there",
                "receivedName": "Ana",
                "serverResponse": SERVER_RESPONSE,
            }))
        );
    }

    #[test]
    fn test_personalized_greeting_without_fields() {
        let response = personalized_greeting(HelloRequest::default(), fixed_now()).unwrap();

        assert_eq!(response.message, GENERIC_GREETING);
        assert_eq!(response.data, Some(json!({ "serverResponse": SERVER_RESPONSE })));
    }
}
