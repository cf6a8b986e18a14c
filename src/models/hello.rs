use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Envelope returned by every `/api/hello` endpoint.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, utoipa::ToSchema)]
pub struct HelloResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub data: Option<Value>,
}

impl HelloResponse {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timestamp: None,
            data: None,
        }
    }
}

/// Body accepted by `POST /api/hello`. Both fields are free-form JSON.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, utoipa::ToSchema)]
pub struct HelloRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub name: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub message: Option<Value>,
}

impl HelloRequest {
    pub fn new(name: Option<&str>, message: Option<&str>) -> Self {
        Self {
            name: name.map(|n| Value::String(n.to_string())),
            message: message.map(|m| Value::String(m.to_string())),
        }
    }

    /// The name to greet, if one was sent with a truthy value.
    pub fn greeting_name(&self) -> Option<String> {
        match self.name.as_ref()? {
            Value::Null | Value::Bool(false) => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            Value::Number(n) if n.as_f64() == Some(0.0) => None,
            other => Some(other.to_string()),
        }
    }
}

/// `data` payload of the POST response, echoing what the client sent.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HelloEcho {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received_message: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received_name: Option<Value>,
    pub server_response: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn with_name(name: Value) -> HelloRequest {
        HelloRequest {
            name: Some(name),
            message: None,
        }
    }

    #[test]
    fn test_greeting_name_for_strings() {
        assert_eq!(with_name(json!("Ana")).greeting_name().as_deref(), Some("Ana"));
        assert_eq!(with_name(json!("")).greeting_name(), None);
        assert_eq!(HelloRequest::default().greeting_name(), None);
    }

    #[test]
    fn test_greeting_name_for_other_values() {
        assert_eq!(with_name(json!(42)).greeting_name().as_deref(), Some("42"));
        assert_eq!(with_name(json!(0)).greeting_name(), None);
        assert_eq!(with_name(json!(false)).greeting_name(), None);
        assert_eq!(with_name(json!(true)).greeting_name().as_deref(), Some("true"));
    }

    #[test]
    fn test_response_skips_absent_fields() {
        let body = serde_json::to_value(HelloResponse::message("hi")).unwrap();
        assert_eq!(body, json!({ "message": "hi" }));
    }
}
