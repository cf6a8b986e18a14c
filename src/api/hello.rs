use actix_web::{http::StatusCode, web, HttpMessage, HttpRequest, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;

use crate::api::not_found;
use crate::models::{HelloRequest, HelloResponse};
use crate::services::hello_service;
use crate::utils::error::AppError;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/hello")
            .route(web::get().to(get_hello))
            .route(web::head().to(get_hello))
            .route(web::post().to(post_hello))
            .default_service(web::to(not_found)),
    )
    .service(
        web::resource("/hello/time")
            .route(web::get().to(get_hello_with_time))
            .route(web::head().to(get_hello_with_time))
            .default_service(web::to(not_found)),
    );
}

#[utoipa::path(
    get,
    path = "/api/hello",
    tag = "Hello",
    responses(
        (status = 200, description = "Basic greeting", body = HelloResponse)
    )
)]
pub async fn get_hello() -> HttpResponse {
    log::info!("✅ GET /api/hello received");
    HttpResponse::Ok().json(hello_service::greeting())
}

#[utoipa::path(
    get,
    path = "/api/hello/time",
    tag = "Hello",
    responses(
        (status = 200, description = "Greeting with server timestamp", body = HelloResponse)
    )
)]
pub async fn get_hello_with_time() -> HttpResponse {
    log::info!("✅ GET /api/hello/time received");
    HttpResponse::Ok().json(hello_service::greeting_with_time(Utc::now()))
}

#[utoipa::path(
    post,
    path = "/api/hello",
    tag = "Hello",
    request_body = HelloRequest,
    responses(
        (status = 201, description = "Greeting echoing the received data", body = HelloResponse),
        (status = 400, description = "Malformed JSON body", body = crate::utils::error::ErrorEnvelope)
    )
)]
pub async fn post_hello(req: HttpRequest, body: web::Bytes) -> Result<HttpResponse, AppError> {
    let request = parse_hello_request(&req, &body)?;
    log::info!(
        "✅ POST /api/hello received: name={:?} message={:?}",
        request.name,
        request.message
    );

    let response = hello_service::personalized_greeting(request, Utc::now())?;
    Ok(HttpResponse::Created().json(response))
}

pub const INVALID_FORM_MESSAGE: &str = "Invalid form data in request body";

#[derive(Debug, PartialEq)]
enum BodyKind {
    Json,
    Form,
    Other,
}

fn body_kind(req: &HttpRequest) -> BodyKind {
    let content_type = req.content_type().to_ascii_lowercase();
    if content_type == "application/json" || content_type.ends_with("+json") {
        BodyKind::Json
    } else if content_type == "application/x-www-form-urlencoded" {
        BodyKind::Form
    } else {
        BodyKind::Other
    }
}

/// Form fields are plain strings; only the two the greeting uses are kept.
#[derive(Deserialize)]
struct HelloForm {
    name: Option<String>,
    message: Option<String>,
}

/// JSON and urlencoded bodies are read; anything else counts as an empty request.
fn parse_hello_request(req: &HttpRequest, body: &[u8]) -> Result<HelloRequest, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(HelloRequest::default());
    }

    match body_kind(req) {
        BodyKind::Json => {
            let value: Value = serde_json::from_slice(body).map_err(|_| AppError::malformed_json())?;
            match value {
                Value::Object(_) => serde_json::from_value(value).map_err(|_| AppError::malformed_json()),
                Value::Array(_) => Ok(HelloRequest::default()),
                _ => Err(AppError::malformed_json()),
            }
        }
        BodyKind::Form => {
            let form: HelloForm = serde_urlencoded::from_bytes(body)
                .map_err(|_| AppError::new(StatusCode::BAD_REQUEST, INVALID_FORM_MESSAGE))?;
            Ok(HelloRequest::new(form.name.as_deref(), form.message.as_deref()))
        }
        BodyKind::Other => Ok(HelloRequest::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::header;
    use actix_web::test::TestRequest;

    fn json_request() -> HttpRequest {
        TestRequest::post()
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .to_http_request()
    }

    #[test]
    fn test_parse_object_body() {
        let parsed = parse_hello_request(&json_request(), br#"{"name":"Ana","extra":1}"#).unwrap();
        assert_eq!(parsed, HelloRequest::new(Some("Ana"), None));
    }

    #[test]
    fn test_parse_empty_and_array_bodies() {
        assert_eq!(parse_hello_request(&json_request(), b"").unwrap(), HelloRequest::default());
        assert_eq!(parse_hello_request(&json_request(), b"  \n").unwrap(), HelloRequest::default());
        assert_eq!(parse_hello_request(&json_request(), b"[\"Ana\"]").unwrap(), HelloRequest::default());
    }

    #[test]
    fn test_parse_rejects_malformed_and_scalars() {
        let err = parse_hello_request(&json_request(), b"{name:").unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = parse_hello_request(&json_request(), b"\"Ana\"").unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_non_json_content_type_is_ignored() {
        let req = TestRequest::post()
            .insert_header((header::CONTENT_TYPE, "text/plain"))
            .to_http_request();
        assert_eq!(parse_hello_request(&req, b"{not json").unwrap(), HelloRequest::default());
    }

    #[test]
    fn test_json_content_type_is_case_insensitive() {
        let req = TestRequest::post()
            .insert_header((header::CONTENT_TYPE, "Application/JSON; charset=utf-8"))
            .to_http_request();
        assert_eq!(body_kind(&req), BodyKind::Json);
        assert_eq!(
            parse_hello_request(&req, br#"{"name":"Ana"}"#).unwrap(),
            HelloRequest::new(Some("Ana"), None)
        );
    }

    #[test]
    fn test_parse_form_body() {
        let req = TestRequest::post()
            .insert_header((header::CONTENT_TYPE, "application/x-www-form-urlencoded"))
            .to_http_request();
        assert_eq!(
            parse_hello_request(&req, b"name=Ana+Maria&message=hola%21&extra=1").unwrap(),
            HelloRequest::new(Some("Ana Maria"), Some("hola!"))
        );
        assert_eq!(
            parse_hello_request(&req, b"message=hi").unwrap(),
            HelloRequest::new(None, Some("hi"))
        );
    }
}
