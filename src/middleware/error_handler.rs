use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::InternalError,
    http::{header, StatusCode},
    Error, HttpResponse,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};

use crate::utils::error::{AppError, ErrorEnvelope, INTERNAL_ERROR_MESSAGE};

/// Renders every error response as an [`ErrorEnvelope`] carrying the request
/// path and method. Stack traces are attached only when `exposes_stack` is set.
pub struct ErrorHandler {
    exposes_stack: bool,
}

impl ErrorHandler {
    pub fn new(exposes_stack: bool) -> Self {
        Self { exposes_stack }
    }
}

impl<S, B> Transform<S, ServiceRequest> for ErrorHandler
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = ErrorHandlerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ErrorHandlerMiddleware {
            service,
            exposes_stack: self.exposes_stack,
        }))
    }
}

pub struct ErrorHandlerMiddleware<S> {
    service: S,
    exposes_stack: bool,
}

impl<S, B> Service<ServiceRequest> for ErrorHandlerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // The router needs sole ownership of the request, so only owned
        // details may be held across the inner call.
        let info = RequestInfo::capture(&req);
        let exposes_stack = self.exposes_stack;
        let fut = self.service.call(req);

        Box::pin(async move {
            match fut.await {
                Ok(res) => {
                    let rendered = res
                        .response()
                        .error()
                        .map(|err| render_error(err, &info, exposes_stack));

                    match rendered {
                        Some(response) => Ok(res.into_response(response).map_into_right_body()),
                        None => Ok(res.map_into_left_body()),
                    }
                }
                Err(err) => {
                    let response = render_error(&err, &info, exposes_stack);
                    Err(InternalError::from_response(err.to_string(), response).into())
                }
            }
        })
    }
}

/// Request details needed to render and log an error.
struct RequestInfo {
    method: String,
    path: String,
    ip: String,
    user_agent: String,
}

impl RequestInfo {
    fn capture(req: &ServiceRequest) -> Self {
        Self {
            method: req.method().as_str().to_string(),
            path: req.uri().to_string(),
            ip: req
                .connection_info()
                .realip_remote_addr()
                .unwrap_or("-")
                .to_string(),
            user_agent: req
                .headers()
                .get(header::USER_AGENT)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("-")
                .to_string(),
        }
    }
}

/// What the caller may see, plus what only the logs may see.
struct Classified {
    status: StatusCode,
    public_message: String,
    internal_message: String,
    stack: String,
}

fn classify(err: &Error) -> Classified {
    if let Some(app_error) = err.as_error::<AppError>() {
        let (status, public_message) = app_error.public_parts();
        return Classified {
            status,
            public_message,
            internal_message: app_error.message().to_string(),
            stack: app_error.stack(),
        };
    }

    // Framework errors (payload limits, extractor failures) keep their 4xx status.
    let status = err.as_response_error().status_code();
    let public_message = if status.is_client_error() {
        err.to_string()
    } else {
        INTERNAL_ERROR_MESSAGE.to_string()
    };

    Classified {
        status: if status.is_client_error() {
            status
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        },
        public_message,
        internal_message: err.to_string(),
        stack: format!("{:?}", err),
    }
}

fn render_error(err: &Error, info: &RequestInfo, exposes_stack: bool) -> HttpResponse {
    let classified = classify(err);

    let level = if classified.status.is_server_error() {
        log::Level::Error
    } else {
        log::Level::Warn
    };

    if exposes_stack {
        log::log!(
            level,
            "🚨 Error caught: message={} url={} method={} ip={} user_agent={}\n{}",
            classified.internal_message,
            info.path,
            info.method,
            info.ip,
            info.user_agent,
            classified.stack
        );
    } else {
        log::log!(level, "🚨 Error: {}", classified.internal_message);
    }

    let mut envelope =
        ErrorEnvelope::new(classified.status, classified.public_message).with_request(&info.method, &info.path);
    if exposes_stack {
        envelope = envelope.with_stack(classified.stack);
    }

    HttpResponse::build(classified.status).json(envelope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, web, App};

    fn failing_routes(cfg: &mut web::ServiceConfig) {
        cfg.route(
            "/conflict",
            web::get().to(|| async {
                Err::<HttpResponse, _>(AppError::new(StatusCode::CONFLICT, "already exists"))
            }),
        )
        .route(
            "/boom",
            web::get().to(|| async {
                Err::<HttpResponse, _>(AppError::internal("db password is hunter2"))
            }),
        )
        .route(
            "/json",
            web::post().to(|body: web::Json<serde_json::Value>| async move {
                HttpResponse::Ok().json(body.into_inner())
            }),
        );
    }

    #[actix_web::test]
    async fn test_operational_error_surfaces_verbatim() {
        let app = test::init_service(App::new().wrap(ErrorHandler::new(false)).configure(failing_routes)).await;
        let req = test::TestRequest::get().uri("/conflict?x=1").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CONFLICT);

        let body: ErrorEnvelope = test::read_body_json(res).await;
        assert!(body.error);
        assert_eq!(body.message, "already exists");
        assert_eq!(body.status_code, 409);
        assert_eq!(body.path.as_deref(), Some("/conflict?x=1"));
        assert_eq!(body.method.as_deref(), Some("GET"));
        assert!(body.stack.is_none());
    }

    #[actix_web::test]
    async fn test_non_operational_error_is_collapsed() {
        let app = test::init_service(App::new().wrap(ErrorHandler::new(false)).configure(failing_routes)).await;
        let req = test::TestRequest::get().uri("/boom").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body: ErrorEnvelope = test::read_body_json(res).await;
        assert_eq!(body.message, INTERNAL_ERROR_MESSAGE);
        assert!(body.stack.is_none());
    }

    #[actix_web::test]
    async fn test_stack_only_in_development() {
        let app = test::init_service(App::new().wrap(ErrorHandler::new(true)).configure(failing_routes)).await;
        let req = test::TestRequest::get().uri("/boom").to_request();
        let res = test::call_service(&app, req).await;

        let body: ErrorEnvelope = test::read_body_json(res).await;
        assert_eq!(body.message, INTERNAL_ERROR_MESSAGE);
        let stack = body.stack.expect("stack in development");
        assert!(stack.starts_with("AppError: db password is hunter2"));
    }

    #[actix_web::test]
    async fn test_framework_client_errors_keep_status() {
        let app = test::init_service(App::new().wrap(ErrorHandler::new(false)).configure(failing_routes)).await;
        let req = test::TestRequest::post()
            .uri("/json")
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .set_payload("{oops")
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let body: ErrorEnvelope = test::read_body_json(res).await;
        assert!(body.error);
        assert_eq!(body.status_code, 400);
    }

    #[actix_web::test]
    async fn test_routed_request_with_path_params() {
        let app = test::init_service(
            App::new()
                .wrap(ErrorHandler::new(true))
                .route("/users/{id}", web::get().to(|id: web::Path<String>| async move {
                    HttpResponse::Ok().body(id.into_inner())
                })),
        )
        .await;
        let req = test::TestRequest::get().uri("/users/42").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(test::read_body(res).await, web::Bytes::from_static(b"42"));
    }

    #[actix_web::test]
    async fn test_inner_middleware_error_is_rendered() {
        let app = test::init_service(
            App::new()
                .wrap_fn(|_req, _srv| {
                    ready(Err::<ServiceResponse, Error>(
                        AppError::new(StatusCode::FORBIDDEN, "blocked").into(),
                    ))
                })
                .wrap(ErrorHandler::new(false))
                .configure(failing_routes),
        )
        .await;
        let req = test::TestRequest::get().uri("/conflict").to_request();
        let err = match app.call(req).await {
            Ok(_) => panic!("middleware error should propagate"),
            Err(err) => err,
        };
        assert_eq!(err.as_response_error().status_code(), StatusCode::FORBIDDEN);

        let response = err.error_response();
        let bytes = actix_web::body::to_bytes(response.into_body()).await.unwrap();
        let body: ErrorEnvelope = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.message, "blocked");
        assert_eq!(body.path.as_deref(), Some("/conflict"));
        assert_eq!(body.method.as_deref(), Some("GET"));
    }

    #[actix_web::test]
    async fn test_successful_responses_pass_through() {
        let app = test::init_service(App::new().wrap(ErrorHandler::new(false)).configure(failing_routes)).await;
        let req = test::TestRequest::post()
            .uri("/json")
            .set_json(serde_json::json!({ "ok": true }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body, serde_json::json!({ "ok": true }));
    }
}
