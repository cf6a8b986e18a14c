use actix_cors::Cors;
use actix_web::{
    body::MessageBody,
    dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse},
    http::header,
    middleware::Logger,
    web, App,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api;
use crate::app_state::AppState;
use crate::config::AppConfig;
use crate::middleware;
use crate::utils::time::iso_now;

/// Apache combined log format.
const ACCESS_LOG_FORMAT: &str = r#"%a - - [%t] "%r" %s %b "%{Referer}i" "%{User-Agent}i""#;

/// Assembles the application: middleware chain, routes and fallbacks.
pub fn build_app(
    state: web::Data<AppState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let cors = build_cors(&state.config);
    let error_handler = middleware::ErrorHandler::new(state.config.exposes_stack());
    let openapi = api::swagger::ApiDoc::openapi();

    App::new()
        .app_data(state)
        .wrap(error_handler)
        .wrap_fn(|req, srv| {
            log::info!("{} - {} {}", iso_now(), req.method(), req.path());
            srv.call(req)
        })
        .wrap(Logger::new(ACCESS_LOG_FORMAT))
        .wrap(cors)
        .wrap(middleware::SecurityHeaders)
        .service(SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi))
        .configure(api::configure)
        .default_service(web::to(api::not_found))
}

pub fn build_cors(config: &AppConfig) -> Cors {
    let mut cors = Cors::default();

    for origin in &config.allowed_origins {
        cors = if origin == "*" {
            cors.allow_any_origin()
        } else {
            cors.allowed_origin(origin)
        };
    }

    cors.allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::AUTHORIZATION])
        .supports_credentials()
        .max_age(3600)
}
