pub mod health;
pub mod hello;
pub mod swagger;

use actix_web::{web, HttpRequest, HttpResponse};

use crate::utils::error::AppError;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/")
            .route(web::get().to(health::service_info))
            .route(web::head().to(health::service_info))
            .default_service(web::to(not_found)),
    )
    .service(
        web::resource("/health")
            .route(web::get().to(health::health_check))
            .route(web::head().to(health::health_check))
            .default_service(web::to(not_found)),
    )
    .service(web::scope("/api").configure(hello::configure));
}

/// Catch-all for unmatched paths and unsupported methods on known paths.
pub async fn not_found(req: HttpRequest) -> Result<HttpResponse, AppError> {
    Err(AppError::not_found(req.method().as_str(), &req.uri().to_string()))
}
