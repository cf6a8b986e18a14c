use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

use crate::app_state::AppState;
use crate::utils::time::iso_now;

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub timestamp: String,
    /// Seconds since the service started.
    pub uptime: f64,
    pub environment: String,
}

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct EndpointIndex {
    pub health: String,
    pub api: String,
    pub hello: String,
    pub docs: String,
}

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct ServiceInfo {
    pub message: String,
    pub version: String,
    pub status: String,
    pub endpoints: EndpointIndex,
    pub documentation: String,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "OK".to_string(),
        message: "Backend is running correctly".to_string(),
        timestamp: iso_now(),
        uptime: state.uptime_secs(),
        environment: state.config.environment_name().to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Health",
    responses(
        (status = 200, description = "Service metadata", body = ServiceInfo)
    )
)]
pub async fn service_info() -> impl Responder {
    HttpResponse::Ok().json(ServiceInfo {
        message: "🚀 Backend API Template".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "running".to_string(),
        endpoints: EndpointIndex {
            health: "/health".to_string(),
            api: "/api".to_string(),
            hello: "/api/hello".to_string(),
            docs: "/swagger-ui/".to_string(),
        },
        documentation: "See README.md for more information".to_string(),
    })
}
