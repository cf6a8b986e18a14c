use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Hello Service API",
        version = "0.1.0",
        description = "Demo backend for the fullstack template. \n\n**Envelope:** every success response carries `message`, optionally `timestamp` and `data`. Every error response uses the error envelope (`error`, `message`, `statusCode`, `timestamp`, `path`, `method`)."
    ),
    paths(
        // Hello
        crate::api::hello::get_hello,
        crate::api::hello::get_hello_with_time,
        crate::api::hello::post_hello,

        // Health & metadata
        crate::api::health::health_check,
        crate::api::health::service_info,
    ),
    components(
        schemas(
            crate::models::HelloRequest,
            crate::models::HelloResponse,
            crate::api::health::HealthResponse,
            crate::api::health::ServiceInfo,
            crate::api::health::EndpointIndex,
            crate::utils::error::ErrorEnvelope,
        )
    ),
    tags(
        (name = "Hello", description = "Demo greeting endpoints used by the web client to check connectivity."),
        (name = "Health", description = "Health check and service metadata."),
    )
)]
pub struct ApiDoc;
