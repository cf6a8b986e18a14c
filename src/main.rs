use actix_web::{web, HttpServer};
use dotenv::dotenv;
use std::io;

use hello_service::app_state::AppState;
use hello_service::config::AppConfig;
use hello_service::{database, server};

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    log::info!("🚀 Starting Hello Service...");
    log::info!("📍 Environment: {}", config.environment_name());
    log::info!("🔐 Allowed origins: {}", config.allowed_origins.join(", "));

    let users = database::connect(&config.storage)
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    match users.count().await {
        Ok(count) => log::info!("👥 User store '{}' ready ({} users)", users.backend_name(), count),
        Err(e) => log::warn!("⚠️  Could not count users: {}", e),
    }

    let (host, port) = config.bind_address();
    let state = web::Data::new(AppState::new(config, users.clone()));

    log::info!("🌐 Server starting on http://{}:{}", host, port);
    log::info!("📋 Health check: http://{}:{}/health", host, port);
    log::info!("🎯 API endpoints: http://{}:{}/api", host, port);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", host, port);

    // Start HTTP server; actix handles SIGINT/SIGTERM with a graceful stop.
    HttpServer::new(move || server::build_app(state.clone()))
        .bind((host.as_str(), port))?
        .run()
        .await?;

    users.close().await;
    log::info!("👋 Server stopped");

    Ok(())
}
