//! # Cachet Cache Server
//!
//! Entry point: opens the cache repository, then serves the RPC surface over
//! Actix-web until SIGINT/SIGTERM.

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

mod config;
mod handlers;
mod middleware;
mod state;
mod telemetry;

use config::AppConfig;
use middleware::context::RequestContextMiddleware;
use state::AppState;
use telemetry::TelemetryConfig;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    telemetry::init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env().map_err(|e| {
        tracing::error!(error = %e, "Invalid configuration");
        std::io::Error::other(e.to_string())
    })?;

    // The repository must be live before the port is bound; startup stops here otherwise.
    let repo = cachet_infra::connect(&config.backend).await.map_err(|e| {
        tracing::error!(error = %e, backend = ?config.backend, "Failed to open cache repository");
        std::io::Error::other(e.to_string())
    })?;
    let state = AppState::new(Arc::new(repo));

    tracing::info!(
        "Starting cache server on {}:{}",
        config.host,
        config.port
    );

    let app_state = state.clone();
    let result = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .wrap(RequestContextMiddleware)
            .app_data(web::Data::new(app_state.clone()))
            .app_data(handlers::json_config())
            .configure(handlers::configure_routes)
    })
    .shutdown_timeout(config.shutdown_timeout.as_secs())
    .bind((config.host.as_str(), config.port))?
    .run()
    .await;

    // Workers have drained by now.
    state.repo.close().await;
    tracing::info!("Cache server stopped");

    result
}
