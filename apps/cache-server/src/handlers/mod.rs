//! RPC handlers and route configuration.

mod cache;
mod health;

use actix_web::web;

use crate::middleware::error::RpcError;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health::health_check))
            .service(
                web::scope("/cache")
                    .route("/set", web::post().to(cache::set))
                    .route("/get", web::post().to(cache::get))
                    .route("/delete", web::post().to(cache::delete))
                    .route("/exists", web::post().to(cache::exists))
                    .route("/expire", web::post().to(cache::expire)),
            ),
    );
}

/// JSON body settings: undecodable bodies become INVALID_ARGUMENT statuses.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(4 * 1024 * 1024)
        .error_handler(|err, _req| RpcError::InvalidArgument(err.to_string()).into())
}
