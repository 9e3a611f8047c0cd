//! Health check endpoint.

use actix_web::{HttpResponse, web};
use serde::Serialize;

use crate::middleware::context::CallContext;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: String,
    pub backend: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Health check endpoint - server status plus a backend round trip.
///
/// GET /api/health
pub async fn health_check(state: web::Data<AppState>, ctx: CallContext) -> HttpResponse {
    let probe = state.repo.ping(ctx.deadline).await;

    let response = HealthResponse {
        status: if probe.is_ok() { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().to_rfc3339(),
        backend: if probe.is_ok() { "ok" } else { "unavailable" },
        detail: probe.as_ref().err().map(ToString::to_string),
    };

    match probe {
        Ok(()) => HttpResponse::Ok().json(response),
        Err(e) => {
            tracing::warn!(error = %e, "Health check: backend probe failed");
            HttpResponse::ServiceUnavailable().json(response)
        }
    }
}
