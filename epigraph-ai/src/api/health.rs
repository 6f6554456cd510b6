//! Health check and service banner

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::AppState;

const SERVER_NAME: &str = "epigraph-ai";

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status ("healthy")
    pub status: String,
    /// Requests currently registered
    pub active_requests: usize,
    /// Crate version from Cargo.toml
    pub version: String,
    /// Seconds since service started
    pub uptime_seconds: u64,
    /// Server name
    pub server: String,
}

/// Root banner response
#[derive(Debug, Serialize)]
pub struct BannerResponse {
    pub message: String,
    pub version: String,
    pub endpoints: Endpoints,
}

/// Endpoint list advertised by the banner
#[derive(Debug, Serialize)]
pub struct Endpoints {
    pub query: &'static str,
    pub query_stream: &'static str,
    pub cancel: &'static str,
    pub health: &'static str,
}

/// GET /api/health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let uptime = Utc::now().signed_duration_since(state.startup_time);
    let uptime_seconds = uptime.num_seconds().max(0) as u64;

    Json(HealthResponse {
        status: "healthy".to_string(),
        active_requests: state.registry.active_count(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds,
        server: SERVER_NAME.to_string(),
    })
}

/// GET /
pub async fn banner() -> Json<BannerResponse> {
    Json(BannerResponse {
        message: "Epigraph analysis API is running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoints: Endpoints {
            query: "/api/query",
            query_stream: "/api/query/stream",
            cancel: "/api/cancel/<request_id>",
            health: "/api/health",
        },
    })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(banner))
        .route("/api/health", get(health_check))
}
