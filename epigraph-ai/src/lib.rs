//! epigraph-ai library interface
//!
//! Exposes the pipeline services and the router for integration testing.

pub mod api;
pub mod config;
pub mod error;
pub mod locale;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::services::{PipelineOrchestrator, RequestRegistry};

/// Buffered stage events per streaming request
pub const DEFAULT_STREAM_BUFFER: usize = 16;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Live requests and their cancellation tokens
    pub registry: Arc<RequestRegistry>,
    /// Pipeline shared by all requests
    pub orchestrator: Arc<PipelineOrchestrator>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Channel capacity between a streaming pipeline and its SSE response
    pub stream_buffer: usize,
}

impl AppState {
    pub fn new(registry: Arc<RequestRegistry>, orchestrator: Arc<PipelineOrchestrator>) -> Self {
        Self {
            registry,
            orchestrator,
            startup_time: Utc::now(),
            stream_buffer: DEFAULT_STREAM_BUFFER,
        }
    }

    pub fn with_stream_buffer(mut self, stream_buffer: usize) -> Self {
        self.stream_buffer = stream_buffer.max(1);
        self
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::query_routes())
        .merge(api::cancel_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
