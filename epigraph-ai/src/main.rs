//! epigraph-ai - inscription analysis service
//!
//! Accepts transliterated cuneiform text (or an XML/TEI document), extracts
//! and classifies it locally, and builds a narrative through a language
//! model. Results are delivered synchronously or streamed over SSE.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use epigraph_ai::config::{resolve_gateway_api_key, PipelineSettings};
use epigraph_ai::services::{
    GeminiGateway, LlmGateway, OfflineGateway, PipelineOrchestrator, RequestRegistry,
};
use epigraph_ai::AppState;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "epigraph-ai")]
#[command(about = "Cuneiform inscription analysis service")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "EPIGRAPH_CONFIG")]
    config: Option<PathBuf>,

    /// Bind address (overrides config file)
    #[arg(long, env = "EPIGRAPH_HOST")]
    host: Option<String>,

    /// Port to listen on (overrides config file)
    #[arg(short, long, env = "EPIGRAPH_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration before logging so the level can come from TOML
    let config = epigraph_common::config::load_or_default(args.config.as_deref())
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    // Initialize tracing (RUST_LOG wins over the configured level)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!("Starting epigraph-ai (inscription analysis) service");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let settings = PipelineSettings::from_config(&config);

    let gateway: Arc<dyn LlmGateway> = match resolve_gateway_api_key(&config) {
        Some(api_key) => Arc::new(
            GeminiGateway::new(&config.gateway.base_url, api_key, settings.call_timeout)
                .map_err(|e| anyhow::anyhow!("Failed to initialize model gateway: {}", e))?,
        ),
        None => {
            warn!(
                "No model API key configured (EPIGRAPH_GEMINI_API_KEY, GEMINI_API_KEY or [gateway] api_key); \
                 running offline, every stage will use its fallback text"
            );
            Arc::new(OfflineGateway)
        }
    };
    info!("Model gateway: {}", gateway.name());

    let registry = Arc::new(RequestRegistry::new());
    let orchestrator = Arc::new(PipelineOrchestrator::new(gateway, settings));
    let state = AppState::new(registry, orchestrator)
        .with_stream_buffer(config.pipeline.stream_buffer);

    let app = epigraph_ai::build_router(state);

    // CLI → environment → TOML → default
    let host = args.host.unwrap_or(config.server.host);
    let port = args.port.unwrap_or(config.server.port);
    let addr = format!("{}:{}", host, port);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/api/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("epigraph-ai stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
