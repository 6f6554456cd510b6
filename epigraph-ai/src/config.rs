//! Configuration resolution for epigraph-ai
//!
//! Gateway API key resolution (ENV → TOML) and pipeline settings derived
//! from the bootstrap TOML.

use epigraph_common::config::TomlConfig;
use std::time::Duration;
use tracing::{info, warn};

/// Service-specific API key variable (highest priority)
pub const API_KEY_ENV_VAR: &str = "EPIGRAPH_GEMINI_API_KEY";

/// Provider-wide API key variable
pub const PROVIDER_API_KEY_ENV_VAR: &str = "GEMINI_API_KEY";

/// Resolve the model gateway API key
///
/// **Priority:** `EPIGRAPH_GEMINI_API_KEY` → `GEMINI_API_KEY` → TOML
///
/// Returns `None` when no source holds a valid key; the service then runs
/// with the offline gateway and every stage uses its fallback text.
pub fn resolve_gateway_api_key(toml_config: &TomlConfig) -> Option<String> {
    let service_key = std::env::var(API_KEY_ENV_VAR).ok().filter(|k| is_valid_key(k));
    let provider_key = std::env::var(PROVIDER_API_KEY_ENV_VAR)
        .ok()
        .filter(|k| is_valid_key(k));
    let toml_key = toml_config
        .gateway
        .api_key
        .clone()
        .filter(|k| is_valid_key(k));

    let mut sources = Vec::new();
    if service_key.is_some() {
        sources.push(API_KEY_ENV_VAR);
    }
    if provider_key.is_some() {
        sources.push(PROVIDER_API_KEY_ENV_VAR);
    }
    if toml_key.is_some() {
        sources.push("TOML");
    }

    // Warn if multiple sources (potential misconfiguration)
    if sources.len() > 1 {
        warn!(
            "Gateway API key found in multiple sources: {}. Using {} (highest priority).",
            sources.join(", "),
            sources[0]
        );
    }

    if let Some(key) = service_key {
        info!("Gateway API key loaded from {}", API_KEY_ENV_VAR);
        return Some(key);
    }

    if let Some(key) = provider_key {
        info!("Gateway API key loaded from {}", PROVIDER_API_KEY_ENV_VAR);
        return Some(key);
    }

    if let Some(key) = toml_key {
        info!("Gateway API key loaded from TOML config");
        return Some(key);
    }

    None
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Model identifiers per stage
#[derive(Debug, Clone)]
pub struct StageModels {
    pub quick: String,
    pub classification: String,
    pub summary: String,
    pub detailed: String,
}

/// Runtime pipeline settings
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub models: StageModels,
    /// Upper bound for one gateway call
    pub call_timeout: Duration,
    pub quick_file_budget: usize,
    pub quick_text_budget: usize,
    pub classification_budget: usize,
    pub transliteration_budget: usize,
    /// Refine rule labels into the output language through the model
    pub llm_classification: bool,
}

impl PipelineSettings {
    /// Derive settings from the bootstrap config
    pub fn from_config(config: &TomlConfig) -> Self {
        let models = &config.gateway.models;
        let pipeline = &config.pipeline;

        Self {
            models: StageModels {
                quick: models.quick.clone(),
                classification: models.classification.clone(),
                summary: models.summary.clone(),
                detailed: models.detailed.clone(),
            },
            call_timeout: Duration::from_secs(config.gateway.timeout_secs.max(1)),
            quick_file_budget: pipeline.quick_file_budget,
            quick_text_budget: pipeline.quick_text_budget,
            classification_budget: pipeline.classification_budget,
            transliteration_budget: pipeline.transliteration_budget,
            llm_classification: pipeline.llm_classification,
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self::from_config(&TomlConfig::default())
    }
}
