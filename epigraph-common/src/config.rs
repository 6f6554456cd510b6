//! Configuration loading and config file resolution
//!
//! The TOML file is bootstrap-only: it is read once at startup and every
//! section is optional. Missing values fall back to built-in defaults.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "EPIGRAPH_CONFIG";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TomlConfig {
    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Language-model gateway settings
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Pipeline stage budgets and switches
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Bind address
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    ///
    /// Default: 5328
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Language-model gateway settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayConfig {
    /// REST endpoint root of the model provider
    #[serde(default = "default_gateway_base_url")]
    pub base_url: String,

    /// Provider API key (environment variables take precedence)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Upper bound for one generate call, in seconds
    #[serde(default = "default_gateway_timeout_secs")]
    pub timeout_secs: u64,

    /// Model identifiers per pipeline stage
    #[serde(default)]
    pub models: ModelConfig,
}

/// Model identifiers per pipeline stage
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelConfig {
    /// Fastest model, used for the quick preview
    #[serde(default = "default_quick_model")]
    pub quick: String,

    /// Model for localized genre/period labels
    #[serde(default = "default_flash_model")]
    pub classification: String,

    /// Model for the short summary
    #[serde(default = "default_flash_model")]
    pub summary: String,

    /// Model for the detailed narrative
    #[serde(default = "default_detailed_model")]
    pub detailed: String,
}

/// Pipeline stage budgets and switches
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    /// Character budget for the quick preview of uploaded files
    #[serde(default = "default_quick_file_budget")]
    pub quick_file_budget: usize,

    /// Character budget for the quick preview of typed text
    #[serde(default = "default_quick_text_budget")]
    pub quick_text_budget: usize,

    /// Character budget for classification prompts
    #[serde(default = "default_classification_budget")]
    pub classification_budget: usize,

    /// Characters of raw transliteration appended to the structured summary
    #[serde(default = "default_transliteration_budget")]
    pub transliteration_budget: usize,

    /// Ask the model for labels in the output language (rule labels otherwise)
    #[serde(default = "default_true")]
    pub llm_classification: bool,

    /// Buffered stage events per streaming request
    #[serde(default = "default_stream_buffer")]
    pub stream_buffer: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5328
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_gateway_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_gateway_timeout_secs() -> u64 {
    60
}

fn default_quick_model() -> String {
    "gemini-2.0-flash-exp".to_string()
}

fn default_flash_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_detailed_model() -> String {
    "gemini-1.5-pro".to_string()
}

fn default_quick_file_budget() -> usize {
    800
}

fn default_quick_text_budget() -> usize {
    400
}

fn default_classification_budget() -> usize {
    1000
}

fn default_transliteration_budget() -> usize {
    4000
}

fn default_true() -> bool {
    true
}

fn default_stream_buffer() -> usize {
    16
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: default_gateway_base_url(),
            api_key: None,
            timeout_secs: default_gateway_timeout_secs(),
            models: ModelConfig::default(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            quick: default_quick_model(),
            classification: default_flash_model(),
            summary: default_flash_model(),
            detailed: default_detailed_model(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            quick_file_budget: default_quick_file_budget(),
            quick_text_budget: default_quick_text_budget(),
            classification_budget: default_classification_budget(),
            transliteration_budget: default_transliteration_budget(),
            llm_classification: true,
            stream_buffer: default_stream_buffer(),
        }
    }
}

/// Config file resolution in priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable `EPIGRAPH_CONFIG`
/// 3. User config directory (`~/.config/epigraph/config.toml` on Linux)
/// 4. System-wide `/etc/epigraph/config.toml` (Linux only)
///
/// Returns `None` when no file exists; the caller then runs on defaults.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: User config directory
    if let Some(user_config) = dirs::config_dir().map(|d| d.join("epigraph").join("config.toml")) {
        if user_config.exists() {
            return Some(user_config);
        }
    }

    // Priority 4: System-wide config
    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/epigraph/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Load and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;

    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Load the resolved config file, or defaults when none exists
pub fn load_or_default(cli_arg: Option<&Path>) -> Result<TomlConfig> {
    match resolve_config_path(cli_arg) {
        Some(path) => {
            let config = load_toml_config(&path)?;
            tracing::info!("Loaded configuration from {}", path.display());
            Ok(config)
        }
        None => {
            tracing::info!("No configuration file found, using built-in defaults");
            Ok(TomlConfig::default())
        }
    }
}
