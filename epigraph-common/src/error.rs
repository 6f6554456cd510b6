//! Common error types for Epigraph

use thiserror::Error;

/// Common result type for Epigraph operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across Epigraph services
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
