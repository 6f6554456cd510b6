//! # Epigraph Common Library
//!
//! Shared code for the Epigraph services including:
//! - Error types
//! - Configuration loading (TOML bootstrap file)
//! - Output language selection
//! - Wire frames for incremental result streaming
//! - API request/response types
//! - Server-Sent Events adapter

pub mod api;
pub mod config;
pub mod error;
pub mod events;
pub mod language;
pub mod sse;

pub use error::{Error, Result};
pub use language::OutputLanguage;
