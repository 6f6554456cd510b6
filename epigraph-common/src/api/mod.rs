//! Shared API request/response types

pub mod types;
