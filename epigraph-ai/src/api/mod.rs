//! HTTP API handlers for epigraph-ai
//!
//! - `POST /api/query` synchronous analysis
//! - `POST /api/query/stream` incremental analysis over SSE
//! - `POST /api/cancel/:request_id` cooperative cancellation
//! - `GET /api/health`, `GET /` service status

pub mod cancel;
pub mod health;
pub mod query;

pub use cancel::cancel_routes;
pub use health::health_routes;
pub use query::{query_routes, REQUEST_ID_HEADER};
