//! Cancellation endpoint

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use epigraph_common::api::types::{CancelResponse, CancelStatus};

use crate::services::RequestId;
use crate::AppState;

/// POST /api/cancel/:request_id
///
/// Marks a live request cancelled; repeated cancels also answer 200.
/// Unknown or malformed identifiers answer 404.
pub async fn cancel_request(
    State(state): State<AppState>,
    Path(request_id): Path<String>,
) -> (StatusCode, Json<CancelResponse>) {
    let cancelled = RequestId::parse(&request_id)
        .map(|id| state.registry.cancel(&id))
        .unwrap_or(false);

    if cancelled {
        (
            StatusCode::OK,
            Json(CancelResponse {
                status: CancelStatus::Cancelled,
                request_id,
            }),
        )
    } else {
        tracing::debug!(request_id = %request_id, "Cancel for unknown request");
        (
            StatusCode::NOT_FOUND,
            Json(CancelResponse {
                status: CancelStatus::NotFound,
                request_id,
            }),
        )
    }
}

/// Build cancellation routes
pub fn cancel_routes() -> Router<AppState> {
    Router::new().route("/api/cancel/:request_id", post(cancel_request))
}
