//! Query handlers
//!
//! Both endpoints validate before registering: a rejected request never
//! creates a registry entry and never runs a stage.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderValue,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use epigraph_common::api::types::QueryRequest;
use epigraph_common::sse::frame_sse_stream;
use epigraph_common::OutputLanguage;
use serde_json::Value;
use std::sync::Arc;

use crate::error::{ApiError, ApiResult};
use crate::locale;
use crate::models::ValidatedQuery;
use crate::services::stream_emitter::{frame_stream, ChannelSink, CollectingSink};
use crate::services::{PipelineOutcome, RequestId, RequestTicket};
use crate::AppState;

/// Response header carrying the request id (the cancellation handle)
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Validate and register one query
///
/// A body that is not JSON at all is answered in the default locale; a JSON
/// body of the wrong shape in the language it asks for.
fn accept(
    state: &AppState,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(ValidatedQuery, RequestTicket)> {
    let Json(body) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected malformed query body");
        ApiError::BadRequest(locale::INVALID_JSON.get(OutputLanguage::default()).to_string())
    })?;

    let language = QueryRequest::output_language_of(&body);
    let request: QueryRequest = serde_json::from_value(body).map_err(|e| {
        tracing::debug!(error = %e, "Rejected query body of unexpected shape");
        ApiError::BadRequest(locale::INVALID_JSON.get(language).to_string())
    })?;

    let query = ValidatedQuery::from_request(request)?;

    let ticket = match query.request_id {
        Some(id) => state
            .registry
            .register_with_id(RequestId::from(id))
            .map_err(|e| {
                tracing::warn!(error = %e, "Rejected duplicate request id");
                ApiError::Conflict(locale::REQUEST_ID_IN_USE.get(query.output_language).to_string())
            })?,
        None => state.registry.register(),
    };

    tracing::info!(
        request_id = %ticket.id(),
        kind = ?query.kind,
        language = %query.output_language,
        file_name = query.file_name.as_deref().unwrap_or(""),
        "Query accepted"
    );

    Ok((query, ticket))
}

fn with_request_id(mut response: Response, request_id: RequestId) -> Response {
    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// POST /api/query
///
/// Runs the whole pipeline and answers with the final result. Cancelled
/// requests answer 499, assembly failures 500.
pub async fn query(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Response> {
    let (query, ticket) = accept(&state, payload)?;
    let request_id = ticket.id();
    let language = query.output_language;

    let mut sink = CollectingSink::new();
    let outcome = state.orchestrator.run(query, ticket, &mut sink).await;

    let response = match outcome {
        PipelineOutcome::Completed(result) => Json(result).into_response(),
        PipelineOutcome::Cancelled => {
            ApiError::Cancelled(locale::REQUEST_CANCELLED.get(language).to_string()).into_response()
        }
        PipelineOutcome::Errored(message) => ApiError::Internal(message).into_response(),
    };

    Ok(with_request_id(response, request_id))
}

/// POST /api/query/stream
///
/// Starts the pipeline in the background and streams its frames over SSE.
/// Dropping the connection closes the sink, which cancels the request.
pub async fn query_stream(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Response> {
    let (query, ticket) = accept(&state, payload)?;
    let request_id = ticket.id();
    let language = query.output_language;

    let (mut sink, rx) = ChannelSink::channel(state.stream_buffer);
    let orchestrator = Arc::clone(&state.orchestrator);

    tokio::spawn(async move {
        let outcome = orchestrator.run(query, ticket, &mut sink).await;
        tracing::debug!(
            request_id = %request_id,
            outcome = outcome_name(&outcome),
            "Streaming pipeline task finished"
        );
    });

    let sse = frame_sse_stream(request_id.to_string(), frame_stream(rx, language));
    Ok(with_request_id(sse.into_response(), request_id))
}

fn outcome_name(outcome: &PipelineOutcome) -> &'static str {
    match outcome {
        PipelineOutcome::Completed(_) => "completed",
        PipelineOutcome::Cancelled => "cancelled",
        PipelineOutcome::Errored(_) => "errored",
    }
}

/// Build query routes
pub fn query_routes() -> Router<AppState> {
    Router::new()
        .route("/api/query", post(query))
        .route("/api/query/stream", post(query_stream))
}
