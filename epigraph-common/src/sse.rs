//! Server-Sent Events (SSE) utilities
//!
//! Adapts a stream of [`StreamFrame`]s to an axum SSE response. Each frame
//! becomes one SSE event named after the frame type, carrying the JSON frame
//! as data and the request identifier as event id.

use crate::events::StreamFrame;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::{Stream, StreamExt};
use std::convert::Infallible;
use std::time::Duration;
use tracing::{debug, warn};

/// Keep-alive interval for idle streams (long model calls)
const KEEP_ALIVE_SECS: u64 = 15;

/// Convert one frame to an SSE event
///
/// Frames that fail to serialize become an `error` event with a plain
/// message so the consumer still sees a terminal frame.
pub fn frame_to_event(frame: &StreamFrame, request_id: &str) -> Event {
    let event_type = frame.frame_type();

    match serde_json::to_string(frame) {
        Ok(json) => Event::default().event(event_type).id(request_id).data(json),
        Err(e) => {
            warn!("SSE: Failed to serialize frame {}: {}", event_type, e);
            Event::default()
                .event("error")
                .id(request_id)
                .data(r#"{"type":"error","message":"serialization failure"}"#)
        }
    }
}

/// Build an SSE response from a frame stream
///
/// The response ends when `frames` ends; comment heartbeats keep the
/// connection open while a stage waits on the model.
///
/// # Example
/// ```rust,ignore
/// let frames = stream_emitter::frame_stream(rx);
/// epigraph_common::sse::frame_sse_stream(request_id.to_string(), frames)
/// ```
pub fn frame_sse_stream<S>(
    request_id: String,
    frames: S,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>>
where
    S: Stream<Item = StreamFrame> + Send + 'static,
{
    let stream = frames.map(move |frame| {
        debug!(request_id = %request_id, frame = frame.frame_type(), "SSE: Sending frame");
        Ok(frame_to_event(&frame, &request_id))
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(KEEP_ALIVE_SECS))
            .text("heartbeat"),
    )
}
