//! Stream emitter
//!
//! The orchestrator emits [`StageEvent`]s into a [`StageSink`]. The
//! streaming endpoint uses a [`ChannelSink`] and turns the receiving end
//! into wire frames with [`frame_stream`]; the synchronous endpoint and the
//! tests collect events with a [`CollectingSink`].

use crate::locale;
use crate::models::StageEvent;
use async_trait::async_trait;
use epigraph_common::events::StreamFrame;
use epigraph_common::OutputLanguage;
use futures::stream::Stream;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// The event consumer went away (client disconnect)
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("Stage event consumer closed")]
pub struct SinkClosed;

/// Ordered, append-only destination for stage events
#[async_trait]
pub trait StageSink: Send {
    async fn emit(&mut self, event: StageEvent) -> Result<(), SinkClosed>;
}

/// Sink forwarding events over a bounded channel
pub struct ChannelSink {
    tx: mpsc::Sender<StageEvent>,
    finished: bool,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<StageEvent>) -> Self {
        Self {
            tx,
            finished: false,
        }
    }

    /// Sink plus the receiver to hand to [`frame_stream`]
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<StageEvent>) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (Self::new(tx), rx)
    }
}

#[async_trait]
impl StageSink for ChannelSink {
    async fn emit(&mut self, event: StageEvent) -> Result<(), SinkClosed> {
        // Nothing follows a terminal event
        if self.finished {
            return Err(SinkClosed);
        }

        let terminal = event.is_terminal();
        self.tx.send(event).await.map_err(|_| SinkClosed)?;
        self.finished = terminal;
        Ok(())
    }
}

/// Sink keeping every event in memory
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Vec<StageEvent>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[StageEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<StageEvent> {
        self.events
    }
}

#[async_trait]
impl StageSink for CollectingSink {
    async fn emit(&mut self, event: StageEvent) -> Result<(), SinkClosed> {
        self.events.push(event);
        Ok(())
    }
}

/// Wire frame for one stage event
///
/// Deep-analysis events have no standalone frame; their payload reaches
/// the caller inside `final_results`.
pub fn frame_from_event(event: &StageEvent) -> Option<StreamFrame> {
    match event {
        StageEvent::StatusChange { stage } => Some(StreamFrame::Status { stage: *stage }),
        StageEvent::QuickPreview(preview) => Some(StreamFrame::QuickPreview {
            content: preview.preview.clone(),
            status: preview.status,
        }),
        StageEvent::Classification {
            genre,
            period,
            language,
            content_type,
        } => Some(StreamFrame::Classification {
            genre: genre.clone(),
            period: period.clone(),
            language: language.clone(),
            content_type: content_type.clone(),
        }),
        StageEvent::DeepAnalysis { .. } => None,
        StageEvent::FinalResult(result) => Some(StreamFrame::FinalResults(result.clone())),
        StageEvent::Error { message } => Some(StreamFrame::Error {
            message: message.clone(),
        }),
        StageEvent::Cancelled { message } => Some(StreamFrame::Cancelled {
            message: message.clone(),
        }),
    }
}

/// Frames for the events received on `rx`
///
/// Ends after the first terminal event; `final_results` is followed by one
/// `complete` frame. If the producer goes away without a terminal event the
/// stream ends with a localized `error` frame.
pub fn frame_stream(
    mut rx: mpsc::Receiver<StageEvent>,
    language: OutputLanguage,
) -> impl Stream<Item = StreamFrame> + Send + 'static {
    async_stream::stream! {
        let mut finished = false;

        while let Some(event) = rx.recv().await {
            debug!(stage = event.stage_name(), "Stage event received");

            let terminal = event.is_terminal();
            let completed = matches!(event, StageEvent::FinalResult(_));

            if let Some(frame) = frame_from_event(&event) {
                yield frame;
            }
            if completed {
                yield StreamFrame::Complete;
            }
            if terminal {
                finished = true;
                break;
            }
        }

        if !finished {
            warn!("Pipeline ended without a terminal event");
            yield StreamFrame::Error {
                message: locale::UNEXPECTED_ERROR.get(language).to_string(),
            };
        }
    }
}
