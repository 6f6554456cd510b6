//! Service modules for the analysis pipeline
//!
//! Leaves first: registry, extraction, classification, prompt composer and
//! model gateway; the orchestrator sequences them and the stream emitter
//! turns its events into wire frames.

pub mod classification;
pub mod extraction;
pub mod llm_gateway;
pub mod pipeline_orchestrator;
pub mod prompt_composer;
pub mod request_registry;
pub mod stream_emitter;

pub use classification::ClassificationEngine;
pub use llm_gateway::{GatewayError, GeminiGateway, LlmGateway, OfflineGateway};
pub use pipeline_orchestrator::{PipelineOrchestrator, PipelineOutcome};
pub use prompt_composer::{PromptComposer, PromptStage};
pub use request_registry::{RegistryError, RequestId, RequestRegistry, RequestTicket};
pub use stream_emitter::{ChannelSink, CollectingSink, SinkClosed, StageSink};
