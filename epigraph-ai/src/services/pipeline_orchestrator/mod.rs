//! Pipeline orchestrator
//!
//! Drives one validated query through the analysis stages and emits stage
//! events into a sink.
//!
//! # State Progression
//! ACCEPTED → EXTRACTING → QUICK_PREVIEW → MAIN_CLASSIFICATION → DEEP_ANALYSIS → COMPLETED
//!
//! `CANCELLED` is reachable from every non-terminal state, `ERRORED` only
//! when the final result cannot be assembled. Each state is handled by a
//! dedicated `phase_*` method:
//!
//! - **EXTRACTING**: feature extraction and structured summary (no gateway call)
//! - **QUICK_PREVIEW**: one fast-model call with a budget chosen by input kind
//! - **MAIN_CLASSIFICATION**: rule tables, optionally refined by the model
//! - **DEEP_ANALYSIS**: short summary and detailed narrative
//!
//! Cancellation is cooperative: the ticket's token is checked before each
//! state is entered and after every gateway call. A result that arrives
//! after cancellation is discarded. Stage failures never escape their phase;
//! each is replaced by a localized fallback.

use crate::config::PipelineSettings;
use crate::locale;
use crate::models::{PipelineState, StageEvent, StateTransition, ValidatedQuery};
use crate::services::classification::ClassificationEngine;
use crate::services::llm_gateway::LlmGateway;
use crate::services::prompt_composer::PromptComposer;
use crate::services::request_registry::RequestTicket;
use crate::services::stream_emitter::StageSink;
use chrono::Utc;
use epigraph_common::api::types::{AnalysisResult, QuickPreview, ResultTab};
use epigraph_common::events::StreamStage;
use epigraph_common::OutputLanguage;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

// Phase modules (internal implementation)
mod phase_classification;
mod phase_deep_analysis;
mod phase_extraction;
mod phase_quick_preview;

pub use phase_classification::ClassificationLabels;
pub use phase_deep_analysis::DeepAnalysis;
pub use phase_extraction::Extraction;

/// How one pipeline run ended
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    /// Final result delivered
    Completed(AnalysisResult),
    /// Cancelled by the caller or by client disconnect
    Cancelled,
    /// Final assembly failed; carries the localized message
    Errored(String),
}

/// Reason the stage sequence stopped early
#[derive(Debug)]
enum Halt {
    /// Cancellation observed at a checkpoint
    Cancelled,
    /// Event consumer went away
    Disconnected,
    /// Final assembly failed
    Failed(String),
}

/// Mutable state of one pipeline run
///
/// Owns the ticket: dropping the run releases the registry entry.
pub(crate) struct PipelineRun {
    ticket: RequestTicket,
    query: ValidatedQuery,
    state: PipelineState,
    transitions: Vec<StateTransition>,
}

impl PipelineRun {
    fn new(ticket: RequestTicket, query: ValidatedQuery) -> Self {
        Self {
            ticket,
            query,
            state: PipelineState::Accepted,
            transitions: Vec::new(),
        }
    }

    fn language(&self) -> OutputLanguage {
        self.query.output_language
    }

    fn transition_to(&mut self, new_state: PipelineState) {
        debug!(
            request_id = %self.ticket.id(),
            from = ?self.state,
            to = ?new_state,
            "Pipeline state transition"
        );
        self.transitions.push(StateTransition {
            old_state: self.state,
            new_state,
            transitioned_at: Utc::now(),
        });
        self.state = new_state;
    }

    /// Cancellation checkpoint
    fn checkpoint(&self) -> Result<(), Halt> {
        if self.ticket.is_cancelled() {
            return Err(Halt::Cancelled);
        }
        Ok(())
    }

    /// Enter a non-terminal state after a checkpoint
    fn enter(&mut self, state: PipelineState) -> Result<(), Halt> {
        self.checkpoint()?;
        self.transition_to(state);
        Ok(())
    }
}

/// Pipeline orchestrator service
pub struct PipelineOrchestrator {
    gateway: Arc<dyn LlmGateway>,
    settings: PipelineSettings,
    composer: PromptComposer,
    classifier: ClassificationEngine,
}

impl PipelineOrchestrator {
    pub fn new(gateway: Arc<dyn LlmGateway>, settings: PipelineSettings) -> Self {
        let composer = PromptComposer::from_settings(&settings);
        Self {
            gateway,
            settings,
            composer,
            classifier: ClassificationEngine::default(),
        }
    }

    /// Run one query to a terminal outcome
    ///
    /// Emits events into `sink` in order and ends with exactly one terminal
    /// event unless the sink itself went away. The ticket is consumed and
    /// its registry entry released before this returns.
    pub async fn run<S: StageSink>(
        &self,
        query: ValidatedQuery,
        ticket: RequestTicket,
        sink: &mut S,
    ) -> PipelineOutcome {
        let start_time = Instant::now();
        let request_id = ticket.id();
        let mut run = PipelineRun::new(ticket, query);

        info!(
            request_id = %request_id,
            kind = ?run.query.kind,
            language = %run.language(),
            text_chars = run.query.text.chars().count(),
            gateway = self.gateway.name(),
            "Pipeline started"
        );

        let outcome = match self.drive(&mut run, sink).await {
            Ok(result) => PipelineOutcome::Completed(result),
            Err(Halt::Cancelled) => {
                run.transition_to(PipelineState::Cancelled);
                let message = locale::REQUEST_CANCELLED.get(run.language()).to_string();
                // Consumer may already be gone
                let _ = sink.emit(StageEvent::Cancelled { message }).await;
                PipelineOutcome::Cancelled
            }
            Err(Halt::Disconnected) => {
                run.transition_to(PipelineState::Cancelled);
                PipelineOutcome::Cancelled
            }
            Err(Halt::Failed(message)) => {
                run.transition_to(PipelineState::Errored);
                let _ = sink
                    .emit(StageEvent::Error {
                        message: message.clone(),
                    })
                    .await;
                PipelineOutcome::Errored(message)
            }
        };

        info!(
            request_id = %request_id,
            state = ?run.state,
            transitions = run.transitions.len(),
            duration_ms = start_time.elapsed().as_millis() as u64,
            "Pipeline finished"
        );

        outcome
    }

    /// Stage sequence up to the delivered final result
    async fn drive<S: StageSink>(
        &self,
        run: &mut PipelineRun,
        sink: &mut S,
    ) -> Result<AnalysisResult, Halt> {
        run.checkpoint()?;
        self.emit_status(run, sink, StreamStage::Initializing).await?;

        run.enter(PipelineState::Extracting)?;
        let extraction = self.phase_extraction(run);

        run.enter(PipelineState::QuickPreview)?;
        self.emit_status(run, sink, StreamStage::QuickPreview).await?;
        let preview = self.phase_quick_preview(run).await?;
        self.emit(run, sink, StageEvent::QuickPreview(preview.clone()))
            .await?;

        run.enter(PipelineState::MainClassification)?;
        self.emit_status(run, sink, StreamStage::Analyzing).await?;
        let labels = self.phase_classification(run, &extraction).await?;
        self.emit(run, sink, labels.to_event()).await?;

        run.enter(PipelineState::DeepAnalysis)?;
        self.emit_status(run, sink, StreamStage::Processing).await?;
        let deep = self.phase_deep_analysis(run, &extraction).await?;
        self.emit(
            run,
            sink,
            StageEvent::DeepAnalysis {
                summary: deep.summary.clone(),
                narrative: deep.narrative.clone(),
            },
        )
        .await?;

        run.checkpoint()?;
        self.emit_status(run, sink, StreamStage::Finalizing).await?;

        let result = assemble_result(run.language(), preview, labels, deep);
        validate_result(&result, run.language())?;

        run.checkpoint()?;
        run.transition_to(PipelineState::Completed);
        self.emit(run, sink, StageEvent::FinalResult(result.clone()))
            .await?;

        Ok(result)
    }

    async fn emit_status<S: StageSink>(
        &self,
        run: &PipelineRun,
        sink: &mut S,
        stage: StreamStage,
    ) -> Result<(), Halt> {
        self.emit(run, sink, StageEvent::StatusChange { stage }).await
    }

    /// Emit one event; a closed sink cancels the request
    async fn emit<S: StageSink>(
        &self,
        run: &PipelineRun,
        sink: &mut S,
        event: StageEvent,
    ) -> Result<(), Halt> {
        let stage = event.stage_name();
        match sink.emit(event).await {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!(
                    request_id = %run.ticket.id(),
                    stage,
                    error = %e,
                    "Event consumer gone, cancelling request"
                );
                run.ticket.cancel();
                Err(Halt::Disconnected)
            }
        }
    }

    /// One bounded gateway call
    ///
    /// Returns `None` on failure, empty reply or timeout; the caller
    /// substitutes its fallback.
    async fn call_gateway(
        &self,
        run: &PipelineRun,
        stage: &'static str,
        model: &str,
        prompt: &str,
    ) -> Option<String> {
        let started = Instant::now();
        let call = self.gateway.generate(model, prompt);

        match tokio::time::timeout(self.settings.call_timeout, call).await {
            Ok(Ok(text)) if !text.trim().is_empty() => {
                debug!(
                    request_id = %run.ticket.id(),
                    stage,
                    model,
                    duration_ms = started.elapsed().as_millis() as u64,
                    "Gateway call succeeded"
                );
                Some(text.trim().to_string())
            }
            Ok(Ok(_)) => {
                warn!(request_id = %run.ticket.id(), stage, model, "Gateway returned empty text, using fallback");
                None
            }
            Ok(Err(e)) => {
                warn!(request_id = %run.ticket.id(), stage, model, error = %e, "Gateway call failed, using fallback");
                None
            }
            Err(_) => {
                warn!(
                    request_id = %run.ticket.id(),
                    stage,
                    model,
                    timeout_secs = self.settings.call_timeout.as_secs(),
                    "Gateway call timed out, using fallback"
                );
                None
            }
        }
    }
}

/// Final result with tabs in fixed order: genre, period, narrative
fn assemble_result(
    language: OutputLanguage,
    preview: QuickPreview,
    labels: ClassificationLabels,
    deep: DeepAnalysis,
) -> AnalysisResult {
    AnalysisResult {
        summary: deep.summary,
        language,
        tabs: vec![
            ResultTab {
                name: locale::TAB_GENRE.get(language).to_string(),
                content: labels.genre,
            },
            ResultTab {
                name: locale::TAB_PERIOD.get(language).to_string(),
                content: labels.period,
            },
            ResultTab {
                name: locale::TAB_CONTENT.get(language).to_string(),
                content: deep.narrative,
            },
        ],
        preprocessing: Some(preview),
    }
}

/// Final result must serialize before delivery
fn validate_result(result: &AnalysisResult, language: OutputLanguage) -> Result<(), Halt> {
    serde_json::to_value(result).map(|_| ()).map_err(|e| {
        warn!(error = %e, "Final result failed to serialize");
        Halt::Failed(locale::UNEXPECTED_ERROR.get(language).to_string())
    })
}
