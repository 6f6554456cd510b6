//! Pipeline stage events
//!
//! Produced by the orchestrator in emission order, consumed by the stream
//! emitter or the synchronous assembler.

use epigraph_common::api::types::{AnalysisResult, QuickPreview};
use epigraph_common::events::StreamStage;

/// One ordered unit of pipeline progress or output
#[derive(Debug, Clone, PartialEq)]
pub enum StageEvent {
    /// Pipeline entered a caller-visible stage
    StatusChange { stage: StreamStage },

    /// Quick preview (model answer or fallback)
    QuickPreview(QuickPreview),

    /// Localized classification labels
    Classification {
        genre: String,
        period: String,
        language: String,
        content_type: String,
    },

    /// Short summary and detailed narrative
    DeepAnalysis { summary: String, narrative: String },

    /// Assembled final result (terminal)
    FinalResult(AnalysisResult),

    /// Final assembly failed (terminal)
    Error { message: String },

    /// Request cancelled (terminal)
    Cancelled { message: String },
}

impl StageEvent {
    /// Stage name for logging
    pub fn stage_name(&self) -> &'static str {
        match self {
            StageEvent::StatusChange { stage } => stage.as_str(),
            StageEvent::QuickPreview(_) => "quick_preview",
            StageEvent::Classification { .. } => "classification",
            StageEvent::DeepAnalysis { .. } => "deep_analysis",
            StageEvent::FinalResult(_) => "final_result",
            StageEvent::Error { .. } => "error",
            StageEvent::Cancelled { .. } => "cancelled",
        }
    }

    /// Whether no further events follow this one
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StageEvent::FinalResult(_) | StageEvent::Error { .. } | StageEvent::Cancelled { .. }
        )
    }
}
