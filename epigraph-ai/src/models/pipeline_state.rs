//! Pipeline state machine
//!
//! Accepted → Extracting → QuickPreview → MainClassification → DeepAnalysis → Completed
//!
//! `Cancelled` is reachable from every non-terminal state; `Errored` only
//! when the final result cannot be assembled.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Pipeline state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineState {
    /// Query validated and registered
    Accepted,
    /// Feature extraction from raw text
    Extracting,
    /// Quick preview from the fast model
    QuickPreview,
    /// Rule classification and label refinement
    MainClassification,
    /// Short summary and detailed narrative
    DeepAnalysis,
    /// Final result delivered
    Completed,
    /// Cancelled by the caller or by disconnect
    Cancelled,
    /// Final assembly failed
    Errored,
}

/// State transition record
#[derive(Debug, Clone, Serialize)]
pub struct StateTransition {
    pub old_state: PipelineState,
    pub new_state: PipelineState,
    pub transitioned_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_names_in_logs() {
        assert_eq!(
            serde_json::to_value(PipelineState::MainClassification).unwrap(),
            "MAIN_CLASSIFICATION"
        );
        assert_eq!(serde_json::to_value(PipelineState::DeepAnalysis).unwrap(), "DEEP_ANALYSIS");
    }
}
