//! Wire frames for incremental result streaming
//!
//! One frame per logical message. Frames are self-contained JSON objects
//! tagged by `type`, so a consumer can parse each one without state from
//! earlier frames.

use crate::api::types::{AnalysisResult, PreviewStatus};
use serde::{Deserialize, Serialize};

/// Progress stages announced by `status` frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamStage {
    /// Request accepted, pipeline starting
    Initializing,
    /// Quick preview requested from the fast model
    QuickPreview,
    /// Feature extraction and classification
    Analyzing,
    /// Deep analysis (summary and narrative)
    Processing,
    /// Assembling the final result
    Finalizing,
}

impl StreamStage {
    /// Wire name of the stage
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamStage::Initializing => "initializing",
            StreamStage::QuickPreview => "quick_preview",
            StreamStage::Analyzing => "analyzing",
            StreamStage::Processing => "processing",
            StreamStage::Finalizing => "finalizing",
        }
    }
}

/// Streaming frame
///
/// Emitted in the order `status(initializing) → status(quick_preview) →
/// quick_preview → status(analyzing) → classification → status(processing)
/// → status(finalizing) → final_results → complete`. A stream ends with
/// exactly one of `final_results`, `error` or `cancelled`; only
/// `final_results` is followed by `complete`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamFrame {
    /// Pipeline entered a new stage
    Status {
        /// Stage being entered
        stage: StreamStage,
    },

    /// Early, short interpretation of the input
    QuickPreview {
        /// Preview text in the output language
        content: String,
        /// `success`, or `partial` when the fallback text was used
        status: PreviewStatus,
    },

    /// Classification labels
    Classification {
        /// Genre label
        genre: String,
        /// Historical period label
        period: String,
        /// Detected source language of the inscription
        language: String,
        /// Content type inferred from extracted words
        content_type: String,
    },

    /// Complete analysis result
    FinalResults(AnalysisResult),

    /// Request failed; no further frames follow
    Error {
        /// Localized message
        message: String,
    },

    /// Request cancelled; no further frames follow
    Cancelled {
        /// Localized message
        message: String,
    },

    /// Stream finished after `final_results`
    Complete,
}

impl StreamFrame {
    /// Frame type as string (used as the SSE event name)
    pub fn frame_type(&self) -> &'static str {
        match self {
            StreamFrame::Status { .. } => "status",
            StreamFrame::QuickPreview { .. } => "quick_preview",
            StreamFrame::Classification { .. } => "classification",
            StreamFrame::FinalResults(_) => "final_results",
            StreamFrame::Error { .. } => "error",
            StreamFrame::Cancelled { .. } => "cancelled",
            StreamFrame::Complete => "complete",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::ResultTab;
    use crate::OutputLanguage;

    #[test]
    fn test_status_frame_wire_shape() {
        let frame = StreamFrame::Status {
            stage: StreamStage::QuickPreview,
        };
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["type"], "status");
        assert_eq!(json["stage"], "quick_preview");
        assert_eq!(frame.frame_type(), "status");
    }

    #[test]
    fn test_final_results_fields_are_inlined() {
        let frame = StreamFrame::FinalResults(AnalysisResult {
            summary: "A barley receipt".to_string(),
            language: OutputLanguage::English,
            tabs: vec![ResultTab {
                name: "Subject".to_string(),
                content: "Economic document".to_string(),
            }],
            preprocessing: None,
        });

        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["type"], "final_results");
        assert_eq!(json["summary"], "A barley receipt");
        assert_eq!(json["language"], "en");
        assert_eq!(json["tabs"][0]["name"], "Subject");
    }

    #[test]
    fn test_complete_frame_parses_independently() {
        let frame: StreamFrame = serde_json::from_str(r#"{"type":"complete"}"#).unwrap();
        assert_eq!(frame, StreamFrame::Complete);
    }
}
