//! Phase: EXTRACTING
//!
//! Feature extraction and structured summary. Runs synchronously with no
//! gateway call and emits no event of its own.

use super::{PipelineOrchestrator, PipelineRun};
use crate::models::FeatureSet;
use crate::services::extraction;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Output of the extraction phase
#[derive(Debug, Clone)]
pub struct Extraction {
    pub features: FeatureSet,
    /// Localized structured summary fed to later prompts
    pub summary: String,
}

impl PipelineOrchestrator {
    /// Phase: EXTRACTING - features and structured summary
    pub(super) fn phase_extraction(&self, run: &PipelineRun) -> Extraction {
        let text = run.query.text.as_str();

        let features = match catch_unwind(AssertUnwindSafe(|| extraction::extract(text))) {
            Ok(features) => features,
            Err(_) => {
                tracing::warn!(
                    request_id = %run.ticket.id(),
                    "Extraction panicked, continuing with empty feature set"
                );
                FeatureSet::empty(extraction::is_markup(text))
            }
        };

        let summary = self
            .composer
            .structured_summary(&features, text, run.language());

        tracing::info!(
            request_id = %run.ticket.id(),
            is_markup = features.is_markup,
            words = features.words.len(),
            language = ?features.language,
            content_type = ?features.content_type,
            "Phase: EXTRACTING complete"
        );

        Extraction { features, summary }
    }
}
