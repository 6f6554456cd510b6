//! Phase: QUICK_PREVIEW
//!
//! One call to the fastest model. Uploaded files get the larger character
//! budget; typed text and camera captures the smaller one.

use super::{Halt, PipelineOrchestrator, PipelineRun};
use crate::locale;
use crate::models::InputKind;
use crate::services::prompt_composer::PromptStage;
use epigraph_common::api::types::{PreviewStatus, QuickPreview};

/// Prompt stage for an input kind
pub(super) fn preview_stage(kind: InputKind) -> PromptStage {
    match kind {
        InputKind::File => PromptStage::QuickFilePreview,
        InputKind::Text | InputKind::Camera => PromptStage::QuickTextPreview,
    }
}

impl PipelineOrchestrator {
    /// Phase: QUICK_PREVIEW - fast-model preview or the localized fallback
    pub(super) async fn phase_quick_preview(&self, run: &PipelineRun) -> Result<QuickPreview, Halt> {
        let language = run.language();
        let prompt = self
            .composer
            .prompt(preview_stage(run.query.kind), language, &run.query.text);

        let reply = self
            .call_gateway(run, "quick_preview", &self.settings.models.quick, &prompt)
            .await;

        // Discard a reply that arrived after cancellation
        run.checkpoint()?;

        let preview = match reply {
            Some(text) => QuickPreview {
                status: PreviewStatus::Success,
                preview: text,
                language,
            },
            None => QuickPreview {
                status: PreviewStatus::Partial,
                preview: locale::QUICK_PREVIEW_FALLBACK.get(language).to_string(),
                language,
            },
        };

        tracing::info!(
            request_id = %run.ticket.id(),
            status = ?preview.status,
            "Phase: QUICK_PREVIEW complete"
        );

        Ok(preview)
    }
}
