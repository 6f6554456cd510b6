//! Phase: DEEP_ANALYSIS
//!
//! Short summary (fast model) then detailed narrative (strong model), with
//! a cancellation checkpoint after each call.

use super::phase_extraction::Extraction;
use super::{Halt, PipelineOrchestrator, PipelineRun};
use crate::locale;
use crate::services::prompt_composer::PromptStage;

/// Output of the deep-analysis phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeepAnalysis {
    pub summary: String,
    pub narrative: String,
}

impl PipelineOrchestrator {
    /// Phase: DEEP_ANALYSIS - summary and narrative, each with its fallback
    pub(super) async fn phase_deep_analysis(
        &self,
        run: &PipelineRun,
        extraction: &Extraction,
    ) -> Result<DeepAnalysis, Halt> {
        let language = run.language();
        let models = &self.settings.models;

        let prompt = self
            .composer
            .prompt(PromptStage::ShortSummary, language, &extraction.summary);
        let summary = self
            .call_gateway(run, "short_summary", &models.summary, &prompt)
            .await
            .unwrap_or_else(|| locale::SUMMARY_FALLBACK.get(language).to_string());
        run.checkpoint()?;

        let prompt = self
            .composer
            .prompt(PromptStage::DetailedAnalysis, language, &extraction.summary);
        let narrative = self
            .call_gateway(run, "detailed_analysis", &models.detailed, &prompt)
            .await
            .unwrap_or_else(|| locale::DETAILED_FALLBACK.get(language).to_string());
        run.checkpoint()?;

        tracing::info!(
            request_id = %run.ticket.id(),
            summary_chars = summary.chars().count(),
            narrative_chars = narrative.chars().count(),
            "Phase: DEEP_ANALYSIS complete"
        );

        Ok(DeepAnalysis { summary, narrative })
    }
}
