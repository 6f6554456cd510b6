//! Phase: MAIN_CLASSIFICATION
//!
//! Rule tables first; when enabled, the model is asked for genre and period
//! labels in the output language, with the rule labels as fallback.

use super::phase_extraction::Extraction;
use super::{Halt, PipelineOrchestrator, PipelineRun};
use crate::models::{ClassificationResult, StageEvent};
use crate::services::prompt_composer::PromptStage;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Localized labels delivered to the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationLabels {
    pub genre: String,
    pub period: String,
    /// Detected source language
    pub language: String,
    pub content_type: String,
}

impl ClassificationLabels {
    pub fn to_event(&self) -> StageEvent {
        StageEvent::Classification {
            genre: self.genre.clone(),
            period: self.period.clone(),
            language: self.language.clone(),
            content_type: self.content_type.clone(),
        }
    }
}

impl PipelineOrchestrator {
    /// Phase: MAIN_CLASSIFICATION - rule labels, optionally refined
    pub(super) async fn phase_classification(
        &self,
        run: &PipelineRun,
        extraction: &Extraction,
    ) -> Result<ClassificationLabels, Halt> {
        let language = run.language();
        let text = run.query.text.as_str();

        let rules = catch_unwind(AssertUnwindSafe(|| self.classifier.classify(text)))
            .unwrap_or_else(|_| {
                tracing::warn!(
                    request_id = %run.ticket.id(),
                    "Classifier panicked, using unclassified labels"
                );
                ClassificationResult::unclassified()
            });

        tracing::debug!(
            request_id = %run.ticket.id(),
            genre_rule = rules.genre_rule,
            period_rule = rules.period_rule,
            "Rule classification"
        );

        let mut genre = rules.genre.label(language).to_string();
        let mut period = rules.period.label(language).to_string();

        if self.settings.llm_classification {
            let model = self.settings.models.classification.as_str();

            let prompt = self
                .composer
                .prompt(PromptStage::GenreClassification, language, &extraction.summary);
            if let Some(label) = self.call_gateway(run, "genre_classification", model, &prompt).await {
                genre = label;
            }
            run.checkpoint()?;

            let prompt = self
                .composer
                .prompt(PromptStage::PeriodClassification, language, &extraction.summary);
            if let Some(label) = self.call_gateway(run, "period_classification", model, &prompt).await {
                period = label;
            }
            run.checkpoint()?;
        }

        let features = &extraction.features;
        let labels = ClassificationLabels {
            genre,
            period,
            language: features.language.label(language).to_string(),
            content_type: features.content_type.label(language).to_string(),
        };

        tracing::info!(
            request_id = %run.ticket.id(),
            genre = %labels.genre,
            period = %labels.period,
            "Phase: MAIN_CLASSIFICATION complete"
        );

        Ok(labels)
    }
}
