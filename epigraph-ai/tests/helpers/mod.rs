//! Test Helper Utilities
//!
//! Shared utilities for testing epigraph-ai: a scripted in-process model
//! gateway, pipeline settings with one model name per stage, and builders
//! for queries and the test router.

#![allow(dead_code)]

use async_trait::async_trait;
use epigraph_ai::config::{PipelineSettings, StageModels};
use epigraph_ai::models::ValidatedQuery;
use epigraph_ai::services::{GatewayError, LlmGateway, PipelineOrchestrator, RequestRegistry};
use epigraph_ai::AppState;
use epigraph_common::api::types::QueryRequest;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub const QUICK_MODEL: &str = "quick-model";
pub const CLASSIFICATION_MODEL: &str = "classification-model";
pub const SUMMARY_MODEL: &str = "summary-model";
pub const DETAILED_MODEL: &str = "detailed-model";

type Script = Box<dyn Fn(&str, &str) -> Result<String, GatewayError> + Send + Sync>;

/// In-process gateway answering from a script
pub struct ScriptedGateway {
    script: Script,
    calls: Mutex<Vec<(String, String)>>,
    cancel_on_call: Mutex<Option<(usize, CancellationToken)>>,
    delay: Option<Duration>,
}

impl ScriptedGateway {
    pub fn new(
        script: impl Fn(&str, &str) -> Result<String, GatewayError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            script: Box::new(script),
            calls: Mutex::new(Vec::new()),
            cancel_on_call: Mutex::new(None),
            delay: None,
        }
    }

    /// Answers `reply from <model>`
    pub fn echo() -> Self {
        Self::new(|model, _| Ok(format!("reply from {}", model)))
    }

    /// Fails every call
    pub fn failing() -> Self {
        Self::new(|_, _| Err(GatewayError::Network("connection refused".to_string())))
    }

    /// Fails calls to one model, echoes the rest
    pub fn failing_model(failing: &'static str) -> Self {
        Self::new(move |model, _| {
            if model == failing {
                Err(GatewayError::Api {
                    status: 503,
                    body: "unavailable".to_string(),
                })
            } else {
                Ok(format!("reply from {}", model))
            }
        })
    }

    /// Sleep before answering every call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Cancel `token` while call number `call` (1-based) is in flight
    pub fn cancel_on_call(&self, call: usize, token: CancellationToken) {
        *self.cancel_on_call.lock().unwrap() = Some((call, token));
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn models_called(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(model, _)| model.clone())
            .collect()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, prompt)| prompt.clone())
            .collect()
    }
}

#[async_trait]
impl LlmGateway for ScriptedGateway {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, GatewayError> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            calls.push((model.to_string(), prompt.to_string()));
            calls.len()
        };

        if let Some((at, token)) = self.cancel_on_call.lock().unwrap().as_ref() {
            if *at == call {
                token.cancel();
            }
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        (self.script)(model, prompt)
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Settings with one distinct model name per stage
pub fn test_settings() -> PipelineSettings {
    PipelineSettings {
        models: StageModels {
            quick: QUICK_MODEL.to_string(),
            classification: CLASSIFICATION_MODEL.to_string(),
            summary: SUMMARY_MODEL.to_string(),
            detailed: DETAILED_MODEL.to_string(),
        },
        call_timeout: Duration::from_secs(5),
        ..PipelineSettings::default()
    }
}

pub fn orchestrator(gateway: Arc<ScriptedGateway>) -> PipelineOrchestrator {
    orchestrator_with(gateway, test_settings())
}

pub fn orchestrator_with(
    gateway: Arc<ScriptedGateway>,
    settings: PipelineSettings,
) -> PipelineOrchestrator {
    PipelineOrchestrator::new(gateway, settings)
}

/// Validated query from a request body
pub fn query(body: serde_json::Value) -> ValidatedQuery {
    let request: QueryRequest = serde_json::from_value(body).unwrap();
    ValidatedQuery::from_request(request).unwrap()
}

/// Validated English text query
pub fn text_query(text: &str) -> ValidatedQuery {
    query(serde_json::json!({
        "inputData": { "type": "text", "data": text },
        "language": "en"
    }))
}

/// Router plus the registry behind it
pub fn test_app(gateway: Arc<ScriptedGateway>) -> (axum::Router, Arc<RequestRegistry>) {
    let registry = Arc::new(RequestRegistry::new());
    let orchestrator = Arc::new(orchestrator(gateway));
    let state = AppState::new(Arc::clone(&registry), orchestrator);
    (epigraph_ai::build_router(state), registry)
}
