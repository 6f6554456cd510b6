//! Pipeline orchestrator tests
//!
//! Drives the orchestrator with a scripted gateway and checks event order,
//! cancellation checkpoints, stage fallbacks and registry release.

mod helpers;

use async_trait::async_trait;
use epigraph_ai::config::PipelineSettings;
use epigraph_ai::models::{GenreLabel, PeriodLabel, SourceLanguage, StageEvent};
use epigraph_ai::services::stream_emitter::{frame_stream, ChannelSink, CollectingSink, SinkClosed, StageSink};
use epigraph_ai::services::{PipelineOutcome, RequestRegistry};
use epigraph_common::api::types::{AnalysisResult, PreviewStatus};
use epigraph_common::events::StreamFrame;
use epigraph_common::OutputLanguage;
use futures::StreamExt;
use helpers::*;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

/// Event label: `status:<stage>` for status changes, the stage name otherwise
fn labels(events: &[StageEvent]) -> Vec<String> {
    events
        .iter()
        .map(|event| match event {
            StageEvent::StatusChange { stage } => format!("status:{}", stage.as_str()),
            other => other.stage_name().to_string(),
        })
        .collect()
}

fn completed(outcome: PipelineOutcome) -> AnalysisResult {
    match outcome {
        PipelineOutcome::Completed(result) => result,
        other => panic!("expected completed outcome, got {:?}", other),
    }
}

fn classification_event(events: &[StageEvent]) -> (String, String, String, String) {
    events
        .iter()
        .find_map(|event| match event {
            StageEvent::Classification {
                genre,
                period,
                language,
                content_type,
            } => Some((genre.clone(), period.clone(), language.clone(), content_type.clone())),
            _ => None,
        })
        .expect("classification event")
}

#[tokio::test]
async fn test_completed_run_event_order() {
    let gateway = Arc::new(ScriptedGateway::echo());
    let orchestrator = orchestrator(Arc::clone(&gateway));
    let registry = Arc::new(RequestRegistry::new());
    let ticket = registry.register();

    let mut sink = CollectingSink::new();
    let outcome = orchestrator
        .run(text_query("1(gur) še lugal"), ticket, &mut sink)
        .await;

    assert!(matches!(outcome, PipelineOutcome::Completed(_)));
    assert_eq!(
        labels(sink.events()),
        vec![
            "status:initializing",
            "status:quick_preview",
            "quick_preview",
            "status:analyzing",
            "classification",
            "status:processing",
            "deep_analysis",
            "status:finalizing",
            "final_result",
        ]
    );
    assert_eq!(registry.active_count(), 0);
    assert_eq!(
        gateway.models_called(),
        vec![QUICK_MODEL, CLASSIFICATION_MODEL, CLASSIFICATION_MODEL, SUMMARY_MODEL, DETAILED_MODEL]
    );
}

#[tokio::test]
async fn test_completed_result_carries_every_stage() {
    let gateway = Arc::new(ScriptedGateway::echo());
    let orchestrator = orchestrator(gateway);
    let registry = Arc::new(RequestRegistry::new());

    let mut sink = CollectingSink::new();
    let result = completed(
        orchestrator
            .run(text_query("lugal"), registry.register(), &mut sink)
            .await,
    );

    assert_eq!(result.summary, "reply from summary-model");
    assert_eq!(result.language, OutputLanguage::English);

    let tabs: Vec<_> = result
        .tabs
        .iter()
        .map(|tab| (tab.name.as_str(), tab.content.as_str()))
        .collect();
    assert_eq!(
        tabs,
        vec![
            ("Subject", "reply from classification-model"),
            ("Period", "reply from classification-model"),
            ("Content", "reply from detailed-model"),
        ]
    );

    let preview = result.preprocessing.clone().expect("preprocessing");
    assert_eq!(preview.status, PreviewStatus::Success);
    assert_eq!(preview.preview, "reply from quick-model");

    // The final event carries the same result
    assert_eq!(sink.events().last(), Some(&StageEvent::FinalResult(result)));
}

#[tokio::test]
async fn test_cancel_before_start_emits_only_cancelled() {
    let gateway = Arc::new(ScriptedGateway::echo());
    let orchestrator = orchestrator(Arc::clone(&gateway));
    let registry = Arc::new(RequestRegistry::new());
    let ticket = registry.register();
    assert!(registry.cancel(&ticket.id()));

    let mut sink = CollectingSink::new();
    let outcome = orchestrator.run(text_query("lugal"), ticket, &mut sink).await;

    assert_eq!(outcome, PipelineOutcome::Cancelled);
    assert_eq!(
        sink.events(),
        &[StageEvent::Cancelled {
            message: "Request cancelled".to_string()
        }]
    );
    assert_eq!(gateway.call_count(), 0);
    assert_eq!(registry.active_count(), 0);
}

#[tokio::test]
async fn test_cancel_during_each_gateway_call() {
    // (call in flight when cancel arrives, last event before `cancelled`)
    let cases = [
        (1, "status:quick_preview"),
        (2, "status:analyzing"),
        (3, "status:analyzing"),
        (4, "status:processing"),
        (5, "status:processing"),
    ];

    for (call, last_before_cancel) in cases {
        let gateway = Arc::new(ScriptedGateway::echo());
        let orchestrator = orchestrator(Arc::clone(&gateway));
        let registry = Arc::new(RequestRegistry::new());
        let ticket = registry.register();
        gateway.cancel_on_call(call, ticket.token().clone());

        let mut sink = CollectingSink::new();
        let outcome = orchestrator.run(text_query("gur še"), ticket, &mut sink).await;

        assert_eq!(outcome, PipelineOutcome::Cancelled, "call {}", call);
        // The in-flight call completes, nothing after it starts
        assert_eq!(gateway.call_count(), call, "call {}", call);

        let events = labels(sink.events());
        assert_eq!(events.last().map(String::as_str), Some("cancelled"), "call {}", call);
        assert_eq!(
            events[events.len() - 2], last_before_cancel,
            "call {}: {:?}",
            call, events
        );
        assert!(!events.iter().any(|e| e == "final_result"), "call {}", call);
        assert_eq!(registry.active_count(), 0, "call {}", call);
    }
}

#[tokio::test]
async fn test_cancelled_preview_result_is_discarded() {
    let gateway = Arc::new(ScriptedGateway::echo());
    let orchestrator = orchestrator(Arc::clone(&gateway));
    let registry = Arc::new(RequestRegistry::new());
    let ticket = registry.register();
    gateway.cancel_on_call(1, ticket.token().clone());

    let mut sink = CollectingSink::new();
    orchestrator.run(text_query("lugal"), ticket, &mut sink).await;

    assert!(!sink
        .events()
        .iter()
        .any(|event| matches!(event, StageEvent::QuickPreview(_))));
}

#[tokio::test]
async fn test_economic_scenario_uses_rule_labels_without_model() {
    let gateway = Arc::new(ScriptedGateway::failing());
    let orchestrator = orchestrator(gateway);
    let registry = Arc::new(RequestRegistry::new());

    let mut sink = CollectingSink::new();
    let result = completed(
        orchestrator
            .run(text_query("gur še barley silver"), registry.register(), &mut sink)
            .await,
    );

    assert_eq!(
        result.tabs[0].content,
        GenreLabel::EconomicTransaction.label(OutputLanguage::English)
    );
    assert_eq!(result.tabs[1].content, PeriodLabel::UrIii.label(OutputLanguage::English));
}

#[tokio::test]
async fn test_sumerian_marker_reported_in_classification() {
    let gateway = Arc::new(ScriptedGateway::echo());
    let orchestrator = orchestrator(gateway);
    let registry = Arc::new(RequestRegistry::new());

    let mut sink = CollectingSink::new();
    orchestrator
        .run(text_query("%sux lugal-e e₂ mu-du₃"), registry.register(), &mut sink)
        .await;

    let (_, _, language, _) = classification_event(sink.events());
    assert_eq!(language, SourceLanguage::Sumerian.label(OutputLanguage::English));
}

#[tokio::test]
async fn test_markup_words_reach_prompts_and_content_type() {
    let gateway = Arc::new(ScriptedGateway::echo());
    let orchestrator = orchestrator(Arc::clone(&gateway));
    let registry = Arc::new(RequestRegistry::new());

    let query = query(json!({
        "inputData": {
            "type": "file",
            "fileName": "tablet.xml",
            "data": "<?xml version=\"1.0\"?><TEI><l><w>lugal</w><w>é</w><w>an</w></l></TEI>"
        },
        "language": "en"
    }));

    let mut sink = CollectingSink::new();
    orchestrator.run(query, registry.register(), &mut sink).await;

    let (_, _, _, content_type) = classification_event(sink.events());
    assert_eq!(content_type, "Religious");

    let summary_prompt = gateway
        .prompts()
        .into_iter()
        .nth(3)
        .expect("short summary prompt");
    assert!(summary_prompt.contains("• lugal\n• é\n• an\n"));
}

#[tokio::test]
async fn test_failing_detailed_call_uses_fallback() {
    let gateway = Arc::new(ScriptedGateway::failing_model(DETAILED_MODEL));
    let orchestrator = orchestrator(gateway);
    let registry = Arc::new(RequestRegistry::new());

    let mut sink = CollectingSink::new();
    let result = completed(
        orchestrator
            .run(text_query("gur še"), registry.register(), &mut sink)
            .await,
    );

    assert_eq!(result.summary, "reply from summary-model");
    assert_eq!(
        result.tabs[2].content,
        "Detailed analysis is not available at the moment"
    );
}

#[tokio::test]
async fn test_offline_run_is_localized() {
    let gateway = Arc::new(ScriptedGateway::failing());
    let orchestrator = orchestrator(gateway);
    let registry = Arc::new(RequestRegistry::new());

    let query = query(json!({
        "inputData": { "type": "text", "data": "gur še" },
        "language": "en",
        "preferences": { "outputLanguage": "he" }
    }));

    let mut sink = CollectingSink::new();
    let result = completed(orchestrator.run(query, registry.register(), &mut sink).await);

    assert_eq!(result.language, OutputLanguage::Hebrew);
    let names: Vec<_> = result.tabs.iter().map(|tab| tab.name.as_str()).collect();
    assert_eq!(names, vec!["נושא", "תקופה", "תוכן"]);
    assert_eq!(result.summary, "הסיכום אינו זמין כרגע");

    let preview = result.preprocessing.expect("preprocessing");
    assert_eq!(preview.status, PreviewStatus::Partial);
    assert_eq!(preview.preview, "מתחיל עיבוד מפורט של הכתובת...");
}

#[tokio::test]
async fn test_gateway_timeout_counts_as_failure() {
    let gateway = Arc::new(ScriptedGateway::echo().with_delay(Duration::from_secs(2)));
    let settings = PipelineSettings {
        call_timeout: Duration::from_millis(20),
        ..test_settings()
    };
    let orchestrator = orchestrator_with(gateway, settings);
    let registry = Arc::new(RequestRegistry::new());

    let mut sink = CollectingSink::new();
    let result = completed(
        orchestrator
            .run(text_query("gur še"), registry.register(), &mut sink)
            .await,
    );

    assert_eq!(
        result.preprocessing.map(|p| p.status),
        Some(PreviewStatus::Partial)
    );
    assert_eq!(result.summary, "Summary is not available at the moment");
}

#[tokio::test]
async fn test_rule_only_classification_skips_model() {
    let gateway = Arc::new(ScriptedGateway::echo());
    let settings = PipelineSettings {
        llm_classification: false,
        ..test_settings()
    };
    let orchestrator = orchestrator_with(Arc::clone(&gateway), settings);
    let registry = Arc::new(RequestRegistry::new());

    let mut sink = CollectingSink::new();
    let result = completed(
        orchestrator
            .run(text_query("Hammurabi"), registry.register(), &mut sink)
            .await,
    );

    assert_eq!(gateway.models_called(), vec![QUICK_MODEL, SUMMARY_MODEL, DETAILED_MODEL]);
    assert_eq!(
        result.tabs[1].content,
        PeriodLabel::OldBabylonian.label(OutputLanguage::English)
    );
}

#[tokio::test]
async fn test_quick_preview_budget_by_input_kind() {
    let long = "q".repeat(1000);

    let gateway = Arc::new(ScriptedGateway::echo());
    let orchestrator = orchestrator(Arc::clone(&gateway));
    let registry = Arc::new(RequestRegistry::new());

    let file = query(json!({
        "inputData": { "type": "file", "data": long, "fileName": "a.txt" },
        "language": "en"
    }));
    orchestrator
        .run(file, registry.register(), &mut CollectingSink::new())
        .await;
    let text = query(json!({
        "inputData": { "type": "text", "data": long },
        "language": "en"
    }));
    orchestrator
        .run(text, registry.register(), &mut CollectingSink::new())
        .await;

    let prompts = gateway.prompts();
    let file_prompt = &prompts[0];
    let text_prompt = &prompts[5];

    assert!(file_prompt.contains(&"q".repeat(800)));
    assert!(!file_prompt.contains(&"q".repeat(801)));
    assert!(text_prompt.contains(&"q".repeat(400)));
    assert!(!text_prompt.contains(&"q".repeat(401)));
}

/// Sink that goes away after a fixed number of events
struct ClosingSink {
    remaining: usize,
    events: Vec<StageEvent>,
}

#[async_trait]
impl StageSink for ClosingSink {
    async fn emit(&mut self, event: StageEvent) -> Result<(), SinkClosed> {
        if self.remaining == 0 {
            return Err(SinkClosed);
        }
        self.remaining -= 1;
        self.events.push(event);
        Ok(())
    }
}

#[tokio::test]
async fn test_disconnect_cancels_and_releases() {
    let gateway = Arc::new(ScriptedGateway::echo());
    let orchestrator = orchestrator(Arc::clone(&gateway));
    let registry = Arc::new(RequestRegistry::new());
    let ticket = registry.register();
    let token = ticket.token().clone();

    let mut sink = ClosingSink {
        remaining: 2,
        events: Vec::new(),
    };
    let outcome = orchestrator.run(text_query("lugal"), ticket, &mut sink).await;

    assert_eq!(outcome, PipelineOutcome::Cancelled);
    assert!(token.is_cancelled());
    // Quick preview ran, its event could not be delivered, nothing followed
    assert_eq!(gateway.call_count(), 1);
    assert_eq!(sink.events.len(), 2);
    assert_eq!(registry.active_count(), 0);
}

#[tokio::test]
async fn test_streamed_frames_in_order() {
    let gateway = Arc::new(ScriptedGateway::echo());
    let orchestrator = Arc::new(orchestrator(gateway));
    let registry = Arc::new(RequestRegistry::new());
    let ticket = registry.register();

    let (mut sink, rx) = ChannelSink::channel(4);
    let task = {
        let orchestrator = Arc::clone(&orchestrator);
        tokio::spawn(async move { orchestrator.run(text_query("gur še"), ticket, &mut sink).await })
    };

    let frames: Vec<_> = frame_stream(rx, OutputLanguage::English).collect().await;
    let types: Vec<_> = frames.iter().map(|frame| frame.frame_type()).collect();
    assert_eq!(
        types,
        vec![
            "status",
            "status",
            "quick_preview",
            "status",
            "classification",
            "status",
            "status",
            "final_results",
            "complete",
        ]
    );

    assert!(matches!(task.await.unwrap(), PipelineOutcome::Completed(_)));
    assert_eq!(registry.active_count(), 0);
}

#[tokio::test]
async fn test_concurrent_streams_are_independent() {
    let gateway = Arc::new(ScriptedGateway::echo().with_delay(Duration::from_millis(30)));
    let orchestrator = Arc::new(orchestrator(gateway));
    let registry = Arc::new(RequestRegistry::new());

    let cancelled = registry.register();
    let cancelled_id = cancelled.id();
    let survivor = registry.register();
    assert_eq!(registry.active_count(), 2);

    let (mut cancelled_sink, cancelled_rx) = ChannelSink::channel(4);
    let (mut survivor_sink, survivor_rx) = ChannelSink::channel(4);

    let cancelled_task = {
        let orchestrator = Arc::clone(&orchestrator);
        tokio::spawn(async move {
            orchestrator
                .run(text_query("lugal"), cancelled, &mut cancelled_sink)
                .await
        })
    };
    let survivor_task = {
        let orchestrator = Arc::clone(&orchestrator);
        tokio::spawn(async move {
            orchestrator
                .run(text_query("gur še"), survivor, &mut survivor_sink)
                .await
        })
    };
    let survivor_frames = tokio::spawn(async move {
        frame_stream(survivor_rx, OutputLanguage::English)
            .collect::<Vec<_>>()
            .await
    });

    // Cancel once the first request is under way
    let mut cancelled_stream = Box::pin(frame_stream(cancelled_rx, OutputLanguage::English));
    let first = cancelled_stream.next().await.expect("first frame");
    assert_eq!(first.frame_type(), "status");
    assert!(registry.cancel(&cancelled_id));
    let rest: Vec<_> = cancelled_stream.collect().await;

    assert_eq!(rest.last().map(|f| f.frame_type()), Some("cancelled"));
    assert!(!rest.iter().any(|f| f.frame_type() == "final_results"));
    assert_eq!(cancelled_task.await.unwrap(), PipelineOutcome::Cancelled);

    let frames = survivor_frames.await.unwrap();
    let types: Vec<_> = frames.iter().map(|frame| frame.frame_type()).collect();
    assert_eq!(
        types,
        vec![
            "status",
            "status",
            "quick_preview",
            "status",
            "classification",
            "status",
            "status",
            "final_results",
            "complete",
        ]
    );
    match &frames[7] {
        StreamFrame::FinalResults(result) => {
            assert_eq!(
                result.tabs[1].content,
                "reply from classification-model"
            );
            assert_eq!(result.summary, "reply from summary-model");
        }
        other => panic!("expected final results, got {:?}", other),
    }
    assert!(matches!(survivor_task.await.unwrap(), PipelineOutcome::Completed(_)));

    assert_eq!(registry.active_count(), 0);
}

#[tokio::test]
async fn test_cancel_is_idempotent_and_unknown_after_release() {
    let gateway = Arc::new(ScriptedGateway::echo());
    let orchestrator = orchestrator(gateway);
    let registry = Arc::new(RequestRegistry::new());
    let ticket = registry.register();
    let id = ticket.id();

    assert!(registry.cancel(&id));
    assert!(registry.cancel(&id));

    orchestrator
        .run(text_query("lugal"), ticket, &mut CollectingSink::new())
        .await;
    assert!(!registry.cancel(&id));
}

#[tokio::test]
async fn test_extraction_and_classification_repeatable() {
    let gateway = Arc::new(ScriptedGateway::echo());
    let settings = PipelineSettings {
        llm_classification: false,
        ..test_settings()
    };
    let orchestrator = orchestrator_with(gateway, settings);
    let registry = Arc::new(RequestRegistry::new());

    let mut first = CollectingSink::new();
    orchestrator
        .run(text_query("%akk mu us₂-sa"), registry.register(), &mut first)
        .await;
    let mut second = CollectingSink::new();
    orchestrator
        .run(text_query("%akk mu us₂-sa"), registry.register(), &mut second)
        .await;

    assert_eq!(
        classification_event(first.events()),
        classification_event(second.events())
    );
}
