//! Integration tests exercising the full pipeline end to end, covering the
//! invariants and laws from spec §8 that unit tests elsewhere can't see
//! across crate boundaries.

use crisis_config::EngineConfig;
use crisis_engine::{AnalyzeRequest, CrisisEngine};

fn engine() -> CrisisEngine {
    CrisisEngine::with_logging_dispatcher(EngineConfig::default())
}

fn request(message: &str) -> AnalyzeRequest {
    AnalyzeRequest {
        message: message.to_string(),
        user_id: Some("scenario-user".to_string()),
        channel_id: None,
        metadata: None,
        message_history: None,
        options: None,
        request_id: None,
    }
}

#[tokio::test]
async fn explicit_crisis_language_is_flagged() {
    let engine = engine();
    let assessment = engine
        .analyze(request("I don't know if I can keep going anymore, I want to die"))
        .await
        .unwrap();
    assert!(assessment.crisis_detected);
    assert!(assessment.crisis_score > 0.5);
}

#[tokio::test]
async fn celebratory_message_is_safe() {
    let engine = engine();
    let assessment = engine.analyze(request("Having a great time!")).await.unwrap();
    assert!(!assessment.crisis_detected);
    assert_eq!(assessment.recommended_action, crisis_common::RecommendedAction::None);
}

#[tokio::test]
async fn response_fields_always_satisfy_the_core_invariants() {
    let engine = engine();
    let assessment = engine.analyze(request("just checking in, nothing major")).await.unwrap();

    assert!((0.0..=1.0).contains(&assessment.crisis_score));
    assert!((0.0..=1.0).contains(&assessment.confidence));
    assert_eq!(
        assessment.requires_intervention,
        matches!(assessment.severity, crisis_common::Severity::High | crisis_common::Severity::Critical)
    );
    assert_eq!(
        assessment.crisis_detected,
        matches!(
            assessment.severity,
            crisis_common::Severity::Medium | crisis_common::Severity::High | crisis_common::Severity::Critical
        )
    );
    assert_eq!(assessment.models_used.len(), assessment.signals.len());
}

#[tokio::test]
async fn identical_requests_are_idempotent_modulo_volatile_fields() {
    let engine = engine();
    let a = engine.analyze(request("I feel pretty anxious about tomorrow")).await.unwrap();
    let b = engine.analyze(request("I feel pretty anxious about tomorrow")).await.unwrap();

    assert_eq!(a.crisis_score, b.crisis_score);
    assert_eq!(a.severity, b.severity);
    assert_eq!(a.signals.len(), b.signals.len());
    assert_eq!(a.explanation.plain_text, b.explanation.plain_text);
}

#[tokio::test]
async fn empty_history_matches_no_history_context_wise() {
    let engine = engine();
    let mut with_history = request("a perfectly ordinary day");
    with_history.message_history = Some(vec![]);
    let a = engine.analyze(request("a perfectly ordinary day")).await.unwrap();
    let b = engine.analyze(with_history).await.unwrap();

    assert!(a.context_analysis.is_none());
    assert!(b.context_analysis.is_none());
}

#[tokio::test]
async fn zero_timeout_degrades_rather_than_panics() {
    let mut config = EngineConfig::default();
    config.request_timeout_ms = 0;
    let engine = CrisisEngine::with_logging_dispatcher(config);
    let assessment = engine.analyze(request("anything at all")).await.unwrap();
    assert!((0.0..=1.0).contains(&assessment.crisis_score));
}

#[tokio::test]
async fn reload_config_swaps_atomically_for_subsequent_requests() {
    let engine = engine();
    let mut new_config = EngineConfig::default();
    new_config.request_timeout_ms = 10_000;
    engine.reload_config(new_config).unwrap();
    let assessment = engine.analyze(request("still works after reconfigure")).await.unwrap();
    assert!((0.0..=1.0).contains(&assessment.crisis_score));
}
