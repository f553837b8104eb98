//! `CrisisEngine`: wires Dispatcher, Consensus, ConflictDetector,
//! ConflictResolver, ContextAnalyzer, Aggregator, Explainer, and AlertSink
//! into `analyze` / `analyze_batch` / `reload_config`.

use crate::request::{validate, AnalyzeRequest};
use chrono::Utc;
use crisis_alerts::{AlertDispatcher, AlertSink, LoggingAlertDispatcher};
use crisis_common::{AgreementLevel, Algorithm, ConsensusResult, SignalSet};
use crisis_config::{EngineConfig, SharedConfig};
use crisis_errors::CrisisError;
use crisis_report::{assemble, explain, BatchResult, CrisisAssessment};
use crisis_signals::SourceRegistry;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

pub struct CrisisEngine {
    config: Arc<SharedConfig>,
    registry: Arc<SourceRegistry>,
    alert_sink: Arc<AlertSink>,
}

impl CrisisEngine {
    pub fn new(config: EngineConfig, dispatcher: Arc<dyn AlertDispatcher>) -> Self {
        let alert_sink = Arc::new(AlertSink::new(
            config.alert_cooldown_seconds,
            config.escalation_alert_cooldown_seconds,
            dispatcher,
        ));
        Self {
            config: Arc::new(SharedConfig::new(config)),
            registry: Arc::new(SourceRegistry::new()),
            alert_sink,
        }
    }

    pub fn with_logging_dispatcher(config: EngineConfig) -> Self {
        Self::new(config, Arc::new(LoggingAlertDispatcher))
    }

    pub fn reload_config(&self, new_config: EngineConfig) -> Result<(), CrisisError> {
        self.config.reload(new_config).map_err(CrisisError::from)
    }

    /// Source names this engine has a handler registered for, for readiness reporting.
    pub fn configured_sources(&self) -> Vec<crisis_common::SourceName> {
        self.registry.all().map(|(name, _)| *name).collect()
    }

    pub async fn analyze(&self, request: AnalyzeRequest) -> Result<CrisisAssessment, CrisisError> {
        let started = Instant::now();
        let validated = validate(request)?;
        let config = self.config.current();

        let dispatch_result = crisis_dispatch::dispatch(&validated.message, &config, &self.registry).await;

        let assessment = match dispatch_result {
            Ok(signal_set) => self.assess(&signal_set, &validated, &config, started).await,
            Err(CrisisError::NoUsableSignals(failures)) => {
                degraded_response(&failures, validated.request_id.clone(), started)
            }
            Err(other) => return Err(other),
        };

        Ok(assessment)
    }

    async fn assess(
        &self,
        signal_set: &SignalSet,
        validated: &crate::request::ValidatedRequest,
        config: &EngineConfig,
        started: Instant,
    ) -> CrisisAssessment {
        let conflicts = crisis_conflict::detect(signal_set);
        let consensus = crisis_consensus::compute(signal_set, config, validated.algorithm, &conflicts);
        let resolution = crisis_conflict::resolve(&consensus, &conflicts, signal_set, validated.resolution_policy);

        let now = Utc::now();
        let context_analysis = if !validated.message_history.is_empty() {
            Some(crisis_context::analyze(
                &validated.message_history,
                resolution.final_score,
                now,
                &config.thresholds,
            ))
        } else {
            None
        };

        let mut final_score = resolution.final_score;
        if let Some(ctx) = &context_analysis {
            final_score = crisis_common::clamp_to_unit(final_score * ctx.temporal_factors.time_risk_modifier);
        }

        let severity = crisis_conflict::severity_for(final_score, &config.thresholds);
        let resolution = crisis_conflict::Resolution {
            final_score,
            requires_review: resolution.requires_review,
        };

        let explanation = explain(validated.verbosity, signal_set, &consensus, &conflicts, &resolution, severity);

        let escalation_detected = context_analysis
            .as_ref()
            .map(|c| c.escalation_detected)
            .unwrap_or(false);
        self.alert_sink
            .maybe_dispatch(&validated.user_id, severity, escalation_detected, now)
            .await;

        let request_id = validated
            .request_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        assemble(
            signal_set,
            &consensus,
            &conflicts,
            &resolution,
            validated.resolution_policy,
            severity,
            context_analysis,
            explanation,
            started.elapsed().as_secs_f64() * 1000.0,
            request_id,
            now,
        )
    }

    pub async fn analyze_batch(&self, messages: Vec<String>, include_details: bool) -> BatchResult {
        let started = Instant::now();
        let mut assessments = Vec::with_capacity(messages.len());
        for message in messages {
            let request = AnalyzeRequest {
                message,
                user_id: None,
                channel_id: None,
                metadata: None,
                message_history: None,
                options: include_details.then(|| crate::request::AnalyzeOptions {
                    verbosity: Some(crisis_common::Verbosity::Detailed),
                    algorithm: None,
                    resolution_policy: None,
                }),
                request_id: None,
            };
            match self.analyze(request).await {
                Ok(assessment) => assessments.push(assessment),
                Err(err) => {
                    tracing::warn!(%err, "batch item failed validation, skipping");
                }
            }
        }

        BatchResult {
            assessments,
            total_processing_time_ms: started.elapsed().as_secs_f64() * 1000.0,
        }
    }
}

fn degraded_response(
    failures: &[crisis_errors::SourceFailure],
    request_id: Option<String>,
    started: Instant,
) -> CrisisAssessment {
    let empty_signals = SignalSet::new(Vec::new());
    let consensus = ConsensusResult {
        algorithm: Algorithm::Weighted,
        raw_score: 0.0,
        confidence: 0.0,
        agreement_level: AgreementLevel::Disagreement,
        per_source_scores: HashMap::new(),
        total_weight: 0.0,
        vote_breakdown: None,
    };
    let resolution = crisis_conflict::Resolution {
        final_score: 0.0,
        requires_review: false,
    };
    let severity = crisis_common::Severity::Safe;

    let mut explanation = explain(
        crisis_common::Verbosity::Standard,
        &empty_signals,
        &consensus,
        &[],
        &resolution,
        severity,
    );
    let names: Vec<&str> = failures.iter().map(|f| f.source.as_str()).collect();
    explanation.plain_text = format!(
        "no signal source produced a usable result ({}); returning a safe, degraded assessment.",
        names.join(", ")
    );

    assemble(
        &empty_signals,
        &consensus,
        &[],
        &resolution,
        crisis_common::ResolutionPolicy::default(),
        severity,
        None,
        explanation,
        started.elapsed().as_secs_f64() * 1000.0,
        request_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
        Utc::now(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::AnalyzeRequest;

    fn engine() -> CrisisEngine {
        CrisisEngine::with_logging_dispatcher(EngineConfig::default())
    }

    #[tokio::test]
    async fn analyze_rejects_empty_message() {
        let engine = engine();
        let request = AnalyzeRequest {
            message: "".to_string(),
            user_id: None,
            channel_id: None,
            metadata: None,
            message_history: None,
            options: None,
            request_id: None,
        };
        assert!(matches!(engine.analyze(request).await, Err(CrisisError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn analyze_returns_assessment_for_normal_message() {
        let engine = engine();
        let request = AnalyzeRequest {
            message: "I had a great time today".to_string(),
            user_id: Some("u1".to_string()),
            channel_id: None,
            metadata: None,
            message_history: None,
            options: None,
            request_id: None,
        };
        let assessment = engine.analyze(request).await.unwrap();
        assert!(assessment.crisis_score >= 0.0 && assessment.crisis_score <= 1.0);
        assert!(!assessment.is_degraded);
    }

    #[tokio::test]
    async fn reload_config_rejects_invalid_thresholds() {
        let engine = engine();
        let mut bad = EngineConfig::default();
        bad.thresholds.low = 0.0;
        assert!(engine.reload_config(bad).is_err());
    }

    #[tokio::test]
    async fn analyze_batch_processes_all_messages() {
        let engine = engine();
        let result = engine
            .analyze_batch(vec!["hello there".to_string(), "another message".to_string()], false)
            .await;
        assert_eq!(result.assessments.len(), 2);
    }
}
