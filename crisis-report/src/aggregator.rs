//! `Aggregator`: pure assembly of the final `CrisisAssessment`. No
//! business logic beyond field layout and the derived booleans the
//! invariants pin (`crisis_detected`, `requires_intervention`, `is_degraded`).

use crate::assessment::{ConflictAnalysisView, ConsensusView, CrisisAssessment, ExplanationView, SignalView};
use chrono::{DateTime, Utc};
use crisis_common::{ConflictRecord, ConsensusResult, ResolutionPolicy, Severity, SignalSet};
use crisis_conflict::Resolution;
use crisis_context::ContextAnalysis;
use std::collections::HashMap;

#[allow(clippy::too_many_arguments)]
pub fn assemble(
    signals: &SignalSet,
    consensus: &ConsensusResult,
    conflicts: &[ConflictRecord],
    resolution: &Resolution,
    resolution_policy: ResolutionPolicy,
    severity: Severity,
    context_analysis: Option<ContextAnalysis>,
    explanation: ExplanationView,
    processing_time_ms: f64,
    request_id: String,
    timestamp: DateTime<Utc>,
) -> CrisisAssessment {
    let signal_views: HashMap<_, _> = signals
        .ok_signals()
        .map(|s| {
            (
                s.source_name,
                SignalView {
                    label: s.raw_label.clone(),
                    score: s.raw_score,
                    crisis_signal: s.crisis_signal,
                },
            )
        })
        .collect();

    let models_used: Vec<_> = signals.ok_signals().map(|s| s.source_name).collect();
    let is_degraded = models_used.len() < crisis_common::SourceName::ALL.len();

    let highest_severity = conflicts.iter().map(|c| c.severity).max();
    let conflict_analysis = ConflictAnalysisView {
        has_conflicts: !conflicts.is_empty(),
        conflict_count: conflicts.len(),
        conflicts: conflicts.to_vec(),
        highest_severity,
        requires_review: resolution.requires_review,
        summary: conflict_summary_text(conflicts),
        resolution_strategy: resolution_policy,
        original_score: consensus.raw_score,
        resolved_score: resolution.final_score,
    };

    CrisisAssessment {
        crisis_detected: severity.crisis_detected(),
        severity,
        confidence: consensus.confidence,
        crisis_score: resolution.final_score,
        requires_intervention: severity.requires_intervention(),
        recommended_action: severity.recommended_action(),
        signals: signal_views,
        consensus: ConsensusView {
            algorithm: consensus.algorithm,
            crisis_score: consensus.raw_score,
            confidence: consensus.confidence,
            agreement_level: consensus.agreement_level,
            individual_scores: consensus.per_source_scores.clone(),
            vote_breakdown: consensus.vote_breakdown,
        },
        conflict_analysis,
        explanation,
        context_analysis,
        processing_time_ms,
        models_used,
        is_degraded,
        request_id,
        timestamp,
    }
}

fn conflict_summary_text(conflicts: &[ConflictRecord]) -> String {
    if conflicts.is_empty() {
        return "no conflicts detected among signal sources".to_string();
    }
    let kinds: Vec<String> = conflicts.iter().map(|c| format!("{:?}", c.kind)).collect();
    format!("{} conflict(s): {}", conflicts.len(), kinds.join(", "))
}
