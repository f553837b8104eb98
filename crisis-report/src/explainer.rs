//! `Explainer`: deterministic, template-based explanation text at one of
//! three verbosities. No randomness, no wall-clock reads — identical
//! input always produces identical output text.

use crate::assessment::{ExplanationView, RecommendedActionDetail};
use crisis_common::{ConflictRecord, ConsensusResult, CrisisSignal, Severity, SignalSet, Verbosity};
use crisis_conflict::Resolution;
use std::collections::HashMap;

pub fn explain(
    verbosity: Verbosity,
    signals: &SignalSet,
    consensus: &ConsensusResult,
    conflicts: &[ConflictRecord],
    resolution: &Resolution,
    severity: Severity,
) -> ExplanationView {
    let ok: Vec<&CrisisSignal> = signals.ok_signals().collect();
    let decision_summary = decision_summary(severity, resolution.final_score);
    let recommended_action = recommended_action_detail(severity);

    if verbosity == Verbosity::Minimal {
        return ExplanationView {
            verbosity,
            decision_summary,
            key_factors: Vec::new(),
            recommended_action,
            plain_text: String::new(),
            confidence_summary: None,
            model_contributions: None,
            conflict_summary: None,
        };
    }

    let key_factors = top_key_factors(&ok);
    let confidence_summary = Some(format!(
        "confidence {:.0}% with {:?} agreement among {} source(s)",
        consensus.confidence * 100.0,
        consensus.agreement_level,
        ok.len()
    ));
    let plain_text = plain_text(&decision_summary, &key_factors, signals, conflicts);

    if verbosity == Verbosity::Standard {
        return ExplanationView {
            verbosity,
            decision_summary,
            key_factors,
            recommended_action,
            plain_text,
            confidence_summary,
            model_contributions: None,
            conflict_summary: None,
        };
    }

    let model_contributions: HashMap<_, _> = ok.iter().map(|s| (s.source_name, s.crisis_signal)).collect();
    let conflict_summary = if conflicts.is_empty() {
        None
    } else {
        Some(
            conflicts
                .iter()
                .map(|c| c.description.clone())
                .collect::<Vec<_>>()
                .join("; "),
        )
    };

    ExplanationView {
        verbosity,
        decision_summary,
        key_factors,
        recommended_action,
        plain_text,
        confidence_summary,
        model_contributions: Some(model_contributions),
        conflict_summary,
    }
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "critical",
        Severity::High => "high",
        Severity::Medium => "medium",
        Severity::Low => "low",
        Severity::Safe => "safe",
    }
}

fn decision_summary(severity: Severity, final_score: f64) -> String {
    format!(
        "the message was assessed as {} risk with a crisis score of {:.2}",
        severity_label(severity),
        final_score
    )
}

fn recommended_action_detail(severity: Severity) -> RecommendedActionDetail {
    let priority = match severity {
        Severity::Critical => "urgent",
        Severity::High => "high",
        Severity::Medium => "standard",
        Severity::Low => "low",
        Severity::Safe => "none",
    };
    RecommendedActionDetail {
        priority: priority.to_string(),
        action: severity.recommended_action(),
        escalation: severity.requires_intervention(),
        rationale: format!(
            "{:?} is the mapped action for {} severity",
            severity.recommended_action(),
            severity_label(severity)
        ),
    }
}

fn top_key_factors(ok: &[&CrisisSignal]) -> Vec<String> {
    let mut sorted: Vec<&&CrisisSignal> = ok.iter().collect();
    sorted.sort_by(|a, b| b.crisis_signal.total_cmp(&a.crisis_signal));
    sorted
        .into_iter()
        .take(3)
        .map(|s| format!("{}: {:.2} ({})", s.source_name, s.crisis_signal, s.raw_label))
        .collect()
}

fn plain_text(
    decision_summary: &str,
    key_factors: &[String],
    signals: &SignalSet,
    conflicts: &[ConflictRecord],
) -> String {
    let mut parts = vec![format!("{decision_summary}.")];

    if !key_factors.is_empty() {
        parts.push(format!("key factors: {}.", key_factors.join(", ")));
    }

    let failed = signals.failed_sources();
    if !failed.is_empty() {
        let names: Vec<String> = failed.iter().map(|s| s.source_name.to_string()).collect();
        parts.push(format!(
            "the following sources were unavailable for this request: {}.",
            names.join(", ")
        ));
    }

    if !conflicts.is_empty() {
        parts.push(format!(
            "{} disagreement(s) were detected between signal sources.",
            conflicts.len()
        ));
    }

    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crisis_common::{AgreementLevel, Algorithm, SignalStatus, SourceName};
    use std::collections::HashMap as StdHashMap;

    fn ok_signal(source: SourceName, crisis_signal: f64) -> CrisisSignal {
        CrisisSignal {
            source_name: source,
            raw_label: "label".into(),
            raw_score: crisis_signal,
            crisis_signal,
            latency_ms: 1.0,
            status: SignalStatus::Ok,
        }
    }

    fn fixture_consensus() -> ConsensusResult {
        ConsensusResult {
            algorithm: Algorithm::Weighted,
            raw_score: 0.6,
            confidence: 0.8,
            agreement_level: AgreementLevel::Moderate,
            per_source_scores: StdHashMap::new(),
            total_weight: 1.0,
            vote_breakdown: None,
        }
    }

    #[test]
    fn minimal_verbosity_omits_plain_text() {
        let signals = SignalSet::new(vec![ok_signal(SourceName::Primary, 0.6)]);
        let resolution = Resolution {
            final_score: 0.6,
            requires_review: false,
        };
        let view = explain(
            Verbosity::Minimal,
            &signals,
            &fixture_consensus(),
            &[],
            &resolution,
            Severity::Medium,
        );
        assert!(view.plain_text.is_empty());
        assert!(view.key_factors.is_empty());
    }

    #[test]
    fn detailed_verbosity_includes_model_contributions() {
        let signals = SignalSet::new(vec![
            ok_signal(SourceName::Primary, 0.8),
            ok_signal(SourceName::Sentiment, 0.4),
        ]);
        let resolution = Resolution {
            final_score: 0.6,
            requires_review: false,
        };
        let view = explain(
            Verbosity::Detailed,
            &signals,
            &fixture_consensus(),
            &[],
            &resolution,
            Severity::Medium,
        );
        assert!(view.model_contributions.is_some());
    }

    #[test]
    fn explanation_is_deterministic() {
        let signals = SignalSet::new(vec![ok_signal(SourceName::Primary, 0.6)]);
        let resolution = Resolution {
            final_score: 0.6,
            requires_review: false,
        };
        let a = explain(Verbosity::Standard, &signals, &fixture_consensus(), &[], &resolution, Severity::Medium);
        let b = explain(Verbosity::Standard, &signals, &fixture_consensus(), &[], &resolution, Severity::Medium);
        assert_eq!(a.plain_text, b.plain_text);
    }
}
