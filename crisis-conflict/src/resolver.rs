//! `ConflictResolver`: turns a raw consensus score into a final score
//! according to a policy, and derives `Severity` from the final score by
//! the configured thresholds.

use crisis_common::{ConflictRecord, ConflictSeverity, ConsensusResult, CrisisSignal, Severity, SignalSet};
use crisis_config::SeverityThresholds;

/// Output of `resolve`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub final_score: f64,
    pub requires_review: bool,
}

pub fn resolve(
    consensus: &ConsensusResult,
    conflicts: &[ConflictRecord],
    signals: &SignalSet,
    policy: crisis_common::ResolutionPolicy,
) -> Resolution {
    use crisis_common::ResolutionPolicy::*;

    if conflicts.is_empty() {
        return Resolution {
            final_score: consensus.raw_score,
            requires_review: false,
        };
    }

    let ok: Vec<&CrisisSignal> = signals.ok_signals().collect();
    let scores: Vec<f64> = ok.iter().map(|s| s.crisis_signal).collect();
    let max = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let min = scores.iter().cloned().fold(f64::INFINITY, f64::min);
    let mean = if scores.is_empty() {
        0.0
    } else {
        scores.iter().sum::<f64>() / scores.len() as f64
    };
    let has_high_severity = conflicts.iter().any(|c| c.severity == ConflictSeverity::High);

    let final_score = match policy {
        Conservative => consensus.raw_score.max(max),
        Optimistic => consensus.raw_score.min(min),
        Mean => mean,
        ReviewFlag => consensus.raw_score.max(max),
    };

    let requires_review = match policy {
        ReviewFlag => true,
        _ => has_high_severity,
    };

    Resolution {
        final_score: crisis_common::clamp_to_unit(final_score),
        requires_review,
    }
}

pub fn severity_for(score: f64, thresholds: &SeverityThresholds) -> Severity {
    if score >= thresholds.critical {
        Severity::Critical
    } else if score >= thresholds.high {
        Severity::High
    } else if score >= thresholds.medium {
        Severity::Medium
    } else if score >= thresholds.low {
        Severity::Low
    } else {
        Severity::Safe
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crisis_common::{
        AgreementLevel, Algorithm, ConflictKind, CrisisSignal, SignalStatus, SourceName,
    };
    use std::collections::HashMap;

    fn ok_signal(source: SourceName, crisis_signal: f64) -> CrisisSignal {
        CrisisSignal {
            source_name: source,
            raw_label: "x".into(),
            raw_score: crisis_signal,
            crisis_signal,
            latency_ms: 1.0,
            status: SignalStatus::Ok,
        }
    }

    fn fixture_consensus(raw_score: f64) -> ConsensusResult {
        ConsensusResult {
            algorithm: Algorithm::Weighted,
            raw_score,
            confidence: 0.8,
            agreement_level: AgreementLevel::Moderate,
            per_source_scores: HashMap::new(),
            total_weight: 1.0,
            vote_breakdown: None,
        }
    }

    #[test]
    fn no_conflicts_passes_through_consensus_score() {
        let signals = SignalSet::new(vec![ok_signal(SourceName::Primary, 0.5)]);
        let resolution = resolve(
            &fixture_consensus(0.42),
            &[],
            &signals,
            crisis_common::ResolutionPolicy::Conservative,
        );
        assert_eq!(resolution.final_score, 0.42);
        assert!(!resolution.requires_review);
    }

    #[test]
    fn conservative_takes_the_max_and_flags_high_severity() {
        let signals = SignalSet::new(vec![
            ok_signal(SourceName::Primary, 0.9),
            ok_signal(SourceName::Sentiment, 0.3),
        ]);
        let conflict = ConflictRecord {
            kind: ConflictKind::ScoreDisagreement,
            severity: ConflictSeverity::High,
            participants: vec![SourceName::Primary, SourceName::Sentiment],
            description: "gap".into(),
        };
        let resolution = resolve(
            &fixture_consensus(0.5),
            &[conflict],
            &signals,
            crisis_common::ResolutionPolicy::Conservative,
        );
        assert_eq!(resolution.final_score, 0.9);
        assert!(resolution.requires_review);
    }

    #[test]
    fn review_flag_always_requires_review_when_conflicts_exist() {
        let signals = SignalSet::new(vec![ok_signal(SourceName::Primary, 0.6)]);
        let conflict = ConflictRecord {
            kind: ConflictKind::IronySentiment,
            severity: ConflictSeverity::Medium,
            participants: vec![SourceName::Irony, SourceName::Sentiment],
            description: "sarcasm".into(),
        };
        let resolution = resolve(
            &fixture_consensus(0.5),
            &[conflict],
            &signals,
            crisis_common::ResolutionPolicy::ReviewFlag,
        );
        assert!(resolution.requires_review);
    }

    #[test]
    fn severity_thresholds_map_correctly() {
        let t = SeverityThresholds {
            critical: 0.85,
            high: 0.70,
            medium: 0.50,
            low: 0.30,
        };
        assert_eq!(severity_for(0.9, &t), Severity::Critical);
        assert_eq!(severity_for(0.75, &t), Severity::High);
        assert_eq!(severity_for(0.55, &t), Severity::Medium);
        assert_eq!(severity_for(0.35, &t), Severity::Low);
        assert_eq!(severity_for(0.1, &t), Severity::Safe);
    }
}
