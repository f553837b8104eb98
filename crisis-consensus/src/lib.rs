//! The four consensus algorithms and agreement-level derivation.
//!
//! `conflict_aware` needs conflict records to decide whether to shift the
//! score, so callers run conflict detection before calling `compute` and
//! pass the records in — conflict detection is a pure function of the
//! `SignalSet` alone, so running it ahead of consensus costs nothing and
//! keeps this crate free of a dependency on `crisis-conflict`.

use crisis_common::{
    AgreementLevel, Algorithm, ConflictRecord, ConflictSeverity, ConsensusResult, CrisisSignal,
    SignalSet, SourceName,
};
use crisis_config::EngineConfig;
use std::collections::HashMap;

pub fn compute(
    signals: &SignalSet,
    config: &EngineConfig,
    algorithm: Algorithm,
    conflicts: &[ConflictRecord],
) -> ConsensusResult {
    let ok: Vec<&CrisisSignal> = signals.ok_signals().collect();

    if ok.len() == 1 {
        let score = ok[0].crisis_signal;
        let mut per_source_scores = HashMap::new();
        per_source_scores.insert(ok[0].source_name, score);
        return ConsensusResult {
            algorithm,
            raw_score: score,
            confidence: score,
            agreement_level: AgreementLevel::Strong,
            per_source_scores,
            total_weight: config.weight_for(ok[0].source_name),
            vote_breakdown: None,
        };
    }

    match algorithm {
        Algorithm::Weighted => weighted(&ok, config),
        Algorithm::Majority => majority(&ok),
        Algorithm::Unanimous => unanimous(&ok),
        Algorithm::ConflictAware => conflict_aware(&ok, config, conflicts),
    }
}

fn per_source_scores(ok: &[&CrisisSignal]) -> HashMap<SourceName, f64> {
    ok.iter().map(|s| (s.source_name, s.crisis_signal)).collect()
}

fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64
}

fn agreement_level(v: f64) -> AgreementLevel {
    if v < 0.05 {
        AgreementLevel::Strong
    } else if v < 0.15 {
        AgreementLevel::Moderate
    } else if v < 0.25 {
        AgreementLevel::Weak
    } else {
        AgreementLevel::Disagreement
    }
}

fn weighted(ok: &[&CrisisSignal], config: &EngineConfig) -> ConsensusResult {
    let total_weight: f64 = ok.iter().map(|s| config.weight_for(s.source_name)).sum();
    let raw_score = if total_weight > 0.0 {
        ok.iter()
            .map(|s| s.crisis_signal * config.weight_for(s.source_name))
            .sum::<f64>()
            / total_weight
    } else {
        0.0
    };

    let scores: Vec<f64> = ok.iter().map(|s| s.crisis_signal).collect();
    let v = variance(&scores);
    let confidence = (1.0 - v.sqrt()).clamp(0.0, 1.0);

    ConsensusResult {
        algorithm: crisis_common::Algorithm::Weighted,
        raw_score: crisis_common::clamp_to_unit(raw_score),
        confidence,
        agreement_level: agreement_level(v),
        per_source_scores: per_source_scores(ok),
        total_weight,
        vote_breakdown: None,
    }
}

fn majority(ok: &[&CrisisSignal]) -> ConsensusResult {
    let votes: Vec<bool> = ok.iter().map(|s| s.crisis_signal >= 0.5).collect();
    let crisis_votes = votes.iter().filter(|v| **v).count();
    let safe_votes = votes.len() - crisis_votes;
    // Ties broken toward is_crisis = true, per spec.
    let is_crisis = crisis_votes >= safe_votes;

    let agreeing: Vec<f64> = ok
        .iter()
        .zip(votes.iter())
        .filter(|(_, v)| **v == is_crisis)
        .map(|(s, _)| s.crisis_signal)
        .collect();
    let raw_score = if agreeing.is_empty() {
        0.0
    } else {
        agreeing.iter().sum::<f64>() / agreeing.len() as f64
    };

    let scores: Vec<f64> = ok.iter().map(|s| s.crisis_signal).collect();
    let v = variance(&scores);
    let winning_count = if is_crisis { crisis_votes } else { safe_votes };

    ConsensusResult {
        algorithm: crisis_common::Algorithm::Majority,
        raw_score: crisis_common::clamp_to_unit(raw_score),
        confidence: (1.0 - v.sqrt()).clamp(0.0, 1.0),
        agreement_level: agreement_level(v),
        per_source_scores: per_source_scores(ok),
        total_weight: ok.len() as f64,
        vote_breakdown: Some((winning_count, ok.len())),
    }
}

fn unanimous(ok: &[&CrisisSignal]) -> ConsensusResult {
    let scores: Vec<f64> = ok.iter().map(|s| s.crisis_signal).collect();
    let is_crisis = scores.iter().all(|s| *s >= 0.5);
    let min = scores.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let raw_score = if is_crisis { min } else { max };
    let range = max - min;

    ConsensusResult {
        algorithm: crisis_common::Algorithm::Unanimous,
        raw_score: crisis_common::clamp_to_unit(raw_score),
        confidence: (1.0 - range).clamp(0.0, 1.0),
        agreement_level: agreement_level(variance(&scores)),
        per_source_scores: per_source_scores(ok),
        total_weight: ok.len() as f64,
        vote_breakdown: None,
    }
}

/// Shift fraction applied toward the most-pessimistic ok signal when a
/// high-severity conflict is present.
const CONFLICT_AWARE_SHIFT: f64 = 0.2;

fn conflict_aware(
    ok: &[&CrisisSignal],
    config: &EngineConfig,
    conflicts: &[ConflictRecord],
) -> ConsensusResult {
    let mut result = weighted(ok, config);
    result.algorithm = crisis_common::Algorithm::ConflictAware;

    let has_high_severity = conflicts.iter().any(|c| c.severity == ConflictSeverity::High);
    if has_high_severity {
        let most_pessimistic = ok
            .iter()
            .map(|s| s.crisis_signal)
            .fold(f64::NEG_INFINITY, f64::max);
        let shifted = result.raw_score + CONFLICT_AWARE_SHIFT * (most_pessimistic - result.raw_score);
        result.raw_score = crisis_common::clamp_to_unit(shifted);
    }

    result
}
