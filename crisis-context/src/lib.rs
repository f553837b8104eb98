//! `ContextAnalyzer`: escalation, trajectory pattern, temporal risk, and
//! intervention urgency over a caller-supplied history plus the current
//! assessment. Invoked only when history is non-empty; the engine never
//! re-scores historical text, it only reasons over the scores supplied.

use chrono::{DateTime, Datelike, Timelike, Utc};
use crisis_common::{EscalationVelocity, HistoryEntry, InterventionUrgency, TrajectoryPattern, TrendDirection};
use crisis_config::SeverityThresholds;
use serde::{Deserialize, Serialize};

const RAPID_SLOPE_PER_HOUR: f64 = 0.3;
const GRADUAL_SLOPE_PER_HOUR: f64 = 0.1;
const IMPROVING_SLOPE_PER_HOUR: f64 = -0.1;
const PLATEAU_EPS: f64 = 0.05;
const LINEAR_RESIDUAL_EPS: f64 = 0.08;
const SPIKE_MARGIN: f64 = 0.3;
const RAPID_POSTING_WINDOW_MINUTES: i64 = 10;
const RAPID_POSTING_COUNT: usize = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendInfo {
    pub direction: TrendDirection,
    pub velocity: EscalationVelocity,
    pub score_delta: f64,
    pub time_span_hours: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemporalFactors {
    pub late_night_risk: bool,
    pub rapid_posting: bool,
    pub time_risk_modifier: f64,
    pub hour_of_day: u32,
    pub is_weekend: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrajectoryInfo {
    pub start_score: f64,
    pub end_score: f64,
    pub peak_score: f64,
    pub scores: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterventionInfo {
    pub urgency: InterventionUrgency,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommended_point: Option<usize>,
    pub intervention_delayed: bool,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryAnalyzed {
    pub message_count: usize,
    pub time_span_hours: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oldest_timestamp: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub newest_timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextAnalysis {
    pub escalation_detected: bool,
    pub escalation_rate: EscalationVelocity,
    pub escalation_pattern: TrajectoryPattern,
    pub pattern_confidence: f64,
    pub trend: TrendInfo,
    pub temporal_factors: TemporalFactors,
    pub trajectory: TrajectoryInfo,
    pub intervention: InterventionInfo,
    pub history_analyzed: HistoryAnalyzed,
}

/// `final_score` modifier derived from temporal risk, applied before
/// severity mapping when context is enabled.
pub fn time_risk_modifier(temporal: &TemporalFactors) -> f64 {
    temporal.time_risk_modifier
}

pub fn analyze(
    history: &[HistoryEntry],
    current_score: f64,
    current_timestamp: DateTime<Utc>,
    thresholds: &SeverityThresholds,
) -> ContextAnalysis {
    let mut points: Vec<(DateTime<Utc>, f64)> = history
        .iter()
        .map(|h| (h.timestamp, h.crisis_score))
        .collect();
    points.sort_by_key(|(ts, _)| *ts);
    points.push((current_timestamp, current_score));

    let temporal_factors = temporal_factors(&points, current_timestamp);

    let history_analyzed = HistoryAnalyzed {
        message_count: points.len(),
        time_span_hours: span_hours(&points),
        oldest_timestamp: points.first().map(|(ts, _)| *ts),
        newest_timestamp: points.last().map(|(ts, _)| *ts),
    };

    if points.len() < 2 {
        return ContextAnalysis {
            escalation_detected: false,
            escalation_rate: EscalationVelocity::Stable,
            escalation_pattern: TrajectoryPattern::None,
            pattern_confidence: 0.0,
            trend: TrendInfo {
                direction: TrendDirection::Stable,
                velocity: EscalationVelocity::Stable,
                score_delta: 0.0,
                time_span_hours: 0.0,
            },
            temporal_factors,
            trajectory: TrajectoryInfo {
                start_score: current_score,
                end_score: current_score,
                peak_score: current_score,
                scores: vec![current_score],
            },
            intervention: InterventionInfo {
                urgency: InterventionUrgency::None,
                recommended_point: None,
                intervention_delayed: false,
                reason: "insufficient history for trend analysis".to_string(),
            },
            history_analyzed,
        };
    }

    let scores: Vec<f64> = points.iter().map(|(_, s)| *s).collect();
    let span = span_hours(&points);
    let overall_slope = if span > 0.0 {
        (scores[scores.len() - 1] - scores[0]) / span
    } else {
        0.0
    };

    let max_delta_per_hour = points
        .windows(2)
        .map(|w| {
            let hours = (w[1].0 - w[0].0).num_seconds() as f64 / 3600.0;
            if hours > 0.0 {
                (w[1].1 - w[0].1) / hours
            } else {
                0.0
            }
        })
        .fold(f64::NEG_INFINITY, f64::max);

    let velocity = if max_delta_per_hour >= RAPID_SLOPE_PER_HOUR || overall_slope > RAPID_SLOPE_PER_HOUR {
        EscalationVelocity::Rapid
    } else if overall_slope >= GRADUAL_SLOPE_PER_HOUR {
        EscalationVelocity::Gradual
    } else if overall_slope <= IMPROVING_SLOPE_PER_HOUR {
        EscalationVelocity::Improving
    } else {
        EscalationVelocity::Stable
    };

    let direction = match velocity {
        EscalationVelocity::Rapid | EscalationVelocity::Gradual => TrendDirection::Escalating,
        EscalationVelocity::Improving => TrendDirection::Improving,
        EscalationVelocity::Stable => TrendDirection::Stable,
    };

    let pattern = classify_pattern(&scores);
    let pattern_confidence = pattern_confidence(&scores, pattern);

    let escalation_detected = matches!(direction, TrendDirection::Escalating);

    let urgency = intervention_urgency(velocity, pattern, current_score, thresholds);
    let intervention_delayed = urgency != InterventionUrgency::Immediate && current_score >= thresholds.high;
    let recommended_point = if escalation_detected {
        points
            .iter()
            .position(|(_, s)| *s >= thresholds.medium)
    } else {
        None
    };
    let reason = intervention_reason(velocity, pattern, urgency);

    ContextAnalysis {
        escalation_detected,
        escalation_rate: velocity,
        escalation_pattern: pattern,
        pattern_confidence,
        trend: TrendInfo {
            direction,
            velocity,
            score_delta: scores[scores.len() - 1] - scores[0],
            time_span_hours: span,
        },
        temporal_factors,
        trajectory: TrajectoryInfo {
            start_score: scores[0],
            end_score: scores[scores.len() - 1],
            peak_score: scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            scores,
        },
        intervention: InterventionInfo {
            urgency,
            recommended_point,
            intervention_delayed,
            reason,
        },
        history_analyzed,
    }
}

fn span_hours(points: &[(DateTime<Utc>, f64)]) -> f64 {
    match (points.first(), points.last()) {
        (Some((first, _)), Some((last, _))) if points.len() > 1 => {
            (*last - *first).num_seconds() as f64 / 3600.0
        }
        _ => 0.0,
    }
}

fn temporal_factors(points: &[(DateTime<Utc>, f64)], current_timestamp: DateTime<Utc>) -> TemporalFactors {
    // No timezone/offset travels in the request contract, so this is the
    // caller's UTC hour, not their local hour (see DESIGN.md).
    let hour = current_timestamp.hour();
    let late_night_risk = !(5..23).contains(&hour);

    let window_start = current_timestamp - chrono::Duration::minutes(RAPID_POSTING_WINDOW_MINUTES);
    let recent_count = points.iter().filter(|(ts, _)| *ts >= window_start && *ts <= current_timestamp).count();
    let rapid_posting = recent_count >= RAPID_POSTING_COUNT;

    let mut modifier: f64 = 1.0;
    if late_night_risk {
        modifier += 0.1;
    }
    if rapid_posting {
        modifier += 0.1;
    }
    modifier = modifier.min(1.3);

    TemporalFactors {
        late_night_risk,
        rapid_posting,
        time_risk_modifier: modifier,
        hour_of_day: hour,
        is_weekend: matches!(
            current_timestamp.weekday(),
            chrono::Weekday::Sat | chrono::Weekday::Sun
        ),
    }
}

fn classify_pattern(scores: &[f64]) -> TrajectoryPattern {
    if scores.len() < 3 {
        return TrajectoryPattern::None;
    }

    let deltas: Vec<f64> = scores.windows(2).map(|w| w[1] - w[0]).collect();
    let monotone_up = deltas.iter().all(|d| *d >= -1e-9);
    let monotone_down = deltas.iter().all(|d| *d <= 1e-9);

    if monotone_up || monotone_down {
        if is_linear(scores) {
            return TrajectoryPattern::Linear;
        }
        if is_exponential(&deltas, monotone_up) {
            return TrajectoryPattern::Exponential;
        }
    } else if let Some(spike_index) = spike_index(scores) {
        let _ = spike_index;
        return TrajectoryPattern::Spike;
    }

    let tail = &scores[scores.len().saturating_sub(4)..];
    let mean = tail.iter().sum::<f64>() / tail.len() as f64;
    let var = tail.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / tail.len() as f64;
    if var < PLATEAU_EPS && mean >= 0.5 {
        return TrajectoryPattern::Plateau;
    }

    let sign_changes = deltas
        .windows(2)
        .filter(|w| w[0].signum() != 0.0 && w[1].signum() != 0.0 && w[0].signum() != w[1].signum())
        .count();
    if sign_changes >= 2 {
        TrajectoryPattern::Oscillating
    } else if monotone_up || monotone_down {
        TrajectoryPattern::Linear
    } else {
        TrajectoryPattern::Oscillating
    }
}

fn spike_index(scores: &[f64]) -> Option<usize> {
    for i in 1..scores.len() - 1 {
        let neighbours_avg = (scores[i - 1] + scores[i + 1]) / 2.0;
        if scores[i] - neighbours_avg > SPIKE_MARGIN {
            return Some(i);
        }
    }
    None
}

fn is_linear(scores: &[f64]) -> bool {
    let n = scores.len() as f64;
    let xs: Vec<f64> = (0..scores.len()).map(|i| i as f64).collect();
    let x_mean = xs.iter().sum::<f64>() / n;
    let y_mean = scores.iter().sum::<f64>() / n;
    let denom: f64 = xs.iter().map(|x| (x - x_mean).powi(2)).sum();
    if denom == 0.0 {
        return true;
    }
    let slope = xs
        .iter()
        .zip(scores)
        .map(|(x, y)| (x - x_mean) * (y - y_mean))
        .sum::<f64>()
        / denom;
    let intercept = y_mean - slope * x_mean;
    let residual: f64 = xs
        .iter()
        .zip(scores)
        .map(|(x, y)| (y - (slope * x + intercept)).powi(2))
        .sum::<f64>()
        / n;
    residual.sqrt() < LINEAR_RESIDUAL_EPS
}

fn is_exponential(deltas: &[f64], monotone_up: bool) -> bool {
    if !monotone_up || deltas.len() < 2 {
        return false;
    }
    deltas.windows(2).all(|w| w[1] >= w[0] - 1e-9)
}

fn pattern_confidence(scores: &[f64], pattern: TrajectoryPattern) -> f64 {
    match pattern {
        TrajectoryPattern::None => 0.0,
        _ if scores.len() < 3 => 0.3,
        _ => 0.7,
    }
}

fn intervention_urgency(
    velocity: EscalationVelocity,
    pattern: TrajectoryPattern,
    current_score: f64,
    thresholds: &SeverityThresholds,
) -> InterventionUrgency {
    if pattern == TrajectoryPattern::Spike && current_score >= thresholds.high {
        InterventionUrgency::Immediate
    } else if velocity == EscalationVelocity::Rapid && current_score >= thresholds.medium {
        InterventionUrgency::Immediate
    } else if velocity == EscalationVelocity::Rapid || pattern == TrajectoryPattern::Exponential {
        InterventionUrgency::High
    } else if velocity == EscalationVelocity::Gradual {
        InterventionUrgency::Moderate
    } else if velocity == EscalationVelocity::Stable && current_score >= thresholds.low {
        InterventionUrgency::Low
    } else {
        InterventionUrgency::None
    }
}

fn intervention_reason(
    velocity: EscalationVelocity,
    pattern: TrajectoryPattern,
    urgency: InterventionUrgency,
) -> String {
    match urgency {
        InterventionUrgency::Immediate if pattern == TrajectoryPattern::Spike => {
            "sudden spike in crisis score at an already elevated level".to_string()
        }
        InterventionUrgency::Immediate => {
            "rapid escalation combined with a medium-or-higher current score".to_string()
        }
        InterventionUrgency::High => format!("{velocity:?} escalation or exponential trajectory"),
        InterventionUrgency::Moderate => "gradual escalation over the observed history".to_string(),
        InterventionUrgency::Low => "stable trajectory but score above the low threshold".to_string(),
        InterventionUrgency::None => "no escalation signal in the observed history".to_string(),
    }
}
