//! The fixed, source-specific `crisis_signal` derivations. Pure functions
//! of `(label, score)`; no state, no I/O, so each is trivially testable in
//! isolation from the heuristic classifiers that produce the raw labels.

use crate::RawPrediction;
use crisis_common::{clamp_to_unit, SourceName};

const PRIMARY_CRISIS_LABELS: &[&str] = &[
    "suicide ideation",
    "emotional distress",
    "self-harm",
    "hopelessness",
];
const PRIMARY_SAFE_LABELS: &[&str] = &["casual conversation", "positive sharing", "seeking support"];

const EMOTION_CRISIS_LABELS: &[&str] = &["sadness", "fear", "grief", "remorse", "disappointment"];
const EMOTION_POSITIVE_LABELS: &[&str] = &[
    "joy",
    "amusement",
    "love",
    "excitement",
    "gratitude",
    "optimism",
    "pride",
    "relief",
    "admiration",
    "approval",
    "caring",
    "desire",
    "curiosity",
];

pub fn crisis_signal_for(source: SourceName, prediction: &RawPrediction) -> f64 {
    let value = match source {
        SourceName::Primary => primary(prediction),
        SourceName::Sentiment => sentiment(prediction),
        SourceName::Irony => irony(prediction),
        SourceName::Emotion => emotion(prediction),
    };
    clamp_to_unit(value)
}

fn primary(p: &RawPrediction) -> f64 {
    let label = p.label.to_ascii_lowercase();
    if PRIMARY_CRISIS_LABELS.contains(&label.as_str()) {
        p.score
    } else if PRIMARY_SAFE_LABELS.contains(&label.as_str()) {
        1.0 - p.score
    } else {
        0.5 * p.score
    }
}

fn sentiment(p: &RawPrediction) -> f64 {
    match p.label.to_ascii_lowercase().as_str() {
        "negative" => p.score,
        "neutral" => 0.5 * p.score,
        "positive" => 1.0 - p.score,
        _ => 0.5 * p.score,
    }
}

fn irony(p: &RawPrediction) -> f64 {
    match p.label.to_ascii_lowercase().as_str() {
        "non_irony" => p.score,
        "irony" => 1.0 - p.score,
        _ => p.score,
    }
}

fn emotion(p: &RawPrediction) -> f64 {
    let label = p.label.to_ascii_lowercase();
    if EMOTION_CRISIS_LABELS.contains(&label.as_str()) {
        p.score
    } else if label == "neutral" {
        0.3 * p.score
    } else if EMOTION_POSITIVE_LABELS.contains(&label.as_str()) {
        1.0 - p.score
    } else {
        0.5 * p.score
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_crisis_label_uses_confidence_directly() {
        let p = RawPrediction {
            label: "suicide ideation".into(),
            score: 0.89,
        };
        assert_eq!(crisis_signal_for(SourceName::Primary, &p), 0.89);
    }

    #[test]
    fn primary_safe_label_inverts_confidence() {
        let p = RawPrediction {
            label: "casual conversation".into(),
            score: 0.9,
        };
        assert!((crisis_signal_for(SourceName::Primary, &p) - 0.1).abs() < 1e-9);
    }

    #[test]
    fn sentiment_negative_uses_confidence() {
        let p = RawPrediction {
            label: "negative".into(),
            score: 0.75,
        };
        assert_eq!(crisis_signal_for(SourceName::Sentiment, &p), 0.75);
    }

    #[test]
    fn irony_non_irony_uses_confidence_directly() {
        let p = RawPrediction {
            label: "non_irony".into(),
            score: 0.95,
        };
        assert_eq!(crisis_signal_for(SourceName::Irony, &p), 0.95);
    }

    #[test]
    fn emotion_positive_family_inverts_confidence() {
        let p = RawPrediction {
            label: "joy".into(),
            score: 0.6,
        };
        assert!((crisis_signal_for(SourceName::Emotion, &p) - 0.4).abs() < 1e-9);
    }

    #[test]
    fn emotion_neutral_dampens_confidence() {
        let p = RawPrediction {
            label: "neutral".into(),
            score: 0.8,
        };
        assert!((crisis_signal_for(SourceName::Emotion, &p) - 0.24).abs() < 1e-9);
    }
}
