//! Deterministic keyword-heuristic stand-ins for the four neural
//! classifiers, in the spirit of `emotion_detection`'s heuristic text
//! classifier: no model runtime, same shape the real classifiers would
//! fill in behind the `SignalSource` trait.

use crate::{RawPrediction, SignalSource};
use async_trait::async_trait;
use crisis_common::SourceName;

fn normalize(text: &str) -> String {
    text.to_ascii_lowercase()
}

fn any_contains(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| text.contains(n))
}

/// Zero-shot NLI over a fixed crisis/safe label set.
#[derive(Debug, Clone, Default)]
pub struct PrimarySource;

const CRISIS_PHRASES: &[&str] = &[
    "kill myself",
    "end it all",
    "end my life",
    "can't keep going",
    "cant keep going",
    "can't go on",
    "cant go on",
    "want to die",
    "wish i was dead",
    "no point in living",
    "hurt myself",
    "self harm",
    "self-harm",
    "hopeless",
    "give up on everything",
];

const SUPPORT_PHRASES: &[&str] = &["need help", "struggling", "talk to someone", "reach out"];
const POSITIVE_PHRASES: &[&str] = &["great time", "so happy", "feeling good", "amazing day"];

#[async_trait]
impl SignalSource for PrimarySource {
    fn name(&self) -> SourceName {
        SourceName::Primary
    }

    fn typical_latency_ms(&self) -> u64 {
        120
    }

    fn max_latency_ms(&self) -> u64 {
        450
    }

    async fn analyze(&self, text: &str) -> Result<RawPrediction, String> {
        let t = normalize(text);
        if t.trim().is_empty() {
            return Err("empty input".to_string());
        }

        let hits = CRISIS_PHRASES.iter().filter(|p| t.contains(*p)).count();
        if hits > 0 {
            let label = if any_contains(&t, &["kill myself", "end my life", "want to die"]) {
                "suicide ideation"
            } else if any_contains(&t, &["hurt myself", "self harm", "self-harm"]) {
                "self-harm"
            } else if any_contains(&t, &["hopeless", "no point in living"]) {
                "hopelessness"
            } else {
                "emotional distress"
            };
            let score = (0.6 + 0.1 * hits as f64).min(0.97);
            return Ok(RawPrediction {
                label: label.to_string(),
                score,
            });
        }

        if any_contains(&t, POSITIVE_PHRASES) {
            return Ok(RawPrediction {
                label: "positive sharing".to_string(),
                score: 0.85,
            });
        }
        if any_contains(&t, SUPPORT_PHRASES) {
            return Ok(RawPrediction {
                label: "seeking support".to_string(),
                score: 0.7,
            });
        }
        Ok(RawPrediction {
            label: "casual conversation".to_string(),
            score: 0.75,
        })
    }
}

/// Three-way sentiment polarity.
#[derive(Debug, Clone, Default)]
pub struct SentimentSource;

const NEGATIVE_WORDS: &[&str] = &[
    "sad", "hurt", "alone", "tired", "worthless", "anxious", "scared", "angry", "hate", "cry",
    "lonely", "exhausted", "afraid",
];
const POSITIVE_WORDS: &[&str] = &[
    "great", "happy", "excited", "love", "wonderful", "amazing", "good", "glad", "fun",
];

#[async_trait]
impl SignalSource for SentimentSource {
    fn name(&self) -> SourceName {
        SourceName::Sentiment
    }

    fn typical_latency_ms(&self) -> u64 {
        60
    }

    fn max_latency_ms(&self) -> u64 {
        250
    }

    async fn analyze(&self, text: &str) -> Result<RawPrediction, String> {
        let t = normalize(text);
        if t.trim().is_empty() {
            return Err("empty input".to_string());
        }

        let neg = NEGATIVE_WORDS.iter().filter(|w| t.contains(**w)).count();
        let pos = POSITIVE_WORDS.iter().filter(|w| t.contains(**w)).count();

        if neg == 0 && pos == 0 {
            return Ok(RawPrediction {
                label: "neutral".to_string(),
                score: 0.6,
            });
        }
        if neg > pos {
            let score = (0.5 + 0.12 * neg as f64).min(0.95);
            Ok(RawPrediction {
                label: "negative".to_string(),
                score,
            })
        } else if pos > neg {
            let score = (0.5 + 0.12 * pos as f64).min(0.95);
            Ok(RawPrediction {
                label: "positive".to_string(),
                score,
            })
        } else {
            Ok(RawPrediction {
                label: "neutral".to_string(),
                score: 0.55,
            })
        }
    }
}

/// Irony / non-irony binary classifier.
#[derive(Debug, Clone, Default)]
pub struct IronySource;

const IRONY_MARKERS: &[&str] = &[
    "lol", "lmao", "haha", "yeah right", "totally", "/s", "sure thing", "dying of laughter",
    "killing me", "dead from laughing",
];

#[async_trait]
impl SignalSource for IronySource {
    fn name(&self) -> SourceName {
        SourceName::Irony
    }

    fn typical_latency_ms(&self) -> u64 {
        70
    }

    fn max_latency_ms(&self) -> u64 {
        260
    }

    async fn analyze(&self, text: &str) -> Result<RawPrediction, String> {
        let t = normalize(text);
        if t.trim().is_empty() {
            return Err("empty input".to_string());
        }

        let hits = IRONY_MARKERS.iter().filter(|m| t.contains(**m)).count();
        if hits > 0 {
            let score = (0.6 + 0.1 * hits as f64).min(0.97);
            Ok(RawPrediction {
                label: "irony".to_string(),
                score,
            })
        } else {
            Ok(RawPrediction {
                label: "non_irony".to_string(),
                score: 0.8,
            })
        }
    }
}

/// 28-way emotion classifier, collapsed here to the handful of labels the
/// `crisis_signal` transform actually branches on.
#[derive(Debug, Clone, Default)]
pub struct EmotionSource;

#[async_trait]
impl SignalSource for EmotionSource {
    fn name(&self) -> SourceName {
        SourceName::Emotion
    }

    fn typical_latency_ms(&self) -> u64 {
        90
    }

    fn max_latency_ms(&self) -> u64 {
        300
    }

    async fn analyze(&self, text: &str) -> Result<RawPrediction, String> {
        let t = normalize(text);
        if t.trim().is_empty() {
            return Err("empty input".to_string());
        }

        let label = if any_contains(&t, &["grief", "grieving", "loss of", "passed away"]) {
            "grief"
        } else if any_contains(&t, &["sad", "cry", "lonely", "hurt"]) {
            "sadness"
        } else if any_contains(&t, &["afraid", "scared", "panic", "anxious"]) {
            "fear"
        } else if any_contains(&t, &["sorry", "regret", "shouldn't have"]) {
            "remorse"
        } else if any_contains(&t, &["disappointed", "let down"]) {
            "disappointment"
        } else if any_contains(&t, &["joy", "happy", "yay", "excited"]) {
            "joy"
        } else if any_contains(&t, &["haha", "lol", "funny", "hilarious"]) {
            "amusement"
        } else if any_contains(&t, &["love you", "i love", "adore"]) {
            "love"
        } else {
            "neutral"
        };

        Ok(RawPrediction {
            label: label.to_string(),
            score: 0.72,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn primary_flags_suicide_ideation() {
        let out = PrimarySource
            .analyze("I don't know if I can keep going anymore, I want to die")
            .await
            .unwrap();
        assert_eq!(out.label, "suicide ideation");
    }

    #[tokio::test]
    async fn primary_rejects_empty_message() {
        assert!(PrimarySource.analyze("   ").await.is_err());
    }

    #[tokio::test]
    async fn sentiment_detects_negative() {
        let out = SentimentSource.analyze("I feel so alone and tired").await.unwrap();
        assert_eq!(out.label, "negative");
    }

    #[tokio::test]
    async fn irony_detects_marker() {
        let out = IronySource.analyze("dying of laughter at this").await.unwrap();
        assert_eq!(out.label, "irony");
    }

    #[tokio::test]
    async fn emotion_defaults_neutral() {
        let out = EmotionSource.analyze("the meeting is at 3pm").await.unwrap();
        assert_eq!(out.label, "neutral");
    }
}
