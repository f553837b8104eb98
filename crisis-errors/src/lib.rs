//! Unified error types for the crisis decision engine.
//!
//! Mirrors the propagation policy: per-source failures are absorbed well
//! before they reach [`CrisisError`], which only ever surfaces the handful
//! of kinds a caller actually needs to branch on.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single signal source that failed or did not answer in time.
///
/// Kept as a typed value (rather than a bare string) so dispatch bookkeeping
/// can match on `kind` without parsing messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFailure {
    pub source: String,
    pub kind: SourceFailureKind,
    pub detail: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceFailureKind {
    Timeout,
    Error,
}

/// Request-shape errors, rejected before any signal source is invoked.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidInputError {
    #[error("message must not be empty after trimming")]
    EmptyMessage,

    #[error("message length {0} exceeds the 10000 character limit")]
    MessageTooLong(usize),

    #[error("malformed history timestamp: {0}")]
    MalformedTimestamp(String),

    #[error("history crisis_score {0} is outside [0,1]")]
    HistoryScoreOutOfRange(String),
}

/// Configuration validation failures (reload path only).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("sum of source weights must be > 0, got {0}")]
    NonPositiveWeightSum(f64),

    #[error("severity thresholds must be non-increasing (critical >= high >= medium >= low > 0), got {critical}, {high}, {medium}, {low}")]
    ThresholdsNotMonotonic {
        critical: f64,
        high: f64,
        medium: f64,
        low: f64,
    },

    #[error("low threshold must be > 0, got {0}")]
    LowThresholdNotPositive(f64),

    #[error("unknown source name in weights: {0}")]
    UnknownSource(String),

    #[error("invalid configuration value: {0} = {1}")]
    InvalidValue(String, String),

    #[error("failed to parse configuration: {0}")]
    ParseError(String),
}

/// Top-level error type for the engine's external boundary.
///
/// `NoUsableSignals` is modeled here as a distinguishable outcome of
/// `CrisisEngine::analyze`, but per spec it still renders as a successful,
/// degraded `CrisisAssessment` at the HTTP layer rather than an error
/// response — `crisis-web` catches it before it would become a 5xx.
#[derive(Debug, Error)]
pub enum CrisisError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    #[error("no usable signals: all sources failed or timed out ({0:?})")]
    NoUsableSignals(Vec<SourceFailure>),

    #[error("configuration invalid: {0}")]
    ConfigInvalid(#[from] ConfigError),

    #[error("alert dispatch failed: {0}")]
    AlertDispatchFailed(String),

    #[error("{0}")]
    Other(String),
}

impl From<String> for CrisisError {
    fn from(s: String) -> Self {
        CrisisError::Other(s)
    }
}

impl From<&str> for CrisisError {
    fn from(s: &str) -> Self {
        CrisisError::Other(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_display() {
        let e = InvalidInputError::MessageTooLong(12_000);
        assert!(e.to_string().contains("12000"));
    }

    #[test]
    fn no_usable_signals_carries_failures() {
        let failures = vec![SourceFailure {
            source: "primary".to_string(),
            kind: SourceFailureKind::Timeout,
            detail: "deadline elapsed".to_string(),
        }];
        let err = CrisisError::NoUsableSignals(failures.clone());
        match err {
            CrisisError::NoUsableSignals(f) => assert_eq!(f, failures),
            _ => panic!("wrong variant"),
        }
    }
}
