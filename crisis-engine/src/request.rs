//! `AnalyzeRequest` and validation. Validation happens before any signal
//! source is invoked, per the propagation policy: `InvalidInput` never
//! reaches the Dispatcher.

use chrono::{DateTime, Utc};
use crisis_common::{Algorithm, HistoryEntry, ResolutionPolicy, Severity, Verbosity};
use crisis_errors::InvalidInputError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const MAX_MESSAGE_LEN: usize = 10_000;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HistoryInput {
    pub timestamp: String,
    pub crisis_score: f64,
    pub severity: Severity,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AnalyzeOptions {
    pub verbosity: Option<Verbosity>,
    pub algorithm: Option<Algorithm>,
    pub resolution_policy: Option<ResolutionPolicy>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalyzeRequest {
    pub message: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub channel_id: Option<String>,
    #[serde(default)]
    pub metadata: Option<HashMap<String, serde_json::Value>>,
    #[serde(default)]
    pub message_history: Option<Vec<HistoryInput>>,
    #[serde(default)]
    pub options: Option<AnalyzeOptions>,
    #[serde(default)]
    pub request_id: Option<String>,
}

/// A validated request: the message is non-empty and within bounds, and
/// every history entry's timestamp parsed and every score is in `[0, 1]`.
pub struct ValidatedRequest {
    pub message: String,
    pub user_id: String,
    pub message_history: Vec<HistoryEntry>,
    pub verbosity: Verbosity,
    pub algorithm: Algorithm,
    pub resolution_policy: ResolutionPolicy,
    pub request_id: Option<String>,
}

pub fn validate(request: AnalyzeRequest) -> Result<ValidatedRequest, InvalidInputError> {
    let trimmed = request.message.trim();
    if trimmed.is_empty() {
        return Err(InvalidInputError::EmptyMessage);
    }
    if request.message.chars().count() > MAX_MESSAGE_LEN {
        return Err(InvalidInputError::MessageTooLong(request.message.chars().count()));
    }

    let mut history = Vec::new();
    for entry in request.message_history.into_iter().flatten() {
        let timestamp: DateTime<Utc> = entry
            .timestamp
            .parse()
            .map_err(|_| InvalidInputError::MalformedTimestamp(entry.timestamp.clone()))?;
        if !(0.0..=1.0).contains(&entry.crisis_score) {
            return Err(InvalidInputError::HistoryScoreOutOfRange(entry.crisis_score.to_string()));
        }
        history.push(HistoryEntry {
            timestamp,
            crisis_score: entry.crisis_score,
            severity: entry.severity,
        });
    }
    history.sort_by_key(|h| h.timestamp);

    let options = request.options.unwrap_or_default();

    Ok(ValidatedRequest {
        message: trimmed.to_string(),
        user_id: request.user_id.unwrap_or_else(|| "anonymous".to_string()),
        message_history: history,
        verbosity: options.verbosity.unwrap_or_default(),
        algorithm: options.algorithm.unwrap_or_default(),
        resolution_policy: options.resolution_policy.unwrap_or_default(),
        request_id: request.request_id,
    })
}
