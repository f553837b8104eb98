//! The `CrisisAssessment` response shape and its sub-structures. Field
//! names are bit-exact with the engine's external interface contract.

use chrono::{DateTime, Utc};
use crisis_common::{
    AgreementLevel, Algorithm, ConflictRecord, ConflictSeverity, RecommendedAction,
    ResolutionPolicy, Severity, SourceName, Verbosity,
};
use crisis_context::ContextAnalysis;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalView {
    pub label: String,
    pub score: f64,
    pub crisis_signal: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsensusView {
    pub algorithm: Algorithm,
    pub crisis_score: f64,
    pub confidence: f64,
    pub agreement_level: AgreementLevel,
    pub individual_scores: HashMap<SourceName, f64>,
    pub vote_breakdown: Option<(usize, usize)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictAnalysisView {
    pub has_conflicts: bool,
    pub conflict_count: usize,
    pub conflicts: Vec<ConflictRecord>,
    pub highest_severity: Option<ConflictSeverity>,
    pub requires_review: bool,
    pub summary: String,
    pub resolution_strategy: ResolutionPolicy,
    pub original_score: f64,
    pub resolved_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendedActionDetail {
    pub priority: String,
    pub action: RecommendedAction,
    pub escalation: bool,
    pub rationale: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplanationView {
    pub verbosity: Verbosity,
    pub decision_summary: String,
    pub key_factors: Vec<String>,
    pub recommended_action: RecommendedActionDetail,
    pub plain_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence_summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_contributions: Option<HashMap<SourceName, f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict_summary: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrisisAssessment {
    pub crisis_detected: bool,
    pub severity: Severity,
    pub confidence: f64,
    pub crisis_score: f64,
    pub requires_intervention: bool,
    pub recommended_action: RecommendedAction,
    pub signals: HashMap<SourceName, SignalView>,
    pub consensus: ConsensusView,
    pub conflict_analysis: ConflictAnalysisView,
    pub explanation: ExplanationView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_analysis: Option<ContextAnalysis>,
    pub processing_time_ms: f64,
    pub models_used: Vec<SourceName>,
    pub is_degraded: bool,
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    pub assessments: Vec<CrisisAssessment>,
    pub total_processing_time_ms: f64,
}
