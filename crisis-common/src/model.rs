//! Core value types shared across the pipeline: signals, consensus,
//! conflicts, and the trajectory used by context analysis.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The closed set of signal sources the engine knows about. Adding a source
/// is a matter of adding a variant here, a wrapper in `crisis-signals`, and a
/// weight in `EngineConfig` — no consensus-algorithm change is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceName {
    Primary,
    Sentiment,
    Irony,
    Emotion,
}

impl SourceName {
    pub const ALL: [SourceName; 4] = [
        SourceName::Primary,
        SourceName::Sentiment,
        SourceName::Irony,
        SourceName::Emotion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceName::Primary => "primary",
            SourceName::Sentiment => "sentiment",
            SourceName::Irony => "irony",
            SourceName::Emotion => "emotion",
        }
    }
}

impl std::fmt::Display for SourceName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-source completion status. Invariant: only `Ok` signals enter
/// consensus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalStatus {
    Ok,
    Timeout,
    Error,
}

/// One classifier's normalized contribution to a single request's
/// assessment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrisisSignal {
    pub source_name: SourceName,
    pub raw_label: String,
    pub raw_score: f64,
    pub crisis_signal: f64,
    pub latency_ms: f64,
    pub status: SignalStatus,
}

impl CrisisSignal {
    pub fn is_ok(&self) -> bool {
        self.status == SignalStatus::Ok
    }
}

/// The tuple of signals produced for one request. Invariant: each source
/// name appears at most once.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignalSet {
    pub signals: Vec<CrisisSignal>,
}

impl SignalSet {
    pub fn new(signals: Vec<CrisisSignal>) -> Self {
        Self { signals }
    }

    pub fn ok_signals(&self) -> impl Iterator<Item = &CrisisSignal> {
        self.signals.iter().filter(|s| s.is_ok())
    }

    pub fn ok_count(&self) -> usize {
        self.ok_signals().count()
    }

    pub fn has_any_ok(&self) -> bool {
        self.ok_signals().next().is_some()
    }

    pub fn find(&self, source: SourceName) -> Option<&CrisisSignal> {
        self.signals.iter().find(|s| s.source_name == source)
    }

    pub fn find_ok(&self, source: SourceName) -> Option<&CrisisSignal> {
        self.signals
            .iter()
            .find(|s| s.source_name == source && s.is_ok())
    }

    pub fn failed_sources(&self) -> Vec<&CrisisSignal> {
        self.signals.iter().filter(|s| !s.is_ok()).collect()
    }
}

/// Kind of disagreement a `ConflictDetector` sub-detector fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    ScoreDisagreement,
    IronySentiment,
    EmotionMismatch,
    LabelDisagreement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictSeverity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictRecord {
    pub kind: ConflictKind,
    pub severity: ConflictSeverity,
    pub participants: Vec<SourceName>,
    pub description: String,
}

/// Qualitative label for variance across signals. Purely descriptive, never
/// fed back into scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgreementLevel {
    Strong,
    Moderate,
    Weak,
    Disagreement,
}

/// Which consensus algorithm produced a `ConsensusResult`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    Weighted,
    Majority,
    Unanimous,
    ConflictAware,
}

impl Default for Algorithm {
    fn default() -> Self {
        Algorithm::Weighted
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsensusResult {
    pub algorithm: Algorithm,
    pub raw_score: f64,
    pub confidence: f64,
    pub agreement_level: AgreementLevel,
    pub per_source_scores: HashMap<SourceName, f64>,
    pub total_weight: f64,
    /// Present only for `Majority`: count of sources whose vote agreed with
    /// the winning side, out of the number of ok sources.
    pub vote_breakdown: Option<(usize, usize)>,
}

/// Policy a `ConflictResolver` applies to turn a raw consensus score into a
/// final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionPolicy {
    Conservative,
    Optimistic,
    Mean,
    ReviewFlag,
}

impl Default for ResolutionPolicy {
    fn default() -> Self {
        ResolutionPolicy::Conservative
    }
}

/// Graded severity assigned to the final score by the configured
/// thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Safe,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn crisis_detected(&self) -> bool {
        matches!(self, Severity::Medium | Severity::High | Severity::Critical)
    }

    pub fn requires_intervention(&self) -> bool {
        matches!(self, Severity::High | Severity::Critical)
    }

    pub fn recommended_action(&self) -> RecommendedAction {
        match self {
            Severity::Critical => RecommendedAction::ImmediateOutreach,
            Severity::High => RecommendedAction::PriorityResponse,
            Severity::Medium => RecommendedAction::StandardMonitoring,
            Severity::Low => RecommendedAction::PassiveMonitoring,
            Severity::Safe => RecommendedAction::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendedAction {
    ImmediateOutreach,
    PriorityResponse,
    StandardMonitoring,
    PassiveMonitoring,
    None,
}

/// Explanation verbosity, selectable per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verbosity {
    Minimal,
    Standard,
    Detailed,
}

impl Default for Verbosity {
    fn default() -> Self {
        Verbosity::Standard
    }
}

/// One prior message's caller-supplied summary (the engine never re-scores
/// historical text).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub crisis_score: f64,
    pub severity: Severity,
}

/// Direction of a fitted crisis-score trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Escalating,
    Stable,
    Improving,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationVelocity {
    Rapid,
    Gradual,
    Stable,
    Improving,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrajectoryPattern {
    Linear,
    Exponential,
    Spike,
    Plateau,
    Oscillating,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterventionUrgency {
    Immediate,
    High,
    Moderate,
    Low,
    None,
}

/// Derived trajectory over `history + current assessment`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextTrajectory {
    pub points: Vec<(DateTime<Utc>, f64)>,
    pub direction: TrendDirection,
    pub velocity: EscalationVelocity,
    pub pattern: TrajectoryPattern,
    pub peak_score: f64,
    pub start_score: f64,
    pub end_score: f64,
}
