//! Signal source capability: the `SignalSource` trait, the four concrete
//! wrappers, the source-specific `crisis_signal` transform table, and the
//! name-keyed registry that lets the dispatcher invoke all enabled sources
//! without runtime duck-typing.
//!
//! The underlying classifiers (zero-shot NLI, sentiment, irony, emotion)
//! are out-of-scope black boxes per the engine's contract — they are
//! declared here only through `analyze(text) -> Result<(label, score)>`.
//! The implementations below are deterministic keyword heuristics in the
//! same spirit as `emotion_detection`'s stub classifier, so the service is
//! runnable end to end without a model runtime.

pub mod registry;
pub mod sources;
pub mod transform;

use async_trait::async_trait;
use crisis_common::SourceName;
use serde::{Deserialize, Serialize};

/// A classifier's raw, untransformed output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPrediction {
    pub label: String,
    pub score: f64,
}

/// Capability every signal source implements. `analyze` returns a
/// diagnostic string on internal failure; timeout is enforced by the
/// caller (`crisis-dispatch`), not by the source itself.
#[async_trait]
pub trait SignalSource: Send + Sync {
    fn name(&self) -> SourceName;
    fn typical_latency_ms(&self) -> u64;
    fn max_latency_ms(&self) -> u64;
    async fn analyze(&self, text: &str) -> Result<RawPrediction, String>;

    /// Apply this source's fixed `crisis_signal` transform to a raw
    /// prediction. Always returns a value clamped to `[0, 1]`.
    fn crisis_signal(&self, prediction: &RawPrediction) -> f64 {
        transform::crisis_signal_for(self.name(), prediction)
    }
}

pub use registry::SourceRegistry;
pub use sources::{EmotionSource, IronySource, PrimarySource, SentimentSource};
