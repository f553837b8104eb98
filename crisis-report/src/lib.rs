//! `Aggregator` + `Explainer`: response assembly and human-readable
//! explanation at the requested verbosity.

pub mod aggregator;
pub mod assessment;
pub mod explainer;

pub use aggregator::assemble;
pub use assessment::{
    BatchResult, ConflictAnalysisView, ConsensusView, CrisisAssessment, ExplanationView,
    RecommendedActionDetail, SignalView,
};
pub use explainer::explain;
