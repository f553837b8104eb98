//! Wires signal sources, dispatch, consensus, conflict handling, context
//! analysis, aggregation/explanation, and alerting into the engine's
//! external interface: `analyze`, `analyze_batch`, `reload_config`.

pub mod engine;
pub mod request;

pub use engine::CrisisEngine;
pub use request::{AnalyzeOptions, AnalyzeRequest, HistoryInput};
