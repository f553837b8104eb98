use crisis_engine::CrisisEngine;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<CrisisEngine>,
}
