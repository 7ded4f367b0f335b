pub mod configurations;

use std::sync::Arc;

use engine::ReleaseProcessOrchestrator;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<ReleaseProcessOrchestrator>,
}

impl AppState {
    pub fn new(orchestrator: ReleaseProcessOrchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
        }
    }
}

/// Liveness probe.
pub async fn ping() -> &'static str {
    "pong"
}
