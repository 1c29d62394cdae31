use engine::EngineGenerator;
use jobs::InMemJobs;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub jobs: Arc<InMemJobs<EngineGenerator>>,
}

impl AppState {
    pub fn new_default() -> Self {
        let jobs = InMemJobs::new(EngineGenerator::new());
        Self { jobs: Arc::new(jobs) }
    }
}
