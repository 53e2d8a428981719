use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::llm::LlmProvider;
use crate::pipeline::ResearchPipeline;
use crate::report::ReportService;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pipeline: Arc<ResearchPipeline>,
    pub reports: Arc<ReportService>,
    /// Kept for health reporting; the pipeline holds its own handle.
    pub llm: LlmProvider,
    /// Parent of every per-request cancellation token. Cancelled on shutdown.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(
        config: Config,
        pipeline: Arc<ResearchPipeline>,
        reports: Arc<ReportService>,
        llm: LlmProvider,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            config: Arc::new(config),
            pipeline,
            reports,
            llm,
            shutdown,
        }
    }
}
