mod context;
mod provider;
mod service;
mod tavily;

pub use context::build_context;
pub use provider::SearchProvider;
pub use service::{clamp_max_results, EvidenceSearch, DEFAULT_MAX_RESULTS, MAX_RESULTS_LIMIT};
pub use tavily::TavilyProvider;
