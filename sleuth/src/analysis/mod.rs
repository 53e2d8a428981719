mod engine;
mod response;

pub use engine::{truncate_context, AnalysisEngine, TRUNCATION_MARKER};
pub use response::{derive_confidence, parse_analysis_response, ParsedAnalysis};
