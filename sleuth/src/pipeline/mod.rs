mod research;

pub use research::{
    validate_topic, PipelineStage, ResearchFailure, ResearchPipeline, MAX_HISTORY_LIMIT,
    MAX_TOPIC_CHARS, MIN_TOPIC_CHARS,
};
