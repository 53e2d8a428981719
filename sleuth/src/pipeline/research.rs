use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::analysis::AnalysisEngine;
use crate::cache::CacheStats;
use crate::error::{Result, SleuthError};
use crate::history::HistoryStore;
use crate::llm::prompts::depth_profile;
use crate::models::{new_research_id, ResearchRecord, ResearchSummary};
use crate::search::{build_context, EvidenceSearch};

pub const MIN_TOPIC_CHARS: usize = 3;
pub const MAX_TOPIC_CHARS: usize = 500;
pub const MAX_HISTORY_LIMIT: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Validation,
    Search,
    Analysis,
    Persistence,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::Search => write!(f, "search"),
            Self::Analysis => write!(f, "analysis"),
            Self::Persistence => write!(f, "persistence"),
        }
    }
}

/// A fatal pipeline error tagged with the stage it came from.
///
/// `record` carries the failed record so callers can inspect partial results.
/// After a persistence failure it still holds the computed analysis. It is
/// `None` only for validation errors.
#[derive(Debug, Error)]
#[error("research failed during {stage}: {error}")]
pub struct ResearchFailure {
    pub stage: PipelineStage,
    pub record: Option<Box<ResearchRecord>>,
    #[source]
    pub error: SleuthError,
}

/// Orchestrates search, analysis and persistence for research runs.
pub struct ResearchPipeline {
    search: Arc<EvidenceSearch>,
    analysis: Arc<AnalysisEngine>,
    history: Arc<dyn HistoryStore>,
}

impl ResearchPipeline {
    pub fn new(
        search: Arc<EvidenceSearch>,
        analysis: Arc<AnalysisEngine>,
        history: Arc<dyn HistoryStore>,
    ) -> Self {
        Self {
            search,
            analysis,
            history,
        }
    }

    pub fn history(&self) -> &Arc<dyn HistoryStore> {
        &self.history
    }

    pub fn model_id(&self) -> &str {
        self.analysis.model_id()
    }

    /// Run one research request to completion or failure.
    ///
    /// Stages run strictly in order. Search failure skips analysis; any failure
    /// persists the record as `failed` on a best-effort basis. There is no
    /// whole-run retry.
    pub async fn start_research(
        &self,
        topic: &str,
        depth: u32,
        max_results: u32,
        cancel: &CancellationToken,
    ) -> std::result::Result<ResearchRecord, ResearchFailure> {
        let topic = validate_topic(topic).map_err(|error| ResearchFailure {
            stage: PipelineStage::Validation,
            record: None,
            error,
        })?;

        let started = Instant::now();
        let mut record = ResearchRecord::new(new_research_id(), topic, depth_profile(depth).level);
        tracing::info!(id = %record.id, topic = %record.topic, depth, "Research started");

        let results = match self.search.search(&record.topic, max_results, cancel).await {
            Ok(results) => results,
            Err(error) => {
                return Err(self
                    .fail(record, PipelineStage::Search, error, started)
                    .await)
            }
        };
        record.sources = results.iter().map(|result| result.url.clone()).collect();
        tracing::debug!(id = %record.id, sources = record.sources.len(), "Search stage complete");

        let context = build_context(&results);
        let analysis = match self
            .analysis
            .analyze(&record.topic, &context, depth, results.len(), cancel)
            .await
        {
            Ok(analysis) => analysis,
            Err(error) => {
                return Err(self
                    .fail(record, PipelineStage::Analysis, error, started)
                    .await)
            }
        };

        record.complete(analysis);
        record.duration_ms = Some(elapsed_ms(started));

        if let Err(error) = self.history.save(&record).await {
            tracing::error!(id = %record.id, error = %error, "Failed to persist completed research");
            let error = SleuthError::PersistenceFailure {
                source: Box::new(error),
            };
            // Unacknowledged writes never leave the record completed; the
            // computed analysis stays attached for inspection.
            let analysis = record.analysis.take();
            record.fail(error.to_string());
            record.analysis = analysis;
            return Err(ResearchFailure {
                stage: PipelineStage::Persistence,
                record: Some(Box::new(record)),
                error,
            });
        }

        tracing::info!(
            id = %record.id,
            sources = record.sources.len(),
            duration_ms = record.duration_ms,
            "Research completed"
        );
        Ok(record)
    }

    async fn fail(
        &self,
        mut record: ResearchRecord,
        stage: PipelineStage,
        error: SleuthError,
        started: Instant,
    ) -> ResearchFailure {
        record.fail(error.to_string());
        record.duration_ms = Some(elapsed_ms(started));
        tracing::warn!(id = %record.id, %stage, error = %error, "Research failed");

        if let Err(save_error) = self.history.save(&record).await {
            tracing::error!(
                id = %record.id,
                error = %save_error,
                "Failed to persist failed research record"
            );
        }

        ResearchFailure {
            stage,
            record: Some(Box::new(record)),
            error,
        }
    }

    pub async fn get_research(&self, id: &str) -> Result<ResearchRecord> {
        self.history
            .get(id)
            .await?
            .ok_or_else(|| SleuthError::NotFound(format!("Research {id} not found")))
    }

    pub async fn list_history(&self, limit: u32) -> Result<Vec<ResearchSummary>> {
        self.history.list(limit.clamp(1, MAX_HISTORY_LIMIT)).await
    }

    pub async fn find_similar(&self, query: &str, limit: u32) -> Result<Vec<ResearchRecord>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SleuthError::Validation("Query cannot be empty".to_string()));
        }
        self.history
            .similarity_search(query, limit.clamp(1, MAX_HISTORY_LIMIT))
            .await
    }

    pub fn clear_cache(&self) {
        self.search.cache().clear();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.search.cache().stats()
    }
}

pub fn validate_topic(topic: &str) -> Result<String> {
    let topic = topic.trim();
    let length = topic.chars().count();
    if !(MIN_TOPIC_CHARS..=MAX_TOPIC_CHARS).contains(&length) {
        return Err(SleuthError::Validation(format!(
            "Topic must be between {MIN_TOPIC_CHARS} and {MAX_TOPIC_CHARS} characters"
        )));
    }
    Ok(topic.to_string())
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_topic_bounds() {
        assert!(validate_topic("ab").is_err());
        assert!(validate_topic("   ab   ").is_err());
        assert_eq!(validate_topic("  rust  ").unwrap(), "rust");
        assert!(validate_topic(&"x".repeat(500)).is_ok());
        assert!(validate_topic(&"x".repeat(501)).is_err());
    }

    #[test]
    fn test_failure_display_names_stage() {
        let failure = ResearchFailure {
            stage: PipelineStage::Search,
            record: None,
            error: SleuthError::Search("down".to_string()),
        };
        assert_eq!(
            failure.to_string(),
            "research failed during search: Search provider error: down"
        );
    }
}
