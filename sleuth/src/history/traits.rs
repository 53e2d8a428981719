use async_trait::async_trait;

use crate::error::Result;
use crate::models::{ResearchRecord, ResearchSummary};

/// Durable store for research records.
///
/// The record id is the join key shared with the pipeline and the report
/// renderer. `save` is an upsert: re-saving a record replaces the stored copy.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn save(&self, record: &ResearchRecord) -> Result<()>;

    async fn get(&self, id: &str) -> Result<Option<ResearchRecord>>;

    /// Most recent first.
    async fn list(&self, limit: u32) -> Result<Vec<ResearchSummary>>;

    /// Completed records ranked by relevance to `query`, best first.
    async fn similarity_search(&self, query: &str, limit: u32) -> Result<Vec<ResearchRecord>>;

    async fn health(&self) -> Result<()>;
}
