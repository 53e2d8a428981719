use async_trait::async_trait;

use crate::error::Result;
use crate::history::connection::Database;
use crate::history::repository::ResearchRepository;
use crate::history::similarity::{relevance_score, tokenize};
use crate::history::HistoryStore;
use crate::models::{ResearchRecord, ResearchSummary};

pub struct LibSqlHistoryStore {
    db: Database,
}

impl LibSqlHistoryStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl HistoryStore for LibSqlHistoryStore {
    async fn save(&self, record: &ResearchRecord) -> Result<()> {
        ResearchRepository::upsert(self.db.connection(), record).await?;
        tracing::debug!(id = %record.id, status = %record.status, "Research record saved");
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<ResearchRecord>> {
        ResearchRepository::get_by_id(self.db.connection(), id).await
    }

    async fn list(&self, limit: u32) -> Result<Vec<ResearchSummary>> {
        ResearchRepository::list_recent(self.db.connection(), limit).await
    }

    async fn similarity_search(&self, query: &str, limit: u32) -> Result<Vec<ResearchRecord>> {
        let terms = tokenize(query);
        let candidates =
            ResearchRepository::completed_candidates(self.db.connection(), &terms).await?;

        let mut scored: Vec<(f64, ResearchRecord)> = candidates
            .into_iter()
            .map(|(record, text)| (relevance_score(&terms, &text), record))
            .filter(|(score, _)| *score > 0.0)
            .collect();
        scored.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.1.created_at.cmp(&a.1.created_at))
        });

        tracing::debug!(query, matches = scored.len(), "History similarity search");
        Ok(scored
            .into_iter()
            .take(limit as usize)
            .map(|(_, record)| record)
            .collect())
    }

    async fn health(&self) -> Result<()> {
        ResearchRepository::ping(self.db.connection()).await
    }
}
