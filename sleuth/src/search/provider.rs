use async_trait::async_trait;

use crate::error::Result;
use crate::models::RawSearchHit;

/// A remote web search backend. Implementations make exactly one request per
/// call; timeouts, retries and caching are applied by [`super::EvidenceSearch`].
#[async_trait]
pub trait SearchProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn raw_search(&self, query: &str, max_results: u32) -> Result<Vec<RawSearchHit>>;
}
