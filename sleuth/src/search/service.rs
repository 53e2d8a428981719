use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::{Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;

use crate::cache::FingerprintCache;
use crate::error::{Result, SleuthError};
use crate::models::SearchResult;
use crate::retry::{RetryError, RetryExecutor};
use crate::search::SearchProvider;

pub const DEFAULT_MAX_RESULTS: u32 = 10;
pub const MAX_RESULTS_LIMIT: u32 = 20;

pub fn clamp_max_results(max_results: u32) -> u32 {
    max_results.clamp(1, MAX_RESULTS_LIMIT)
}

/// Per-key single-flight gate. Dropping it removes the map entry once no other
/// task holds the same gate, including when the owning future is cancelled.
struct InFlightGate<'a> {
    in_flight: &'a DashMap<String, Arc<Mutex<()>>>,
    key: &'a str,
    gate: Arc<Mutex<()>>,
}

impl<'a> InFlightGate<'a> {
    fn enter(in_flight: &'a DashMap<String, Arc<Mutex<()>>>, key: &'a str) -> Self {
        let gate = Arc::clone(in_flight.entry(key.to_string()).or_default().value());
        Self {
            in_flight,
            key,
            gate,
        }
    }

    async fn lock(&self) -> MutexGuard<'_, ()> {
        self.gate.lock().await
    }
}

impl Drop for InFlightGate<'_> {
    fn drop(&mut self) {
        // The map and this guard are the only owners of an idle gate.
        self.in_flight.remove_if(self.key, |_, gate| {
            Arc::ptr_eq(gate, &self.gate) && Arc::strong_count(gate) == 2
        });
    }
}

/// Cached, retried web search.
///
/// Concurrent misses on the same fingerprint are serialized through a per-key
/// gate, so a burst of identical requests results in one provider call.
pub struct EvidenceSearch {
    provider: Arc<dyn SearchProvider>,
    cache: Arc<FingerprintCache>,
    executor: RetryExecutor,
    timeout: Duration,
    in_flight: DashMap<String, Arc<Mutex<()>>>,
}

impl EvidenceSearch {
    pub fn new(
        provider: Arc<dyn SearchProvider>,
        cache: Arc<FingerprintCache>,
        executor: RetryExecutor,
        timeout: Duration,
    ) -> Self {
        Self {
            provider,
            cache,
            executor,
            timeout,
            in_flight: DashMap::new(),
        }
    }

    pub fn cache(&self) -> &Arc<FingerprintCache> {
        &self.cache
    }

    pub async fn search(
        &self,
        query: &str,
        max_results: u32,
        cancel: &CancellationToken,
    ) -> Result<Vec<SearchResult>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SleuthError::Validation(
                "Search query cannot be empty".to_string(),
            ));
        }

        let max_results = clamp_max_results(max_results);
        let key = FingerprintCache::key(query, max_results);

        if let Some(results) = self.cache.get_by_key(&key) {
            tracing::debug!(query, max_results, hits = results.len(), "Search cache hit");
            return Ok(results);
        }

        let gate = InFlightGate::enter(&self.in_flight, &key);
        let _permit = gate.lock().await;
        // Another task may have filled the entry while this one waited.
        match self.cache.get_by_key(&key) {
            Some(results) => Ok(results),
            None => self.fetch(query, max_results, &key, cancel).await,
        }
    }

    async fn fetch(
        &self,
        query: &str,
        max_results: u32,
        key: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<SearchResult>> {
        let timeout = self.timeout;
        let provider = self.provider.as_ref();

        let hits = self
            .executor
            .execute("web_search", cancel, || async move {
                match tokio::time::timeout(timeout, provider.raw_search(query, max_results)).await
                {
                    Ok(result) => result,
                    Err(_) => Err(SleuthError::Search(format!(
                        "{} search timed out after {}ms",
                        provider.name(),
                        timeout.as_millis()
                    ))),
                }
            })
            .await
            .map_err(|error| match error {
                RetryError::Exhausted { attempts, last } => SleuthError::SearchUnavailable {
                    attempts,
                    source: Box::new(last),
                },
                RetryError::Cancelled { .. } => SleuthError::Cancelled("search".to_string()),
            })?;

        let results: Vec<SearchResult> = hits
            .into_iter()
            .filter_map(|hit| hit.normalize())
            .take(max_results as usize)
            .collect();

        tracing::info!(
            query,
            max_results,
            results = results.len(),
            provider = provider.name(),
            "Web search completed"
        );

        self.cache.put_by_key(key.to_string(), results.clone());
        Ok(results)
    }
}
