use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tokio::time::Instant;

use crate::models::SearchResult;

struct CacheEntry {
    payload: Arc<Vec<SearchResult>>,
    stored_at: Instant,
}

impl CacheEntry {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.stored_at.elapsed() < ttl
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// TTL cache of search results keyed by a fingerprint of the query and its parameters.
///
/// Backed by a sharded `DashMap`, so writers on distinct keys never contend on a
/// global lock and a reader sees either the whole old payload or the whole new one.
/// Expired entries are treated as absent and evicted on access or by
/// [`FingerprintCache::purge_expired`].
pub struct FingerprintCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl FingerprintCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Stable SHA-256 fingerprint over the normalized query and `max_results`.
    pub fn key(query: &str, max_results: u32) -> String {
        let mut hasher = Sha256::new();
        hasher.update(normalize_query(query).as_bytes());
        // Unit separator keeps "ab"+"1" and "a"+"b1" apart
        hasher.update([0x1f]);
        hasher.update(max_results.to_string().as_bytes());
        format!("{:x}", hasher.finalize())
    }

    pub fn get(&self, query: &str, max_results: u32) -> Option<Vec<SearchResult>> {
        self.get_by_key(&Self::key(query, max_results))
    }

    pub fn get_by_key(&self, key: &str) -> Option<Vec<SearchResult>> {
        // Read under the shard guard, release it before any removal.
        let lookup = self
            .entries
            .get(key)
            .map(|entry| (entry.is_fresh(self.ttl), Arc::clone(&entry.payload)));

        match lookup {
            Some((true, payload)) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(payload.as_ref().clone())
            }
            Some((false, _)) => {
                let ttl = self.ttl;
                self.entries.remove_if(key, |_, entry| !entry.is_fresh(ttl));
                self.misses.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(key = %key, "Search cache entry expired");
                None
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Stores a payload, replacing any previous entry and refreshing its timestamp.
    pub fn put(&self, query: &str, max_results: u32, payload: Vec<SearchResult>) {
        self.put_by_key(Self::key(query, max_results), payload);
    }

    pub fn put_by_key(&self, key: String, payload: Vec<SearchResult>) {
        self.entries.insert(
            key,
            CacheEntry {
                payload: Arc::new(payload),
                stored_at: Instant::now(),
            },
        );
    }

    pub fn clear(&self) {
        let removed = self.entries.len();
        self.entries.clear();
        tracing::info!(removed, "Search cache cleared");
    }

    /// Number of stored entries, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn purge_expired(&self) -> usize {
        let ttl = self.ttl;
        let mut removed = 0;
        self.entries.retain(|_, entry| {
            let keep = entry.is_fresh(ttl);
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.len(),
        }
    }
}

/// Trim, lowercase and collapse whitespace runs to a single space.
pub fn normalize_query(query: &str) -> String {
    query
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(url: &str) -> SearchResult {
        SearchResult {
            url: url.to_string(),
            title: format!("Title for {url}"),
            snippet: "snippet".to_string(),
            score: Some(0.5),
        }
    }

    #[test]
    fn test_key_stability() {
        let key1 = FingerprintCache::key("quantum computing", 10);
        let key2 = FingerprintCache::key("quantum computing", 10);
        assert_eq!(key1, key2, "Same query should generate identical keys");
        assert_eq!(key1.len(), 64);
    }

    #[test]
    fn test_key_normalizes_query() {
        assert_eq!(
            FingerprintCache::key("  Quantum\tComputing ", 5),
            FingerprintCache::key("quantum computing", 5)
        );
    }

    #[test]
    fn test_key_includes_max_results() {
        assert_ne!(
            FingerprintCache::key("quantum computing", 5),
            FingerprintCache::key("quantum computing", 10)
        );
        assert_ne!(
            FingerprintCache::key("query A", 5),
            FingerprintCache::key("query B", 5)
        );
    }

    #[test]
    fn test_normalize_query() {
        assert_eq!(normalize_query("  Rust \n  Async   IO "), "rust async io");
        assert_eq!(normalize_query(""), "");
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_within_ttl_is_deterministic() {
        let cache = FingerprintCache::new(Duration::from_secs(3600));
        cache.put("rust", 3, vec![result("https://a"), result("https://b")]);

        let first = cache.get("rust", 3).expect("hit");
        tokio::time::advance(Duration::from_secs(1800)).await;
        let second = cache.get("rust", 3).expect("hit");

        assert_eq!(first, second);
        assert_eq!(first[0].url, "https://a");
        assert_eq!(first[1].url, "https://b");
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_after_ttl_is_miss_and_evicts() {
        let cache = FingerprintCache::new(Duration::from_secs(60));
        cache.put("rust", 3, vec![result("https://a")]);
        assert_eq!(cache.len(), 1);

        tokio::time::advance(Duration::from_secs(60)).await;

        assert!(cache.get("rust", 3).is_none());
        assert_eq!(cache.len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_put_refreshes_timestamp() {
        let cache = FingerprintCache::new(Duration::from_secs(60));
        cache.put("rust", 3, vec![result("https://old")]);

        tokio::time::advance(Duration::from_secs(45)).await;
        cache.put("rust", 3, vec![result("https://new")]);
        tokio::time::advance(Duration::from_secs(45)).await;

        let hit = cache.get("rust", 3).expect("refreshed entry still fresh");
        assert_eq!(hit[0].url, "https://new");
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_expired_only_removes_stale_entries() {
        let cache = FingerprintCache::new(Duration::from_secs(60));
        cache.put("old", 1, vec![result("https://old")]);
        tokio::time::advance(Duration::from_secs(30)).await;
        cache.put("new", 1, vec![result("https://new")]);
        tokio::time::advance(Duration::from_secs(31)).await;

        assert_eq!(cache.purge_expired(), 1);
        assert!(cache.get("new", 1).is_some());
    }

    #[test]
    fn test_clear_and_stats() {
        let cache = FingerprintCache::new(Duration::from_secs(60));
        cache.put("a", 1, vec![result("https://a")]);
        cache.put("b", 1, vec![result("https://b")]);

        assert!(cache.get("a", 1).is_some());
        assert!(cache.get("missing", 1).is_none());

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 2);

        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.get("a", 1).is_none());
    }

    #[test]
    fn test_zero_ttl_never_hits() {
        let cache = FingerprintCache::new(Duration::ZERO);
        cache.put("a", 1, vec![result("https://a")]);
        assert!(cache.get("a", 1).is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_access() {
        let cache = Arc::new(FingerprintCache::new(Duration::from_secs(3600)));
        let mut handles = vec![];

        for i in 0..32 {
            let cache = Arc::clone(&cache);
            handles.push(tokio::spawn(async move {
                let query = format!("query_{}", i % 8);
                let payload = vec![result(&format!("https://{}", i % 8))];
                cache.put(&query, 5, payload.clone());

                let hit = cache.get(&query, 5).expect("just written");
                assert_eq!(hit, payload);
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(cache.len(), 8);
    }
}
