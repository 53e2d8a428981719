//! Admin DTOs for the v1 API.

use serde::Serialize;

use crate::cache::CacheStats;

/// Fingerprint cache counters for `GET /v1/admin/cache`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
    pub ttl_secs: u64,
}

impl CacheStatsResponse {
    pub fn new(stats: CacheStats, ttl_secs: u64) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            entries: stats.entries,
            ttl_secs,
        }
    }
}

/// Response for `DELETE /v1/admin/cache`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CacheClearedResponse {
    /// Entries held by the cache right before it was cleared.
    pub entries_cleared: usize,
}
