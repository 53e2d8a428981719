mod fingerprint;

pub use fingerprint::{normalize_query, CacheStats, FingerprintCache};
