//! Fetch memoization
//!
//! Per-argument caches for suggestion and result fetches. Repeating a fetch
//! for the same (query, locale[, page]) within the TTL is served locally,
//! so flipping back and forth while typing does not re-hit the provider.

use crate::results::ResultPage;
use moka::future::Cache;
use std::time::Duration;

/// Cache for autocomplete suggestion lists
pub struct SuggestionCache {
    cache: Cache<String, Vec<String>>,
}

impl SuggestionCache {
    pub fn new(ttl_seconds: u64, max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .time_to_live(Duration::from_secs(ttl_seconds))
            .max_capacity(max_capacity)
            .build();

        Self { cache }
    }

    pub async fn get(&self, key: &str) -> Option<Vec<String>> {
        self.cache.get(key).await
    }

    pub async fn set(&self, key: String, value: Vec<String>) {
        self.cache.insert(key, value).await;
    }
}

impl Default for SuggestionCache {
    fn default() -> Self {
        Self::new(300, 1000) // 5 minutes TTL
    }
}

/// Cache for fetched result pages
pub struct ResultPageCache {
    cache: Cache<String, ResultPage>,
}

impl ResultPageCache {
    pub fn new(ttl_seconds: u64, max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .time_to_live(Duration::from_secs(ttl_seconds))
            .max_capacity(max_capacity)
            .build();

        Self { cache }
    }

    pub async fn get(&self, key: &str) -> Option<ResultPage> {
        self.cache.get(key).await
    }

    pub async fn set(&self, key: String, value: ResultPage) {
        self.cache.insert(key, value).await;
    }
}

impl Default for ResultPageCache {
    fn default() -> Self {
        Self::new(300, 200)
    }
}

/// Cache key for a suggestion fetch
pub fn suggestion_key(query: &str, locale: &str) -> String {
    digest(&[query, locale, "suggest"])
}

/// Cache key for a result fetch
pub fn result_key(query: &str, page: u32, locale: &str) -> String {
    digest(&[query, &page.to_string(), locale, "results"])
}

fn digest(parts: &[&str]) -> String {
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_bytes());
        hasher.update([0u8]);
    }
    format!("{:x}", hasher.finalize())
}
