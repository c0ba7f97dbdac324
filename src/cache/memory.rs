// SPDX-License-Identifier: MPL-2.0

//! In-memory LRU+TTL cache tier, backed by [moka].

use std::time::Duration;

/// Memory tier: an LRU cache bounded by total byte size, with an optional
/// per-entry time-to-live.
#[derive(Clone)]
pub struct MemoryTier {
    cache: moka::future::Cache<String, Vec<u8>>,
}

impl MemoryTier {
    /// Builds a memory tier with the given byte capacity and TTL.
    /// `ttl = None` means entries never expire on their own; eviction is then
    /// purely LRU-driven by `max_size_bytes`.
    pub fn new(max_size_bytes: u64, ttl: Option<Duration>) -> Self {
        let mut builder =
            moka::future::Cache::builder()
                .max_capacity(max_size_bytes)
                .weigher(|_key: &String, value: &Vec<u8>| -> u32 {
                    value.len().try_into().unwrap_or(u32::MAX)
                });
        if let Some(ttl) = ttl {
            builder = builder.time_to_live(ttl);
        }
        Self {
            cache: builder.build(),
        }
    }

    /// Looks up `key`, refreshing its recency on hit.
    pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.cache.get(key).await
    }

    /// Inserts or replaces `key`. May evict other entries to make room.
    pub async fn put(&self, key: &str, data: Vec<u8>) {
        self.cache.insert(key.to_string(), data).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let tier = MemoryTier::new(1024, Some(Duration::from_secs(60)));
        tier.put("a", b"hello".to_vec()).await;
        assert_eq!(tier.get("a").await, Some(b"hello".to_vec()));
    }

    #[tokio::test]
    async fn missing_key_is_none() {
        let tier = MemoryTier::new(1024, None);
        assert_eq!(tier.get("missing").await, None);
    }

    #[tokio::test]
    async fn oversized_entries_are_evicted_to_respect_capacity() {
        let tier = MemoryTier::new(8, None);
        tier.put("a", vec![0u8; 4]).await;
        tier.put("b", vec![0u8; 4]).await;
        tier.put("c", vec![0u8; 4]).await;
        tier.cache.run_pending_tasks().await;
        // capacity is 8 bytes; inserting a third 4-byte entry must evict one of the first two
        let total_present = [tier.get("a").await, tier.get("b").await, tier.get("c").await]
            .into_iter()
            .filter(Option::is_some)
            .count();
        assert!(total_present <= 2);
    }
}
