// SPDX-License-Identifier: MPL-2.0

//! Two-level cache: an in-memory LRU/TTL tier backed by [moka], and an
//! atomic-write on-disk tier, keyed by the SHA-256 of the caller's cache key.
//!
//! Callers never see a torn disk write: [DiskTier::put] writes to a temp file
//! in the cache directory and renames it into place.

mod disk;
mod memory;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use thiserror::Error;

use crate::config::CacheConfig;

pub use disk::DiskTier;
pub use memory::MemoryTier;

/// Errors from cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The disk tier could not read or write its backing directory.
    #[error("disk cache I/O error at {path}")]
    DiskIo {
        /// Path that failed.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The memory tier would exceed its configured capacity.
    #[error("cache entry of {size} bytes exceeds memory capacity of {capacity} bytes")]
    OutOfMemory {
        /// Size of the rejected entry.
        size: u64,
        /// Configured capacity.
        capacity: u64,
    },
}

/// A single cached blob plus its bookkeeping metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Cache key this entry was stored under.
    pub key: String,
    /// Raw cached bytes.
    pub data: Vec<u8>,
}

/// Composite two-level cache: memory LRU+TTL in front of an atomic-write disk store.
///
/// Cheaply cloneable: internally `Arc`-shared, safe to hand to multiple
/// concurrent fetcher tasks without an external mutex.
#[derive(Clone)]
pub struct Cache {
    memory: MemoryTier,
    disk: Option<Arc<DiskTier>>,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

impl Cache {
    /// Builds a cache from configuration. The disk tier is omitted entirely
    /// when `config.disk_dir` is `None`, matching [CacheConfig]'s documented behavior.
    pub fn new(config: &CacheConfig) -> Self {
        let disk = config
            .disk_dir
            .as_ref()
            .map(|dir| Arc::new(DiskTier::new(dir.clone(), config.disk_ttl)));
        Self {
            memory: MemoryTier::new(config.memory_size, config.memory_ttl),
            disk,
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Looks up `key`, checking memory first and promoting a disk hit into memory.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
        if let Some(data) = self.memory.get(key).await {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Some(data);
        }
        if let Some(disk) = &self.disk {
            match disk.get(key).await {
                Ok(Some(data)) => {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    self.memory.put(key, data.clone()).await;
                    return Some(data);
                }
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(%key, error = %err, "disk cache read failed");
                }
            }
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Writes `data` under `key` to both tiers. The disk write is best-effort:
    /// a disk failure is logged and swallowed, never returned to the caller.
    #[tracing::instrument(level = "debug", skip(self, data))]
    pub async fn put(&self, key: &str, data: Vec<u8>) {
        self.memory.put(key, data.clone()).await;
        if let Some(disk) = &self.disk {
            if let Err(err) = disk.put(key, &data).await {
                tracing::warn!(%key, error = %err, "disk cache write failed, continuing with memory tier only");
            }
        }
    }

    /// Total cache hits recorded so far.
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Total cache misses recorded so far.
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// `hits / (hits + misses)`, or `0.0` if nothing has been looked up yet.
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits() as f64;
        let misses = self.misses() as f64;
        if hits + misses == 0.0 {
            0.0
        } else {
            hits / (hits + misses)
        }
    }
}

/// Builds the cache key for a raw Simple API page.
pub fn simple_key(name: &str) -> String {
    format!("simple:{name}")
}

/// Builds the cache key for a wheel's PEP 658 METADATA text.
pub fn meta_key(name: &str) -> String {
    format!("meta:{name}")
}

/// Builds the cache key for a raw JSON API body.
pub fn json_key(name: &str) -> String {
    format!("pypi:json:{name}")
}

/// Builds the cache key for a single version's JSON API body
/// (`GET {json_api_url}/{name}/{version}/json`).
pub fn json_version_key(name: &str, version: &str) -> String {
    format!("pypi:json:{name}:{version}")
}
