// SPDX-License-Identifier: MPL-2.0

//! Runtime configuration for the cache and PyPI metadata fetcher.
//!
//! [ResolverConfig] bundles the three nested configs consumed by
//! [crate::cache::Cache], [crate::http::Fetcher] and [crate::pypi::PyPIClient].
//! Every field has a [Default] matching the table documented for each struct;
//! `ResolverConfig::default()` alone is enough to resolve against public PyPI.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top level configuration, typically loaded once per process.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Cache tiering and TTL configuration.
    pub cache: CacheConfig,
    /// HTTP/2 fetcher configuration.
    pub fetcher: FetcherConfig,
    /// PyPI endpoint and client configuration.
    pub pypi: PyPIClientConfig,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            fetcher: FetcherConfig::default(),
            pypi: PyPIClientConfig::default(),
        }
    }
}

impl ResolverConfig {
    /// Loads a config from a TOML file, falling back to defaults for any
    /// field the file does not set.
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Locates and loads the user-level config file, if any, using the same
    /// project-directory convention as the default disk cache location.
    ///
    /// Returns `Ok(None)` rather than an error when no config file is present;
    /// this is an expected outcome, not a failure.
    pub fn from_default_location() -> std::io::Result<Option<Self>> {
        let Some(dirs) = directories::ProjectDirs::from("dev", "pypubgrub", "pypubgrub") else {
            return Ok(None);
        };
        let path = dirs.config_dir().join("config.toml");
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs_err::read_to_string(&path)?;
        let config = Self::from_toml_str(&contents)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        Ok(Some(config))
    }
}

fn default_cache_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("dev", "pypubgrub", "pypubgrub")
        .map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Configuration for the two-level [crate::cache::Cache].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Memory LRU capacity, in bytes.
    pub memory_size: u64,
    /// Memory entry lifetime. `None` means entries never expire from memory on their own.
    #[serde(with = "humantime_duration_opt")]
    pub memory_ttl: Option<Duration>,
    /// Disk cache directory. `None` disables the disk tier entirely.
    pub disk_dir: Option<PathBuf>,
    /// Disk entry lifetime, checked against file mtime.
    #[serde(with = "humantime_duration")]
    pub disk_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            memory_size: 64 * 1024 * 1024,
            memory_ttl: Some(Duration::from_secs(300)),
            disk_dir: default_cache_dir(),
            disk_ttl: Duration::from_secs(3600),
        }
    }
}

/// Configuration for the HTTP/2 [crate::http::Fetcher].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// Per-request timeout.
    #[serde(with = "humantime_duration")]
    pub timeout: Duration,
    /// Fetcher-level parallelism hint; the hard batching cap is always 100.
    pub max_concurrent: usize,
    /// Number of retry attempts for transient failures, with exponential backoff.
    pub max_retries: u32,
    /// Value sent as the `User-Agent` header.
    pub user_agent: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(30_000),
            max_concurrent: 32,
            max_retries: 3,
            user_agent: format!("pypubgrub/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Hard batching limit for a single fan-out call, independent of `max_concurrent`.
pub const MAX_CONCURRENT_BATCH: usize = 100;

/// Configuration for the tiered [crate::pypi::PyPIClient].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PyPIClientConfig {
    /// Base URL for the legacy JSON API.
    pub json_api_url: String,
    /// Base URL for the Simple API.
    pub simple_api_url: String,
}

impl Default for PyPIClientConfig {
    fn default() -> Self {
        Self {
            json_api_url: "https://pypi.org/pypi".to_string(),
            simple_api_url: "https://pypi.org/simple".to_string(),
        }
    }
}

mod humantime_duration {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let millis = u64::deserialize(d)?;
        Ok(Duration::from_millis(millis))
    }
}

mod humantime_duration_opt {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match d {
            Some(d) => s.serialize_u64(d.as_millis() as u64),
            None => s.serialize_u64(0),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        let millis = u64::deserialize(d)?;
        Ok(if millis == 0 {
            None
        } else {
            Some(Duration::from_millis(millis))
        })
    }
}
