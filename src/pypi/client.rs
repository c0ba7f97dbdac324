// SPDX-License-Identifier: MPL-2.0

//! Tiered PyPI client: a fast path through the Simple API (+ PEP 658 wheel
//! METADATA), falling back to the JSON API when the fast path can't produce
//! a usable answer.

use std::sync::Arc;

use url::Url;

use crate::cache::{self, Cache};
use crate::config::{PyPIClientConfig, MAX_CONCURRENT_BATCH};
use crate::http::Fetcher;

use super::error::PyPIError;
use super::metadata::{self, JsonPackageInfo, PackageMetadata};

/// Metadata for every known version of a package, keyed by version string.
#[derive(Debug, Clone, Default)]
pub struct PackageVersions {
    /// Version string -> parsed metadata, for every version this lookup could resolve.
    pub versions: std::collections::HashMap<String, PackageMetadata>,
}

/// Tiered client: Simple API + PEP 658 fast path, JSON API fallback, both
/// routed through the shared [Cache].
pub struct PyPIClient {
    fetcher: Fetcher,
    cache: Cache,
    json_api_url: String,
    simple_api_url: String,
}

impl PyPIClient {
    /// Builds a client from its three configuration pieces.
    pub fn new(config: &PyPIClientConfig, fetcher: Fetcher, cache: Cache) -> Self {
        Self {
            fetcher,
            cache,
            json_api_url: config.json_api_url.trim_end_matches('/').to_string(),
            simple_api_url: config.simple_api_url.trim_end_matches('/').to_string(),
        }
    }

    /// Resolves a single package's metadata, trying the Simple API fast path
    /// first and falling back to the JSON API when it yields nothing usable.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn get_package(&self, name: &str) -> Result<PackageVersions, PyPIError> {
        match self.get_package_fast(name).await {
            Ok(versions) if !versions.versions.is_empty() => Ok(versions),
            _ => self.get_package_json(name).await,
        }
    }

    /// Resolves several packages concurrently, capping fan-out at
    /// [MAX_CONCURRENT_BATCH] while preserving the caller's request order in
    /// the returned vector.
    pub async fn get_packages(&self, names: &[String]) -> Vec<Result<PackageVersions, PyPIError>> {
        let mut out = Vec::with_capacity(names.len());
        for chunk in names.chunks(MAX_CONCURRENT_BATCH) {
            let results = futures::future::join_all(
                chunk.iter().map(|name| self.get_package(name)),
            )
            .await;
            out.extend(results);
        }
        out
    }

    /// Simple API + PEP 658 fast path: list wheel files, pick the best file
    /// per version, and fetch each file's `.metadata` sidecar (through the
    /// cache) instead of downloading the wheel itself.
    async fn get_package_fast(&self, name: &str) -> Result<PackageVersions, PyPIError> {
        let simple_key = cache::simple_key(name);
        let body = match self.cache.get(&simple_key).await {
            Some(body) => body,
            None => {
                let url = format!("{}/{}/", self.simple_api_url, name);
                let response = self.fetcher.get(&url, "text/html").await?;
                if let Some(err) = PyPIError::from_status(name, response.status) {
                    return Err(err);
                }
                self.cache.put(&simple_key, response.body.clone()).await;
                response.body
            }
        };
        let body_text = String::from_utf8_lossy(&body).into_owned();
        let base = Url::parse(&format!("{}/{}/", self.simple_api_url, name))
            .map_err(|e| PyPIError::ParseError(format!("invalid Simple API base URL: {e}")))?;
        let files = metadata::parse_simple_api_page(&base, &body_text)?;
        let best = metadata::best_per_version(files);

        let mut versions = std::collections::HashMap::with_capacity(best.len());
        let entries: Vec<_> = best.into_values().collect();
        for chunk in entries.chunks(MAX_CONCURRENT_BATCH) {
            let fetched = futures::future::join_all(
                chunk
                    .iter()
                    .map(|file| self.get_wheel_metadata(name, file)),
            )
            .await;
            for (file, result) in chunk.iter().zip(fetched) {
                if let Some(parsed) = result {
                    versions.insert(file.version.clone(), parsed);
                }
            }
        }
        Ok(PackageVersions { versions })
    }

    async fn get_wheel_metadata(
        &self,
        name: &str,
        file: &metadata::WheelFile,
    ) -> Option<PackageMetadata> {
        if !file.metadata_available {
            return None;
        }
        let key = cache::meta_key(&format!("{name}:{}", file.filename));
        let text = if let Some(cached) = self.cache.get(&key).await {
            String::from_utf8_lossy(&cached).into_owned()
        } else {
            let metadata_url = format!("{}.metadata", file.url);
            let response = self
                .fetcher
                .get(&metadata_url, "text/plain")
                .await
                .ok()?;
            if response.status != 200 {
                return None;
            }
            self.cache.put(&key, response.body.clone()).await;
            String::from_utf8_lossy(&response.body).into_owned()
        };
        metadata::parse_metadata_text(&text).ok()
    }

    /// JSON API fallback: one request for the project overview (latest
    /// release's metadata plus the full list of known version strings), then
    /// one request per remaining version to pick up its own `Requires-Dist`.
    async fn get_package_json(&self, name: &str) -> Result<PackageVersions, PyPIError> {
        let json_key = cache::json_key(name);
        let body = match self.cache.get(&json_key).await {
            Some(body) => body,
            None => {
                let url = format!("{}/{}/json", self.json_api_url, name);
                let response = self.fetcher.get(&url, "application/json").await?;
                if let Some(err) = PyPIError::from_status(name, response.status) {
                    return Err(err);
                }
                self.cache.put(&json_key, response.body.clone()).await;
                response.body
            }
        };
        let JsonPackageInfo {
            metadata,
            all_versions,
            ..
        } = metadata::parse_json_api_response(&body)?;

        let mut versions = std::collections::HashMap::with_capacity(all_versions.len());
        let current = metadata.version.clone();
        versions.insert(current.clone(), metadata);

        let remaining: Vec<String> = all_versions
            .into_iter()
            .filter(|v| *v != current)
            .collect();
        for chunk in remaining.chunks(MAX_CONCURRENT_BATCH) {
            let fetched = futures::future::join_all(
                chunk.iter().map(|version| self.get_version_json(name, version)),
            )
            .await;
            for (version, result) in chunk.iter().zip(fetched) {
                if let Some(parsed) = result {
                    versions.insert(version.clone(), parsed);
                }
            }
        }
        Ok(PackageVersions { versions })
    }

    /// Fetches (or reads from cache) a single version's metadata via
    /// `GET {json_api_url}/{name}/{version}/json`. Returns `None` rather than
    /// an error on failure, mirroring [Self::get_wheel_metadata]'s
    /// per-request-failure-does-not-abort-the-batch behavior.
    async fn get_version_json(&self, name: &str, version: &str) -> Option<PackageMetadata> {
        let key = cache::json_version_key(name, version);
        let body = if let Some(cached) = self.cache.get(&key).await {
            cached
        } else {
            let url = format!("{}/{}/{}/json", self.json_api_url, name, version);
            let response = self.fetcher.get(&url, "application/json").await.ok()?;
            if response.status != 200 {
                return None;
            }
            self.cache.put(&key, response.body.clone()).await;
            response.body
        };
        metadata::parse_json_api_response(&body)
            .ok()
            .map(|info| info.metadata)
    }
}

/// Shared, cheaply cloneable handle to a [PyPIClient], for use across
/// concurrently-running solver tasks.
pub type SharedPyPIClient = Arc<PyPIClient>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CacheConfig, FetcherConfig};

    fn test_client() -> PyPIClient {
        let cache = Cache::new(&CacheConfig {
            disk_dir: None,
            ..Default::default()
        });
        let fetcher = Fetcher::new(&FetcherConfig::default());
        PyPIClient::new(&PyPIClientConfig::default(), fetcher, cache)
    }

    #[test]
    fn client_builds_from_default_config() {
        let _client = test_client();
    }
}
