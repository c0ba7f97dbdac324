// SPDX-License-Identifier: MPL-2.0

//! Multiplexed HTTP/2 fetcher with connection reuse, bounded concurrency,
//! and retry-with-backoff for transient failures.
//!
//! The base [Fetcher::get]/[Fetcher::get_all] contract never retries: a
//! non-200 response is returned to the caller, not raised as an error.
//! Retry policy lives entirely in the `reqwest-middleware` stack built in
//! [Fetcher::new], so callers only ever see the already-retried outcome.

use std::time::Duration;

use futures::stream::{self, StreamExt};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use thiserror::Error;

use crate::config::FetcherConfig;

/// Errors from the HTTP/2 fetcher.
#[derive(Debug, Error)]
pub enum FetcherError {
    /// The request timed out.
    #[error("request to {url} timed out after {timeout_ms}ms")]
    Timeout {
        /// Requested URL.
        url: String,
        /// Configured timeout.
        timeout_ms: u64,
    },
    /// A transport-level error occurred (DNS, connect, TLS, etc).
    #[error("request to {url} failed")]
    Transport {
        /// Requested URL.
        url: String,
        /// Underlying error.
        #[source]
        source: reqwest_middleware::Error,
    },
}

/// A single fetched response: status code plus body bytes.
#[derive(Debug, Clone)]
pub struct FetchedResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: Vec<u8>,
}

/// HTTP/2 fetcher: one client, reused across every request, with a
/// `reqwest-retry` middleware layered on for transient-failure backoff.
#[derive(Clone)]
pub struct Fetcher {
    client: ClientWithMiddleware,
    timeout: Duration,
    max_concurrent: usize,
}

impl Fetcher {
    /// Builds a fetcher from configuration.
    pub fn new(config: &FetcherConfig) -> Self {
        let base = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()
            .expect("building the reqwest client from static config cannot fail");
        let retry_policy =
            ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let client = ClientBuilder::new(base)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();
        Self {
            client,
            timeout: config.timeout,
            max_concurrent: config.max_concurrent,
        }
    }

    /// Fetches a single URL with the given `Accept` header.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn get(&self, url: &str, accept: &str) -> Result<FetchedResponse, FetcherError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, accept)
            .send()
            .await
            .map_err(|source| classify(url, self.timeout, source))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|source| classify(url, self.timeout, reqwest_middleware::Error::Reqwest(source)))?
            .to_vec();
        Ok(FetchedResponse { status, body })
    }

    /// Fans `urls` out concurrently, bounded by `max_concurrent`, returning
    /// results positionally aligned with `urls`. Callers must keep `urls.len()`
    /// at or below the hard batching cap of 100.
    #[tracing::instrument(level = "debug", skip(self, urls))]
    pub async fn get_all(
        &self,
        urls: &[String],
        accept: &str,
    ) -> Vec<Result<FetchedResponse, FetcherError>> {
        stream::iter(urls.iter())
            .map(|url| async move { self.get(url, accept).await })
            .buffered(self.max_concurrent.max(1))
            .collect()
            .await
    }
}

fn classify(url: &str, timeout: Duration, source: reqwest_middleware::Error) -> FetcherError {
    let is_timeout = match &source {
        reqwest_middleware::Error::Reqwest(e) => e.is_timeout(),
        reqwest_middleware::Error::Middleware(_) => false,
    };
    if is_timeout {
        FetcherError::Timeout {
            url: url.to_string(),
            timeout_ms: timeout.as_millis() as u64,
        }
    } else {
        FetcherError::Transport {
            url: url.to_string(),
            source,
        }
    }
}
