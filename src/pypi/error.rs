// SPDX-License-Identifier: MPL-2.0

//! Error taxonomy for the PyPI metadata subsystem. Distinct from the solver
//! core's [`crate::PubGrubError`]: this enum covers everything that can go
//! wrong *fetching* package data, before a single incompatibility is derived.

use thiserror::Error;

use crate::cache::CacheError;
use crate::http::FetcherError;

/// Everything that can go wrong resolving a package name to its metadata.
#[derive(Debug, Error)]
pub enum PyPIError {
    /// The package name failed PEP 503 normalization.
    #[error("'{0}' is not a valid package name")]
    InvalidPackageName(String),
    /// Neither the Simple API nor the JSON API have any record of this package.
    #[error("package '{0}' was not found")]
    PackageNotFound(String),
    /// A non-404, non-429, non-5xx HTTP error, or a connection failure.
    #[error("network error fetching '{0}'")]
    NetworkError(String),
    /// The response body could not be parsed as expected.
    #[error("{0}")]
    ParseError(String),
    /// The request exceeded its configured timeout.
    #[error(transparent)]
    Timeout(FetcherError),
    /// The server responded 429; callers should back off and retry later.
    #[error("rate limited by PyPI while fetching '{0}'")]
    TooManyRequests(String),
    /// The server responded 5xx.
    #[error("PyPI server error fetching '{0}'")]
    ServerError(String),
    /// The in-memory cache tier rejected an entry larger than its capacity.
    #[error(transparent)]
    OutOfMemory(#[from] CacheError),
}

impl From<FetcherError> for PyPIError {
    /// `Timeout` stays `Timeout`; every other transport failure (DNS,
    /// connect, TLS, ...) becomes `NetworkError` instead of being folded
    /// into `Timeout` by a blanket conversion.
    fn from(err: FetcherError) -> Self {
        match err {
            FetcherError::Timeout { .. } => Self::Timeout(err),
            FetcherError::Transport { .. } => Self::NetworkError(err.to_string()),
        }
    }
}

impl PyPIError {
    /// Classifies an HTTP status code for a given package name into the
    /// matching error variant. Returns `None` for success statuses.
    pub fn from_status(package: &str, status: u16) -> Option<Self> {
        match status {
            200..=299 => None,
            404 => Some(Self::PackageNotFound(package.to_string())),
            429 => Some(Self::TooManyRequests(package.to_string())),
            500..=599 => Some(Self::ServerError(package.to_string())),
            _ => Some(Self::NetworkError(format!(
                "'{package}' returned unexpected status {status}"
            ))),
        }
    }
}
