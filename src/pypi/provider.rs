// SPDX-License-Identifier: MPL-2.0

//! [`DependencyProvider`] implementation backed by live PyPI metadata.
//!
//! The solver core's trait methods are synchronous (the algorithm in
//! `solver.rs` is not written against `async fn`), but fetching package
//! metadata is inherently asynchronous. [PyPIProvider] bridges the two with
//! `tokio::task::block_in_place` + `Handle::current().block_on`, the same
//! pattern used to call async registry clients from a sync resolver trait.

use std::cmp::Reverse;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use pep440_rs::VersionSpecifiers;
use pep508_rs::{Requirement, VersionOrUrl};
use tokio::runtime::Handle;

use crate::{Dependencies, DependencyConstraints, DependencyProvider};

use super::client::PyPIClient;
use super::error::PyPIError;
use super::version::{specifiers_to_range, PypiVersion, PypiVersionSet};

/// Resolves against live PyPI metadata, fetched (and cached) through a
/// [PyPIClient].
pub struct PyPIProvider {
    client: Arc<PyPIClient>,
    cancelled: AtomicBool,
}

impl PyPIProvider {
    /// Wraps a client for use as a [DependencyProvider].
    pub fn new(client: Arc<PyPIClient>) -> Self {
        Self {
            client,
            cancelled: AtomicBool::new(false),
        }
    }

    /// Requests cooperative cancellation: the next `should_cancel` call (and
    /// every one after it) will return an error.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    fn block_on<F: std::future::Future>(&self, fut: F) -> F::Output {
        tokio::task::block_in_place(|| Handle::current().block_on(fut))
    }
}

impl DependencyProvider for PyPIProvider {
    type P = String;
    type V = PypiVersion;
    type VS = PypiVersionSet;
    type M = String;
    type Priority = (Reverse<usize>, Reverse<String>);
    type Err = PyPIError;

    fn prioritize(&self, package: &Self::P, range: &Self::VS) -> Self::Priority {
        // Fewer matching versions means a faster-to-exhaust search branch, so
        // it gets priority; ties broken by package name for determinism.
        let count = match self.block_on(self.client.get_package(package)) {
            Ok(versions) => versions
                .versions
                .keys()
                .filter_map(|v| parse_version(v))
                .filter(|v| range.contains(v))
                .count(),
            Err(_) => 0,
        };
        (Reverse(count), Reverse(package.clone()))
    }

    fn choose_version(
        &self,
        package: &Self::P,
        range: &Self::VS,
    ) -> Result<Option<Self::V>, Self::Err> {
        let versions = self.block_on(self.client.get_package(package))?;
        let mut candidates: Vec<PypiVersion> = versions
            .versions
            .keys()
            .filter_map(|v| parse_version(v))
            .filter(|v| range.contains(v))
            .collect();
        candidates.sort();
        Ok(candidates.pop())
    }

    fn get_dependencies(
        &self,
        package: &Self::P,
        version: &Self::V,
    ) -> Result<Dependencies<Self::P, Self::VS, Self::M>, Self::Err> {
        let versions = self.block_on(self.client.get_package(package))?;
        let Some(metadata) = versions.versions.get(&version.to_string()) else {
            return Ok(Dependencies::Unavailable(format!(
                "{package} {version} has no metadata on record"
            )));
        };
        if let Some(requires_python) = &metadata.requires_python {
            if requires_python.parse::<VersionSpecifiers>().is_err() {
                return Ok(Dependencies::Unavailable(format!(
                    "{package} {version} has an unparsable Requires-Python marker"
                )));
            }
        }

        let mut constraints: DependencyConstraints<Self::P, Self::VS> = DependencyConstraints::default();
        for raw in &metadata.requires_dist {
            let Ok(requirement) = raw.parse::<Requirement>() else {
                continue;
            };
            if !evaluate_marker(&requirement) {
                continue;
            }
            let range = match requirement.version_or_url {
                Some(VersionOrUrl::VersionSpecifier(specifiers)) => specifiers_to_range(&specifiers),
                _ => crate::Range::full(),
            };
            let existing = constraints
                .entry(requirement.name.to_string())
                .or_insert_with(crate::Range::<PypiVersion>::full);
            *existing = existing.intersection(&range);
        }
        Ok(Dependencies::Available(constraints))
    }

    fn should_cancel(&self) -> Result<(), Self::Err> {
        if self.cancelled.load(Ordering::Relaxed) {
            Err(PyPIError::NetworkError(
                "resolution was cancelled".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

/// Requirement markers (`; extra == "foo"`, `; python_version < "3.8"`, ...)
/// are out of scope for this provider: every requirement is treated as
/// unconditionally applicable. A marker environment can be layered on top by
/// filtering `requires_dist` before it reaches this provider.
fn evaluate_marker(_requirement: &Requirement) -> bool {
    true
}

fn parse_version(s: &str) -> Option<PypiVersion> {
    s.parse::<pep440_rs::Version>().ok().map(PypiVersion)
}

impl fmt::Debug for PyPIProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PyPIProvider").finish_non_exhaustive()
    }
}
