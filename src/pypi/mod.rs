// SPDX-License-Identifier: MPL-2.0

//! A [`crate::DependencyProvider`] backed by live PyPI metadata: a tiered
//! Simple API / JSON API client, wired through the shared cache and fetcher.

mod client;
mod error;
mod metadata;
mod provider;
mod version;

pub use client::{PackageVersions, PyPIClient, SharedPyPIClient};
pub use error::PyPIError;
pub use metadata::{parse_wheel_version, PackageMetadata, WheelFile};
pub use provider::PyPIProvider;
pub use version::{specifiers_to_range, PypiVersion, PypiVersionSet};
