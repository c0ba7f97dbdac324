// SPDX-License-Identifier: MPL-2.0

//! Handling pubgrub errors.

use thiserror::Error;

use crate::report::DerivationTree;
use crate::solver::DependencyProvider;

/// Errors that may occur while solving dependencies.
#[derive(Error)]
pub enum PubGrubError<DP: DependencyProvider> {
    /// There is no solution for this set of dependencies.
    #[error("No solution")]
    NoSolution(DerivationTree<DP::P, DP::VS, DP::M>),

    /// Error arising when the implementer of [DependencyProvider]
    /// returned an error in the method
    /// [get_dependencies](DependencyProvider::get_dependencies).
    #[error("Retrieving dependencies of {package} {version} failed")]
    ErrorRetrievingDependencies {
        /// Package whose dependencies we want.
        package: DP::P,
        /// Version of the package for which we want the dependencies.
        version: DP::V,
        /// Error raised by the implementer of [DependencyProvider].
        #[source]
        source: DP::Err,
    },

    /// Error arising when the implementer of [DependencyProvider]
    /// returned an error in the method
    /// [choose_version](DependencyProvider::choose_version).
    #[error("Choosing a compatible version for a package failed")]
    ErrorChoosingPackageVersion(#[source] DP::Err),

    /// Error arising when the implementer of [DependencyProvider]
    /// returned an error in the method
    /// [should_cancel](DependencyProvider::should_cancel).
    #[error("We should cancel")]
    ErrorInShouldCancel(#[source] DP::Err),

    /// Something unexpected happened.
    #[error("{0}")]
    Failure(String),
}

impl<DP: DependencyProvider> std::fmt::Debug for PubGrubError<DP> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoSolution(tree) => f.debug_tuple("NoSolution").field(tree).finish(),
            Self::ErrorRetrievingDependencies {
                package,
                version,
                source,
            } => f
                .debug_struct("ErrorRetrievingDependencies")
                .field("package", package)
                .field("version", version)
                .field("source", source)
                .finish(),
            Self::ErrorChoosingPackageVersion(err) => f
                .debug_tuple("ErrorChoosingPackageVersion")
                .field(err)
                .finish(),
            Self::ErrorInShouldCancel(err) => {
                f.debug_tuple("ErrorInShouldCancel").field(err).finish()
            }
            Self::Failure(msg) => f.debug_tuple("Failure").field(msg).finish(),
        }
    }
}

/// Holds information about the resolution that failed. Can be converted to a [PubGrubError].
#[derive(Debug)]
pub struct NoSolutionError<DP: DependencyProvider>(
    pub(crate) DerivationTree<DP::P, DP::VS, DP::M>,
);

impl<DP: DependencyProvider> NoSolutionError<DP> {
    /// The derivation tree describing the reason resolution failed.
    pub fn derivation_tree(self) -> DerivationTree<DP::P, DP::VS, DP::M> {
        self.0
    }
}

impl<DP: DependencyProvider> From<DerivationTree<DP::P, DP::VS, DP::M>> for NoSolutionError<DP> {
    fn from(tree: DerivationTree<DP::P, DP::VS, DP::M>) -> Self {
        NoSolutionError(tree)
    }
}

impl<DP: DependencyProvider> From<NoSolutionError<DP>> for PubGrubError<DP> {
    fn from(e: NoSolutionError<DP>) -> Self {
        PubGrubError::NoSolution(e.0)
    }
}
