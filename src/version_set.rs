// SPDX-License-Identifier: MPL-2.0

//! A [VersionSet] is a constraint defining a set of versions.
//!
//! Concretely, a [VersionSet] implementation must provide constructors for
//! the empty set and a singleton set, plus complement and intersection
//! operations. Union and the full set are then derived automatically from
//! those.
//!
//! The building blocks are:
//!  - [empty()](VersionSet::empty): the empty set
//!  - [singleton(v)](VersionSet::singleton): the set containing only the version v
//!  - [complement()](VersionSet::complement): the complement of a set
//!  - [intersection(other)](VersionSet::intersection): the intersection of two sets
//!  - [full()](VersionSet::full): the set of all possible versions, derived as `empty().complement()`
//!  - [union(other)](VersionSet::union): the union of two sets, derived from complement and intersection

use std::fmt::{Debug, Display};

/// Trait describing sets of versions.
pub trait VersionSet: Debug + Display + Clone + Eq {
    /// Version type associated with the sets manipulated.
    type V: Clone + Debug + Display;

    // Constructors
    /// Constructor for an empty set containing no version.
    fn empty() -> Self;
    /// Constructor for a set containing exactly one version.
    fn singleton(v: Self::V) -> Self;

    // Operations
    /// Compute the complement of this set.
    fn complement(&self) -> Self;
    /// Compute the intersection with another set.
    fn intersection(&self, other: &Self) -> Self;

    // Membership
    /// Evaluate membership of a version in this set.
    fn contains(&self, v: &Self::V) -> bool;

    // Automatically implemented functions ###########################

    /// Constructor for the set containing all versions.
    /// Automatically implemented as `Self::empty().complement()`.
    fn full() -> Self {
        Self::empty().complement()
    }

    /// Compute the union with another set.
    /// Thanks to set properties, this is automatically implemented as:
    /// `self.complement().intersection(&other.complement()).complement()`
    fn union(&self, other: &Self) -> Self {
        self.complement()
            .intersection(&other.complement())
            .complement()
    }
}
