// SPDX-License-Identifier: MPL-2.0

//! [`Range`] is the [`VersionSet`] implementation built on top of [`version_ranges::Ranges`].
//!
//! Concretely, it represents any set of versions expressible as the concatenation, union,
//! and complement of the building blocks [`empty`](Range::empty), [`full`](Range::full),
//! [`singleton`](Range::singleton), and the various `*_than` / `between` constructors of
//! [`Ranges`].

use std::fmt::{Debug, Display};

use version_ranges::Ranges;

use crate::version_set::VersionSet;

/// A set of versions, implemented as a union of disjoint intervals.
///
/// This is the interval-based [`VersionSet`] implementation, built directly on top of
/// [`version_ranges::Ranges`].
pub type Range<V> = Ranges<V>;

impl<V: Debug + Display + Clone + Eq + Ord> VersionSet for Range<V> {
    type V = V;

    fn empty() -> Self {
        Ranges::empty()
    }

    fn singleton(v: Self::V) -> Self {
        Ranges::singleton(v)
    }

    fn complement(&self) -> Self {
        Ranges::complement(self)
    }

    fn intersection(&self, other: &Self) -> Self {
        Ranges::intersection(self, other)
    }

    fn contains(&self, v: &Self::V) -> bool {
        Ranges::contains(self, v)
    }

    fn full() -> Self {
        Ranges::full()
    }

    fn union(&self, other: &Self) -> Self {
        Ranges::union(self, other)
    }
}
