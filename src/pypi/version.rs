// SPDX-License-Identifier: MPL-2.0

//! A [`crate::Version`] implementation backed by [`pep440_rs::Version`], and
//! the bridge from PEP 508 requirement specifiers to [`crate::Range`].

use std::fmt::{self, Display};

use pep440_rs::{Operator, VersionSpecifier, VersionSpecifiers};

use crate::{Range, Version};

/// Newtype around [`pep440_rs::Version`] so the solver core's [Version] trait
/// (`lowest`/`bump`) can be implemented for it without orphan-rule trouble.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PypiVersion(pub pep440_rs::Version);

impl Display for PypiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<pep440_rs::Version> for PypiVersion {
    fn from(v: pep440_rs::Version) -> Self {
        Self(v)
    }
}

impl Version for PypiVersion {
    fn lowest() -> Self {
        Self(pep440_rs::Version::new([0]))
    }

    fn bump(&self) -> Self {
        // Bump the least significant release segment, e.g. 1.2.3 -> 1.2.4,
        // mirroring how `SemanticVersion::bump` steps the patch number.
        let mut release: Vec<u64> = self.0.release().to_vec();
        if let Some(last) = release.last_mut() {
            *last += 1;
        } else {
            release.push(1);
        }
        Self(self.0.clone().with_release(release))
    }
}

/// A PEP 440/508 version set over [PypiVersion], expressed as the
/// [`crate::Range`] the solver core already understands.
pub type PypiVersionSet = Range<PypiVersion>;

/// Converts a single PEP 440 version specifier (e.g. `>=1.0,<2.0`'s `>=1.0`
/// component) into the equivalent [Range].
fn specifier_to_range(spec: &VersionSpecifier) -> PypiVersionSet {
    let v = PypiVersion(spec.version().clone());
    match spec.operator() {
        Operator::Equal | Operator::ExactEqual => Range::singleton(v),
        Operator::NotEqual => Range::singleton(v).complement(),
        Operator::LessThan => Range::strictly_lower_than(v),
        Operator::LessThanEqual => Range::lower_than(v),
        Operator::GreaterThan => Range::strictly_higher_than(v),
        Operator::GreaterThanEqual => Range::higher_than(v),
        // `~=1.4.2` means `>=1.4.2, ==1.4.*`; pep440_rs exposes the expanded
        // bounds directly rather than making us parse the release segment.
        Operator::TildeEqual => {
            let lower = PypiVersion(spec.version().clone());
            let mut release: Vec<u64> = spec.version().release().to_vec();
            release.pop();
            if let Some(last) = release.last_mut() {
                *last += 1;
            }
            let upper = PypiVersion(spec.version().clone().with_release(release));
            Range::between(lower, upper)
        }
        // `== 1.4.*`: every version whose release segments start with the
        // given prefix, i.e. `[1.4, 1.5)`.
        Operator::EqualStar => prefix_range(spec.version()),
        // `!= 1.4.*`: everything outside that same prefix range.
        Operator::NotEqualStar => prefix_range(spec.version()).complement(),
        // No other operator is defined by pep440_rs today; kept so a future
        // addition degrades to "no constraint" instead of failing to compile.
        _ => Range::full(),
    }
}

/// The range of versions whose release segments start with `version`'s own
/// release prefix, i.e. `[version, version-with-last-segment-bumped)`.
fn prefix_range(version: &pep440_rs::Version) -> PypiVersionSet {
    let lower = PypiVersion(version.clone());
    let mut release: Vec<u64> = version.release().to_vec();
    if let Some(last) = release.last_mut() {
        *last += 1;
    } else {
        release.push(1);
    }
    let upper = PypiVersion(version.clone().with_release(release));
    Range::between(lower, upper)
}

/// Converts a full set of PEP 440 specifiers (an AND of individual specifiers)
/// into the equivalent [Range], by intersecting each specifier's range.
pub fn specifiers_to_range(specifiers: &VersionSpecifiers) -> PypiVersionSet {
    specifiers
        .iter()
        .map(specifier_to_range)
        .fold(Range::full(), |acc, r| acc.intersection(&r))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn v(s: &str) -> PypiVersion {
        PypiVersion(pep440_rs::Version::from_str(s).unwrap())
    }

    #[test]
    fn bump_increments_last_release_segment() {
        assert_eq!(v("1.2.3").bump(), v("1.2.4"));
    }

    #[test]
    fn equal_specifier_yields_singleton_range() {
        let specifiers = VersionSpecifiers::from_str("==1.2.3").unwrap();
        let range = specifiers_to_range(&specifiers);
        assert!(range.contains(&v("1.2.3")));
        assert!(!range.contains(&v("1.2.4")));
    }

    #[test]
    fn compound_specifier_intersects_bounds() {
        let specifiers = VersionSpecifiers::from_str(">=1.0,<2.0").unwrap();
        let range = specifiers_to_range(&specifiers);
        assert!(range.contains(&v("1.5.0")));
        assert!(!range.contains(&v("2.0.0")));
        assert!(!range.contains(&v("0.9.0")));
    }

    #[test]
    fn equal_star_specifier_yields_prefix_range() {
        let specifiers = VersionSpecifiers::from_str("==1.4.*").unwrap();
        let range = specifiers_to_range(&specifiers);
        assert!(range.contains(&v("1.4.0")));
        assert!(range.contains(&v("1.4.9")));
        assert!(!range.contains(&v("1.5.0")));
        assert!(!range.contains(&v("1.3.9")));
    }

    #[test]
    fn not_equal_star_specifier_excludes_prefix_range() {
        let specifiers = VersionSpecifiers::from_str("!=1.4.*").unwrap();
        let range = specifiers_to_range(&specifiers);
        assert!(!range.contains(&v("1.4.0")));
        assert!(!range.contains(&v("1.4.9")));
        assert!(range.contains(&v("1.5.0")));
        assert!(range.contains(&v("1.3.9")));
    }
}
