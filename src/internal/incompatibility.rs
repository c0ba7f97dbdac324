// SPDX-License-Identifier: MPL-2.0

//! An incompatibility is a set of terms for different packages
//! that should never be all true at the same time.
//! A size one incompatibility is guaranteed to always be true.
//! Incompatibilities are the basic building blocks of the PubGrub algorithm,
//! they are also used to report errors.

use std::collections::HashSet as Set;
use std::fmt::{self, Debug, Display};
use std::sync::Arc;

use crate::internal::arena::{Arena, Id};
use crate::internal::small_map::SmallMap;
use crate::package::Package;
use crate::report::{DerivationTree, Derived, External};
use crate::solver::DependencyProvider;
use crate::term::{self, Term};
use crate::type_aliases::Map;
use crate::version_set::VersionSet;

/// The id of an incompatibility, as stored in an [Arena].
pub(crate) type IncompId<P, VS, M> = Id<Incompatibility<P, VS, M>>;

/// The id of an incompatibility keyed by a [DependencyProvider]'s associated types.
pub(crate) type IncompDpId<DP> = IncompId<
    <DP as DependencyProvider>::P,
    <DP as DependencyProvider>::VS,
    <DP as DependencyProvider>::M,
>;

/// An incompatibility is a set of terms for different packages
/// that should never be all true at the same time.
///
/// Consider the intersections of all terms in any one incompatibility.
/// The terms are chosen in such a way that whenever all terms are true,
/// we know for sure that the list of packages (and their version ranges)
/// that corresponds to these terms is not possible for a valid set of dependencies.
///
/// An incompatibility usually originates from a package's dependency.
/// For example, if package A at version 1 depends on package B at version 2,
/// we can create the incompatibility `{A "1": B "not 2"}`: A at version 1
/// and B not at version 2 are not compatible together. The incompatibility
/// store adds these automatically through [from_dependency](Incompatibility::from_dependency).
///
/// `not_root` incompatibilities remember that we want to select the root package.
/// `no_versions` incompatibilities remember that a nonempty set of versions of a
/// package has no versions matching the constraints, and `custom_version` remembers
/// that the dependency provider rejected a specific version for some other reason.
///
/// Finally, `DerivedFrom` incompatibilities are built during conflict resolution,
/// when two applicable incompatibilities are combined into a new one.
#[derive(Debug, Clone)]
pub(crate) struct Incompatibility<P: Package, VS: VersionSet, M: Eq + Clone + Debug + Display> {
    package_terms: SmallMap<P, Term<VS>>,
    kind: Kind<P, VS, M>,
}

/// A package together with a term about it, used to report a contradiction.
type PackageTerm<P, VS> = (P, Term<VS>);

#[derive(Debug, Clone)]
enum Kind<P: Package, VS: VersionSet, M: Eq + Clone + Debug + Display> {
    /// The root incompatibility, only used to forbid the empty version of the root package.
    NotRoot(P, VS::V),
    /// There are no versions in this set for this package.
    NoVersions(P, VS),
    /// The dependency provider gave us a reason a package's version is unavailable:
    /// this could be anything, from a network failure to an incompatible license.
    Custom(P, VS::V, M),
    /// Caused by a dependency: a package in the first term depends on one of the
    /// versions excluded by the second term.
    FromDependencyOf(P, VS, P, VS),
    /// Derived from two existing incompatibilities during conflict resolution.
    DerivedFrom(IncompId<P, VS, M>, IncompId<P, VS, M>),
}

/// A Relation describes how a set of terms can be compared to an incompatibility.
/// Typically, the set of terms comes from the partial solution.
#[derive(Eq, PartialEq, Debug)]
pub(crate) enum Relation<P: Package, VS: VersionSet> {
    /// The set of terms satisfies the incompatibility
    /// and is guaranteed to fail resolution.
    Satisfied,
    /// A single term in the incompatibility is undecided,
    /// and all the others are satisfied.
    AlmostSatisfied(P),
    /// At least one term is contradicted.
    Contradicted(PackageTerm<P, VS>),
    /// Neither satisfied, contradicted, nor almost satisfied.
    Inconclusive,
}

impl<P: Package, VS: VersionSet, M: Eq + Clone + Debug + Display> Incompatibility<P, VS, M> {
    /// Create the root incompatibility.
    ///
    /// Used to remember that we want to select the root package, forcing the
    /// algorithm to call `choose_package_version` with the root package first.
    pub(crate) fn not_root(package: P, version: VS::V) -> Self {
        Self {
            package_terms: SmallMap::One([(
                package.clone(),
                Term::Negative(VS::singleton(version.clone())),
            )]),
            kind: Kind::NotRoot(package, version),
        }
    }

    /// Create an incompatibility to remember that a given set of versions is not
    /// available for a package.
    pub(crate) fn no_versions(package: P, term: Term<VS>) -> Self {
        let set = match &term {
            Term::Positive(set) => set.clone(),
            Term::Negative(_) => panic!("No version should have a positive term"),
        };
        Self {
            package_terms: SmallMap::One([(package.clone(), term)]),
            kind: Kind::NoVersions(package, set),
        }
    }

    /// Create an incompatibility to remember that the dependency provider rejected
    /// a specific version of a package, along with the reason why.
    pub(crate) fn custom_version(package: P, version: VS::V, reason: M) -> Self {
        let set = VS::singleton(version.clone());
        Self {
            package_terms: SmallMap::One([(package.clone(), Term::Positive(set))]),
            kind: Kind::Custom(package, version, reason),
        }
    }

    /// Build an incompatibility from a given dependency.
    pub(crate) fn from_dependency(package: P, versions: VS, dep: (P, VS)) -> Self {
        let (dep_p, dep_range) = dep;
        Self {
            package_terms: SmallMap::Two([
                (package.clone(), Term::Positive(versions.clone())),
                (dep_p.clone(), Term::Negative(dep_range.clone())),
            ]),
            kind: Kind::FromDependencyOf(package, versions, dep_p, dep_range),
        }
    }

    /// If an incompatibility is `{t1, t2}` and `{t3, t4}`, and `t2` and `t4` both
    /// exclude the same package by the same version range, the two incompatibilities
    /// can be merged into one, unioning the ranges of `t1` and `t3`. This is the
    /// inverse of the intersection that happens when building an incompatibility from
    /// a dependency, and keeps the number of incompatibilities about a given pair of
    /// packages from growing unbounded.
    pub(crate) fn merge_dependents(&self, other: &Self) -> Option<Self> {
        match (&self.kind, &other.kind) {
            (
                Kind::FromDependencyOf(p1, p1_set, p2, p2_set),
                Kind::FromDependencyOf(o1, o1_set, o2, o2_set),
            ) if p1 == o1 && p2 == o2 && p2_set == o2_set => {
                let merged_set = p1_set.union(o1_set);
                Some(Self {
                    package_terms: SmallMap::Two([
                        (p1.clone(), Term::Positive(merged_set.clone())),
                        (p2.clone(), Term::Negative(p2_set.clone())),
                    ]),
                    kind: Kind::FromDependencyOf(
                        p1.clone(),
                        merged_set,
                        p2.clone(),
                        p2_set.clone(),
                    ),
                })
            }
            _ => None,
        }
    }

    /// If this incompatibility was derived from a dependency of p1 on p2, return `(p1, p2)`.
    pub(crate) fn as_dependency(&self) -> Option<(&P, &P)> {
        match &self.kind {
            Kind::FromDependencyOf(p1, _, p2, _) => Some((p1, p2)),
            _ => None,
        }
    }

    /// Prior cause of two incompatibilities using the rule of resolution.
    pub(crate) fn prior_cause(
        incompat: IncompId<P, VS, M>,
        satisfier_cause: IncompId<P, VS, M>,
        package: &P,
        store: &Arena<Self>,
    ) -> Self {
        let kind = Kind::DerivedFrom(incompat, satisfier_cause);
        let mut package_terms = store[incompat].package_terms.clone();
        let t1 = package_terms.remove(package).unwrap();
        package_terms.merge(
            store[satisfier_cause]
                .package_terms
                .iter()
                .filter(|(p, _)| p != &package),
            |t1, t2| Some(t1.intersection(t2)),
        );
        let t2 = store[satisfier_cause].get(package).unwrap();
        let term = t1.union(t2);
        if term != Term::any() {
            package_terms.insert(package.clone(), term);
        }
        Self {
            package_terms,
            kind,
        }
    }

    /// Check if an incompatibility should mark the end of the algorithm, because it
    /// forces the selection of the root package.
    pub(crate) fn is_terminal(&self, root_package: &P, root_version: &VS::V) -> bool {
        if self.package_terms.len() != 1 {
            return false;
        }
        let (package, term) = self.package_terms.iter().next().unwrap();
        package == root_package && term.contains(root_version)
    }

    /// Get the term related to a given package, if it exists.
    pub(crate) fn get(&self, package: &P) -> Option<&Term<VS>> {
        self.package_terms.get(package)
    }

    /// Iterate over the packages and their terms.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (&P, &Term<VS>)> {
        self.package_terms.iter()
    }

    // Reporting ###############################################################

    /// Retrieve parent causes if of kind `DerivedFrom`.
    pub(crate) fn causes(&self) -> Option<(IncompId<P, VS, M>, IncompId<P, VS, M>)> {
        match &self.kind {
            Kind::DerivedFrom(id1, id2) => Some((*id1, *id2)),
            _ => None,
        }
    }

    /// Build a derivation tree for error reporting, given the store of all
    /// incompatibilities and a map from ids that appear more than once in the
    /// tree to their already-computed shared derivation tree.
    pub(crate) fn build_derivation_tree(
        id: IncompId<P, VS, M>,
        shared_ids: &Set<IncompId<P, VS, M>>,
        store: &Arena<Self>,
        precomputed: &Map<IncompId<P, VS, M>, Arc<DerivationTree<P, VS, M>>>,
    ) -> DerivationTree<P, VS, M> {
        match &store[id].kind {
            Kind::DerivedFrom(id1, id2) => {
                let cause1 = precomputed
                    .get(id1)
                    .expect("an id shared by the tree should already be precomputed")
                    .as_ref()
                    .clone();
                let cause2 = precomputed
                    .get(id2)
                    .expect("an id shared by the tree should already be precomputed")
                    .as_ref()
                    .clone();
                let derived = Derived {
                    terms: store[id].package_terms.as_map(),
                    shared_id: shared_ids.contains(&id).then(|| id.into_raw()),
                    cause1: Box::new(cause1),
                    cause2: Box::new(cause2),
                };
                DerivationTree::Derived(derived)
            }
            Kind::NotRoot(package, version) => {
                DerivationTree::External(External::NotRoot(package.clone(), version.clone()))
            }
            Kind::NoVersions(package, set) => {
                DerivationTree::External(External::NoVersions(package.clone(), set.clone()))
            }
            Kind::FromDependencyOf(package, set, dep_package, dep_set) => {
                DerivationTree::External(External::FromDependencyOf(
                    package.clone(),
                    set.clone(),
                    dep_package.clone(),
                    dep_set.clone(),
                ))
            }
            Kind::Custom(package, version, reason) => DerivationTree::External(External::Custom(
                package.clone(),
                VS::singleton(version.clone()),
                reason.clone(),
            )),
        }
    }

    /// Compute how a set of terms (usually the partial solution) relates to this
    /// incompatibility.
    pub(crate) fn relation(
        &self,
        mut term_in_partial_solution: impl FnMut(&P) -> Option<Term<VS>>,
    ) -> Relation<P, VS> {
        let mut relation = Relation::Satisfied;
        for (package, incompat_term) in self.package_terms.iter() {
            let term_in_solution = term_in_partial_solution(package);
            match term_in_solution.map(|term| incompat_term.relation_with(&term)) {
                Some(term::Relation::Satisfied) => {}
                Some(term::Relation::Contradicted) => {
                    return Relation::Contradicted((package.clone(), incompat_term.clone()));
                }
                None | Some(term::Relation::Inconclusive) => {
                    // A missing package is treated as providing an infinite amount of
                    // versions satisfying that term, so it can never contradict.
                    if relation == Relation::Satisfied {
                        relation = Relation::AlmostSatisfied(package.clone());
                    } else {
                        relation = Relation::Inconclusive;
                    }
                }
            }
        }
        relation
    }
}

impl<P: Package, VS: VersionSet, M: Eq + Clone + Debug + Display> Display
    for Incompatibility<P, VS, M>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use crate::report::{DefaultStringReportFormatter, ReportFormatter};
        write!(
            f,
            "{}",
            DefaultStringReportFormatter.format_terms(&self.package_terms.as_map())
        )
    }
}
