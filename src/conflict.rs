//! Conflict resolution: one chosen version per identity.
//!
//! Collapses the accumulated constraint sets of a graph expansion into a
//! single version per `(group, artifact)` identity, applying the
//! forced-upgrade policy when siblings disagree and the version-lock
//! exception list for coordinate families that opt out of lock-step
//! upgrades.

use crate::coordinate::{Coordinate, Identity, Version, VersionConstraint};
use crate::repository::RepositorySet;
use crate::report::{MissingEntry, ModifiedEntry};
use crate::resolver::{Expansion, GraphResolver};
use crate::spec::Request;
use crate::Error;
use std::collections::BTreeSet;

/// Identities matched by this policy are resolved independently and never
/// relaxed or bumped as part of a forced-upgrade chain.
pub trait VersionLockPolicy {
    fn is_exempt(&self, identity: &Identity) -> bool;
}

/// Exception list keyed by coordinate family patterns (`*` wildcards).
///
/// A pattern containing `:` matches against `group:artifact`, otherwise
/// against the artifact name alone.
pub struct FamilyExceptions {
    patterns: Vec<String>,
}

impl FamilyExceptions {
    pub fn new(patterns: Vec<String>) -> Self {
        Self { patterns }
    }
}

impl Default for FamilyExceptions {
    fn default() -> Self {
        // Unity wrapper packages version independently of the Android core
        // libraries they pull in.
        Self::new(vec![
            "firebase-*-unity".to_string(),
            "play-services-*-unity".to_string(),
        ])
    }
}

impl VersionLockPolicy for FamilyExceptions {
    fn is_exempt(&self, identity: &Identity) -> bool {
        self.patterns.iter().any(|pattern| {
            if pattern.contains(':') {
                glob_match(pattern, &identity.to_string())
            } else {
                glob_match(pattern, &identity.artifact)
            }
        })
    }
}

fn glob_match(pattern: &str, value: &str) -> bool {
    let pieces: Vec<&str> = pattern.split('*').collect();
    if pieces.len() == 1 {
        return pattern == value;
    }
    let mut rest = value;
    for (index, piece) in pieces.iter().enumerate() {
        if piece.is_empty() {
            continue;
        }
        if index == 0 {
            match rest.strip_prefix(piece) {
                Some(tail) => rest = tail,
                None => return false,
            }
        } else if index == pieces.len() - 1 {
            return rest.ends_with(piece);
        } else {
            match rest.find(piece) {
                Some(at) => rest = &rest[at + piece.len()..],
                None => return false,
            }
        }
    }
    true
}

/// One identity's final choice, with attributes merged from its requests.
#[derive(Debug, Clone)]
pub struct ChosenArtifact {
    pub coordinate: Coordinate,
    pub version: Version,
}

/// The conflict resolver's output, pre-fetch.
#[derive(Debug, Default)]
pub struct Outcome {
    pub chosen: Vec<ChosenArtifact>,
    pub missing: Vec<MissingEntry>,
    pub modified: Vec<ModifiedEntry>,
}

pub struct ConflictResolver<'a, P: VersionLockPolicy> {
    repositories: &'a RepositorySet,
    policy: &'a P,
}

impl<'a, P: VersionLockPolicy> ConflictResolver<'a, P> {
    pub fn new(repositories: &'a RepositorySet, policy: &'a P) -> Self {
        Self {
            repositories,
            policy,
        }
    }

    /// Resolve `roots` to one version per identity.
    ///
    /// Per identity, in order: unanimous exact version; highest version
    /// satisfying every constraint; forced upgrade of the conflicting
    /// consumers; highest available anywhere; missing.
    pub fn resolve(&self, roots: &[Request]) -> Outcome {
        let graph = GraphResolver::new(self.repositories);
        let mut expansion = graph.expand(roots);
        let mut modified: Vec<ModifiedEntry> = Vec::new();

        let conflicted: Vec<Identity> = expansion
            .identities
            .iter()
            .filter(|(_, state)| !state.available.is_empty() && !state.is_satisfiable())
            .map(|(identity, _)| identity.clone())
            .collect();

        if !conflicted.is_empty() {
            match self.forced_upgrade(&graph, roots, &expansion, &conflicted) {
                Ok((upgraded, relaxed)) => {
                    expansion = upgraded;
                    for (identity, original_spec, constraint) in relaxed {
                        modified.push(ModifiedEntry {
                            original: original_spec,
                            resolved: format!("{identity}:{constraint}"),
                        });
                    }
                }
                // No upgrade chain satisfies all consumers; recovered below
                // by the highest-available fallback per identity.
                Err(_) => {}
            }
        }

        let mut outcome = Outcome {
            modified,
            ..Default::default()
        };

        for (identity, state) in &expansion.identities {
            if state.available.is_empty() {
                outcome.missing.push(MissingEntry {
                    identity: identity.clone(),
                });
                if let Some(request) = most_specific(&state.requests) {
                    if !request.constraint.is_any() {
                        outcome.modified.push(ModifiedEntry {
                            original: request.spec.clone(),
                            resolved: format!("{identity}:+"),
                        });
                    }
                }
                continue;
            }

            let version = match state.satisfying_max() {
                Some(version) => {
                    // Merging constraints can land on a version none of the
                    // original requests named; that upgrade is reported
                    // against the most specific request.
                    if let Some(request) = most_specific(&state.requests) {
                        let named_exactly = match &request.constraint {
                            VersionConstraint::Exact(named) => named == version,
                            _ => state.requests.len() == 1,
                        };
                        if !named_exactly {
                            outcome.modified.push(ModifiedEntry {
                                original: request.spec.clone(),
                                resolved: format!("{identity}:{version}"),
                            });
                        }
                    }
                    version.clone()
                }
                None => {
                    // Highest-available fallback; the most specific request
                    // is reported modified to a bare wildcard.
                    let fallback = state
                        .available
                        .last()
                        .cloned()
                        .unwrap_or_else(|| Version::new("0"));
                    if let Some(request) = most_specific(&state.requests) {
                        outcome.modified.push(ModifiedEntry {
                            original: request.spec.clone(),
                            resolved: format!("{identity}:+"),
                        });
                    }
                    fallback
                }
            };

            outcome.chosen.push(ChosenArtifact {
                coordinate: merged_coordinate(identity, &state.requests),
                version,
            });
        }

        outcome
    }

    /// Search for the minimal version increase of the conflicting root
    /// consumers that makes every shared downstream identity satisfiable.
    ///
    /// Returns the accepted expansion plus one relaxation record per
    /// consumer, or [`Error::UnresolvableConflict`] when no upgrade chain
    /// works; the caller recovers with the highest-available fallback.
    #[allow(clippy::type_complexity)]
    fn forced_upgrade(
        &self,
        graph: &GraphResolver<'_>,
        roots: &[Request],
        expansion: &Expansion,
        conflicted: &[Identity],
    ) -> Result<(Expansion, Vec<(Identity, String, VersionConstraint)>), Error> {
        let unresolvable = |reason: &str| Error::UnresolvableConflict {
            identity: conflicted
                .first()
                .map(ToString::to_string)
                .unwrap_or_default(),
            reason: reason.to_string(),
        };

        let mut consumers: BTreeSet<Identity> = BTreeSet::new();
        for identity in conflicted {
            for consumer in expansion.root_consumers(identity) {
                // A self-conflict between root constraints has no shared
                // downstream to repair; that case is the highest-available
                // fallback's.
                if consumer == *identity {
                    continue;
                }
                if self.policy.is_exempt(&consumer) {
                    continue;
                }
                consumers.insert(consumer);
            }
        }
        if consumers.is_empty() {
            return Err(unresolvable("no upgradable consumers"));
        }

        // Per consumer: the relaxed constraint and its ascending candidate
        // ladder, floored at the originally selected version.
        let mut ladders: Vec<(Identity, String, VersionConstraint, Vec<Version>)> = Vec::new();
        for consumer in consumers {
            let state = expansion
                .identities
                .get(&consumer)
                .ok_or_else(|| unresolvable("consumer missing from expansion"))?;
            let root_request = most_specific(
                &state
                    .requests
                    .iter()
                    .filter(|r| r.is_root())
                    .cloned()
                    .collect::<Vec<_>>(),
            )
            .ok_or_else(|| unresolvable("consumer has no root request"))?
            .clone();

            let floor = match &root_request.constraint {
                VersionConstraint::Exact(v) | VersionConstraint::Snapshot(v) => Some(v.clone()),
                VersionConstraint::Range(low, _) => Some(low.clone()),
                VersionConstraint::WildcardPrefix(_) => state.candidate.clone(),
            };
            let relaxed = match &root_request.constraint {
                VersionConstraint::WildcardPrefix(_) => root_request.constraint.clone(),
                VersionConstraint::Exact(v) | VersionConstraint::Snapshot(v) => v.relaxed(),
                VersionConstraint::Range(low, _) => low.relaxed(),
            };

            let mut ladder: Vec<Version> = state
                .available
                .iter()
                .filter(|v| relaxed.satisfies(v))
                .cloned()
                .collect();
            if let Some(floor) = &floor {
                ladder.retain(|v| v >= floor);
            }
            if ladder.is_empty() {
                return Err(unresolvable("consumer has no candidate upgrades"));
            }
            ladders.push((consumer, root_request.spec.clone(), relaxed, ladder));
        }

        let limits: Vec<usize> = ladders.iter().map(|(_, _, _, l)| l.len() - 1).collect();
        let max_total: usize = limits.iter().sum();

        for total in 0..=max_total {
            for combo in assignments_with_total(&limits, total) {
                let pinned: Vec<Request> = roots
                    .iter()
                    .map(|request| {
                        let identity = request.coordinate.identity();
                        match ladders
                            .iter()
                            .position(|(consumer, _, _, _)| *consumer == identity)
                        {
                            Some(index) if request.is_root() => {
                                let version = ladders[index].3[combo[index]].clone();
                                Request {
                                    constraint: VersionConstraint::Exact(version),
                                    ..request.clone()
                                }
                            }
                            _ => request.clone(),
                        }
                    })
                    .collect();

                let candidate = graph.expand(&pinned);
                let all_satisfiable = candidate
                    .identities
                    .values()
                    .all(|state| state.available.is_empty() || state.is_satisfiable());
                if all_satisfiable {
                    let relaxed = ladders
                        .into_iter()
                        .map(|(identity, spec, constraint, _)| (identity, spec, constraint))
                        .collect();
                    return Ok((candidate, relaxed));
                }
            }
        }

        Err(unresolvable("no assignment satisfies every consumer"))
    }
}

/// Index assignments over `limits` whose indices sum to `total`, in
/// lexicographic order, the deterministic "minimal total increase first"
/// enumeration.
fn assignments_with_total(limits: &[usize], total: usize) -> Vec<Vec<usize>> {
    let mut out = Vec::new();
    let mut current = Vec::with_capacity(limits.len());
    fill_assignment(limits, total, &mut current, &mut out);
    out
}

fn fill_assignment(
    limits: &[usize],
    remaining: usize,
    current: &mut Vec<usize>,
    out: &mut Vec<Vec<usize>>,
) {
    if limits.is_empty() {
        if remaining == 0 {
            out.push(current.clone());
        }
        return;
    }
    let cap = limits[0].min(remaining);
    for index in 0..=cap {
        current.push(index);
        fill_assignment(&limits[1..], remaining - index, current, out);
        current.pop();
    }
}

fn specificity(constraint: &VersionConstraint) -> u8 {
    match constraint {
        VersionConstraint::Exact(_) => 4,
        VersionConstraint::Snapshot(_) => 3,
        VersionConstraint::Range(_, _) => 2,
        VersionConstraint::WildcardPrefix(p) if !p.is_empty() => 1,
        VersionConstraint::WildcardPrefix(_) => 0,
    }
}

/// The most specific request for an identity; its spec string is the left
/// side of Modified report entries.
pub(crate) fn most_specific(requests: &[Request]) -> Option<&Request> {
    requests.iter().max_by_key(|request| {
        (
            specificity(&request.constraint),
            request.is_root(),
            request.spec.len(),
            std::cmp::Reverse(request.spec.clone()),
        )
    })
}

/// Merge request attributes into the fetch coordinate: classifier and
/// packaging come from the first request that names them.
fn merged_coordinate(identity: &Identity, requests: &[Request]) -> Coordinate {
    Coordinate {
        group: identity.group.clone(),
        artifact: identity.artifact.clone(),
        classifier: requests
            .iter()
            .find_map(|request| request.coordinate.classifier.clone()),
        packaging: requests
            .iter()
            .find_map(|request| request.coordinate.packaging.clone()),
    }
}
