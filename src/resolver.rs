//! Transitive dependency graph expansion.
//!
//! Expansion is a breadth-first worklist over [`Request`]s with a memo
//! table keyed by `(group, artifact)` identity. The first visit of an
//! identity selects its best candidate version and expands that version's
//! metadata into child requests; later visits only accumulate constraints.
//! The graph is expand-once and never back-edited, so cyclic repository
//! metadata cannot loop and no reference cycles exist.

use crate::coordinate::{Identity, Version};
use crate::repository::RepositorySet;
use crate::spec::{self, Request, ROOT};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Accumulated resolution state for one identity.
#[derive(Debug, Default)]
pub struct IdentityState {
    /// Every request that targeted this identity, with provenance.
    pub requests: Vec<Request>,
    /// Versions published by the winning repository, ascending.
    pub available: Vec<Version>,
    /// Candidate selected on first visit; drives child expansion only,
    /// the conflict resolver makes the final choice.
    pub candidate: Option<Version>,
}

impl IdentityState {
    /// True when at least one published version satisfies every request.
    pub fn is_satisfiable(&self) -> bool {
        self.satisfying_max().is_some()
    }

    /// The highest published version satisfying every request, if any.
    pub fn satisfying_max(&self) -> Option<&Version> {
        self.available
            .iter()
            .filter(|v| self.requests.iter().all(|r| r.constraint.satisfies(v)))
            .max()
    }
}

/// The result of one graph expansion: identity to accumulated state.
#[derive(Debug, Default)]
pub struct Expansion {
    pub identities: BTreeMap<Identity, IdentityState>,
}

impl Expansion {
    /// Root-requested identities that transitively introduced `identity`.
    ///
    /// Walks provenance edges upward until hitting `"root"`; the returned
    /// set contains the root consumers on those chains (including
    /// `identity` itself when it was requested at the root).
    pub fn root_consumers(&self, identity: &Identity) -> BTreeSet<Identity> {
        let mut roots = BTreeSet::new();
        let mut frontier = VecDeque::from([identity.clone()]);
        let mut seen = BTreeSet::from([identity.clone()]);

        while let Some(current) = frontier.pop_front() {
            let Some(state) = self.identities.get(&current) else {
                continue;
            };
            for request in &state.requests {
                for parent in &request.requested_by {
                    if parent == ROOT {
                        roots.insert(current.clone());
                    } else if let Some(parent_id) = parse_identity(parent) {
                        if seen.insert(parent_id.clone()) {
                            frontier.push_back(parent_id);
                        }
                    }
                }
            }
        }
        roots
    }
}

fn parse_identity(label: &str) -> Option<Identity> {
    let (group, artifact) = label.split_once(':')?;
    Some(Identity::new(group, artifact))
}

/// Expands root requests into the full transitive request graph.
pub struct GraphResolver<'a> {
    repositories: &'a RepositorySet,
}

impl<'a> GraphResolver<'a> {
    pub fn new(repositories: &'a RepositorySet) -> Self {
        Self { repositories }
    }

    /// Breadth-first expansion from `roots`.
    pub fn expand(&self, roots: &[Request]) -> Expansion {
        let mut expansion = Expansion::default();
        let mut frontier: VecDeque<Request> = roots.iter().cloned().collect();

        while let Some(request) = frontier.pop_front() {
            let identity = request.coordinate.identity();

            if let Some(state) = expansion.identities.get_mut(&identity) {
                // Revisit: accumulate the constraint, never re-expand.
                state.requests.push(request);
                continue;
            }

            let available = self.repositories.list_versions(&identity);
            let candidate = request
                .constraint
                .select(&available)
                // Unsatisfied constraints retry unconstrained once, which
                // backs the `+` fallback reporting convention.
                .or_else(|| available.last())
                .cloned();

            if let Some(version) = &candidate {
                for dep_spec in self.repositories.dependencies_of(&identity, version) {
                    match spec::parse_one(&dep_spec) {
                        Ok((coordinate, constraint)) => {
                            frontier.push_back(Request::child(
                                coordinate,
                                constraint,
                                &identity.to_string(),
                                &dep_spec,
                            ));
                        }
                        // Broken metadata entries are skipped, not fatal.
                        Err(_) => continue,
                    }
                }
            }

            expansion.identities.insert(
                identity,
                IdentityState {
                    requests: vec![request],
                    available,
                    candidate,
                },
            );
        }

        expansion
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{ArtifactMetadata, DirRepository, Repository, VersionEntry};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn publish(root: &Path, group: &str, artifact: &str, versions: &[(&str, &[&str])]) {
        let dir = root.join(group.replace('.', "/")).join(artifact);
        fs::create_dir_all(&dir).unwrap();
        let metadata = ArtifactMetadata {
            group: group.to_string(),
            artifact: artifact.to_string(),
            versions: versions
                .iter()
                .map(|(version, deps)| VersionEntry {
                    version: version.to_string(),
                    packaging: "jar".to_string(),
                    classifier: None,
                    checksum: None,
                    dependencies: deps.iter().map(|d| d.to_string()).collect(),
                })
                .collect(),
        };
        fs::write(
            dir.join("artifact.json"),
            serde_json::to_string(&metadata).unwrap(),
        )
        .unwrap();
    }

    fn root_request(spec_str: &str) -> Request {
        let (coordinate, constraint) = spec::parse_one(spec_str).unwrap();
        Request::root(coordinate, constraint, spec_str)
    }

    #[test]
    fn test_transitive_expansion() {
        let temp = TempDir::new().unwrap();
        publish(
            temp.path(),
            "android.arch.core",
            "common",
            &[("1.0.0", &["com.android.support:support-annotations:26.1.0"])],
        );
        publish(
            temp.path(),
            "com.android.support",
            "support-annotations",
            &[("26.1.0", &[])],
        );
        let set = RepositorySet::new(vec![Repository::Dir(DirRepository::new(temp.path()))]);
        let expansion =
            GraphResolver::new(&set).expand(&[root_request("android.arch.core:common:1.0.0")]);

        assert_eq!(expansion.identities.len(), 2);
        let annotations = expansion
            .identities
            .get(&Identity::new("com.android.support", "support-annotations"))
            .unwrap();
        assert_eq!(annotations.candidate.as_ref().unwrap().raw(), "26.1.0");
        assert!(!annotations.requests[0].is_root());
    }

    #[test]
    fn test_revisit_accumulates_constraints() {
        let temp = TempDir::new().unwrap();
        publish(temp.path(), "org.test", "shared", &[("1.0", &[]), ("2.0", &[])]);
        publish(temp.path(), "org.test", "a", &[("1.0", &["org.test:shared:1.+"])]);
        publish(temp.path(), "org.test", "b", &[("1.0", &["org.test:shared:2.+"])]);
        let set = RepositorySet::new(vec![Repository::Dir(DirRepository::new(temp.path()))]);
        let expansion = GraphResolver::new(&set)
            .expand(&[root_request("org.test:a:1.0"), root_request("org.test:b:1.0")]);

        let shared = expansion
            .identities
            .get(&Identity::new("org.test", "shared"))
            .unwrap();
        assert_eq!(shared.requests.len(), 2);
        assert!(!shared.is_satisfiable());
    }

    #[test]
    fn test_cyclic_metadata_terminates() {
        let temp = TempDir::new().unwrap();
        publish(temp.path(), "org.test", "ping", &[("1.0", &["org.test:pong:1.0"])]);
        publish(temp.path(), "org.test", "pong", &[("1.0", &["org.test:ping:1.0"])]);
        let set = RepositorySet::new(vec![Repository::Dir(DirRepository::new(temp.path()))]);
        let expansion = GraphResolver::new(&set).expand(&[root_request("org.test:ping:1.0")]);
        assert_eq!(expansion.identities.len(), 2);
    }

    #[test]
    fn test_unknown_identity_has_no_candidate() {
        let temp = TempDir::new().unwrap();
        let set = RepositorySet::new(vec![Repository::Dir(DirRepository::new(temp.path()))]);
        let expansion =
            GraphResolver::new(&set).expand(&[root_request("apackage.thatdoes:notexist:9.9.9")]);
        let state = expansion
            .identities
            .get(&Identity::new("apackage.thatdoes", "notexist"))
            .unwrap();
        assert!(state.candidate.is_none());
        assert!(state.available.is_empty());
    }

    #[test]
    fn test_root_consumers_walks_provenance() {
        let temp = TempDir::new().unwrap();
        publish(temp.path(), "org.test", "leaf", &[("1.0", &[])]);
        publish(temp.path(), "org.test", "mid", &[("1.0", &["org.test:leaf:1.0"])]);
        publish(temp.path(), "org.test", "top", &[("1.0", &["org.test:mid:1.0"])]);
        let set = RepositorySet::new(vec![Repository::Dir(DirRepository::new(temp.path()))]);
        let expansion = GraphResolver::new(&set).expand(&[root_request("org.test:top:1.0")]);

        let roots = expansion.root_consumers(&Identity::new("org.test", "leaf"));
        assert_eq!(roots, BTreeSet::from([Identity::new("org.test", "top")]));
    }

    #[test]
    fn test_wildcard_selects_highest_matching_candidate() {
        let temp = TempDir::new().unwrap();
        publish(
            temp.path(),
            "com.android.support",
            "support-annotations",
            &[("23.0.0", &[]), ("23.0.1", &[]), ("24.0.0", &[])],
        );
        let set = RepositorySet::new(vec![Repository::Dir(DirRepository::new(temp.path()))]);
        let expansion = GraphResolver::new(&set)
            .expand(&[root_request("com.android.support:support-annotations:23.0.+")]);
        let state = expansion
            .identities
            .get(&Identity::new("com.android.support", "support-annotations"))
            .unwrap();
        assert_eq!(state.candidate.as_ref().unwrap().raw(), "23.0.1");
    }
}
