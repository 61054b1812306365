//! Artifact repositories and the ordered repository set.
//!
//! A repository is a key to (metadata, bytes) lookup service in Maven
//! directory layout: metadata lives at
//! `<root>/<group-as-path>/<artifact>/artifact.json`, artifact bytes at
//! `<root>/<group-as-path>/<artifact>/<version>/<artifact>-<version>[-classifier].<ext>`.
//! Two kinds exist behind one enum, a local directory and an HTTP
//! endpoint, and a [`RepositorySet`] queries them in priority order with
//! fall-through on failure.

use crate::coordinate::{Coordinate, Identity, Version};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Metadata document for one artifact (`artifact.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    pub group: String,
    pub artifact: String,
    pub versions: Vec<VersionEntry>,
}

/// One published version of an artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionEntry {
    pub version: String,
    #[serde(default = "default_packaging")]
    pub packaging: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,
    /// SHA256 of the artifact bytes, hex-encoded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    /// Transitive dependencies as package spec strings.
    #[serde(default)]
    pub dependencies: Vec<String>,
}

fn default_packaging() -> String {
    "jar".to_string()
}

impl VersionEntry {
    /// Repository-relative file name for this entry.
    pub fn file_name(&self, artifact: &str) -> String {
        match &self.classifier {
            Some(classifier) => {
                format!("{}-{}-{}.{}", artifact, self.version, classifier, self.packaging)
            }
            None => format!("{}-{}.{}", artifact, self.version, self.packaging),
        }
    }
}

/// A fully resolved artifact with fetched bytes.
#[derive(Debug, Clone)]
pub struct ResolvedArtifact {
    pub coordinate: Coordinate,
    pub version: Version,
    pub packaging: String,
    /// Location string of the repository that supplied the bytes.
    pub source: String,
    pub bytes: Vec<u8>,
}

impl ResolvedArtifact {
    /// The materialized file name: `group.artifact-version[-classifier].ext`,
    /// with `srcaar` packaging renamed to `aar` on output.
    pub fn file_name(&self) -> String {
        let ext = if self.packaging == "srcaar" {
            "aar"
        } else {
            self.packaging.as_str()
        };
        let classifier = self
            .coordinate
            .classifier
            .as_deref()
            .map(|c| format!("-{c}"))
            .unwrap_or_default();
        format!(
            "{}.{}-{}{}.{}",
            self.coordinate.group, self.coordinate.artifact, self.version, classifier, ext
        )
    }

    /// `group:artifact:version`, the right-hand side of Modified entries.
    pub fn spec_string(&self) -> String {
        format!(
            "{}:{}:{}",
            self.coordinate.group, self.coordinate.artifact, self.version
        )
    }
}

fn group_path(group: &str) -> String {
    group.replace('.', "/")
}

/// A repository rooted at a local directory.
pub struct DirRepository {
    location: String,
    root: PathBuf,
}

impl DirRepository {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref().to_path_buf();
        Self {
            location: root.display().to_string(),
            root,
        }
    }

    fn artifact_dir(&self, identity: &Identity) -> PathBuf {
        self.root
            .join(group_path(&identity.group))
            .join(&identity.artifact)
    }

    fn metadata(&self, identity: &Identity) -> Result<Option<ArtifactMetadata>> {
        let path = self.artifact_dir(identity).join("artifact.json");
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn fetch_bytes(&self, identity: &Identity, entry: &VersionEntry) -> Result<Vec<u8>> {
        let path = self
            .artifact_dir(identity)
            .join(&entry.version)
            .join(entry.file_name(&identity.artifact));
        Ok(fs::read(path)?)
    }

    /// Store fetched bytes under this repository's layout (cache write-through).
    fn store(&self, identity: &Identity, entry: &VersionEntry, bytes: &[u8]) -> Result<()> {
        let dir = self.artifact_dir(identity).join(&entry.version);
        fs::create_dir_all(&dir)?;
        fs::write(dir.join(entry.file_name(&identity.artifact)), bytes)?;
        Ok(())
    }
}

/// A repository served over HTTP in the same layout as [`DirRepository`].
pub struct HttpRepository {
    location: String,
    base: url::Url,
    client: reqwest::blocking::Client,
}

impl HttpRepository {
    pub fn new(location: &str) -> Result<Self> {
        // A trailing slash makes Url::join treat the base as a directory.
        let normalized = format!("{}/", location.trim_end_matches('/'));
        Ok(Self {
            location: location.trim_end_matches('/').to_string(),
            base: url::Url::parse(&normalized)?,
            client: reqwest::blocking::Client::new(),
        })
    }

    fn metadata(&self, identity: &Identity) -> Result<Option<ArtifactMetadata>> {
        let url = self.base.join(&format!(
            "{}/{}/artifact.json",
            group_path(&identity.group),
            identity.artifact
        ))?;
        let response = self.client.get(url).send()?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = response.error_for_status()?;
        Ok(Some(response.json()?))
    }

    fn fetch_bytes(&self, identity: &Identity, entry: &VersionEntry) -> Result<Vec<u8>> {
        let url = self.base.join(&format!(
            "{}/{}/{}/{}",
            group_path(&identity.group),
            identity.artifact,
            entry.version,
            entry.file_name(&identity.artifact)
        ))?;
        let response = self.client.get(url).send()?.error_for_status()?;
        Ok(response.bytes()?.to_vec())
    }
}

/// One queryable artifact source.
pub enum Repository {
    Dir(DirRepository),
    Http(HttpRepository),
}

impl Repository {
    /// Build a repository from a configured location string: `http(s)://`
    /// URLs become HTTP repositories, anything else a local directory.
    pub fn from_location(location: &str) -> Result<Self> {
        if location.starts_with("http://") || location.starts_with("https://") {
            Ok(Repository::Http(HttpRepository::new(location)?))
        } else {
            Ok(Repository::Dir(DirRepository::new(location)))
        }
    }

    pub fn location(&self) -> &str {
        match self {
            Repository::Dir(repo) => &repo.location,
            Repository::Http(repo) => &repo.location,
        }
    }

    fn metadata(&self, identity: &Identity) -> Result<Option<ArtifactMetadata>> {
        match self {
            Repository::Dir(repo) => repo.metadata(identity),
            Repository::Http(repo) => repo.metadata(identity),
        }
    }

    fn fetch_bytes(&self, identity: &Identity, entry: &VersionEntry) -> Result<Vec<u8>> {
        match self {
            Repository::Dir(repo) => repo.fetch_bytes(identity, entry),
            Repository::Http(repo) => repo.fetch_bytes(identity, entry),
        }
    }
}

/// The ordered list of repositories consulted during resolution.
///
/// The first repository whose metadata answers for an identity wins that
/// identity; later repositories are not merged in. Read failures fall
/// through to the next repository, and only when every repository fails
/// does the identity become unresolved.
pub struct RepositorySet {
    repositories: Vec<Repository>,
    /// Write-through cache for bytes fetched over HTTP.
    cache_root: Option<DirRepository>,
    /// Identity to (winning repository index, metadata). None = nobody answered.
    metadata_cache: RefCell<HashMap<Identity, Option<(usize, ArtifactMetadata)>>>,
}

impl RepositorySet {
    pub fn new(repositories: Vec<Repository>) -> Self {
        Self {
            repositories,
            cache_root: None,
            metadata_cache: RefCell::new(HashMap::new()),
        }
    }

    /// Enable write-through caching of fetched bytes into `root`.
    pub fn with_cache<P: AsRef<Path>>(mut self, root: P) -> Self {
        self.cache_root = Some(DirRepository::new(root));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.repositories.is_empty()
    }

    /// Metadata for `identity` from the first repository that answers.
    fn winning_metadata(&self, identity: &Identity) -> Option<(usize, ArtifactMetadata)> {
        if let Some(cached) = self.metadata_cache.borrow().get(identity) {
            return cached.clone();
        }
        let mut winner = None;
        for (index, repository) in self.repositories.iter().enumerate() {
            match repository.metadata(identity) {
                Ok(Some(metadata)) if !metadata.versions.is_empty() => {
                    winner = Some((index, metadata));
                    break;
                }
                Ok(_) => continue,
                // Unreachable repository: fall through to the next one.
                Err(_) => continue,
            }
        }
        self.metadata_cache
            .borrow_mut()
            .insert(identity.clone(), winner.clone());
        winner
    }

    /// All published versions for `identity`, ascending. Empty when no
    /// repository answers.
    pub fn list_versions(&self, identity: &Identity) -> Vec<Version> {
        let Some((_, metadata)) = self.winning_metadata(identity) else {
            return Vec::new();
        };
        let mut versions: Vec<Version> = metadata
            .versions
            .iter()
            .map(|entry| Version::new(&entry.version))
            .collect();
        versions.sort();
        versions.dedup();
        versions
    }

    /// Dependency spec strings for an exact version of `identity`.
    pub fn dependencies_of(&self, identity: &Identity, version: &Version) -> Vec<String> {
        self.entry(identity, version, None)
            .map(|entry| entry.dependencies)
            .unwrap_or_default()
    }

    /// The version entry for `identity`@`version`, preferring a classifier
    /// match when one is requested.
    pub fn entry(
        &self,
        identity: &Identity,
        version: &Version,
        classifier: Option<&str>,
    ) -> Option<VersionEntry> {
        let (_, metadata) = self.winning_metadata(identity)?;
        let matching: Vec<&VersionEntry> = metadata
            .versions
            .iter()
            .filter(|entry| Version::new(&entry.version) == *version)
            .collect();
        matching
            .iter()
            .find(|entry| entry.classifier.as_deref() == classifier)
            .or_else(|| matching.first())
            .map(|entry| (*entry).clone())
    }

    /// Fetch the bytes for `coordinate`@`version`.
    ///
    /// Tries the winning repository first, then every later repository that
    /// also publishes the version; checksum mismatches count as repository
    /// failures. Errors only when all candidates fail.
    pub fn fetch(&self, coordinate: &Coordinate, version: &Version) -> Result<ResolvedArtifact> {
        let identity = coordinate.identity();
        let Some((winner, _)) = self.winning_metadata(&identity) else {
            return Err(Error::RepositoryUnavailable {
                repository: "<all>".to_string(),
                reason: format!("no repository publishes {identity}"),
            });
        };
        let Some(entry) = self.entry(&identity, version, coordinate.classifier.as_deref()) else {
            return Err(Error::RepositoryUnavailable {
                repository: "<all>".to_string(),
                reason: format!("{identity}:{version} is not published"),
            });
        };

        let mut last_failure = String::new();
        for (index, repository) in self.repositories.iter().enumerate() {
            if index < winner {
                continue;
            }
            match repository.fetch_bytes(&identity, &entry) {
                Ok(bytes) => {
                    if let Some(expected) = &entry.checksum {
                        if !checksum_matches(&bytes, expected) {
                            last_failure = format!(
                                "checksum mismatch for {} from {}",
                                entry.file_name(&identity.artifact),
                                repository.location()
                            );
                            continue;
                        }
                    }
                    if matches!(repository, Repository::Http(_)) {
                        if let Some(cache) = &self.cache_root {
                            // Best effort; a failed cache write never fails the fetch.
                            let _ = cache.store(&identity, &entry, &bytes);
                        }
                    }
                    return Ok(ResolvedArtifact {
                        coordinate: Coordinate {
                            classifier: entry.classifier.clone(),
                            ..coordinate.clone()
                        },
                        version: version.clone(),
                        packaging: entry.packaging.clone(),
                        source: repository.location().to_string(),
                        bytes,
                    });
                }
                Err(err) => {
                    last_failure = format!("{}: {err}", repository.location());
                    continue;
                }
            }
        }

        Err(Error::RepositoryUnavailable {
            repository: "<all>".to_string(),
            reason: last_failure,
        })
    }
}

fn checksum_matches(bytes: &[u8], expected: &str) -> bool {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let computed = format!("{:x}", hasher.finalize());
    computed.eq_ignore_ascii_case(expected)
}
