//! Test utilities and helpers for unidep integration tests.
//!
//! Provides a fixture repository builder that publishes mock artifacts in
//! the directory layout the resolver consumes.

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use unidep::{ArtifactMetadata, Config, VersionEntry};

/// A mock artifact published into a [`TestRepository`].
pub struct MockArtifact {
    pub group: String,
    pub artifact: String,
    pub version: String,
    pub packaging: String,
    pub classifier: Option<String>,
    pub dependencies: Vec<String>,
    pub content: Vec<u8>,
}

impl MockArtifact {
    pub fn new(group: &str, artifact: &str, version: &str) -> Self {
        Self {
            group: group.to_string(),
            artifact: artifact.to_string(),
            version: version.to_string(),
            packaging: "jar".to_string(),
            classifier: None,
            dependencies: Vec::new(),
            content: format!("{group}:{artifact}:{version}").into_bytes(),
        }
    }

    pub fn with_packaging(mut self, packaging: &str) -> Self {
        self.packaging = packaging.to_string();
        self
    }

    #[allow(dead_code)]
    pub fn with_classifier(mut self, classifier: &str) -> Self {
        self.classifier = Some(classifier.to_string());
        self
    }

    pub fn with_dependency(mut self, spec: &str) -> Self {
        self.dependencies.push(spec.to_string());
        self
    }

    pub fn with_content(mut self, content: &[u8]) -> Self {
        self.content = content.to_vec();
        self
    }
}

/// An on-disk fixture repository.
pub struct TestRepository {
    pub temp_dir: TempDir,
    pub root: PathBuf,
}

impl TestRepository {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path().to_path_buf();
        Self { temp_dir, root }
    }

    /// The repository location string for MAVEN_REPOS.
    pub fn location(&self) -> String {
        self.root.display().to_string()
    }

    /// Publish a mock artifact: bytes plus its entry in `artifact.json`.
    pub fn add(&self, artifact: &MockArtifact) {
        let dir = self
            .root
            .join(artifact.group.replace('.', "/"))
            .join(&artifact.artifact);
        fs::create_dir_all(&dir).expect("Failed to create artifact directory");

        let entry = VersionEntry {
            version: artifact.version.clone(),
            packaging: artifact.packaging.clone(),
            classifier: artifact.classifier.clone(),
            checksum: None,
            dependencies: artifact.dependencies.clone(),
        };

        let version_dir = dir.join(&artifact.version);
        fs::create_dir_all(&version_dir).expect("Failed to create version directory");
        fs::write(
            version_dir.join(entry.file_name(&artifact.artifact)),
            &artifact.content,
        )
        .expect("Failed to write artifact bytes");

        let metadata_path = dir.join("artifact.json");
        let mut metadata = if metadata_path.exists() {
            let content = fs::read_to_string(&metadata_path).unwrap();
            serde_json::from_str::<ArtifactMetadata>(&content).unwrap()
        } else {
            ArtifactMetadata {
                group: artifact.group.clone(),
                artifact: artifact.artifact.clone(),
                versions: Vec::new(),
            }
        };
        metadata.versions.push(entry);
        fs::write(
            &metadata_path,
            serde_json::to_string_pretty(&metadata).unwrap(),
        )
        .expect("Failed to write artifact metadata");
    }
}

/// A configuration pointed at fixture repositories only: no machine-local
/// cache, no remote repositories unless listed.
pub fn fixture_config(packages: &str, repos: &[&str]) -> Config {
    let mut config = Config::from_properties([
        ("PACKAGES_TO_COPY", packages),
        ("USE_MAVEN_LOCAL_REPO", "false"),
    ])
    .expect("Failed to build fixture config");
    config.maven_repos = repos.iter().map(|r| r.to_string()).collect();
    config
}
