//! Run configuration.
//!
//! A resolution invocation is parameterized by a flat set of recognized
//! options. They can come from a `unidep.toml` file in the working
//! directory, from a property map using the upper-case key names
//! (`PACKAGES_TO_COPY`, `TARGET_DIR`, `MAVEN_REPOS`,
//! `USE_MAVEN_LOCAL_REPO`, `USE_REMOTE_MAVEN_REPOS`, `USE_JETIFIER`,
//! `DATA_BINDING_VERSION`), or from CLI flags; later sources override
//! earlier ones.
//!
//! # Examples
//!
//! ```no_run
//! use unidep::Config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut config = Config::load()?;
//! config.packages_to_copy = "android.arch.core:common:1.0.0".to_string();
//! let repositories = config.repository_set()?;
//! # Ok(())
//! # }
//! ```

use crate::repository::{Repository, RepositorySet};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// The configuration file name looked up in the working directory.
pub const CONFIG_FILE: &str = "unidep.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Semicolon-delimited package specification string.
    #[serde(default)]
    pub packages_to_copy: String,

    /// Directory the resolved artifacts are copied into.
    #[serde(default = "default_target_dir")]
    pub target_dir: String,

    /// Ordered repository locations: directories or http(s) URLs.
    #[serde(default)]
    pub maven_repos: Vec<String>,

    /// Consult the machine-local repository cache first.
    #[serde(default = "default_true")]
    pub use_maven_local_repo: bool,

    /// Allow http(s) entries from `maven_repos`.
    #[serde(default = "default_true")]
    pub use_remote_maven_repos: bool,

    /// Remap legacy Android support coordinates to AndroidX.
    #[serde(default)]
    pub use_jetifier: bool,

    /// Version hint for the databinding family, consulted only when the
    /// Jetifier is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_binding_version: Option<String>,
}

fn default_target_dir() -> String {
    "Assets/Plugins/Android".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            packages_to_copy: String::new(),
            target_dir: default_target_dir(),
            maven_repos: Vec::new(),
            use_maven_local_repo: true,
            use_remote_maven_repos: true,
            use_jetifier: false,
            data_binding_version: None,
        }
    }
}

impl Config {
    /// Load `unidep.toml` from the working directory, or defaults when the
    /// file does not exist.
    pub fn load() -> Result<Self> {
        Self::load_from(CONFIG_FILE)
    }

    pub fn load_from(path: &str) -> Result<Self> {
        let path = PathBuf::from(shellexpand::tilde(path).into_owned());
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Apply one `KEY=value` property; unrecognized keys are ignored so a
    /// caller can hand over its whole property map.
    pub fn apply_property(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "PACKAGES_TO_COPY" => self.packages_to_copy = value.to_string(),
            "TARGET_DIR" => self.target_dir = value.to_string(),
            "MAVEN_REPOS" => {
                self.maven_repos = value
                    .split(';')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect();
            }
            "USE_MAVEN_LOCAL_REPO" => self.use_maven_local_repo = parse_bool(key, value)?,
            "USE_REMOTE_MAVEN_REPOS" => self.use_remote_maven_repos = parse_bool(key, value)?,
            "USE_JETIFIER" => self.use_jetifier = parse_bool(key, value)?,
            "DATA_BINDING_VERSION" => self.data_binding_version = Some(value.to_string()),
            _ => {}
        }
        Ok(())
    }

    /// Build a configuration from an iterator of `(key, value)` properties
    /// over the defaults.
    pub fn from_properties<'a, I>(properties: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut config = Self::default();
        for (key, value) in properties {
            config.apply_property(key, value)?;
        }
        Ok(config)
    }

    /// The expanded target directory path.
    pub fn target_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.target_dir).into_owned())
    }

    /// The machine-local repository cache location.
    ///
    /// `UNIDEP_LOCAL_REPO` overrides the default of
    /// `~/.m2/unidep-repository` (useful for testing).
    pub fn local_repo_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("UNIDEP_LOCAL_REPO") {
            if !path.is_empty() {
                return Some(PathBuf::from(path));
            }
        }
        dirs::home_dir().map(|home| home.join(".m2").join("unidep-repository"))
    }

    /// Assemble the ordered repository set: local cache first (when
    /// enabled), then `maven_repos` in configured order with remote
    /// entries gated by `use_remote_maven_repos`.
    pub fn repository_set(&self) -> Result<RepositorySet> {
        let mut repositories = Vec::new();
        let local = if self.use_maven_local_repo {
            Self::local_repo_path()
        } else {
            None
        };
        if let Some(path) = &local {
            repositories.push(Repository::from_location(&path.display().to_string())?);
        }
        for location in &self.maven_repos {
            let expanded = shellexpand::tilde(location).into_owned();
            let remote = expanded.starts_with("http://") || expanded.starts_with("https://");
            if remote && !self.use_remote_maven_repos {
                continue;
            }
            repositories.push(Repository::from_location(&expanded)?);
        }

        let mut set = RepositorySet::new(repositories);
        if let Some(path) = local {
            set = set.with_cache(path);
        }
        Ok(set)
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::Other(format!(
            "Invalid boolean '{value}' for {key}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.target_dir, "Assets/Plugins/Android");
        assert!(config.use_maven_local_repo);
        assert!(config.use_remote_maven_repos);
        assert!(!config.use_jetifier);
    }

    #[test]
    fn test_from_properties() {
        let config = Config::from_properties([
            ("PACKAGES_TO_COPY", "a.b:c:1.0;d.e:f"),
            ("TARGET_DIR", "/tmp/out"),
            ("MAVEN_REPOS", "/repo/one;https://repo.example.com/maven2"),
            ("USE_MAVEN_LOCAL_REPO", "false"),
            ("USE_JETIFIER", "1"),
            ("DATA_BINDING_VERSION", "3.6.0"),
            ("SOME_UNRELATED_KEY", "ignored"),
        ])
        .unwrap();

        assert_eq!(config.packages_to_copy, "a.b:c:1.0;d.e:f");
        assert_eq!(config.target_dir, "/tmp/out");
        assert_eq!(config.maven_repos.len(), 2);
        assert!(!config.use_maven_local_repo);
        assert!(config.use_jetifier);
        assert_eq!(config.data_binding_version.as_deref(), Some("3.6.0"));
    }

    #[test]
    fn test_invalid_boolean_rejected() {
        let mut config = Config::default();
        assert!(config.apply_property("USE_JETIFIER", "maybe").is_err());
    }

    #[test]
    fn test_remote_repos_gated() {
        let config = Config::from_properties([
            ("MAVEN_REPOS", "https://repo.example.com/maven2"),
            ("USE_MAVEN_LOCAL_REPO", "false"),
            ("USE_REMOTE_MAVEN_REPOS", "false"),
        ])
        .unwrap();
        let set = config.repository_set().unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_toml_round_trip() {
        let toml_text = r#"
            packages_to_copy = "a.b:c:1.0"
            target_dir = "/tmp/out"
            maven_repos = ["/repo/one"]
            use_jetifier = true
        "#;
        let config: Config = toml::from_str(toml_text).unwrap();
        assert_eq!(config.packages_to_copy, "a.b:c:1.0");
        assert!(config.use_jetifier);
        assert!(config.use_maven_local_repo);
    }
}
