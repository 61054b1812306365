//! unidep - Maven-style dependency resolver for Unity plugins
//!
//! unidep computes a single conflict-free set of concrete artifact
//! versions from a set of Maven-style package specifications, fetches the
//! binary artifacts from an ordered list of repositories, optionally
//! remaps legacy Android support libraries to their AndroidX successors,
//! and copies the results into a Unity project's plugin directory. It
//! provides:
//!
//! - Transitive dependency resolution with constraint accumulation
//! - Forced-upgrade conflict resolution with a pluggable version-lock
//!   exception policy
//! - Optional Jetifier remapping including internal-reference rewriting
//! - Atomic artifact materialization with normalized file naming
//! - A stable Copied/Missing/Modified textual report for calling tools
//!
//! # Examples
//!
//! ```no_run
//! use unidep::{pipeline, Config};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_properties([
//!     ("PACKAGES_TO_COPY", "com.android.support:support-annotations:26.1.0"),
//!     ("MAVEN_REPOS", "/path/to/repo"),
//!     ("TARGET_DIR", "Assets/Plugins/Android"),
//! ])?;
//!
//! let resolution = pipeline::run(&config)?;
//! pipeline::materialize(&resolution, &config)?;
//! print!("{}", resolution.result.render());
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`coordinate`] - Coordinates, versions and version constraints
//! - [`spec`] - Package specification parsing
//! - [`repository`] - Repository kinds and the ordered repository set
//! - [`resolver`] - Transitive dependency graph expansion
//! - [`conflict`] - Conflict resolution and forced upgrades
//! - [`jetifier`] - Legacy support library to AndroidX remapping
//! - [`materializer`] - Artifact copying into the target directory
//! - [`report`] - The Copied/Missing/Modified report
//! - [`config`] - Run configuration
//! - [`pipeline`] - Stage orchestration
//! - [`error`] - Error types and result handling

pub mod config;
pub mod conflict;
pub mod coordinate;
pub mod error;
pub mod jetifier;
pub mod materializer;
pub mod pipeline;
pub mod report;
pub mod repository;
pub mod resolver;
pub mod spec;

pub use config::{Config, CONFIG_FILE};
pub use conflict::{ChosenArtifact, ConflictResolver, FamilyExceptions, VersionLockPolicy};
pub use coordinate::{Coordinate, Identity, Version, VersionConstraint};
pub use error::{Error, Result};
pub use jetifier::{Jetifier, ReferenceRewriter, TextReferenceRewriter};
pub use materializer::{materialize, materialize_artifact};
pub use pipeline::Resolution;
pub use report::{MissingEntry, ModifiedEntry, ResolutionResult};
pub use repository::{
    ArtifactMetadata, DirRepository, HttpRepository, Repository, RepositorySet, ResolvedArtifact,
    VersionEntry,
};
pub use resolver::{Expansion, GraphResolver};
pub use spec::{parse_one, parse_packages, Request};
