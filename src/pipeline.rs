//! End-to-end resolution pipeline.
//!
//! Wires the stages together in their fixed order (parse, graph
//! expansion, conflict resolution, fetch, Jetifier, report) so the
//! CLI and tests share one entry point. Each stage consumes its
//! predecessor's output and produces a fresh result set; nothing is
//! mutated upstream.
//!
//! # Examples
//!
//! ```no_run
//! use unidep::{pipeline, Config};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_properties([
//!     ("PACKAGES_TO_COPY", "android.arch.core:common:1.0.0"),
//!     ("MAVEN_REPOS", "/opt/fixtures/repo"),
//! ])?;
//! let resolution = pipeline::run(&config)?;
//! print!("{}", resolution.result.render());
//! # Ok(())
//! # }
//! ```

use crate::config::Config;
use crate::conflict::{self, ConflictResolver, FamilyExceptions};
use crate::coordinate::Identity;
use crate::jetifier::Jetifier;
use crate::materializer;
use crate::report::{MissingEntry, ModifiedEntry, ResolutionResult};
use crate::spec::{self, Request};
use crate::{Error, Result};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// One resolution invocation's full outcome.
#[derive(Debug)]
pub struct Resolution {
    pub result: ResolutionResult,
    /// Malformed specs encountered while parsing; siblings still resolved.
    pub spec_errors: Vec<Error>,
}

/// Resolve the configured packages without touching the target directory.
pub fn run(config: &Config) -> Result<Resolution> {
    let (requests, spec_errors) = spec::parse_packages(&config.packages_to_copy);
    let repositories = config.repository_set()?;
    let policy = FamilyExceptions::default();
    let outcome = ConflictResolver::new(&repositories, &policy).resolve(&requests);

    let original_specs = original_specs_by_identity(&requests);

    let mut result = ResolutionResult {
        copied: Vec::new(),
        missing: outcome.missing,
        modified: outcome.modified,
    };

    let mut artifacts = Vec::new();
    for chosen in &outcome.chosen {
        match repositories.fetch(&chosen.coordinate, &chosen.version) {
            Ok(artifact) => {
                let identity = chosen.coordinate.identity();
                let original = original_specs
                    .get(&identity)
                    .cloned()
                    .unwrap_or_else(|| identity.to_string());
                if let Some(requested) = &chosen.coordinate.packaging {
                    if *requested != artifact.packaging {
                        result.modified.push(ModifiedEntry {
                            original: original.clone(),
                            resolved: format!(
                                "{}@{}",
                                artifact.spec_string(),
                                artifact.packaging
                            ),
                        });
                    }
                }
                // The repository applied a classifier default the request
                // did not ask for.
                if chosen.coordinate.classifier != artifact.coordinate.classifier {
                    let resolved = match &artifact.coordinate.classifier {
                        Some(classifier) => {
                            format!("{}:{}", artifact.spec_string(), classifier)
                        }
                        None => artifact.spec_string(),
                    };
                    result.modified.push(ModifiedEntry { original, resolved });
                }
                artifacts.push(artifact);
            }
            // Every repository failed to hand over the bytes: the identity
            // is missing, not fatal.
            Err(_) => {
                result.missing.push(MissingEntry {
                    identity: chosen.coordinate.identity(),
                });
            }
        }
    }

    if config.use_jetifier {
        let jetifier = Jetifier::new(config.data_binding_version.as_deref());
        artifacts = jetifier.apply(artifacts, &repositories, &original_specs, &mut result.modified);
    }

    result.copied = artifacts;
    result.normalize();

    Ok(Resolution {
        result,
        spec_errors,
    })
}

/// Copy a finished resolution's artifacts into the configured target
/// directory. Fatal on the first write failure.
pub fn materialize(resolution: &Resolution, config: &Config) -> Result<Vec<PathBuf>> {
    materializer::materialize(&resolution.result.copied, &config.target_path())
}

fn original_specs_by_identity(requests: &[Request]) -> BTreeMap<Identity, String> {
    let mut grouped: BTreeMap<Identity, Vec<Request>> = BTreeMap::new();
    for request in requests {
        grouped
            .entry(request.coordinate.identity())
            .or_default()
            .push(request.clone());
    }
    grouped
        .into_iter()
        .filter_map(|(identity, requests)| {
            conflict::most_specific(&requests).map(|request| (identity, request.spec.clone()))
        })
        .collect()
}
