//! Legacy Android support library to AndroidX remapping.
//!
//! Runs after conflict resolution, over the final single chosen version
//! per identity. Remapped artifacts change coordinate and version and get
//! a Modified report entry; artifacts that merely reference legacy
//! coordinates are rewritten in place through the [`ReferenceRewriter`]
//! seam so the resolver never learns about archive internals. The whole
//! pass is idempotent: an already-modern artifact is untouched.

use crate::coordinate::{Coordinate, Identity, Version};
use crate::report::ModifiedEntry;
use crate::repository::{RepositorySet, ResolvedArtifact};
use regex::bytes::Regex;
use std::collections::BTreeMap;

/// Legacy to modern coordinate pairs with the minimum compatible version.
/// The databinding family takes its version from the `DATA_BINDING_VERSION`
/// hint instead.
const MAPPINGS: &[(&str, &str, &str, &str, &str)] = &[
    ("com.android.support", "support-annotations", "androidx.annotation", "annotation", "1.0.0"),
    ("com.android.support", "appcompat-v7", "androidx.appcompat", "appcompat", "1.0.0"),
    ("com.android.support", "support-v4", "androidx.legacy", "legacy-support-v4", "1.0.0"),
    ("com.android.support", "support-compat", "androidx.core", "core", "1.0.0"),
    ("com.android.support", "support-fragment", "androidx.fragment", "fragment", "1.0.0"),
    ("com.android.support", "support-media-compat", "androidx.media", "media", "1.0.0"),
    ("com.android.support", "recyclerview-v7", "androidx.recyclerview", "recyclerview", "1.0.0"),
    ("com.android.support", "cardview-v7", "androidx.cardview", "cardview", "1.0.0"),
    ("com.android.support", "customtabs", "androidx.browser", "browser", "1.0.0"),
    ("com.android.support", "design", "com.google.android.material", "material", "1.0.0"),
    ("com.android.support", "multidex", "androidx.multidex", "multidex", "2.0.0"),
    ("android.arch.core", "common", "androidx.arch.core", "core-common", "2.0.0"),
    ("android.arch.core", "runtime", "androidx.arch.core", "core-runtime", "2.0.0"),
    ("android.arch.lifecycle", "common", "androidx.lifecycle", "lifecycle-common", "2.0.0"),
    ("android.arch.lifecycle", "runtime", "androidx.lifecycle", "lifecycle-runtime", "2.0.0"),
];

const DATA_BINDING_MAPPINGS: &[(&str, &str, &str, &str)] = &[
    ("com.android.databinding", "baseLibrary", "androidx.databinding", "databinding-common"),
    ("com.android.databinding", "library", "androidx.databinding", "databinding-runtime"),
    ("com.android.databinding", "adapters", "androidx.databinding", "databinding-adapters"),
];

const DEFAULT_DATA_BINDING_VERSION: &str = "3.4.0";

/// One legacy to modern remapping.
#[derive(Debug, Clone)]
pub struct Mapping {
    pub legacy: Identity,
    pub modern: Identity,
    pub min_version: Version,
}

/// Rewrites coordinate references held inside artifact content.
///
/// Implementations own the archive-format knowledge; the resolver core
/// only ever sees bytes in, bytes out.
pub trait ReferenceRewriter {
    fn rewrite(&self, bytes: &[u8], mappings: &[Mapping]) -> Vec<u8>;
}

/// Textual rewriter: replaces `group:artifact` and `group/artifact` forms
/// of every legacy coordinate occurring in the content. Modern coordinates
/// never match a legacy pattern, which makes repeated application a no-op.
#[derive(Default)]
pub struct TextReferenceRewriter;

impl ReferenceRewriter for TextReferenceRewriter {
    fn rewrite(&self, bytes: &[u8], mappings: &[Mapping]) -> Vec<u8> {
        let mut out = bytes.to_vec();
        for mapping in mappings {
            let forms = [
                // group:artifact, as in dependency metadata.
                (
                    format!("{}:{}", mapping.legacy.group, mapping.legacy.artifact),
                    format!("{}:{}", mapping.modern.group, mapping.modern.artifact),
                ),
                // group/artifact path form, as in repository layouts.
                (
                    format!(
                        "{}/{}",
                        mapping.legacy.group.replace('.', "/"),
                        mapping.legacy.artifact
                    ),
                    format!(
                        "{}/{}",
                        mapping.modern.group.replace('.', "/"),
                        mapping.modern.artifact
                    ),
                ),
            ];
            for (needle, replacement) in forms {
                // Patterns are escaped literals; compilation cannot fail.
                if let Ok(pattern) = Regex::new(&regex::escape(&needle)) {
                    out = pattern
                        .replace_all(&out, replacement.as_bytes())
                        .into_owned();
                }
            }
        }
        out
    }
}

/// The remapping pass itself.
pub struct Jetifier {
    mappings: Vec<Mapping>,
    rewriter: Box<dyn ReferenceRewriter>,
}

impl Jetifier {
    pub fn new(data_binding_version: Option<&str>) -> Self {
        let mut mappings: Vec<Mapping> = MAPPINGS
            .iter()
            .map(|(lg, la, mg, ma, min)| Mapping {
                legacy: Identity::new(lg, la),
                modern: Identity::new(mg, ma),
                min_version: Version::new(min),
            })
            .collect();
        let data_binding =
            Version::new(data_binding_version.unwrap_or(DEFAULT_DATA_BINDING_VERSION));
        for (lg, la, mg, ma) in DATA_BINDING_MAPPINGS {
            mappings.push(Mapping {
                legacy: Identity::new(lg, la),
                modern: Identity::new(mg, ma),
                min_version: data_binding.clone(),
            });
        }
        Self {
            mappings,
            rewriter: Box::new(TextReferenceRewriter),
        }
    }

    pub fn with_rewriter(mut self, rewriter: Box<dyn ReferenceRewriter>) -> Self {
        self.rewriter = rewriter;
        self
    }

    pub fn mapping_for(&self, identity: &Identity) -> Option<&Mapping> {
        self.mappings
            .iter()
            .find(|mapping| mapping.legacy == *identity)
    }

    /// Remap and rewrite the final resolved set.
    ///
    /// `original_specs` maps each identity to the most specific original
    /// request string, used as the left side of Modified entries.
    pub fn apply(
        &self,
        artifacts: Vec<ResolvedArtifact>,
        repositories: &RepositorySet,
        original_specs: &BTreeMap<Identity, String>,
        modified: &mut Vec<ModifiedEntry>,
    ) -> Vec<ResolvedArtifact> {
        artifacts
            .into_iter()
            .map(|artifact| {
                let identity = artifact.coordinate.identity();
                match self.mapping_for(&identity) {
                    Some(mapping) => {
                        let original = original_specs
                            .get(&identity)
                            .cloned()
                            .unwrap_or_else(|| artifact.spec_string());
                        let remapped = self.remap(artifact, mapping, repositories);
                        modified.push(ModifiedEntry {
                            original,
                            resolved: remapped.spec_string(),
                        });
                        remapped
                    }
                    None => ResolvedArtifact {
                        bytes: self.rewriter.rewrite(&artifact.bytes, &self.mappings),
                        ..artifact
                    },
                }
            })
            .collect()
    }

    /// Replace a legacy artifact with its modern successor.
    ///
    /// Prefers the highest modern version the repository set publishes at
    /// or above the mapped minimum; when the modern artifact is not
    /// published at all, the legacy bytes are rewritten and carried over
    /// under the modern coordinate.
    fn remap(
        &self,
        artifact: ResolvedArtifact,
        mapping: &Mapping,
        repositories: &RepositorySet,
    ) -> ResolvedArtifact {
        let available = repositories.list_versions(&mapping.modern);
        let version = available
            .iter()
            .filter(|v| **v >= mapping.min_version)
            .max()
            .cloned()
            .unwrap_or_else(|| mapping.min_version.clone());

        let modern_coordinate = Coordinate {
            group: mapping.modern.group.clone(),
            artifact: mapping.modern.artifact.clone(),
            classifier: artifact.coordinate.classifier.clone(),
            packaging: None,
        };

        match repositories.fetch(&modern_coordinate, &version) {
            Ok(fetched) => ResolvedArtifact {
                bytes: self.rewriter.rewrite(&fetched.bytes, &self.mappings),
                ..fetched
            },
            Err(_) => ResolvedArtifact {
                coordinate: modern_coordinate,
                version,
                packaging: artifact.packaging.clone(),
                source: artifact.source.clone(),
                bytes: self.rewriter.rewrite(&artifact.bytes, &self.mappings),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_lookup() {
        let jetifier = Jetifier::new(None);
        let mapping = jetifier
            .mapping_for(&Identity::new("com.android.support", "support-annotations"))
            .unwrap();
        assert_eq!(mapping.modern, Identity::new("androidx.annotation", "annotation"));
        assert_eq!(mapping.min_version, Version::new("1.0.0"));
        assert!(jetifier
            .mapping_for(&Identity::new("androidx.annotation", "annotation"))
            .is_none());
    }

    #[test]
    fn test_data_binding_version_hint() {
        let jetifier = Jetifier::new(Some("3.6.0"));
        let mapping = jetifier
            .mapping_for(&Identity::new("com.android.databinding", "baseLibrary"))
            .unwrap();
        assert_eq!(mapping.min_version, Version::new("3.6.0"));
    }

    #[test]
    fn test_text_rewriter_replaces_both_forms() {
        let jetifier = Jetifier::new(None);
        let rewriter = TextReferenceRewriter;
        let content = b"depends=com.android.support:support-annotations \
                        path=com/android/support/support-annotations/26.1.0"
            .to_vec();
        let rewritten = rewriter.rewrite(&content, &jetifier.mappings);
        let text = String::from_utf8(rewritten).unwrap();
        assert!(text.contains("androidx.annotation:annotation"));
        assert!(text.contains("androidx/annotation/annotation/26.1.0"));
        assert!(!text.contains("com.android.support"));
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let jetifier = Jetifier::new(None);
        let rewriter = TextReferenceRewriter;
        let content = b"uses androidx.annotation:annotation only".to_vec();
        let once = rewriter.rewrite(&content, &jetifier.mappings);
        assert_eq!(once, content);
        let twice = rewriter.rewrite(&once, &jetifier.mappings);
        assert_eq!(twice, once);
    }
}
