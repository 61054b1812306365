//! Resolution result model and report rendering.
//!
//! The rendered report is the machine contract surrounding tools parse:
//! three known section headers, entries one per line sorted lexically,
//! sections separated by a single blank line and omitted entirely when
//! empty.

use crate::coordinate::Identity;
use crate::repository::ResolvedArtifact;
use std::fmt;

/// A `original --> resolved` report line.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ModifiedEntry {
    pub original: String,
    pub resolved: String,
}

impl fmt::Display for ModifiedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} --> {}", self.original, self.resolved)
    }
}

/// An identity no repository could satisfy, rendered `group:artifact:+`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct MissingEntry {
    pub identity: Identity,
}

impl fmt::Display for MissingEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:+", self.identity)
    }
}

/// The final outcome of one resolution invocation.
#[derive(Debug, Default)]
pub struct ResolutionResult {
    /// Materialized artifacts, sorted by rendered file name.
    pub copied: Vec<ResolvedArtifact>,
    pub missing: Vec<MissingEntry>,
    pub modified: Vec<ModifiedEntry>,
}

impl ResolutionResult {
    /// Sort each section into its rendered order and drop duplicates.
    pub fn normalize(&mut self) {
        self.copied.sort_by_key(|a| a.file_name());
        self.copied.dedup_by_key(|a| a.file_name());
        self.missing.sort();
        self.missing.dedup();
        self.modified.sort();
        self.modified.dedup();
    }

    /// Render the three-section textual report.
    pub fn render(&self) -> String {
        let mut sections: Vec<String> = Vec::new();

        if !self.copied.is_empty() {
            let mut section = String::from("Copied artifacts:");
            for artifact in &self.copied {
                section.push('\n');
                section.push_str(&artifact.file_name());
            }
            sections.push(section);
        }
        if !self.missing.is_empty() {
            let mut section = String::from("Missing artifacts:");
            for entry in &self.missing {
                section.push('\n');
                section.push_str(&entry.to_string());
            }
            sections.push(section);
        }
        if !self.modified.is_empty() {
            let mut section = String::from("Modified artifacts:");
            for entry in &self.modified {
                section.push('\n');
                section.push_str(&entry.to_string());
            }
            sections.push(section);
        }

        if sections.is_empty() {
            return String::new();
        }
        let mut report = sections.join("\n\n");
        report.push('\n');
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinate::{Coordinate, Version};

    fn artifact(group: &str, name: &str, version: &str, packaging: &str) -> ResolvedArtifact {
        ResolvedArtifact {
            coordinate: Coordinate::new(group, name),
            version: Version::new(version),
            packaging: packaging.to_string(),
            source: String::new(),
            bytes: Vec::new(),
        }
    }

    #[test]
    fn test_render_all_sections() {
        let mut result = ResolutionResult {
            copied: vec![
                artifact("com.android.support", "support-annotations", "26.1.0", "jar"),
                artifact("android.arch.core", "common", "1.0.0", "jar"),
            ],
            missing: vec![MissingEntry {
                identity: Identity::new("apackage.thatdoes", "notexist"),
            }],
            modified: vec![ModifiedEntry {
                original: "apackage.thatdoes:notexist:9.9.9".to_string(),
                resolved: "apackage.thatdoes:notexist:+".to_string(),
            }],
        };
        result.normalize();

        assert_eq!(
            result.render(),
            "Copied artifacts:\n\
             android.arch.core.common-1.0.0.jar\n\
             com.android.support.support-annotations-26.1.0.jar\n\
             \n\
             Missing artifacts:\n\
             apackage.thatdoes:notexist:+\n\
             \n\
             Modified artifacts:\n\
             apackage.thatdoes:notexist:9.9.9 --> apackage.thatdoes:notexist:+\n"
        );
    }

    #[test]
    fn test_empty_sections_omitted() {
        let mut result = ResolutionResult {
            copied: vec![artifact("android.arch.core", "common", "1.0.0", "jar")],
            ..Default::default()
        };
        result.normalize();
        assert_eq!(
            result.render(),
            "Copied artifacts:\nandroid.arch.core.common-1.0.0.jar\n"
        );
    }

    #[test]
    fn test_fully_empty_result_renders_nothing() {
        assert_eq!(ResolutionResult::default().render(), "");
    }

    #[test]
    fn test_normalize_dedups() {
        let mut result = ResolutionResult {
            modified: vec![
                ModifiedEntry {
                    original: "a:b:1.0".to_string(),
                    resolved: "a:b:2.0".to_string(),
                },
                ModifiedEntry {
                    original: "a:b:1.0".to_string(),
                    resolved: "a:b:2.0".to_string(),
                },
            ],
            ..Default::default()
        };
        result.normalize();
        assert_eq!(result.modified.len(), 1);
    }
}
