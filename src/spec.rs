//! Package specification parsing.
//!
//! A specification string names one or more coordinates separated by `;`,
//! each shaped `group:artifact[:version][:classifier][@packaging]`. A
//! missing version token means "latest available".
//!
//! # Examples
//!
//! ```
//! use unidep::spec::parse_packages;
//!
//! let (requests, errors) = parse_packages(
//!     "com.android.support:support-annotations:23.0.+;android.arch.core:common:1.0.0@aar",
//! );
//! assert_eq!(requests.len(), 2);
//! assert!(errors.is_empty());
//! ```

use crate::coordinate::{Coordinate, VersionConstraint};
use crate::{Error, Result};
use std::collections::BTreeSet;

/// Provenance label for requests that came straight from the caller.
pub const ROOT: &str = "root";

/// A single parsed dependency request.
#[derive(Debug, Clone)]
pub struct Request {
    pub coordinate: Coordinate,
    pub constraint: VersionConstraint,
    /// Identities that asked for this coordinate, or `"root"`.
    pub requested_by: BTreeSet<String>,
    /// The original request string, kept verbatim for report rendering.
    pub spec: String,
}

impl Request {
    /// A request originating from the caller's specification string.
    pub fn root(coordinate: Coordinate, constraint: VersionConstraint, spec: &str) -> Self {
        Self {
            coordinate,
            constraint,
            requested_by: BTreeSet::from([ROOT.to_string()]),
            spec: spec.to_string(),
        }
    }

    /// A request introduced by another artifact's metadata.
    pub fn child(
        coordinate: Coordinate,
        constraint: VersionConstraint,
        parent: &str,
        spec: &str,
    ) -> Self {
        Self {
            coordinate,
            constraint,
            requested_by: BTreeSet::from([parent.to_string()]),
            spec: spec.to_string(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.requested_by.contains(ROOT)
    }
}

/// Parse one `group:artifact[:version][:classifier][@packaging]` spec.
pub fn parse_one(spec: &str) -> Result<(Coordinate, VersionConstraint)> {
    let trimmed = spec.trim();
    if trimmed.is_empty() {
        return Err(malformed(spec, "empty specification"));
    }

    let (body, packaging) = match trimmed.rsplit_once('@') {
        Some((body, pkg)) => {
            if pkg.is_empty() {
                return Err(malformed(spec, "'@' with no packaging"));
            }
            (body, Some(pkg.to_string()))
        }
        None => (trimmed, None),
    };

    // Range versions contain ':'-free commas only, so a plain colon split is
    // safe for every recognized version shape.
    let parts: Vec<&str> = body.split(':').collect();
    if parts.len() < 2 {
        return Err(malformed(spec, "expected at least group:artifact"));
    }
    if parts.len() > 4 {
        return Err(malformed(
            spec,
            "expected at most group:artifact:version:classifier",
        ));
    }
    if parts[0].is_empty() {
        return Err(malformed(spec, "group is empty"));
    }
    if parts[1].is_empty() {
        return Err(malformed(spec, "artifact is empty"));
    }

    let constraint = VersionConstraint::parse(parts.get(2).copied().unwrap_or(""))
        .map_err(|reason| malformed(spec, &reason))?;

    let classifier = match parts.get(3) {
        Some(c) if c.is_empty() => return Err(malformed(spec, "classifier is empty")),
        Some(c) => Some(c.to_string()),
        None => None,
    };

    Ok((
        Coordinate {
            group: parts[0].to_string(),
            artifact: parts[1].to_string(),
            classifier,
            packaging,
        },
        constraint,
    ))
}

/// Parse a semicolon-separated specification string into root requests.
///
/// A malformed spec fails only itself; sibling specs keep going. The
/// caller decides what the collected errors mean for the exit code.
pub fn parse_packages(input: &str) -> (Vec<Request>, Vec<Error>) {
    let mut requests = Vec::new();
    let mut errors = Vec::new();

    for raw in input.split(';') {
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }
        match parse_one(raw) {
            Ok((coordinate, constraint)) => {
                requests.push(Request::root(coordinate, constraint, raw));
            }
            Err(err) => errors.push(err),
        }
    }

    (requests, errors)
}

fn malformed(spec: &str, reason: &str) -> Error {
    Error::MalformedSpec {
        spec: spec.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinate::Version;

    #[test]
    fn test_parse_group_artifact_only() {
        let (coord, constraint) = parse_one("com.google.firebase:firebase-common").unwrap();
        assert_eq!(coord.group, "com.google.firebase");
        assert_eq!(coord.artifact, "firebase-common");
        assert!(constraint.is_any());
        assert_eq!(coord.packaging, None);
    }

    #[test]
    fn test_parse_with_version_and_packaging() {
        let (coord, constraint) = parse_one("android.arch.core:common:1.0.0@aar").unwrap();
        assert_eq!(coord.packaging.as_deref(), Some("aar"));
        assert!(constraint.satisfies(&Version::new("1.0.0")));
        assert!(!constraint.satisfies(&Version::new("1.0.1")));
    }

    #[test]
    fn test_parse_with_classifier() {
        let (coord, _) = parse_one("org.test:artifact:1.0:sources").unwrap();
        assert_eq!(coord.classifier.as_deref(), Some("sources"));
    }

    #[test]
    fn test_parse_wildcard_version() {
        let (_, constraint) =
            parse_one("com.android.support:support-annotations:23.0.+").unwrap();
        assert!(constraint.satisfies(&Version::new("23.0.1")));
        assert!(!constraint.satisfies(&Version::new("24.0.0")));
    }

    #[test]
    fn test_malformed_specs_rejected() {
        assert!(parse_one("justonepart").is_err());
        assert!(parse_one(":artifact:1.0").is_err());
        assert!(parse_one("group::1.0").is_err());
        assert!(parse_one("a:b:c:d:e").is_err());
        assert!(parse_one("group:artifact:[1.0").is_err());
        assert!(parse_one("group:artifact:1.0@").is_err());
    }

    #[test]
    fn test_sibling_specs_survive_malformed_entry() {
        let (requests, errors) = parse_packages("good.group:good:1.0;bad spec here:;also.good:b");
        assert_eq!(requests.len(), 2);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("bad spec here"));
    }

    #[test]
    fn test_empty_segments_ignored() {
        let (requests, errors) = parse_packages(";;a.b:c:1.0;;");
        assert_eq!(requests.len(), 1);
        assert!(errors.is_empty());
        assert_eq!(requests[0].spec, "a.b:c:1.0");
        assert!(requests[0].is_root());
    }
}
