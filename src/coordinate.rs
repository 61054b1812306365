//! Maven-style coordinates, versions and version constraints.
//!
//! A [`Coordinate`] names an artifact; its conflict identity is the
//! `(group, artifact)` pair only; classifier, packaging and version are
//! attributes. [`Version`] orders Maven version strings by numeric segment
//! with a lexical fallback, and [`VersionConstraint`] is the closed set of
//! version requirements a package specification can carry.

use std::cmp::Ordering;
use std::fmt;

/// Conflict identity of a dependency: group + artifact, nothing else.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Identity {
    pub group: String,
    pub artifact: String,
}

impl Identity {
    pub fn new(group: &str, artifact: &str) -> Self {
        Self {
            group: group.to_string(),
            artifact: artifact.to_string(),
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.artifact)
    }
}

/// A dependency coordinate as requested or resolved.
///
/// `packaging: None` means "whatever the repository publishes"; the
/// concrete packaging is filled in from repository metadata at fetch time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coordinate {
    pub group: String,
    pub artifact: String,
    pub classifier: Option<String>,
    pub packaging: Option<String>,
}

impl Coordinate {
    pub fn new(group: &str, artifact: &str) -> Self {
        Self {
            group: group.to_string(),
            artifact: artifact.to_string(),
            classifier: None,
            packaging: None,
        }
    }

    pub fn identity(&self) -> Identity {
        Identity::new(&self.group, &self.artifact)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.artifact)
    }
}

/// A single dot-separated version segment.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Num(u64),
    Text(String),
}

/// An ordered Maven version string.
///
/// Segments are compared numerically when both sides parse as integers,
/// lexically otherwise; a version that is a strict segment-prefix of
/// another orders before it.
#[derive(Debug, Clone, Eq)]
pub struct Version {
    raw: String,
    segments: Vec<Segment>,
}

impl Version {
    pub fn new(raw: &str) -> Self {
        let segments = raw
            .split('.')
            .map(|s| match s.parse::<u64>() {
                Ok(n) => Segment::Num(n),
                Err(_) => Segment::Text(s.to_string()),
            })
            .collect();
        Self {
            raw: raw.to_string(),
            segments,
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The version with its final segment replaced by a `+` wildcard:
    /// `2.0.2` relaxes to the constraint rendered `2.0.+`, a single-segment
    /// version relaxes to the bare `+`.
    pub fn relaxed(&self) -> VersionConstraint {
        match self.raw.rfind('.') {
            Some(idx) => VersionConstraint::WildcardPrefix(self.raw[..=idx].to_string()),
            None => VersionConstraint::WildcardPrefix(String::new()),
        }
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        for pair in self.segments.iter().zip(other.segments.iter()) {
            let ord = match pair {
                (Segment::Num(a), Segment::Num(b)) => a.cmp(b),
                (Segment::Text(a), Segment::Text(b)) => a.cmp(b),
                (Segment::Num(a), Segment::Text(b)) => a.to_string().as_str().cmp(b.as_str()),
                (Segment::Text(a), Segment::Num(b)) => a.as_str().cmp(b.to_string().as_str()),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        self.segments.len().cmp(&other.segments.len())
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// A version requirement attached to a coordinate request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionConstraint {
    /// A concrete version; only equality satisfies it.
    Exact(Version),
    /// A `+` wildcard: any version whose string starts with the prefix.
    /// The empty prefix means "latest available".
    WildcardPrefix(String),
    /// Inclusive `[low,high]` range.
    Range(Version, Version),
    /// A `-SNAPSHOT` version: exact, but the plain base version is accepted
    /// when the snapshot itself is not published.
    Snapshot(Version),
}

impl VersionConstraint {
    /// Parse a version token from a package specification.
    ///
    /// Recognized shapes: exact (`1.0.0`), wildcard prefix (`23.0.+` or
    /// bare `+`), inclusive range (`[1.0,2.0]`), snapshot
    /// (`1.0.0-SNAPSHOT`). An empty token means "latest available".
    pub fn parse(token: &str) -> std::result::Result<Self, String> {
        let token = token.trim();
        if token.is_empty() || token == "+" || token.eq_ignore_ascii_case("LATEST") {
            return Ok(VersionConstraint::WildcardPrefix(String::new()));
        }
        if let Some(prefix) = token.strip_suffix('+') {
            if prefix.contains(['[', ']', ',']) {
                return Err(format!("wildcard prefix '{token}' contains range syntax"));
            }
            return Ok(VersionConstraint::WildcardPrefix(prefix.to_string()));
        }
        if token.starts_with('[') || token.ends_with(']') {
            let inner = token
                .strip_prefix('[')
                .and_then(|t| t.strip_suffix(']'))
                .ok_or_else(|| format!("unbalanced brackets in range '{token}'"))?;
            let (low, high) = inner
                .split_once(',')
                .ok_or_else(|| format!("range '{token}' is missing a comma"))?;
            if low.trim().is_empty() || high.trim().is_empty() {
                return Err(format!("range '{token}' has an empty bound"));
            }
            return Ok(VersionConstraint::Range(
                Version::new(low.trim()),
                Version::new(high.trim()),
            ));
        }
        if token.contains([',', '(', ')']) {
            return Err(format!("unrecognized version syntax '{token}'"));
        }
        if let Some(base) = token.strip_suffix("-SNAPSHOT") {
            return Ok(VersionConstraint::Snapshot(Version::new(base)));
        }
        Ok(VersionConstraint::Exact(Version::new(token)))
    }

    /// Does `candidate` satisfy this constraint?
    pub fn satisfies(&self, candidate: &Version) -> bool {
        match self {
            VersionConstraint::Exact(v) => candidate == v,
            VersionConstraint::WildcardPrefix(prefix) => candidate.raw().starts_with(prefix),
            VersionConstraint::Range(low, high) => candidate >= low && candidate <= high,
            VersionConstraint::Snapshot(base) => {
                candidate.raw() == format!("{}-SNAPSHOT", base.raw()) || candidate == base
            }
        }
    }

    /// True for the unconstrained "latest available" request.
    pub fn is_any(&self) -> bool {
        matches!(self, VersionConstraint::WildcardPrefix(p) if p.is_empty())
    }

    /// The highest candidate satisfying this constraint, if any.
    pub fn select<'a>(&self, candidates: &'a [Version]) -> Option<&'a Version> {
        candidates.iter().filter(|v| self.satisfies(v)).max()
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionConstraint::Exact(v) => write!(f, "{v}"),
            VersionConstraint::WildcardPrefix(prefix) => write!(f, "{prefix}+"),
            VersionConstraint::Range(low, high) => write!(f, "[{low},{high}]"),
            VersionConstraint::Snapshot(base) => write!(f, "{base}-SNAPSHOT"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::new(s)
    }

    #[test]
    fn test_numeric_segment_ordering() {
        assert!(v("24.0.0") > v("23.0.1"));
        assert!(v("2.0.10") > v("2.0.9"));
        assert!(v("1.0.0") < v("1.1"));
    }

    #[test]
    fn test_prefix_orders_before_longer() {
        assert!(v("1.0") < v("1.0.0"));
        assert_eq!(v("1.0.0"), v("1.0.0"));
    }

    #[test]
    fn test_lexical_fallback_for_text_segments() {
        assert!(v("1.0.0-SNAPSHOT") != v("1.0.0"));
        assert!(v("1.0.alpha") < v("1.0.beta"));
    }

    #[test]
    fn test_parse_exact() {
        let c = VersionConstraint::parse("1.0.0").unwrap();
        assert_eq!(c, VersionConstraint::Exact(v("1.0.0")));
        assert!(c.satisfies(&v("1.0.0")));
        assert!(!c.satisfies(&v("1.0.1")));
    }

    #[test]
    fn test_parse_wildcard_prefix() {
        let c = VersionConstraint::parse("23.0.+").unwrap();
        assert!(c.satisfies(&v("23.0.1")));
        assert!(c.satisfies(&v("23.0.12")));
        assert!(!c.satisfies(&v("23.1.0")));
        assert_eq!(c.to_string(), "23.0.+");
    }

    #[test]
    fn test_parse_empty_means_latest() {
        let c = VersionConstraint::parse("").unwrap();
        assert!(c.is_any());
        assert!(c.satisfies(&v("0.0.1")));
        assert_eq!(c.to_string(), "+");
    }

    #[test]
    fn test_parse_range_inclusive() {
        let c = VersionConstraint::parse("[1.0,2.0]").unwrap();
        assert!(c.satisfies(&v("1.0")));
        assert!(c.satisfies(&v("1.5.3")));
        assert!(c.satisfies(&v("2.0")));
        assert!(!c.satisfies(&v("2.0.1")));
    }

    #[test]
    fn test_parse_snapshot_tolerates_base() {
        let c = VersionConstraint::parse("1.2.0-SNAPSHOT").unwrap();
        assert!(c.satisfies(&v("1.2.0-SNAPSHOT")));
        assert!(c.satisfies(&v("1.2.0")));
        assert!(!c.satisfies(&v("1.2.1")));
    }

    #[test]
    fn test_parse_rejects_bad_range() {
        assert!(VersionConstraint::parse("[1.0").is_err());
        assert!(VersionConstraint::parse("[1.0,]").is_err());
        assert!(VersionConstraint::parse("1.0,2.0").is_err());
    }

    #[test]
    fn test_select_picks_maximum_satisfying() {
        let candidates = vec![v("23.0.0"), v("23.0.1"), v("24.0.0")];
        let c = VersionConstraint::parse("23.0.+").unwrap();
        assert_eq!(c.select(&candidates).unwrap().raw(), "23.0.1");
        let any = VersionConstraint::parse("+").unwrap();
        assert_eq!(any.select(&candidates).unwrap().raw(), "24.0.0");
    }

    #[test]
    fn test_relaxed_drops_last_segment() {
        assert_eq!(v("2.0.2").relaxed().to_string(), "2.0.+");
        assert_eq!(v("2").relaxed().to_string(), "+");
        assert!(v("2.0.2").relaxed().satisfies(&v("2.0.4")));
    }

    #[test]
    fn test_identity_display() {
        let id = Identity::new("com.android.support", "support-annotations");
        assert_eq!(id.to_string(), "com.android.support:support-annotations");
    }
}
