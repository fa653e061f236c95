//! Canonical OU path construction
//!
//! Paths are LDAP-style distinguished names written leaf-first:
//! `OU=2024,OU=Math,OU=Base,DC=example,DC=com`. Building a path is a
//! pure string transform with no dependency on directory state.

use serde::{Deserialize, Serialize};

/// A canonical hierarchical directory path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DirectoryPath(String);

impl DirectoryPath {
    pub fn new(path: impl Into<String>) -> Self {
        DirectoryPath(path.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison against another path string.
    pub fn eq_ignore_case(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other.trim())
    }

    /// Path segments in leaf-first order, trimmed.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(',').map(str::trim).filter(|s| !s.is_empty())
    }

    /// Name of the leftmost (most specific) OU segment.
    pub fn leaf_name(&self) -> Option<&str> {
        self.segments()
            .find(|s| is_ou_segment(s))
            .and_then(|s| s.split_once('='))
            .map(|(_, name)| name.trim())
    }

    /// Number of OU segments; a first-level container directly under
    /// the domain root has depth 1.
    pub fn ou_depth(&self) -> usize {
        self.segments().filter(|s| is_ou_segment(s)).count()
    }
}

impl std::fmt::Display for DirectoryPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DirectoryPath {
    fn from(value: &str) -> Self {
        DirectoryPath::new(value)
    }
}

fn is_ou_segment(segment: &str) -> bool {
    segment.get(..3).is_some_and(|p| p.eq_ignore_ascii_case("ou="))
}

fn is_dc_segment(segment: &str) -> bool {
    segment.get(..3).is_some_and(|p| p.eq_ignore_ascii_case("dc="))
}

/// True when the grouping value is already a full distinguished name
/// rather than a relative label.
fn looks_like_dn(value: &str) -> bool {
    let lower = value.to_lowercase();
    lower.contains("dc=") || (lower.contains("ou=") && lower.contains(','))
}

/// Build the canonical OU path for a grouping value.
///
/// Blank values fall back to the (trimmed) default base path. Full DNs
/// are reduced to their OU/DC segments; anything else in the string is
/// discarded. Relative labels are split on `/` or `\`, wrapped as OU
/// segments and reversed, so the last path component of the label
/// becomes the leaf. Identical inputs always yield identical output.
pub fn build_ou_path(grouping_value: &str, default_base: &str) -> DirectoryPath {
    let base = default_base.trim();
    let value = grouping_value.trim();

    if value.is_empty() {
        return DirectoryPath::new(base);
    }

    if looks_like_dn(value) {
        let segments: Vec<&str> = value
            .split(',')
            .map(str::trim)
            .filter(|s| is_ou_segment(s) || is_dc_segment(s))
            .collect();
        if segments.is_empty() {
            return DirectoryPath::new(base);
        }
        return DirectoryPath::new(segments.join(","));
    }

    let mut segments: Vec<String> = value
        .split(['/', '\\'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("OU={}", s))
        .collect();
    if segments.is_empty() {
        return DirectoryPath::new(base);
    }
    segments.reverse();

    if base.is_empty() {
        DirectoryPath::new(segments.join(","))
    } else {
        DirectoryPath::new(format!("{},{}", segments.join(","), base))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "OU=Base,DC=example,DC=com";

    #[test]
    fn test_blank_value_returns_default_base() {
        assert_eq!(build_ou_path("", BASE).as_str(), BASE);
        assert_eq!(build_ou_path("   ", "  OU=Base,DC=x  ").as_str(), "OU=Base,DC=x");
    }

    #[test]
    fn test_relative_label_is_reversed_leaf_first() {
        let path = build_ou_path("Math/2024", "OU=Base,DC=x");
        assert_eq!(path.as_str(), "OU=2024,OU=Math,OU=Base,DC=x");
    }

    #[test]
    fn test_single_label() {
        let path = build_ou_path("Math", BASE);
        assert_eq!(path.as_str(), "OU=Math,OU=Base,DC=example,DC=com");
    }

    #[test]
    fn test_backslash_separator_and_empty_segments() {
        let path = build_ou_path(r"Math\\2024", BASE);
        assert_eq!(path.as_str(), format!("OU=2024,OU=Math,{}", BASE));

        let path = build_ou_path("Math//2024/", BASE);
        assert_eq!(path.as_str(), format!("OU=2024,OU=Math,{}", BASE));
    }

    #[test]
    fn test_relative_label_without_base() {
        let path = build_ou_path("Math/2024", "");
        assert_eq!(path.as_str(), "OU=2024,OU=Math");
    }

    #[test]
    fn test_full_dn_extracts_ou_dc_segments_only() {
        let path = build_ou_path("CN=ignored,OU=Math, OU=Base ,DC=example,DC=com", BASE);
        assert_eq!(path.as_str(), "OU=Math,OU=Base,DC=example,DC=com");
    }

    #[test]
    fn test_dn_detection_by_dc_marker_alone() {
        let path = build_ou_path("DC=example,DC=com", BASE);
        assert_eq!(path.as_str(), "DC=example,DC=com");
    }

    #[test]
    fn test_dn_with_no_usable_segments_falls_back() {
        // detected as a DN (dc= marker) but no segment survives extraction
        let path = build_ou_path("CN=foo dc=example", BASE);
        assert_eq!(path.as_str(), BASE);
    }

    #[test]
    fn test_build_is_idempotent() {
        let first = build_ou_path("Math/2024", BASE);
        let second = build_ou_path("Math/2024", BASE);
        assert_eq!(first, second);

        // feeding the output back in yields the same path
        let again = build_ou_path(first.as_str(), BASE);
        assert_eq!(again, first);
    }

    #[test]
    fn test_leaf_name_and_depth() {
        let path = DirectoryPath::new("OU=2024,OU=Math,OU=Base,DC=x");
        assert_eq!(path.leaf_name(), Some("2024"));
        assert_eq!(path.ou_depth(), 3);

        let first_level = DirectoryPath::new("OU=Base,DC=x");
        assert_eq!(first_level.ou_depth(), 1);

        let root = DirectoryPath::new("DC=x");
        assert_eq!(root.leaf_name(), None);
        assert_eq!(root.ou_depth(), 0);
    }

    #[test]
    fn test_eq_ignore_case() {
        let path = DirectoryPath::new("OU=Base,DC=x");
        assert!(path.eq_ignore_case("ou=base,dc=X"));
        assert!(!path.eq_ignore_case("ou=other,dc=x"));
    }
}
