//! Tag string normalization
//!
//! Tags arrive as a comma separated attribute value. The canonical form is a
//! set of trimmed, non-empty strings; its text form joins them with `", "` in
//! first-seen order.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Default, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub struct TagSet {
    tags: Vec<String>,
}

impl TagSet {
    pub fn parse(raw: &str) -> Self {
        let mut seen = HashSet::new();
        let tags = raw
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .filter(|t| seen.insert(*t))
            .map(str::to_string)
            .collect();
        Self { tags }
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    /// Canonical string, or `None` for an empty set.
    pub fn into_canonical(self) -> Option<String> {
        (!self.is_empty()).then(|| self.to_string())
    }
}

/// Normalize an optional raw `TAGS` value straight to its canonical string.
pub fn normalize_tags(raw: Option<&str>) -> Option<String> {
    raw.map(TagSet::parse).and_then(TagSet::into_canonical)
}

impl PartialEq for TagSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|t| other.contains(t))
    }
}

impl std::fmt::Display for TagSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tags.join(", "))
    }
}

impl From<String> for TagSet {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<TagSet> for String {
    fn from(tags: TagSet) -> Self {
        tags.to_string()
    }
}

impl std::str::FromStr for TagSet {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_and_dedups() {
        let tags = TagSet::parse(" x, y ,x,, ");
        assert_eq!(tags.to_string(), "x, y");
        assert_eq!(tags.len(), 2);
    }

    #[test]
    fn test_empty_input_has_no_canonical_form() {
        assert_eq!(normalize_tags(Some(" , ,")), None);
        assert_eq!(normalize_tags(None), None);
        assert_eq!(normalize_tags(Some("rust")), Some("rust".to_string()));
    }

    #[test]
    fn test_round_trip_is_stable() {
        let inputs = [
            "a,b,c",
            "  c , b,a ",
            "dup, dup ,DUP",
            ",,,",
            "with space, another one",
            "unicode, café,  naïve",
        ];

        for raw in inputs {
            let first = TagSet::parse(raw);
            let again = TagSet::parse(&first.to_string());
            assert_eq!(first, again, "round trip changed {raw:?}");
        }
    }

    #[test]
    fn test_equality_ignores_order() {
        assert_eq!(TagSet::parse("a, b"), TagSet::parse("b,a"));
        assert_ne!(TagSet::parse("a, b"), TagSet::parse("a"));
        // Case is significant
        assert_ne!(TagSet::parse("Rust"), TagSet::parse("rust"));
    }
}
