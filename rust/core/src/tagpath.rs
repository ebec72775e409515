// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Hierarchical category tag paths (NCPs).
//!
//! A tag path like `Assembly-->Wall-->Interior` places a preset in the
//! taxonomy used for search and slot filtering. Paths compare either
//! exactly or as a prefix (a search for `Assembly-->Wall` also matches
//! `Assembly-->Wall-->Interior`).

use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Segment separator in the string form.
pub const TAG_PATH_SEPARATOR: &str = "-->";

/// An ordered list of category tags. Empty paths are legal and match
/// nothing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct TagPath {
    segments: SmallVec<[String; 6]>,
}

impl TagPath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a `-->`-separated path. Surrounding whitespace per segment
    /// is trimmed; empty segments are dropped.
    pub fn from_str(s: &str) -> Self {
        let segments = s
            .split(TAG_PATH_SEPARATOR)
            .map(str::trim)
            .filter(|seg| !seg.is_empty())
            .map(String::from)
            .collect();
        TagPath { segments }
    }

    pub fn push(&mut self, segment: impl Into<String>) {
        self.segments.push(segment.into());
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The most specific tag, used as the category token in generated keys.
    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Every segment equal, same length.
    pub fn matches_exact(&self, other: &TagPath) -> bool {
        self.segments == other.segments
    }

    /// True when `self` starts with all of `other`'s segments. An empty
    /// `other` matches nothing rather than everything.
    pub fn matches_partial(&self, other: &TagPath) -> bool {
        !other.is_empty()
            && self.segments.len() >= other.segments.len()
            && self.segments[..other.segments.len()] == other.segments[..]
    }
}

impl fmt::Display for TagPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join(TAG_PATH_SEPARATOR))
    }
}

impl Serialize for TagPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TagPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PathVisitor;
        impl<'de> Visitor<'de> for PathVisitor {
            type Value = TagPath;
            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a '-->'-separated tag path")
            }
            fn visit_str<E: de::Error>(self, v: &str) -> Result<TagPath, E> {
                Ok(TagPath::from_str(v))
            }
        }
        deserializer.deserialize_str(PathVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display() {
        let path = TagPath::from_str("Assembly-->Wall--> Interior ");
        assert_eq!(path.segments(), &["Assembly", "Wall", "Interior"]);
        assert_eq!(path.to_string(), "Assembly-->Wall-->Interior");
        assert_eq!(path.last(), Some("Interior"));
        assert!(TagPath::from_str("").is_empty());
    }

    #[test]
    fn exact_and_partial_matching() {
        let full = TagPath::from_str("Assembly-->Wall-->Interior");
        let prefix = TagPath::from_str("Assembly-->Wall");
        let other = TagPath::from_str("Assembly-->Floor");

        assert!(full.matches_exact(&full.clone()));
        assert!(!full.matches_exact(&prefix));
        assert!(full.matches_partial(&prefix));
        assert!(!prefix.matches_partial(&full));
        assert!(!full.matches_partial(&other));
        assert!(!full.matches_partial(&TagPath::new()));
    }
}
