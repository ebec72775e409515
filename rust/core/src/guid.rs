// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Preset identity types.
//!
//! Presets carry two identities: a stable [`PresetGuid`] used as the map key
//! everywhere, and an optional human-readable [`BimKey`] generated from the
//! preset's category path and display name (legacy identity, still emitted
//! for exports and debugging).

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identity of a preset. Wraps a v4 UUID; the nil UUID is reserved
/// as "no preset" and is rejected by collection mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PresetGuid(Uuid);

impl PresetGuid {
    /// The nil GUID, used as an explicit "none" marker in records.
    pub const NIL: PresetGuid = PresetGuid(Uuid::nil());

    /// Generates a fresh random GUID.
    pub fn generate() -> Self {
        PresetGuid(Uuid::new_v4())
    }

    /// Non-nil GUIDs are valid preset identities.
    pub fn is_valid(&self) -> bool {
        !self.0.is_nil()
    }

    /// Parses a GUID from its string form. Returns `None` on malformed
    /// input; callers treat that the same as a nil GUID.
    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(PresetGuid)
    }
}

impl Default for PresetGuid {
    fn default() -> Self {
        PresetGuid::NIL
    }
}

impl fmt::Display for PresetGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Human-readable preset key. Whitespace is stripped on construction so
/// keys generated from display names are stable against spacing edits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BimKey(String);

impl BimKey {
    pub fn new(s: impl AsRef<str>) -> Self {
        BimKey(s.as_ref().chars().filter(|c| !c.is_whitespace()).collect())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for BimKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nil_guid_is_invalid() {
        assert!(!PresetGuid::NIL.is_valid());
        assert!(PresetGuid::generate().is_valid());
    }

    #[test]
    fn guid_round_trips_through_string() {
        let guid = PresetGuid::generate();
        assert_eq!(PresetGuid::parse(&guid.to_string()), Some(guid));
        assert_eq!(PresetGuid::parse("not-a-guid"), None);
    }

    #[test]
    fn bim_key_strips_whitespace() {
        let key = BimKey::new("Concrete Block  4in");
        assert_eq!(key.as_str(), "ConcreteBlock4in");
        assert_eq!(key, BimKey::new("ConcreteBlock4in"));
    }
}
