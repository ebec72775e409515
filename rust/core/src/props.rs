// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scoped property sheets.
//!
//! Every preset carries a [`PropertySheet`]: a map from `(scope, name)` to a
//! tagged [`Value`]. Sheets support one-way bindings (writes to a source key
//! mirror into a target key) and a deep-equality [`PropertySheet::matches`]
//! used for dirty-checking in the editor.
//!
//! Numeric comparison uses an absolute epsilon; values round-trip through
//! float-serialized documents and exact equality would flag spurious diffs.

use std::fmt;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::{Error, Result};
use crate::guid::PresetGuid;
use crate::scope::ValueScope;

/// Absolute tolerance for numeric property equality.
pub const NUMBER_EPSILON: f64 = 1e-4;

/// Well-known property names. The catalog is open (sheets accept any
/// name); these are the ones the resolver and builders read directly.
pub mod names {
    pub const ASSET_ID: &str = "AssetID";
    pub const ASSET_PATH: &str = "AssetPath";
    pub const CHANNEL: &str = "Channel";
    pub const CODE: &str = "Code";
    pub const COLOR: &str = "Color";
    pub const COMMENTS: &str = "Comments";
    pub const DEPTH: &str = "Depth";
    pub const DIAMETER: &str = "Diameter";
    pub const FLIP_X: &str = "FlipX";
    pub const FLIP_Y: &str = "FlipY";
    pub const FLIP_Z: &str = "FlipZ";
    pub const FORM: &str = "Form";
    pub const FUNCTION: &str = "Function";
    pub const HEX_VALUE: &str = "HexValue";
    pub const LOCATION_X: &str = "LocationX";
    pub const LOCATION_Y: &str = "LocationY";
    pub const LOCATION_Z: &str = "LocationZ";
    pub const MESH: &str = "Mesh";
    pub const NAME: &str = "Name";
    pub const OVERRIDE: &str = "Override";
    pub const ROTATION_X: &str = "RotationX";
    pub const ROTATION_Y: &str = "RotationY";
    pub const ROTATION_Z: &str = "RotationZ";
    pub const SCALE: &str = "Scale";
    pub const SIZE_X: &str = "SizeX";
    pub const SIZE_Y: &str = "SizeY";
    pub const SIZE_Z: &str = "SizeZ";
    pub const SUPPORTED_NCPS: &str = "SupportedNCPs";
    pub const THICKNESS: &str = "Thickness";
    pub const WIDTH: &str = "Width";
}

/// A property value: tagged union over the types authored data carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    String(String),
    Number(f64),
    Vector([f64; 3]),
    Boolean(bool),
    Guid(PresetGuid),
}

impl Value {
    /// Epsilon-tolerant equality. Strings, booleans, and GUIDs compare
    /// exactly; numbers and vectors within [`NUMBER_EPSILON`].
    pub fn matches(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => (a - b).abs() <= NUMBER_EPSILON,
            (Value::Vector(a), Value::Vector(b)) => a
                .iter()
                .zip(b.iter())
                .all(|(x, y)| (x - y).abs() <= NUMBER_EPSILON),
            (a, b) => a == b,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<[f64; 3]> {
        match self {
            Value::Vector(v) => Some(*v),
            _ => None,
        }
    }

    /// Asset references are authored either as plain string keys or as
    /// preset GUIDs; both flatten to a string key for database lookup.
    pub fn as_asset_key(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.clone()),
            Value::Guid(g) => Some(g.to_string()),
            _ => None,
        }
    }
}

/// A scoped property address. Displays as the qualified name `Scope.Name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyKey {
    pub scope: ValueScope,
    pub name: String,
}

impl PropertyKey {
    pub fn new(scope: ValueScope, name: impl Into<String>) -> Self {
        PropertyKey {
            scope,
            name: name.into(),
        }
    }

    /// Parses a qualified name of the form `Scope.Name`.
    pub fn from_qn(qn: &str) -> Result<Self> {
        let (scope, name) = qn
            .split_once('.')
            .ok_or_else(|| Error::MalformedPropertyKey(qn.to_string()))?;
        let scope = ValueScope::from_str(scope)
            .ok_or_else(|| Error::MalformedPropertyKey(qn.to_string()))?;
        if name.is_empty() || name.contains('.') {
            return Err(Error::MalformedPropertyKey(qn.to_string()));
        }
        Ok(PropertyKey::new(scope, name))
    }

    pub fn qn(&self) -> String {
        format!("{}.{}", self.scope.as_str(), self.name)
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.scope.as_str(), self.name)
    }
}

impl Serialize for PropertyKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.qn())
    }
}

impl<'de> Deserialize<'de> for PropertyKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct QnVisitor;
        impl<'de> Visitor<'de> for QnVisitor {
            type Value = PropertyKey;
            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a qualified property name of the form Scope.Name")
            }
            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<PropertyKey, E> {
                PropertyKey::from_qn(v).map_err(E::custom)
            }
        }
        deserializer.deserialize_str(QnVisitor)
    }
}

/// A scoped key/value store with one-way property bindings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertySheet {
    values: FxHashMap<PropertyKey, Value>,
    /// Source key to the targets mirroring it.
    bindings: FxHashMap<PropertyKey, SmallVec<[PropertyKey; 1]>>,
    /// Keys that are the target of some binding. Read-only to callers.
    bound_targets: FxHashSet<PropertyKey>,
}

impl PropertySheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Upserts a property. Writing to the target of a binding is rejected;
    /// bound targets only change through their source.
    pub fn set(&mut self, scope: ValueScope, name: &str, value: Value) -> Result<()> {
        let key = PropertyKey::new(scope, name);
        if self.bound_targets.contains(&key) {
            return Err(Error::BoundTargetWrite(key.qn()));
        }
        if let Some(targets) = self.bindings.get(&key) {
            for target in targets.clone() {
                self.values.insert(target, value.clone());
            }
        }
        self.values.insert(key, value);
        Ok(())
    }

    pub fn try_get(&self, scope: ValueScope, name: &str) -> Option<&Value> {
        self.values.get(&PropertyKey::new(scope, name))
    }

    pub fn has(&self, scope: ValueScope, name: &str) -> bool {
        self.values.contains_key(&PropertyKey::new(scope, name))
    }

    /// Returns the stored number, or 0.0 when absent or non-numeric.
    /// Callers that must distinguish absence use [`Self::try_get_number`].
    pub fn number(&self, scope: ValueScope, name: &str) -> f64 {
        self.try_get_number(scope, name).unwrap_or(0.0)
    }

    /// Returns the stored string, or empty when absent or non-string.
    pub fn string(&self, scope: ValueScope, name: &str) -> &str {
        self.try_get(scope, name).and_then(Value::as_str).unwrap_or("")
    }

    pub fn try_get_number(&self, scope: ValueScope, name: &str) -> Option<f64> {
        self.try_get(scope, name).and_then(Value::as_number)
    }

    pub fn try_get_string(&self, scope: ValueScope, name: &str) -> Option<&str> {
        self.try_get(scope, name).and_then(Value::as_str)
    }

    pub fn try_get_bool(&self, scope: ValueScope, name: &str) -> Option<bool> {
        self.try_get(scope, name).and_then(Value::as_bool)
    }

    pub fn try_get_vector(&self, scope: ValueScope, name: &str) -> Option<[f64; 3]> {
        self.try_get(scope, name).and_then(Value::as_vector)
    }

    pub fn try_get_asset_key(&self, scope: ValueScope, name: &str) -> Option<String> {
        self.try_get(scope, name).and_then(Value::as_asset_key)
    }

    /// Removes a property and any bindings referencing it.
    pub fn remove(&mut self, scope: ValueScope, name: &str) {
        let key = PropertyKey::new(scope, name);
        self.values.remove(&key);
        self.bindings.remove(&key);
        self.bound_targets.remove(&key);
        for targets in self.bindings.values_mut() {
            targets.retain(|t| *t != key);
        }
    }

    /// Visits every stored property in unspecified order. The sheet must
    /// not be mutated during iteration.
    pub fn for_each(&self, mut visitor: impl FnMut(&PropertyKey, &Value)) {
        for (key, value) in &self.values {
            visitor(key, value);
        }
    }

    /// Iterates stored properties sorted by qualified name. Used wherever
    /// deterministic output order matters (records, key generation).
    pub fn iter_sorted(&self) -> impl Iterator<Item = (&PropertyKey, &Value)> {
        let mut entries: Vec<_> = self.values.iter().collect();
        entries.sort_by_key(|(key, _)| key.qn());
        entries.into_iter()
    }

    /// Records a one-way mirror: subsequent writes to the source also
    /// update the target, and the target becomes read-only. Both slots
    /// must already exist.
    pub fn bind(
        &mut self,
        source_scope: ValueScope,
        source_name: &str,
        target_scope: ValueScope,
        target_name: &str,
    ) -> Result<()> {
        let source = PropertyKey::new(source_scope, source_name);
        let target = PropertyKey::new(target_scope, target_name);
        if !self.values.contains_key(&source) {
            return Err(Error::BindSlotMissing(source.qn()));
        }
        if !self.values.contains_key(&target) {
            return Err(Error::BindSlotMissing(target.qn()));
        }
        let value = self.values[&source].clone();
        self.values.insert(target.clone(), value);
        self.bound_targets.insert(target.clone());
        self.bindings.entry(source).or_default().push(target);
        Ok(())
    }

    /// Upserts every property of `other` into this sheet. Used for bulk
    /// merging during resolution; bindings are not carried over.
    pub fn add_properties(&mut self, other: &PropertySheet) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    /// Upserts every property of `other`, re-addressing `Node`- and
    /// `None`-scope keys under `scope`. Adjective presets author their
    /// properties in the node scope and acquire a concrete scope from the
    /// pin they attach through.
    pub fn add_rescoped(&mut self, other: &PropertySheet, scope: ValueScope) {
        for (key, value) in &other.values {
            let rescoped = match key.scope {
                ValueScope::Node | ValueScope::None => PropertyKey::new(scope, &key.name),
                _ => key.clone(),
            };
            self.values.insert(rescoped, value.clone());
        }
    }

    /// Deep value-equality across all keys, epsilon-tolerant for numbers.
    pub fn matches(&self, other: &PropertySheet) -> bool {
        if self.values.len() != other.values.len() {
            return false;
        }
        self.values.iter().all(|(key, value)| {
            other
                .values
                .get(key)
                .is_some_and(|theirs| value.matches(theirs))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet_with(entries: &[(ValueScope, &str, Value)]) -> PropertySheet {
        let mut sheet = PropertySheet::new();
        for (scope, name, value) in entries {
            sheet.set(*scope, name, value.clone()).unwrap();
        }
        sheet
    }

    #[test]
    fn set_and_get() {
        let mut sheet = PropertySheet::new();
        sheet
            .set(ValueScope::Dimension, names::THICKNESS, Value::Number(2.0))
            .unwrap();
        assert_eq!(
            sheet.try_get_number(ValueScope::Dimension, names::THICKNESS),
            Some(2.0)
        );
        // Absent keys default to zero values.
        assert_eq!(sheet.number(ValueScope::Dimension, names::WIDTH), 0.0);
        assert_eq!(sheet.string(ValueScope::Layer, names::NAME), "");
        assert_eq!(sheet.try_get_number(ValueScope::Dimension, names::WIDTH), None);
    }

    #[test]
    fn bind_requires_both_slots() {
        let mut sheet = sheet_with(&[(
            ValueScope::Node,
            names::NAME,
            Value::String("Oak".into()),
        )]);
        let missing = sheet.bind(ValueScope::Node, names::NAME, ValueScope::Layer, names::NAME);
        assert!(matches!(missing, Err(Error::BindSlotMissing(_))));

        sheet
            .set(ValueScope::Layer, names::NAME, Value::String("".into()))
            .unwrap();
        sheet
            .bind(ValueScope::Node, names::NAME, ValueScope::Layer, names::NAME)
            .unwrap();
        // Source writes mirror into the target.
        sheet
            .set(ValueScope::Node, names::NAME, Value::String("Pine".into()))
            .unwrap();
        assert_eq!(sheet.try_get_string(ValueScope::Layer, names::NAME), Some("Pine"));
        // The target is read-only once bound.
        let write = sheet.set(ValueScope::Layer, names::NAME, Value::String("Elm".into()));
        assert!(matches!(write, Err(Error::BoundTargetWrite(_))));
    }

    #[test]
    fn matches_is_epsilon_tolerant() {
        let a = sheet_with(&[(ValueScope::Dimension, names::THICKNESS, Value::Number(2.0))]);
        let b = sheet_with(&[(
            ValueScope::Dimension,
            names::THICKNESS,
            Value::Number(2.0 + 1e-5),
        )]);
        let c = sheet_with(&[(ValueScope::Dimension, names::THICKNESS, Value::Number(2.1))]);
        assert!(a.matches(&b));
        assert!(!a.matches(&c));
        assert!(!a.matches(&PropertySheet::new()));
    }

    #[test]
    fn rescoping_rewrites_node_scope_only() {
        let adjective = sheet_with(&[
            (ValueScope::Node, names::ASSET_ID, Value::String("M1".into())),
            (ValueScope::Dimension, names::WIDTH, Value::Number(3.0)),
        ]);
        let mut target = PropertySheet::new();
        target.add_rescoped(&adjective, ValueScope::Material);
        assert_eq!(
            target.try_get_string(ValueScope::Material, names::ASSET_ID),
            Some("M1")
        );
        assert_eq!(target.try_get_number(ValueScope::Dimension, names::WIDTH), Some(3.0));
        assert!(!target.has(ValueScope::Node, names::ASSET_ID));
    }

    #[test]
    fn qualified_name_parse() {
        let key = PropertyKey::from_qn("Dimension.Thickness").unwrap();
        assert_eq!(key.scope, ValueScope::Dimension);
        assert_eq!(key.name, "Thickness");
        assert_eq!(key.qn(), "Dimension.Thickness");
        assert!(PropertyKey::from_qn("Thickness").is_err());
        assert!(PropertyKey::from_qn("Bogus.Thickness").is_err());
        assert!(PropertyKey::from_qn("Dimension.").is_err());
    }
}
