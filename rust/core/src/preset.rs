// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The preset node: a typed, property-carrying vertex of the authored
//! crafting graph.

use serde::{Deserialize, Serialize};

use crate::guid::PresetGuid;
use crate::props::PropertySheet;
use crate::scope::{ObjectType, PinTarget, ValueScope};
use crate::tagpath::TagPath;

/// A reference from a parent preset to a child preset, addressed by the
/// parent's pin set and the position within that set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildAttachment {
    pub parent_pin_set_index: u32,
    pub parent_pin_set_position: u32,
    pub preset_guid: PresetGuid,
    /// Layer stack this attachment feeds; `Default` inherits the parent's.
    pub pin_target: PinTarget,
}

impl ChildAttachment {
    pub fn new(pin_set_index: u32, pin_set_position: u32, preset_guid: PresetGuid) -> Self {
        ChildAttachment {
            parent_pin_set_index: pin_set_index,
            parent_pin_set_position: pin_set_position,
            preset_guid,
            pin_target: PinTarget::Default,
        }
    }

    pub fn with_target(mut self, target: PinTarget) -> Self {
        self.pin_target = target;
        self
    }
}

/// A named 3D attachment point on a compound object (door, window, FFE),
/// carrying the preset that fills it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PartSlot {
    pub slot_name: String,
    pub part_preset: PresetGuid,
    pub id: String,
    pub parent_id: String,
}

/// A named, typed, user-editable node of the preset graph.
///
/// Invariants: a non-`None`-scope preset's `node_type` must name a
/// descriptor in the owning collection, and `child_presets` must be sorted
/// by `(pin set index, pin set position)` before serialization or
/// structural comparison.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Preset {
    pub guid: PresetGuid,
    pub display_name: String,
    pub node_type: String,
    pub node_scope: ValueScope,
    pub object_type: ObjectType,
    /// Category-selector presets are read-only: never edited directly,
    /// they drill down through exactly one child to a writable preset.
    pub is_read_only: bool,
    pub properties: PropertySheet,
    pub child_presets: Vec<ChildAttachment>,
    pub part_slots: Vec<PartSlot>,
    /// The preset describing named attachment points for `part_slots`.
    pub slot_config_preset: Option<PresetGuid>,
    pub my_tag_path: TagPath,
    pub parent_tag_paths: Vec<TagPath>,
}

impl Preset {
    /// Sorts child attachments by pin set index, then position, so
    /// serialization and matching are order-stable.
    pub fn sort_child_presets(&mut self) {
        self.child_presets.sort_by_key(|child| {
            (child.parent_pin_set_index, child.parent_pin_set_position)
        });
    }

    /// Child attachments belonging to one pin set, in position order.
    /// Assumes `child_presets` is sorted.
    pub fn children_of_pin(&self, pin_set_index: u32) -> impl Iterator<Item = &ChildAttachment> {
        self.child_presets
            .iter()
            .filter(move |child| child.parent_pin_set_index == pin_set_index)
    }

    /// Structural equality against another preset. Child order is
    /// significant; callers sort both sides first when comparing presets
    /// from different origins.
    pub fn matches(&self, other: &Preset) -> bool {
        self.guid == other.guid
            && self.display_name == other.display_name
            && self.node_type == other.node_type
            && self.node_scope == other.node_scope
            && self.object_type == other.object_type
            && self.is_read_only == other.is_read_only
            && self.child_presets == other.child_presets
            && self.part_slots == other.part_slots
            && self.slot_config_preset == other.slot_config_preset
            && self.my_tag_path == other.my_tag_path
            && self.parent_tag_paths == other.parent_tag_paths
            && self.properties.matches(&other.properties)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorting_orders_by_pin_then_position() {
        let a = PresetGuid::generate();
        let b = PresetGuid::generate();
        let c = PresetGuid::generate();
        let mut preset = Preset {
            child_presets: vec![
                ChildAttachment::new(1, 0, c),
                ChildAttachment::new(0, 1, b),
                ChildAttachment::new(0, 0, a),
            ],
            ..Default::default()
        };
        preset.sort_child_presets();
        let guids: Vec<_> = preset.child_presets.iter().map(|ch| ch.preset_guid).collect();
        assert_eq!(guids, vec![a, b, c]);
        assert_eq!(preset.children_of_pin(0).count(), 2);
    }

    #[test]
    fn matches_detects_property_drift() {
        use crate::props::{names, Value};
        use crate::scope::ValueScope;

        let mut preset = Preset {
            guid: PresetGuid::generate(),
            display_name: "Brick".into(),
            node_type: "Module".into(),
            node_scope: ValueScope::Module,
            ..Default::default()
        };
        preset
            .properties
            .set(ValueScope::Dimension, names::WIDTH, Value::Number(9.0))
            .unwrap();

        let mut edited = preset.clone();
        assert!(preset.matches(&edited));
        edited
            .properties
            .set(ValueScope::Dimension, names::WIDTH, Value::Number(10.0))
            .unwrap();
        assert!(!preset.matches(&edited));
    }
}
