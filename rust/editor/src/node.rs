// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Live node instances.
//!
//! A node instance wraps a working copy of a preset for interactive
//! editing: its own property sheet and its own pin sets with attached
//! child instances. The preset in the collection is never touched until
//! the user explicitly saves.

use bimcraft_core::{PinSetDescriptor, PresetGuid, PropertySheet, TypeDescriptor, ValueScope};

use crate::keys::InstanceKey;

/// Staleness of a node relative to its originating preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeStatus {
    /// The originating preset is gone from the collection.
    None,
    /// The originating preset is a category selector; never edited
    /// directly.
    ReadOnly,
    /// Re-serializing the instance reproduces the stored preset.
    UpToDate,
    /// The instance has unsaved edits.
    Dirty,
}

/// One pin set on a live node: the descriptor's bounds plus the child
/// instances currently attached, in order.
#[derive(Debug, Clone)]
pub struct InstancePin {
    pub name: String,
    pub scope: ValueScope,
    pub min_count: i32,
    pub max_count: i32,
    pub attached: Vec<InstanceKey>,
}

impl InstancePin {
    pub fn from_descriptor(descriptor: &PinSetDescriptor) -> Self {
        InstancePin {
            name: descriptor.name.clone(),
            scope: descriptor.scope,
            min_count: descriptor.min_count,
            max_count: descriptor.max_count,
            attached: Vec::new(),
        }
    }

    pub fn is_full(&self) -> bool {
        self.max_count >= 0 && self.attached.len() as i32 >= self.max_count
    }
}

/// A live editing-session node.
#[derive(Debug, Clone)]
pub struct NodeInstance {
    /// Monotonic pool-wide ID. Never reused, even after destruction.
    pub instance_id: u64,
    /// The preset this node was instantiated from.
    pub preset_guid: PresetGuid,
    /// The preset's node type, kept locally so descriptor lookups survive
    /// preset removal from the collection.
    pub node_type: String,
    pub parent: Option<InstanceKey>,
    /// Working copy of the preset's properties.
    pub properties: PropertySheet,
    pub pins: Vec<InstancePin>,
}

impl NodeInstance {
    pub fn new(
        instance_id: u64,
        preset_guid: PresetGuid,
        properties: PropertySheet,
        descriptor: &TypeDescriptor,
    ) -> Self {
        NodeInstance {
            instance_id,
            preset_guid,
            node_type: descriptor.type_name.clone(),
            parent: None,
            properties,
            pins: descriptor
                .pin_sets
                .iter()
                .map(InstancePin::from_descriptor)
                .collect(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// All attached children across every pin, in pin order.
    pub fn children(&self) -> impl Iterator<Item = InstanceKey> + '_ {
        self.pins.iter().flat_map(|pin| pin.attached.iter().copied())
    }

    /// Locates a child within this node's pins.
    pub fn find_child(&self, child: InstanceKey) -> Option<(usize, usize)> {
        self.pins.iter().enumerate().find_map(|(pin_index, pin)| {
            pin.attached
                .iter()
                .position(|&key| key == child)
                .map(|position| (pin_index, position))
        })
    }
}
