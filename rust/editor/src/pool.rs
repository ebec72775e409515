// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The node pool: arena-owned crafting-tree instances.
//!
//! The pool is the single owner of all live nodes. Parent/child links are
//! plain [`InstanceKey`]s into the slot map; destroying a node removes it
//! and every descendant in one pass. Instance IDs are a separate monotonic
//! counter and are never reused, so an ID held by external UI state can
//! never silently alias a newer node.

use bimcraft_core::{ChildAttachment, Preset, PresetCollection, PresetGuid};
use rustc_hash::FxHashMap;
use slotmap::SlotMap;

use crate::error::{Error, Result};
use crate::keys::InstanceKey;
use crate::node::{NodeInstance, NodeStatus};

/// A chain of preset GUIDs occupying one pin position: zero or more
/// read-only selectors terminated by one writable preset.
#[derive(Debug, Clone)]
struct Sequence {
    pin_set_index: u32,
    pin_set_position: u32,
    presets: Vec<PresetGuid>,
}

/// Groups a preset's sorted child attachments into per-position chains.
fn sequences_of(preset: &Preset) -> Vec<Sequence> {
    let mut sorted = preset.child_presets.clone();
    sorted.sort_by_key(|child| (child.parent_pin_set_index, child.parent_pin_set_position));

    let mut sequences: Vec<Sequence> = Vec::new();
    for child in sorted {
        match sequences.last_mut() {
            Some(seq)
                if seq.pin_set_index == child.parent_pin_set_index
                    && seq.pin_set_position == child.parent_pin_set_position =>
            {
                seq.presets.push(child.preset_guid);
            }
            _ => sequences.push(Sequence {
                pin_set_index: child.parent_pin_set_index,
                pin_set_position: child.parent_pin_set_position,
                presets: vec![child.preset_guid],
            }),
        }
    }
    sequences
}

/// Arena of live editing-session nodes.
#[derive(Debug, Default)]
pub struct NodePool {
    nodes: SlotMap<InstanceKey, NodeInstance>,
    by_instance_id: FxHashMap<u64, InstanceKey>,
    /// Creation-ordered list of live keys, kept in lockstep with the map.
    order: Vec<InstanceKey>,
    next_instance_id: u64,
}

impl NodePool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn instance(&self, key: InstanceKey) -> Result<&NodeInstance> {
        self.nodes.get(key).ok_or(Error::InstanceNotFound(key))
    }

    pub fn instance_mut(&mut self, key: InstanceKey) -> Result<&mut NodeInstance> {
        self.nodes.get_mut(key).ok_or(Error::InstanceNotFound(key))
    }

    /// Resolves a monotonic instance ID to its live key, if still alive.
    pub fn key_from_instance_id(&self, instance_id: u64) -> Option<InstanceKey> {
        self.by_instance_id.get(&instance_id).copied()
    }

    /// The sole parentless node, if the pool is non-empty and consistent.
    pub fn root(&self) -> Option<InstanceKey> {
        self.order
            .iter()
            .copied()
            .find(|&key| self.nodes[key].is_root())
    }

    pub fn keys(&self) -> impl Iterator<Item = InstanceKey> + '_ {
        self.order.iter().copied()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.by_instance_id.clear();
        self.order.clear();
        // next_instance_id deliberately keeps counting.
    }

    /// Creates a node instance from a preset, attaching it under `parent`
    /// at the given pin index/position when supplied, and materializing
    /// the preset's child tree pre-order.
    ///
    /// `create_default_read_only_children` controls read-only selector
    /// chains: a brand-new node drills down through the selectors' own
    /// default children, while reconstruction of a saved node keeps
    /// exactly the authored chain.
    pub fn create_node_instance_from_preset(
        &mut self,
        collection: &PresetCollection,
        parent: Option<InstanceKey>,
        preset_guid: PresetGuid,
        pin_set_index: u32,
        pin_set_position: u32,
        create_default_read_only_children: bool,
    ) -> Result<InstanceKey> {
        let watermark = self.order.len();
        let key = self.spawn(collection, preset_guid)?;

        let mut build = || -> Result<()> {
            if let Some(parent_key) = parent {
                self.attach_child(collection, parent_key, pin_set_index, pin_set_position, key)?;
            }
            self.materialize_children(collection, key, create_default_read_only_children)
        };
        if let Err(err) = build() {
            // Failed creations leave no partial subtree behind. A child is
            // spawned before its attach, so one whose attach failed is not
            // a descendant of `key`; every key allocated by this call is
            // destroyed, not just the subtree.
            self.destroy_spawned_since(watermark);
            return Err(err);
        }

        self.validate_pool()?;
        Ok(key)
    }

    /// Destroys every node spawned since the pool held `watermark` live
    /// entries, cascades included. Spawns are append-only on `order`, so
    /// the tail past the watermark is exactly the set to undo.
    fn destroy_spawned_since(&mut self, watermark: usize) {
        let spawned: Vec<InstanceKey> = self.order[watermark..].to_vec();
        for key in spawned {
            // Earlier destructions may have cascaded over later keys.
            if self.nodes.contains_key(key) {
                let _ = self.destroy_node_instance(key);
            }
        }
    }

    /// Allocates one bare node: fresh monotonic ID, property copy, pin
    /// sets from the type descriptor.
    fn spawn(&mut self, collection: &PresetCollection, preset_guid: PresetGuid) -> Result<InstanceKey> {
        let preset = collection.preset(preset_guid)?;
        let descriptor = collection.descriptor(&preset.node_type)?;

        let instance_id = self.next_instance_id;
        self.next_instance_id += 1;

        let node = NodeInstance::new(instance_id, preset_guid, preset.properties.clone(), descriptor);
        let key = self.nodes.insert(node);
        self.by_instance_id.insert(instance_id, key);
        self.order.push(key);
        Ok(key)
    }

    /// Materializes the child tree below an existing node. Read-only
    /// selector chains come from the owning preset's explicit sequences;
    /// a chain's interior nodes never materialize their own children.
    fn materialize_children(
        &mut self,
        collection: &PresetCollection,
        key: InstanceKey,
        create_defaults: bool,
    ) -> Result<()> {
        let preset_guid = self.instance(key)?.preset_guid;
        let preset = collection.preset(preset_guid)?;
        if preset.is_read_only && !create_defaults {
            return Ok(());
        }
        let sequences = sequences_of(preset);

        for sequence in sequences {
            let mut parent_key = key;
            let mut pin_index = sequence.pin_set_index;
            let mut pin_position = sequence.pin_set_position;
            let last = sequence.presets.len() - 1;

            for (i, &guid) in sequence.presets.iter().enumerate() {
                let child_key = self.spawn(collection, guid)?;
                self.attach_child(collection, parent_key, pin_index, pin_position, child_key)?;
                if i == last {
                    self.materialize_children(collection, child_key, create_defaults)?;
                }
                parent_key = child_key;
                pin_index = 0;
                pin_position = 0;
            }
        }
        Ok(())
    }

    /// Attaches `child` to `parent`'s pin set. Hard failure when the pin
    /// is at capacity or the child's preset fails the pin's eligibility
    /// search.
    pub fn attach_child(
        &mut self,
        collection: &PresetCollection,
        parent: InstanceKey,
        pin_set_index: u32,
        pin_set_position: u32,
        child: InstanceKey,
    ) -> Result<()> {
        let child_preset = self.instance(child)?.preset_guid;
        let parent_node = self.instance(parent)?;
        let pin_count = parent_node.pins.len();
        let pin = parent_node
            .pins
            .get(pin_set_index as usize)
            .ok_or(Error::PinIndexOutOfRange(pin_set_index, pin_count))?;
        if pin.is_full() {
            return Err(Error::PinFull(pin.name.clone(), pin.max_count));
        }

        let descriptor = collection.descriptor(&parent_node.node_type)?;
        let pin_descriptor = descriptor
            .pin_sets
            .get(pin_set_index as usize)
            .ok_or(Error::PinIndexOutOfRange(pin_set_index, descriptor.pin_sets.len()))?;
        if !collection.preset_eligible_for_pin(pin_descriptor, child_preset)? {
            return Err(Error::IneligibleChild {
                pin: pin_descriptor.name.clone(),
                child: child_preset,
            });
        }

        let pin = &mut self.nodes[parent].pins[pin_set_index as usize];
        // Positions past the current count append. Authored position gaps
        // (a saved preset whose middle child was deleted) collapse as the
        // surviving sequences materialize one at a time.
        let position = (pin_set_position as usize).min(pin.attached.len());
        pin.attached.insert(position, child);
        self.nodes[child].parent = Some(parent);
        Ok(())
    }

    /// Whether detaching this node would keep its parent pin at or above
    /// its minimum count. Roots are always removable.
    pub fn can_remove_child(&self, key: InstanceKey) -> Result<bool> {
        let node = self.instance(key)?;
        let Some(parent) = node.parent else {
            return Ok(true);
        };
        let parent_node = self.instance(parent)?;
        let (pin_index, _) = parent_node
            .find_child(key)
            .ok_or(Error::MismatchedParentLink(node.instance_id))?;
        let pin = &parent_node.pins[pin_index];
        Ok(pin.attached.len() as i32 > pin.min_count)
    }

    /// Destroys a node and its whole descendant tree, detaching it from
    /// its parent first. Returns every destroyed instance ID (the node
    /// plus N descendants yields N + 1 IDs) so callers can drop external
    /// references.
    pub fn destroy_node_instance(&mut self, key: InstanceKey) -> Result<Vec<u64>> {
        self.instance(key)?;

        // Gather the full subtree before touching anything.
        let mut doomed = Vec::new();
        let mut stack = vec![key];
        while let Some(current) = stack.pop() {
            doomed.push(current);
            let node = self.instance(current)?;
            for child in node.children() {
                stack.push(child);
            }
        }

        if let Some(parent) = self.nodes[key].parent {
            if let Some((pin_index, position)) = self.nodes[parent].find_child(key) {
                self.nodes[parent].pins[pin_index].attached.remove(position);
            }
        }

        let mut destroyed = Vec::with_capacity(doomed.len());
        for current in doomed {
            if let Some(node) = self.nodes.remove(current) {
                self.by_instance_id.remove(&node.instance_id);
                destroyed.push(node.instance_id);
            }
        }
        self.order.retain(|k| self.nodes.contains_key(*k));
        Ok(destroyed)
    }

    /// Structural invariants: parent/child links mutually consistent, at
    /// most one root, bookkeeping map and list in agreement.
    pub fn validate_pool(&self) -> Result<()> {
        if self.by_instance_id.len() != self.nodes.len() || self.order.len() != self.nodes.len() {
            return Err(Error::InstanceBookkeepingMismatch {
                map: self.by_instance_id.len(),
                list: self.order.len(),
            });
        }

        let mut roots = 0usize;
        for (key, node) in &self.nodes {
            match node.parent {
                None => {
                    roots += 1;
                    if roots > 1 {
                        return Err(Error::MultipleRoots);
                    }
                }
                Some(parent) => {
                    let parent_node = self
                        .nodes
                        .get(parent)
                        .ok_or(Error::MismatchedParentLink(node.instance_id))?;
                    if parent_node.find_child(key).is_none() {
                        return Err(Error::MismatchedParentLink(node.instance_id));
                    }
                }
            }
            for child in node.children() {
                let child_node = self
                    .nodes
                    .get(child)
                    .ok_or(Error::MismatchedParentLink(node.instance_id))?;
                if child_node.parent != Some(key) {
                    return Err(Error::MismatchedParentLink(child_node.instance_id));
                }
            }
        }
        Ok(())
    }

    /// Rebuilds the pool from a single preset, reconstructing the exact
    /// authored selector chains.
    pub fn reset_instances(
        &mut self,
        collection: &PresetCollection,
        root_preset: PresetGuid,
    ) -> Result<InstanceKey> {
        self.clear();
        self.create_node_instance_from_preset(collection, None, root_preset, 0, 0, false)
    }

    /// Swaps the preset under an existing node: children are destroyed and
    /// re-materialized from the new preset with default selector chains,
    /// while the node's identity (key, instance ID, parent link) stays.
    pub fn set_new_preset_for_node(
        &mut self,
        collection: &PresetCollection,
        key: InstanceKey,
        preset_guid: PresetGuid,
    ) -> Result<()> {
        let preset = collection.preset(preset_guid)?;
        let descriptor = collection.descriptor(&preset.node_type)?;
        let properties = preset.properties.clone();
        let pins: Vec<_> = descriptor
            .pin_sets
            .iter()
            .map(crate::node::InstancePin::from_descriptor)
            .collect();

        let children: Vec<InstanceKey> = self.instance(key)?.children().collect();
        for child in children {
            self.destroy_node_instance(child)?;
        }

        let node = self.instance_mut(key)?;
        node.preset_guid = preset_guid;
        node.node_type = preset.node_type.clone();
        node.properties = properties;
        node.pins = pins;

        let watermark = self.order.len();
        if let Err(err) = self.materialize_children(collection, key, true) {
            self.destroy_spawned_since(watermark);
            return Err(err);
        }
        self.validate_pool()
    }

    /// Staleness of a node relative to its originating preset, computed
    /// by re-deriving a preset from the instance and matching it against
    /// the stored one.
    pub fn preset_status(
        &self,
        collection: &PresetCollection,
        key: InstanceKey,
    ) -> Result<NodeStatus> {
        let node = self.instance(key)?;
        let Some(original) = collection.presets.get(&node.preset_guid) else {
            return Ok(NodeStatus::None);
        };
        if original.is_read_only {
            return Ok(NodeStatus::ReadOnly);
        }

        let mut derived = self.instance_data_as_preset(collection, key)?;
        let mut original = original.clone();
        derived.sort_child_presets();
        original.sort_child_presets();
        if derived.matches(&original) {
            Ok(NodeStatus::UpToDate)
        } else {
            Ok(NodeStatus::Dirty)
        }
    }

    /// Re-derives a preset from a live node: the instance's properties
    /// plus child attachments rebuilt from its pins, with read-only
    /// selector chains flattened back into per-position sequences.
    ///
    /// Each read-only descendant must hold exactly one pin with exactly
    /// one child; anything else cannot be expressed as a chain.
    pub fn instance_data_as_preset(
        &self,
        collection: &PresetCollection,
        key: InstanceKey,
    ) -> Result<Preset> {
        let node = self.instance(key)?;
        let mut preset = collection.preset(node.preset_guid)?.clone();
        preset.properties = node.properties.clone();
        preset.child_presets.clear();

        for (pin_index, pin) in node.pins.iter().enumerate() {
            for (position, &child) in pin.attached.iter().enumerate() {
                let mut current = child;
                loop {
                    let child_node = self.instance(current)?;
                    preset.child_presets.push(ChildAttachment::new(
                        pin_index as u32,
                        position as u32,
                        child_node.preset_guid,
                    ));
                    let child_preset = collection.preset(child_node.preset_guid)?;
                    if !child_preset.is_read_only {
                        break;
                    }
                    let grandchildren: Vec<InstanceKey> = child_node.children().collect();
                    if child_node.pins.len() != 1 || grandchildren.len() != 1 {
                        return Err(Error::MalformedReadOnlyChain(child_node.preset_guid));
                    }
                    current = grandchildren[0];
                }
            }
        }
        Ok(preset)
    }
}
