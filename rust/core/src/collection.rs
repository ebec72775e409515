// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The preset collection: the in-memory database of presets and node-type
//! descriptors, with the dependency and taxonomy queries the editor and
//! resolver are built on.
//!
//! The collection is read-mostly: an external loader builds it once from
//! parsed authoring data, and only the interactive editor mutates it
//! afterwards (adding saved presets, allocating GUIDs and keys).

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::guid::{BimKey, PresetGuid};
use crate::preset::Preset;
use crate::props::{names, PropertySheet};
use crate::record::PresetRecord;
use crate::scope::{ObjectType, ValueScope};
use crate::tagpath::TagPath;

/// Retry bound for random GUID allocation. Collisions are negligible;
/// the bound only protects against a broken random source.
const GUID_ALLOCATION_ATTEMPTS: u32 = 1000;

/// Cardinality bounds and scope of one pin set on a node type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinSetDescriptor {
    pub name: String,
    /// Scope acquired by adjective children attached through this pin.
    pub scope: ValueScope,
    pub min_count: i32,
    /// -1 means unbounded.
    pub max_count: i32,
    /// Taxonomy filter for eligible children. Empty means the pin filters
    /// by scope alone.
    pub eligible_ncp: TagPath,
}

impl PinSetDescriptor {
    pub fn is_unbounded(&self) -> bool {
        self.max_count < 0
    }
}

/// Schema for a class of presets: property template, legal pin sets, and
/// the object kind instances ultimately produce.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeDescriptor {
    pub type_name: String,
    pub object_type: ObjectType,
    pub scope: ValueScope,
    pub property_template: PropertySheet,
    pub pin_sets: Vec<PinSetDescriptor>,
    /// UI form item to the property it edits.
    pub form_item_to_property: FxHashMap<String, String>,
}

/// Serialized form of a whole collection's presets. Descriptors travel
/// with the authoring data, not the document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectionRecord {
    pub presets: Vec<PresetRecord>,
}

/// The preset database.
#[derive(Debug, Clone, Default)]
pub struct PresetCollection {
    pub node_descriptors: FxHashMap<String, TypeDescriptor>,
    pub presets: FxHashMap<PresetGuid, Preset>,
    issued_keys: FxHashSet<BimKey>,
}

impl PresetCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn preset(&self, guid: PresetGuid) -> Result<&Preset> {
        self.presets.get(&guid).ok_or(Error::PresetNotFound(guid))
    }

    pub fn descriptor(&self, node_type: &str) -> Result<&TypeDescriptor> {
        self.node_descriptors
            .get(node_type)
            .ok_or_else(|| Error::NodeTypeNotFound(node_type.to_string()))
    }

    pub fn add_descriptor(&mut self, descriptor: TypeDescriptor) {
        self.node_descriptors
            .insert(descriptor.type_name.clone(), descriptor);
    }

    /// Upserts a preset keyed by its GUID. A nil GUID is rejected without
    /// modifying the collection.
    pub fn add_preset(&mut self, preset: Preset) -> Result<()> {
        if !preset.guid.is_valid() {
            return Err(Error::InvalidGuid);
        }
        self.presets.insert(preset.guid, preset);
        Ok(())
    }

    pub fn remove_preset(&mut self, guid: PresetGuid) -> Result<Preset> {
        if !guid.is_valid() {
            return Err(Error::InvalidGuid);
        }
        self.presets.remove(&guid).ok_or(Error::PresetNotFound(guid))
    }

    /// The object kind a preset resolves into, `None` for unknown presets.
    pub fn preset_object_type(&self, guid: PresetGuid) -> ObjectType {
        self.presets
            .get(&guid)
            .map(|preset| preset.object_type)
            .unwrap_or_default()
    }

    /// All presets transitively referenced by `guid` through child
    /// attachments, part slots, and slot configs, including `guid` itself.
    ///
    /// Iterative DFS with a visited set: terminates on cyclic data rather
    /// than detecting the cycle as an error.
    pub fn dependent_presets(&self, guid: PresetGuid) -> Result<FxHashSet<PresetGuid>> {
        self.preset(guid)?;

        let mut visited = FxHashSet::default();
        let mut stack = vec![guid];
        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            let Some(preset) = self.presets.get(&current) else {
                // Dangling references are tolerated here; post_load reports
                // them.
                continue;
            };
            for child in &preset.child_presets {
                if !visited.contains(&child.preset_guid) {
                    stack.push(child.preset_guid);
                }
            }
            for slot in &preset.part_slots {
                if slot.part_preset.is_valid() && !visited.contains(&slot.part_preset) {
                    stack.push(slot.part_preset);
                }
            }
            if let Some(config) = preset.slot_config_preset {
                if !visited.contains(&config) {
                    stack.push(config);
                }
            }
        }
        Ok(visited)
    }

    /// Presets whose child attachments or part slots reference `guid`.
    pub fn ancestor_presets(&self, guid: PresetGuid) -> Vec<PresetGuid> {
        let mut out = self.presets_by_predicate(|preset| {
            preset
                .child_presets
                .iter()
                .any(|child| child.preset_guid == guid)
                || preset.part_slots.iter().any(|slot| slot.part_preset == guid)
                || preset.slot_config_preset == Some(guid)
        });
        out.sort();
        out
    }

    /// Linear scan filter. Results are sorted by GUID for determinism.
    pub fn presets_by_predicate(&self, predicate: impl Fn(&Preset) -> bool) -> Vec<PresetGuid> {
        let mut out: Vec<PresetGuid> = self
            .presets
            .values()
            .filter(|preset| predicate(preset))
            .map(|preset| preset.guid)
            .collect();
        out.sort();
        out
    }

    /// Presets whose tag path matches `path` exactly, or as a descendant
    /// when `partial_ok` is set.
    pub fn presets_for_ncp(&self, path: &TagPath, partial_ok: bool) -> Vec<PresetGuid> {
        self.presets_by_predicate(|preset| {
            preset.my_tag_path.matches_exact(path)
                || (partial_ok && preset.my_tag_path.matches_partial(path))
        })
    }

    /// Presets eligible to fill a slot: resolves the slot preset's
    /// `Slot.SupportedNCPs` tag path and filters the taxonomy by it.
    pub fn presets_for_slot(&self, slot_preset: PresetGuid) -> Result<Vec<PresetGuid>> {
        let slot = self.preset(slot_preset)?;
        let Some(ncp) = slot
            .properties
            .try_get_string(ValueScope::Slot, names::SUPPORTED_NCPS)
        else {
            return Ok(Vec::new());
        };
        let path = TagPath::from_str(ncp);
        if path.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.presets_for_ncp(&path, true))
    }

    /// Whether a preset may attach through a pin: its tag path must fall
    /// under the pin's taxonomy filter, or, with no filter, its node scope
    /// must agree with the pin's scope.
    pub fn preset_eligible_for_pin(&self, pin: &PinSetDescriptor, child: PresetGuid) -> Result<bool> {
        let preset = self.preset(child)?;
        if !pin.eligible_ncp.is_empty() {
            return Ok(preset.my_tag_path.matches_exact(&pin.eligible_ncp)
                || preset.my_tag_path.matches_partial(&pin.eligible_ncp));
        }
        Ok(pin.scope == ValueScope::None
            || preset.node_scope == pin.scope
            || preset.node_scope == ValueScope::None)
    }

    /// Allocates a random GUID not present in the collection. Bounded
    /// retry; exhaustion is a hard error.
    pub fn available_guid(&self) -> Result<PresetGuid> {
        for _ in 0..GUID_ALLOCATION_ATTEMPTS {
            let candidate = PresetGuid::generate();
            if !self.presets.contains_key(&candidate) {
                return Ok(candidate);
            }
        }
        Err(Error::GuidAllocationExhausted(GUID_ALLOCATION_ATTEMPTS))
    }

    /// Builds a human-readable key for a preset by concatenating category
    /// tags and display names across the preset and its transitive
    /// children and parts, whitespace-stripped, then de-duplicating with a
    /// numeric suffix against keys this collection already issued.
    ///
    /// Children are pushed in reverse so the stack pops them in
    /// declaration order; the traversal order is part of key stability.
    pub fn generate_key_for_preset(&mut self, guid: PresetGuid) -> Result<BimKey> {
        self.preset(guid)?;

        let mut base = String::new();
        let mut visited = FxHashSet::default();
        let mut stack = vec![guid];
        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            let Some(preset) = self.presets.get(&current) else {
                continue;
            };
            if let Some(category) = preset.my_tag_path.last() {
                base.push_str(category);
            }
            base.push_str(&preset.display_name);

            for child in preset.child_presets.iter().rev() {
                stack.push(child.preset_guid);
            }
            for slot in preset.part_slots.iter().rev() {
                if slot.part_preset.is_valid() {
                    stack.push(slot.part_preset);
                }
            }
        }

        let base = BimKey::new(&base);
        let mut key = base.clone();
        let mut suffix = 1u32;
        while !self.issued_keys.insert(key.clone()) {
            key = BimKey::new(format!("{}-{}", base, suffix));
            suffix += 1;
        }
        Ok(key)
    }

    /// Structural equality used by validation and tests: same descriptor
    /// count, same presets, per-preset `matches` with children sorted on
    /// both sides.
    pub fn matches(&self, other: &PresetCollection) -> bool {
        if self.node_descriptors.len() != other.node_descriptors.len() {
            return false;
        }
        if self.presets.len() != other.presets.len() {
            return false;
        }
        self.presets.iter().all(|(guid, preset)| {
            other.presets.get(guid).is_some_and(|theirs| {
                let mut mine = preset.clone();
                let mut theirs = theirs.clone();
                mine.sort_child_presets();
                theirs.sort_child_presets();
                mine.matches(&theirs)
            })
        })
    }

    /// Post-load validation: reports dangling references and unknown node
    /// types as warning messages. Best-effort; the load itself stands.
    pub fn post_load(&self) -> Vec<String> {
        let mut messages = Vec::new();
        let mut guids: Vec<_> = self.presets.keys().copied().collect();
        guids.sort();
        for guid in guids {
            let preset = &self.presets[&guid];
            if preset.node_scope != ValueScope::None
                && !self.node_descriptors.contains_key(&preset.node_type)
            {
                messages.push(format!(
                    "preset {} names unknown node type {}",
                    guid, preset.node_type
                ));
            }
            for child in &preset.child_presets {
                if !self.presets.contains_key(&child.preset_guid) {
                    messages.push(format!(
                        "preset {} references missing child {}",
                        guid, child.preset_guid
                    ));
                }
            }
            for slot in &preset.part_slots {
                if slot.part_preset.is_valid() && !self.presets.contains_key(&slot.part_preset) {
                    messages.push(format!(
                        "preset {} slot {} references missing part {}",
                        guid, slot.slot_name, slot.part_preset
                    ));
                }
            }
            if let Some(config) = preset.slot_config_preset {
                if !self.presets.contains_key(&config) {
                    messages.push(format!(
                        "preset {} references missing slot config {}",
                        guid, config
                    ));
                }
            }
        }
        messages
    }

    /// Flattens every preset into records, sorted by GUID.
    pub fn to_records(&self) -> CollectionRecord {
        let mut guids: Vec<_> = self.presets.keys().copied().collect();
        guids.sort();
        CollectionRecord {
            presets: guids
                .into_iter()
                .map(|guid| self.presets[&guid].to_record())
                .collect(),
        }
    }

    /// Loads presets from records into this collection. A corrupt record
    /// is skipped whole and reported; sibling records still load.
    pub fn from_records(&mut self, record: &CollectionRecord) -> Vec<String> {
        let mut messages = Vec::new();
        for preset_record in &record.presets {
            match Preset::from_record(preset_record) {
                Ok(preset) => {
                    if let Err(err) = self.add_preset(preset) {
                        messages.push(format!(
                            "rejected preset record {}: {}",
                            preset_record.preset_guid, err
                        ));
                    }
                }
                Err(err) => {
                    messages.push(format!(
                        "rejected preset record {}: {}",
                        preset_record.preset_guid, err
                    ));
                }
            }
        }
        messages
    }
}
