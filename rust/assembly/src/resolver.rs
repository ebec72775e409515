// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Preset tree to assembly spec resolution.
//!
//! [`from_preset`] walks a preset tree depth-first with an explicit
//! stack and compiles it into a flat [`AssemblySpec`]. The walk is
//! best-effort: broken references degrade to defaults and are collected
//! as messages on the [`Resolution`], while structural violations
//! (cyclic graphs, conflicting object types) abort with a hard error.
//!
//! Traversal order is load-bearing. Layers are visually significant
//! (first declared renders outermost), so children are pushed in reverse
//! declaration order and the stack pops them in declaration order.

use bimcraft_core::{
    names, ChildAttachment, ObjectType, PinTarget, Preset, PresetCollection, PresetGuid,
    PropertySheet, Value, ValueScope,
};
use rayon::prelude::*;
use rustc_hash::FxHashMap;

use crate::database::AssetDatabase;
use crate::error::{Error, Resolution, Result};
use crate::extrusion::ExtrusionSpec;
use crate::layer::LayerSpec;
use crate::part::{PartSpec, VectorExpression};
use crate::spec::AssemblySpec;

/// Compiles the preset tree rooted at `root` into an [`AssemblySpec`].
///
/// Hard failures: the root preset must exist, the reachable graph must be
/// acyclic, and at most one non-`None` object type may appear across the
/// tree. Everything else degrades and is reported through
/// [`Resolution::messages`].
pub fn from_preset(
    db: &dyn AssetDatabase,
    collection: &PresetCollection,
    root: PresetGuid,
) -> Result<Resolution> {
    collection.preset(root)?;
    detect_cycle(collection, root)?;

    let mut resolver = Resolver {
        db,
        collection,
        spec: AssemblySpec::new(root),
        messages: Vec::new(),
        recorded_type: None,
    };
    resolver.walk(root)?;
    resolver.finalize()
}

/// Resolves a single layer preset for preview, outside any authored
/// assembly. A scratch root of the given object type is synthesized
/// around the layer so the ordinary walk and finalization apply.
pub fn from_layer_preset(
    db: &dyn AssetDatabase,
    collection: &PresetCollection,
    layer: PresetGuid,
    object_type: ObjectType,
) -> Result<Resolution> {
    collection.preset(layer)?;

    let mut scratch = collection.clone();
    let root_guid = scratch.available_guid()?;
    let mut root = Preset {
        guid: root_guid,
        display_name: "Layer Preview".into(),
        node_scope: ValueScope::Assembly,
        object_type,
        ..Default::default()
    };
    root.child_presets.push(ChildAttachment::new(0, 0, layer));
    scratch.add_preset(root)?;

    let mut resolution = from_preset(db, &scratch, root_guid)?;
    resolution.spec.root_preset = layer;
    Ok(resolution)
}

/// Resolves every object-type-bearing preset in the collection, in
/// parallel. Project load uses this to precompute all assemblies; each
/// root is an independent read-only walk over the shared collection.
pub fn resolve_all(
    db: &(dyn AssetDatabase + Sync),
    collection: &PresetCollection,
) -> Vec<(PresetGuid, Result<Resolution>)> {
    let roots = collection.presets_by_predicate(|preset| preset.object_type != ObjectType::None);
    roots
        .into_par_iter()
        .map(|root| (root, from_preset(db, collection, root)))
        .collect()
}

/// Verifies the graph reachable from `root` is acyclic before the main
/// walk starts. A plain visited set would also reject legitimate diamond
/// sharing (one material preset under two layers), so this tracks
/// in-progress nodes separately and only a back edge is an error.
/// Dangling references are skipped here; the walk reports them.
fn detect_cycle(collection: &PresetCollection, root: PresetGuid) -> Result<()> {
    enum Visit {
        Enter(PresetGuid),
        Exit(PresetGuid),
    }

    // false = on the current path, true = fully explored.
    let mut state: FxHashMap<PresetGuid, bool> = FxHashMap::default();
    let mut stack = vec![Visit::Enter(root)];
    while let Some(visit) = stack.pop() {
        match visit {
            Visit::Enter(guid) => {
                match state.get(&guid) {
                    Some(false) => return Err(Error::CyclicPresetGraph(guid)),
                    Some(true) => continue,
                    None => {}
                }
                state.insert(guid, false);
                stack.push(Visit::Exit(guid));
                let Some(preset) = collection.presets.get(&guid) else {
                    continue;
                };
                for child in &preset.child_presets {
                    stack.push(Visit::Enter(child.preset_guid));
                }
                for slot in &preset.part_slots {
                    if slot.part_preset.is_valid() {
                        stack.push(Visit::Enter(slot.part_preset));
                    }
                }
                if let Some(config) = preset.slot_config_preset {
                    stack.push(Visit::Enter(config));
                }
            }
            Visit::Exit(guid) => {
                state.insert(guid, true);
            }
        }
    }
    Ok(())
}

/// Which property sheet a frame's merges land in.
#[derive(Debug, Clone, Copy)]
enum SheetAddr {
    Root,
    Layer(PinTarget, usize),
    Extrusion(usize),
}

/// One pending node of the iterative walk.
struct Frame {
    guid: PresetGuid,
    /// Layer stack this subtree feeds.
    target: PinTarget,
    sheet: SheetAddr,
}

struct Resolver<'a> {
    db: &'a dyn AssetDatabase,
    collection: &'a PresetCollection,
    spec: AssemblySpec,
    messages: Vec<String>,
    recorded_type: Option<ObjectType>,
}

impl<'a> Resolver<'a> {
    fn walk(&mut self, root: PresetGuid) -> Result<()> {
        let collection = self.collection;
        let mut stack = vec![Frame {
            guid: root,
            target: PinTarget::Default,
            sheet: SheetAddr::Root,
        }];

        while let Some(frame) = stack.pop() {
            let Ok(preset) = collection.preset(frame.guid) else {
                self.messages.push(format!("missing preset {}", frame.guid));
                continue;
            };

            self.record_object_type(preset)?;

            let mut sheet = frame.sheet;
            match preset.node_scope {
                // Gaps between modules are not resolved into geometry by
                // this layer.
                ValueScope::Gap => continue,
                ValueScope::Pattern => {
                    // Patterns follow their layer in traversal order.
                    match self.last_layer(frame.target) {
                        Some(index) => {
                            sheet = SheetAddr::Layer(frame.target, index);
                            // A pattern preset with no authored asset
                            // reference is its own asset, keyed by GUID
                            // like color presets.
                            if scoped_asset_key(preset, ValueScope::Pattern).is_none() {
                                let guid = preset.guid;
                                if self
                                    .sheet_mut(sheet)
                                    .set(ValueScope::Pattern, names::ASSET_ID, Value::Guid(guid))
                                    .is_err()
                                {
                                    self.messages.push(format!(
                                        "pattern reference {} rejected by a bound property",
                                        guid
                                    ));
                                }
                            }
                        }
                        None => {
                            self.messages.push(format!(
                                "pattern {} has no preceding layer",
                                preset.guid
                            ));
                            continue;
                        }
                    }
                }
                ValueScope::Layer => {
                    let layers = self.layer_stack_mut(frame.target);
                    layers.push(LayerSpec::default());
                    sheet = SheetAddr::Layer(frame.target, layers.len() - 1);
                }
                ValueScope::Profile => {
                    // Extrusions and layered stacks are mutually exclusive;
                    // a mixed tree keeps its layers and drops the extrusion.
                    if !self.spec.layers.is_empty()
                        || !self.spec.tread_layers.is_empty()
                        || !self.spec.riser_layers.is_empty()
                    {
                        tracing::warn!(preset = %preset.guid, "ignoring extrusion on a layered assembly");
                        self.messages.push(format!(
                            "ignoring extrusion {} on a layered assembly",
                            preset.guid
                        ));
                        continue;
                    }
                    self.spec.extrusions.push(ExtrusionSpec::default());
                    sheet = SheetAddr::Extrusion(self.spec.extrusions.len() - 1);
                }
                ValueScope::Color => {
                    // A color preset is its own asset reference.
                    let guid = preset.guid;
                    if self
                        .sheet_mut(sheet)
                        .set(ValueScope::Color, names::ASSET_ID, Value::Guid(guid))
                        .is_err()
                    {
                        self.messages.push(format!(
                            "color reference {} rejected by a bound property",
                            guid
                        ));
                    }
                }
                _ => {}
            }

            self.sheet_mut(sheet)
                .add_rescoped(&preset.properties, preset.node_scope);

            if !preset.part_slots.is_empty() {
                self.walk_part_slots(preset)?;
            }

            // Reverse push so declaration order pops first; layer stacking
            // is first-declared outermost.
            for child in preset.child_presets.iter().rev() {
                let target = match child.pin_target {
                    PinTarget::Default => frame.target,
                    explicit => explicit,
                };
                stack.push(Frame {
                    guid: child.preset_guid,
                    target,
                    sheet,
                });
            }
        }
        Ok(())
    }

    /// First non-`None` object type wins; a later distinct one is a
    /// contract violation, never a silent overwrite.
    fn record_object_type(&mut self, preset: &Preset) -> Result<()> {
        if preset.object_type == ObjectType::None {
            return Ok(());
        }
        match self.recorded_type {
            None => {
                self.recorded_type = Some(preset.object_type);
                self.spec.object_type = preset.object_type;
                Ok(())
            }
            Some(first) if first != preset.object_type => Err(Error::ConflictingObjectType {
                first,
                second: preset.object_type,
            }),
            Some(_) => Ok(()),
        }
    }

    fn layer_stack_mut(&mut self, target: PinTarget) -> &mut Vec<LayerSpec> {
        match target {
            PinTarget::Default => &mut self.spec.layers,
            PinTarget::Tread => &mut self.spec.tread_layers,
            PinTarget::Riser => &mut self.spec.riser_layers,
        }
    }

    fn last_layer(&self, target: PinTarget) -> Option<usize> {
        let layers = match target {
            PinTarget::Default => &self.spec.layers,
            PinTarget::Tread => &self.spec.tread_layers,
            PinTarget::Riser => &self.spec.riser_layers,
        };
        layers.len().checked_sub(1)
    }

    fn sheet_mut(&mut self, addr: SheetAddr) -> &mut PropertySheet {
        match addr {
            SheetAddr::Root => &mut self.spec.root_properties,
            SheetAddr::Layer(target, index) => {
                &mut self.layer_stack_mut(target)[index].properties
            }
            SheetAddr::Extrusion(index) => &mut self.spec.extrusions[index].properties,
        }
    }

    /// Resolves a compound preset's part slots into flat part specs.
    /// A missing slot config aborts this preset's parts only; nested
    /// sub-assemblies are resolved recursively and spliced flat.
    fn walk_part_slots(&mut self, preset: &'a Preset) -> Result<()> {
        let collection = self.collection;

        let Some(config_guid) = preset.slot_config_preset else {
            self.messages.push(format!(
                "preset {} declares part slots but no slot config",
                preset.guid
            ));
            return Ok(());
        };
        let Ok(config) = collection.preset(config_guid) else {
            self.messages
                .push(format!("missing slot config {}", config_guid));
            return Ok(());
        };

        // Slot id to the flat index of the part it produced; parent links
        // are fixed up after every slot has a home.
        let mut slot_indices: FxHashMap<&str, usize> = FxHashMap::default();
        let mut parent_fixups: Vec<(usize, &str)> = Vec::new();

        for slot in &preset.part_slots {
            if !slot.part_preset.is_valid() {
                self.messages.push(format!(
                    "part slot {} of {} has no preset",
                    slot.slot_name, preset.guid
                ));
                continue;
            }
            let Ok(part_preset) = collection.preset(slot.part_preset) else {
                self.messages.push(format!(
                    "part slot {} references missing preset {}",
                    slot.slot_name, slot.part_preset
                ));
                continue;
            };

            if part_preset.node_scope == ValueScope::Assembly {
                // A nested sub-assembly flattens into the outer part list;
                // its internal parent links are rebased at splice time.
                let mut nested = from_preset(self.db, collection, slot.part_preset)?;
                self.messages.append(&mut nested.messages);
                let offset = self.spec.parts.len() as i32;
                if !nested.spec.parts.is_empty() {
                    slot_indices.insert(slot.id.as_str(), self.spec.parts.len());
                }
                for mut part in nested.spec.parts {
                    if part.parent_slot_index >= 0 {
                        part.parent_slot_index += offset;
                    }
                    self.spec.parts.push(part);
                }
                continue;
            }

            let mut part = PartSpec::new(slot.part_preset);
            part.slot_name = slot.slot_name.clone();
            // The compound preset's properties carry assembly-wide values
            // (dimensions, identity) every part needs; the part's own
            // properties layer on top.
            part.properties
                .add_rescoped(&preset.properties, preset.node_scope);
            part.properties
                .add_rescoped(&part_preset.properties, part_preset.node_scope);
            self.scan_part_children(part_preset, &mut part);
            if part.mesh.is_some() {
                self.apply_slot_transform(config, &slot.slot_name, &mut part);
            }

            let index = self.spec.parts.len();
            slot_indices.insert(slot.id.as_str(), index);
            if !slot.parent_id.is_empty() {
                parent_fixups.push((index, slot.parent_id.as_str()));
            }
            self.spec.parts.push(part);
        }

        for (index, parent_id) in parent_fixups {
            if let Some(&parent_index) = slot_indices.get(parent_id) {
                self.spec.parts[index].parent_slot_index = parent_index as i32;
            } else {
                self.messages.push(format!(
                    "part slot parent id {} not found in {}",
                    parent_id, preset.guid
                ));
            }
        }
        Ok(())
    }

    /// Walks a part preset's children for channel material overrides and
    /// the mesh asset reference.
    fn scan_part_children(&mut self, part_preset: &'a Preset, part: &mut PartSpec) {
        let collection = self.collection;
        for attachment in &part_preset.child_presets {
            let Ok(child) = collection.preset(attachment.preset_guid) else {
                self.messages.push(format!(
                    "part {} references missing child {}",
                    part_preset.guid, attachment.preset_guid
                ));
                continue;
            };
            if child.node_scope.is_material() {
                let Some(key) = scoped_asset_key(child, child.node_scope) else {
                    self.messages.push(format!(
                        "part material {} carries no asset reference",
                        child.guid
                    ));
                    continue;
                };
                // Channel names are authored indirection, not engine
                // material slot names.
                let channel = child
                    .properties
                    .try_get_string(child.node_scope, names::CHANNEL)
                    .or_else(|| child.properties.try_get_string(ValueScope::Node, names::CHANNEL))
                    .unwrap_or(child.display_name.as_str())
                    .to_string();
                match self.db.material_by_key(&key) {
                    Some(material) => {
                        part.channel_materials.insert(channel, material.clone());
                    }
                    None => {
                        self.messages
                            .push(format!("part material not found: {}", key));
                    }
                }
            } else if child.node_scope == ValueScope::Mesh {
                let Some(key) = scoped_asset_key(child, ValueScope::Mesh) else {
                    self.messages.push(format!(
                        "part mesh {} carries no asset reference",
                        child.guid
                    ));
                    continue;
                };
                match self.db.mesh_by_key(&key) {
                    Some(mesh) => part.mesh = Some(mesh.clone()),
                    None => {
                        self.messages.push(format!("part mesh not found: {}", key));
                    }
                }
            }
        }
    }

    /// Copies the named slot's transform expressions onto the part. The
    /// expressions stay unevaluated; native mesh sizes they reference are
    /// only known at render time.
    fn apply_slot_transform(&mut self, config: &'a Preset, slot_name: &str, part: &mut PartSpec) {
        let collection = self.collection;
        for attachment in &config.child_presets {
            let Ok(slot_preset) = collection.preset(attachment.preset_guid) else {
                continue;
            };
            let named = slot_preset
                .properties
                .try_get_string(ValueScope::Slot, names::NAME)
                .unwrap_or(slot_preset.display_name.as_str());
            if named != slot_name {
                continue;
            }

            let expr = |name: &str| {
                slot_preset
                    .properties
                    .try_get_string(ValueScope::Slot, name)
                    .unwrap_or("")
                    .to_string()
            };
            part.translation = VectorExpression::new(
                expr(names::LOCATION_X),
                expr(names::LOCATION_Y),
                expr(names::LOCATION_Z),
            );
            part.orientation = VectorExpression::new(
                expr(names::ROTATION_X),
                expr(names::ROTATION_Y),
                expr(names::ROTATION_Z),
            );
            part.size = VectorExpression::new(
                expr(names::SIZE_X),
                expr(names::SIZE_Y),
                expr(names::SIZE_Z),
            );
            let flip = |name: &str| {
                slot_preset
                    .properties
                    .try_get_bool(ValueScope::Slot, name)
                    .unwrap_or(false)
            };
            part.flip = [flip(names::FLIP_X), flip(names::FLIP_Y), flip(names::FLIP_Z)];
            return;
        }
        self.messages.push(format!(
            "slot config {} has no slot named {}",
            config.guid, slot_name
        ));
    }

    /// Dispatches to the finalization builder matching the recorded
    /// object type. A tree without one legitimately resolves to an empty
    /// spec (sub-preset previews).
    fn finalize(mut self) -> Result<Resolution> {
        self.spec.capture_identity();
        if self.spec.display_name.is_empty() {
            if let Ok(root) = self.collection.preset(self.spec.root_preset) {
                self.spec.display_name = root.display_name.clone();
            }
        }

        let object_type = self.spec.object_type;
        if object_type.is_layered() {
            for layer in self.spec.layers.iter_mut() {
                layer.build(self.db, &mut self.messages);
            }
            for layer in self.spec.tread_layers.iter_mut() {
                layer.build(self.db, &mut self.messages);
            }
            for layer in self.spec.riser_layers.iter_mut() {
                layer.build(self.db, &mut self.messages);
            }
        } else if object_type.is_extruded() {
            for extrusion in self.spec.extrusions.iter_mut() {
                extrusion.build(self.db, &mut self.messages);
            }
        } else if object_type.is_rigged() && self.spec.parts.is_empty() {
            // Legacy stub FFE: one mesh property at the root, no slots.
            let mut part = PartSpec::new(self.spec.root_preset);
            match self
                .spec
                .root_properties
                .try_get_asset_key(ValueScope::Mesh, names::ASSET_ID)
            {
                Some(key) => match self.db.mesh_by_key(&key) {
                    Some(mesh) => part.mesh = Some(mesh.clone()),
                    None => self.messages.push(format!("rigged mesh not found: {}", key)),
                },
                None => self
                    .messages
                    .push("rigged assembly has no mesh reference".into()),
            }
            self.spec.parts.push(part);
        }

        Ok(Resolution {
            spec: self.spec,
            messages: self.messages,
        })
    }
}

/// Asset reference of an adjective preset: authored either under its own
/// concrete scope or under the node scope before rescoping.
fn scoped_asset_key(preset: &Preset, scope: ValueScope) -> Option<String> {
    preset
        .properties
        .try_get_asset_key(scope, names::ASSET_ID)
        .or_else(|| {
            preset
                .properties
                .try_get_asset_key(ValueScope::Node, names::ASSET_ID)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bimcraft_core::PartSlot;

    use crate::database::InMemoryAssetDatabase;

    fn add(collection: &mut PresetCollection, preset: Preset) -> PresetGuid {
        let guid = preset.guid;
        collection.add_preset(preset).unwrap();
        guid
    }

    fn preset(name: &str, scope: ValueScope) -> Preset {
        Preset {
            guid: PresetGuid::generate(),
            display_name: name.into(),
            node_scope: scope,
            ..Default::default()
        }
    }

    #[test]
    fn cycle_detection_rejects_back_edges_only() {
        let mut collection = PresetCollection::new();
        let shared = add(&mut collection, preset("Shared", ValueScope::Material));
        let mut left = preset("Left", ValueScope::Layer);
        left.child_presets.push(ChildAttachment::new(0, 0, shared));
        let left = add(&mut collection, left);
        let mut right = preset("Right", ValueScope::Layer);
        right.child_presets.push(ChildAttachment::new(0, 0, shared));
        let right = add(&mut collection, right);
        let mut root = preset("Root", ValueScope::Assembly);
        root.child_presets.push(ChildAttachment::new(0, 0, left));
        root.child_presets.push(ChildAttachment::new(0, 1, right));
        let root = add(&mut collection, root);

        // Diamond sharing is legitimate.
        assert!(detect_cycle(&collection, root).is_ok());

        // A true back edge is not.
        collection
            .presets
            .get_mut(&shared)
            .unwrap()
            .child_presets
            .push(ChildAttachment::new(0, 0, root));
        assert!(matches!(
            detect_cycle(&collection, root),
            Err(Error::CyclicPresetGraph(_))
        ));
    }

    #[test]
    fn missing_root_is_a_hard_error() {
        let collection = PresetCollection::new();
        let db = InMemoryAssetDatabase::new();
        let err = from_preset(&db, &collection, PresetGuid::generate());
        assert!(matches!(err, Err(Error::Core(_))));
    }

    #[test]
    fn part_slot_parent_links_resolve_to_flat_indices() {
        let mut collection = PresetCollection::new();
        let db = InMemoryAssetDatabase::new();

        let body = add(&mut collection, preset("Body", ValueScope::Part));
        let handle = add(&mut collection, preset("Handle", ValueScope::Part));
        let config = add(&mut collection, preset("Slots", ValueScope::SlotConfig));

        let mut door = preset("Door", ValueScope::Assembly);
        door.object_type = ObjectType::Door;
        door.slot_config_preset = Some(config);
        door.part_slots.push(PartSlot {
            slot_name: "Body".into(),
            part_preset: body,
            id: "s0".into(),
            parent_id: String::new(),
        });
        door.part_slots.push(PartSlot {
            slot_name: "Handle".into(),
            part_preset: handle,
            id: "s1".into(),
            parent_id: "s0".into(),
        });
        let door = add(&mut collection, door);

        let resolution = from_preset(&db, &collection, door).unwrap();
        assert_eq!(resolution.spec.parts.len(), 2);
        assert_eq!(resolution.spec.parts[0].parent_slot_index, -1);
        assert_eq!(resolution.spec.parts[1].parent_slot_index, 0);
    }
}
