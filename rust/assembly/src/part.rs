// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Rigged part specs.
//!
//! Compound objects (doors, windows, cabinets, FFE) resolve into a flat
//! list of parts, each carrying a mesh reference, per-channel material
//! overrides, and unevaluated transform expressions. Expressions stay as
//! strings until render time because they reference mesh native sizes
//! that are only known once assets are loaded.

use bimcraft_core::{PresetGuid, PropertySheet};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::database::{ArchitecturalMaterial, ArchitecturalMesh};

/// A triple of deferred-evaluation formula strings, one per axis.
/// Formulas reference named variables such as `Parent.NativeSizeX`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorExpression {
    pub x: String,
    pub y: String,
    pub z: String,
}

impl VectorExpression {
    pub fn new(x: impl Into<String>, y: impl Into<String>, z: impl Into<String>) -> Self {
        VectorExpression {
            x: x.into(),
            y: y.into(),
            z: z.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty() && self.y.is_empty() && self.z.is_empty()
    }
}

/// One resolved part of a rigged assembly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartSpec {
    pub preset_guid: PresetGuid,
    /// Named attachment point this part fills, empty for synthesized
    /// single-mesh parts.
    pub slot_name: String,
    /// Index into the flat part list of the part this one attaches to;
    /// -1 for top-level parts. Nested sub-assemblies are spliced flat,
    /// so the index is rebased at splice time.
    pub parent_slot_index: i32,
    pub mesh: Option<ArchitecturalMesh>,
    /// Material overrides keyed by authored pin-channel name. Channel
    /// names are an indirection layer and need not match engine mesh
    /// material slot names.
    pub channel_materials: FxHashMap<String, ArchitecturalMaterial>,
    pub translation: VectorExpression,
    pub orientation: VectorExpression,
    pub size: VectorExpression,
    pub flip: [bool; 3],
    pub properties: PropertySheet,
}

impl PartSpec {
    pub fn new(preset_guid: PresetGuid) -> Self {
        PartSpec {
            preset_guid,
            parent_slot_index: -1,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_part_is_top_level() {
        let part = PartSpec::new(PresetGuid::generate());
        assert_eq!(part.parent_slot_index, -1);
        assert!(part.translation.is_empty());
        assert!(part.mesh.is_none());
    }
}
