// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The compiled assembly: the flat output of a resolution pass, consumed
//! by geometry builders and UI layers.

use bimcraft_core::{names, ObjectType, PresetGuid, PropertySheet, ValueScope};
use serde::{Deserialize, Serialize};

use crate::extrusion::ExtrusionSpec;
use crate::layer::LayerSpec;
use crate::part::PartSpec;

/// A preset tree compiled into flat, render-ready form. Layer lists are
/// outer-to-inner; tread and riser stacks are kept separate for stairs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssemblySpec {
    pub object_type: ObjectType,
    pub root_preset: PresetGuid,
    pub display_name: String,
    pub code_name: String,
    pub comments: String,
    /// Properties merged at the assembly root, outside any layer or
    /// extrusion. Downstream systems read `Assembly.Scale` and similar
    /// keys from here.
    pub root_properties: PropertySheet,
    pub layers: Vec<LayerSpec>,
    pub tread_layers: Vec<LayerSpec>,
    pub riser_layers: Vec<LayerSpec>,
    pub extrusions: Vec<ExtrusionSpec>,
    pub parts: Vec<PartSpec>,
}

impl AssemblySpec {
    pub fn new(root_preset: PresetGuid) -> Self {
        AssemblySpec {
            root_preset,
            ..Default::default()
        }
    }

    /// Total depth of the default layer stack in world centimeters.
    /// Tread and riser stacks are excluded; their depth is a per-step
    /// quantity, not an overall assembly dimension.
    pub fn calculate_thickness(&self) -> f64 {
        self.layers.iter().map(|layer| layer.thickness).sum()
    }

    /// Pulls the identity strings out of the merged root properties.
    /// Called once at the end of resolution.
    pub(crate) fn capture_identity(&mut self) {
        self.display_name = self
            .root_properties
            .string(ValueScope::Assembly, names::NAME)
            .to_string();
        self.code_name = self
            .root_properties
            .string(ValueScope::Assembly, names::CODE)
            .to_string();
        self.comments = self
            .root_properties
            .string(ValueScope::Assembly, names::COMMENTS)
            .to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn thickness_sums_default_stack_only() {
        let mut spec = AssemblySpec::default();
        spec.layers.push(LayerSpec {
            thickness: 2.0,
            ..Default::default()
        });
        spec.layers.push(LayerSpec {
            thickness: 5.0,
            ..Default::default()
        });
        spec.tread_layers.push(LayerSpec {
            thickness: 4.0,
            ..Default::default()
        });
        assert_relative_eq!(spec.calculate_thickness(), 7.0);
    }
}
