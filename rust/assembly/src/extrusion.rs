// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Extrusion finalization.
//!
//! An extrusion sweeps a 2D profile polygon along a path. Finalization
//! resolves the profile and raw material and computes the non-uniform
//! scale that maps the profile's native extents onto the authored
//! cross-section size.

use bimcraft_core::{names, PropertySheet, Value, ValueScope};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::database::{ArchitecturalMaterial, AssetDatabase, ProfileMesh};

/// One profile extrusion of a trim or mullion assembly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtrusionSpec {
    pub material: Option<ArchitecturalMaterial>,
    pub profile: Option<ProfileMesh>,
    /// Cross-section scale relative to the profile's native extents.
    /// Z is the sweep axis and stays 1.
    pub scale: [f64; 3],
    pub properties: PropertySheet,
}

impl ExtrusionSpec {
    /// Resolves profile and material references and derives the scale.
    /// Both references are required; absence degrades to defaults and is
    /// reported. The derived scale is written back into the property
    /// sheet under `Assembly.Scale` because downstream systems read
    /// scale generically from properties.
    pub fn build(&mut self, db: &dyn AssetDatabase, messages: &mut Vec<String>) {
        let profile_key = self
            .properties
            .try_get_asset_key(ValueScope::Profile, names::ASSET_ID);
        match profile_key.as_deref().and_then(|key| db.profile_by_key(key)) {
            Some(profile) => self.profile = Some(profile.clone()),
            None => {
                tracing::warn!(key = ?profile_key, "extrusion profile not found");
                messages.push(match profile_key {
                    Some(key) => format!("extrusion profile not found: {}", key),
                    None => "extrusion has no profile reference".into(),
                });
            }
        }

        let material_key = self
            .properties
            .try_get_asset_key(ValueScope::RawMaterial, names::ASSET_ID)
            .or_else(|| {
                self.properties
                    .try_get_asset_key(ValueScope::Material, names::ASSET_ID)
            });
        match material_key.as_deref().and_then(|key| db.material_by_key(key)) {
            Some(material) => self.material = Some(material.clone()),
            None => {
                tracing::warn!(key = ?material_key, "extrusion material not found, using default");
                messages.push(match material_key {
                    Some(key) => format!("extrusion material not found: {}", key),
                    None => "extrusion has no material reference".into(),
                });
                self.material = Some(ArchitecturalMaterial::default_material());
            }
        }

        // Diameter is the circular-profile shortcut; otherwise width and
        // depth are read independently.
        let (size_x, size_y) = match self
            .properties
            .try_get_number(ValueScope::Dimension, names::DIAMETER)
        {
            Some(diameter) => (diameter, diameter),
            None => (
                self.properties.number(ValueScope::Dimension, names::WIDTH),
                self.properties.number(ValueScope::Dimension, names::DEPTH),
            ),
        };

        self.scale = match &self.profile {
            Some(profile) if profile.polygon_extents.x > 0.0 && profile.polygon_extents.y > 0.0 => {
                [
                    size_x / profile.polygon_extents.x,
                    size_y / profile.polygon_extents.y,
                    1.0,
                ]
            }
            _ => [1.0, 1.0, 1.0],
        };
        let scale = Vector3::new(self.scale[0], self.scale[1], self.scale[2]);
        if self
            .properties
            .set(
                ValueScope::Assembly,
                names::SCALE,
                Value::Vector([scale.x, scale.y, scale.z]),
            )
            .is_err()
        {
            // Scale is bound read-only in this sheet; authored value wins.
            tracing::warn!("extrusion scale property is bound, keeping authored value");
        }
    }
}
