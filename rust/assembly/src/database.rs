// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Asset database interface.
//!
//! Resolution consumes materials, colors, meshes, profiles, and layer
//! patterns from an already-loaded database. Lookups are synchronous
//! in-memory map reads and return `None` for missing keys; the resolver
//! applies its best-effort policy per lookup.

use nalgebra::{Vector2, Vector3};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Fallback color applied when neither a color nor a material resolves.
pub const DEFAULT_COLOR_HEX: &str = "#808080";

/// An architectural surface material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchitecturalMaterial {
    pub key: String,
    pub display_name: String,
    /// Base color; layer-level color overrides replace it.
    pub color: CustomColor,
}

impl ArchitecturalMaterial {
    /// The neutral gray placeholder for unresolved material references.
    pub fn default_material() -> Self {
        ArchitecturalMaterial {
            key: "DefaultMaterial".into(),
            display_name: "Default Material".into(),
            color: CustomColor::default_color(),
        }
    }
}

/// A named custom color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomColor {
    pub key: String,
    pub name: String,
    pub hex: String,
}

impl CustomColor {
    pub fn default_color() -> Self {
        CustomColor {
            key: "DefaultColor".into(),
            name: "Default Gray".into(),
            hex: DEFAULT_COLOR_HEX.into(),
        }
    }
}

/// An engine mesh asset for rigged parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchitecturalMesh {
    pub key: String,
    pub asset_path: String,
    /// Native bounding size in world centimeters, known once the asset
    /// is loaded. Part transform expressions reference it by name.
    pub native_size: Vector3<f64>,
}

/// A 2D profile polygon swept by extrusions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileMesh {
    pub key: String,
    pub name: String,
    /// Extents of the profile polygon in world centimeters.
    pub polygon_extents: Vector2<f64>,
}

/// A layer fill pattern (brick courses, tile grids).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerPattern {
    pub key: String,
    pub name: String,
    pub module_count: u32,
}

/// External asset lookups the resolver depends on. Absence is a normal
/// condition handled by the caller, never a panic.
pub trait AssetDatabase {
    fn material_by_key(&self, key: &str) -> Option<&ArchitecturalMaterial>;
    fn color_by_key(&self, key: &str) -> Option<&CustomColor>;
    fn mesh_by_key(&self, key: &str) -> Option<&ArchitecturalMesh>;
    fn profile_by_key(&self, key: &str) -> Option<&ProfileMesh>;
    fn pattern_by_key(&self, key: &str) -> Option<&LayerPattern>;
}

/// Map-backed asset database, used by tests and batch tooling.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAssetDatabase {
    materials: FxHashMap<String, ArchitecturalMaterial>,
    colors: FxHashMap<String, CustomColor>,
    meshes: FxHashMap<String, ArchitecturalMesh>,
    profiles: FxHashMap<String, ProfileMesh>,
    patterns: FxHashMap<String, LayerPattern>,
}

impl InMemoryAssetDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_material(&mut self, material: ArchitecturalMaterial) {
        self.materials.insert(material.key.clone(), material);
    }

    pub fn add_color(&mut self, color: CustomColor) {
        self.colors.insert(color.key.clone(), color);
    }

    pub fn add_mesh(&mut self, mesh: ArchitecturalMesh) {
        self.meshes.insert(mesh.key.clone(), mesh);
    }

    pub fn add_profile(&mut self, profile: ProfileMesh) {
        self.profiles.insert(profile.key.clone(), profile);
    }

    pub fn add_pattern(&mut self, pattern: LayerPattern) {
        self.patterns.insert(pattern.key.clone(), pattern);
    }
}

impl AssetDatabase for InMemoryAssetDatabase {
    fn material_by_key(&self, key: &str) -> Option<&ArchitecturalMaterial> {
        self.materials.get(key)
    }

    fn color_by_key(&self, key: &str) -> Option<&CustomColor> {
        self.colors.get(key)
    }

    fn mesh_by_key(&self, key: &str) -> Option<&ArchitecturalMesh> {
        self.meshes.get(key)
    }

    fn profile_by_key(&self, key: &str) -> Option<&ProfileMesh> {
        self.profiles.get(key)
    }

    fn pattern_by_key(&self, key: &str) -> Option<&LayerPattern> {
        self.patterns.get(key)
    }
}
