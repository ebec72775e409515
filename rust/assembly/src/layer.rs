// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Layer finalization.
//!
//! During the tree walk a layer only accumulates properties; `build`
//! resolves them against the asset database: material, color override,
//! pattern, and numeric thickness. Missing references degrade to
//! defaults and are reported, so broken authored data still renders.

use bimcraft_core::{names, PropertySheet, ValueScope};
use serde::{Deserialize, Serialize};

use crate::database::{ArchitecturalMaterial, AssetDatabase, LayerPattern};

/// Thickness applied when no dimension property is present at all.
/// Malformed legacy data degrades to a visibly thin layer instead of
/// producing zero-thickness geometry downstream.
pub const FALLBACK_LAYER_THICKNESS: f64 = 1.0;

/// Structural role of a layer within its assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LayerFunction {
    #[default]
    None,
    Void,
    Insulation,
    Structure,
    Substrate,
    Membrane,
    Adhesive,
    Underlayment,
    Finish,
    Abstract,
}

impl LayerFunction {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "None" => Some(LayerFunction::None),
            "Void" => Some(LayerFunction::Void),
            "Insulation" => Some(LayerFunction::Insulation),
            "Structure" => Some(LayerFunction::Structure),
            "Substrate" => Some(LayerFunction::Substrate),
            "Membrane" => Some(LayerFunction::Membrane),
            "Adhesive" => Some(LayerFunction::Adhesive),
            "Underlayment" => Some(LayerFunction::Underlayment),
            "Finish" => Some(LayerFunction::Finish),
            "Abstract" => Some(LayerFunction::Abstract),
            _ => None,
        }
    }
}

/// Physical form of the layer's material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LayerFormat {
    #[default]
    None,
    Block,
    Board,
    Brick,
    Channel,
    Deck,
    Joist,
    Masonry,
    Mass,
    Panel,
    Plank,
    Roll,
    Spread,
    Stud,
    Sheet,
    Shingle,
    Tile,
}

impl LayerFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "None" => Some(LayerFormat::None),
            "Block" => Some(LayerFormat::Block),
            "Board" => Some(LayerFormat::Board),
            "Brick" => Some(LayerFormat::Brick),
            "Channel" => Some(LayerFormat::Channel),
            "Deck" => Some(LayerFormat::Deck),
            "Joist" => Some(LayerFormat::Joist),
            "Masonry" => Some(LayerFormat::Masonry),
            "Mass" => Some(LayerFormat::Mass),
            "Panel" => Some(LayerFormat::Panel),
            "Plank" => Some(LayerFormat::Plank),
            "Roll" => Some(LayerFormat::Roll),
            "Spread" => Some(LayerFormat::Spread),
            "Stud" => Some(LayerFormat::Stud),
            "Sheet" => Some(LayerFormat::Sheet),
            "Shingle" => Some(LayerFormat::Shingle),
            "Tile" => Some(LayerFormat::Tile),
            _ => None,
        }
    }
}

/// One layer of a layered assembly, outer-to-inner ordered.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayerSpec {
    /// World centimeters.
    pub thickness: f64,
    pub function: LayerFunction,
    pub format: LayerFormat,
    pub material: Option<ArchitecturalMaterial>,
    pub pattern: Option<LayerPattern>,
    /// Everything the tree walk merged into this layer.
    pub properties: PropertySheet,
}

impl LayerSpec {
    /// Resolves the accumulated properties against the asset database.
    /// Soft failures push a message and fall back; only the aggregate
    /// caller decides what to do with a degraded result.
    pub fn build(&mut self, db: &dyn AssetDatabase, messages: &mut Vec<String>) {
        // Material: either scope may carry the asset reference.
        let material_key = self
            .properties
            .try_get_asset_key(ValueScope::Material, names::ASSET_ID)
            .or_else(|| {
                self.properties
                    .try_get_asset_key(ValueScope::RawMaterial, names::ASSET_ID)
            });
        let mut material = match material_key {
            Some(key) => match db.material_by_key(&key) {
                Some(found) => found.clone(),
                None => {
                    tracing::warn!(key = %key, "layer material not found, using default");
                    messages.push(format!("layer material not found: {}", key));
                    ArchitecturalMaterial::default_material()
                }
            },
            None => {
                tracing::warn!("layer has no material reference, using default");
                messages.push("layer has no material reference".into());
                ArchitecturalMaterial::default_material()
            }
        };

        // Color override wins over the material's own base color.
        let color_key = self
            .properties
            .try_get_asset_key(ValueScope::Color, names::ASSET_ID)
            .or_else(|| {
                self.properties
                    .try_get_string(ValueScope::Color, names::NAME)
                    .map(String::from)
            });
        if let Some(key) = color_key {
            match db.color_by_key(&key) {
                Some(color) => material.color = color.clone(),
                None => {
                    tracing::warn!(key = %key, "layer color not found, keeping material color");
                    messages.push(format!("layer color not found: {}", key));
                }
            }
        }
        self.material = Some(material);

        if let Some(key) = self
            .properties
            .try_get_asset_key(ValueScope::Pattern, names::ASSET_ID)
        {
            match db.pattern_by_key(&key) {
                Some(pattern) => self.pattern = Some(pattern.clone()),
                None => {
                    tracing::warn!(key = %key, "layer pattern not found");
                    messages.push(format!("layer pattern not found: {}", key));
                }
            }
        }

        self.thickness = self.resolve_thickness();

        if let Some(function) = self.properties.try_get_string(ValueScope::Layer, names::FUNCTION) {
            self.function = LayerFunction::from_str(function).unwrap_or_default();
        }
        if let Some(format) = self.properties.try_get_string(ValueScope::Layer, names::FORM) {
            self.format = LayerFormat::from_str(format).unwrap_or_default();
        }
    }

    /// Thickness resolution chain: `Thickness`, `Depth`, `Width`, then
    /// the fallback constant.
    fn resolve_thickness(&self) -> f64 {
        for name in [names::THICKNESS, names::DEPTH, names::WIDTH] {
            if let Some(value) = self
                .properties
                .try_get_number(ValueScope::Dimension, name)
            {
                return value;
            }
        }
        tracing::debug!("layer has no dimension property, using fallback thickness");
        FALLBACK_LAYER_THICKNESS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bimcraft_core::Value;

    use crate::database::{CustomColor, InMemoryAssetDatabase};

    fn db_with_material() -> InMemoryAssetDatabase {
        let mut db = InMemoryAssetDatabase::new();
        db.add_material(ArchitecturalMaterial {
            key: "M-Brick".into(),
            display_name: "Brick".into(),
            color: CustomColor {
                key: "C-Red".into(),
                name: "Red".into(),
                hex: "#aa3311".into(),
            },
        });
        db
    }

    #[test]
    fn thickness_chain_prefers_thickness_then_depth_then_width() {
        let mut layer = LayerSpec::default();
        layer
            .properties
            .set(ValueScope::Dimension, names::WIDTH, Value::Number(3.0))
            .unwrap();
        layer
            .properties
            .set(ValueScope::Dimension, names::DEPTH, Value::Number(5.0))
            .unwrap();
        assert_eq!(layer.resolve_thickness(), 5.0);

        layer
            .properties
            .set(ValueScope::Dimension, names::THICKNESS, Value::Number(2.0))
            .unwrap();
        assert_eq!(layer.resolve_thickness(), 2.0);

        assert_eq!(LayerSpec::default().resolve_thickness(), FALLBACK_LAYER_THICKNESS);
    }

    #[test]
    fn missing_material_degrades_to_default_with_message() {
        let db = InMemoryAssetDatabase::new();
        let mut layer = LayerSpec::default();
        layer
            .properties
            .set(
                ValueScope::Material,
                names::ASSET_ID,
                Value::String("M-Gone".into()),
            )
            .unwrap();
        let mut messages = Vec::new();
        layer.build(&db, &mut messages);

        assert_eq!(messages.len(), 1);
        let material = layer.material.unwrap();
        assert_eq!(material.key, "DefaultMaterial");
    }

    #[test]
    fn color_override_beats_material_base_color() {
        let mut db = db_with_material();
        db.add_color(CustomColor {
            key: "C-White".into(),
            name: "White".into(),
            hex: "#ffffff".into(),
        });

        let mut layer = LayerSpec::default();
        layer
            .properties
            .set(
                ValueScope::Material,
                names::ASSET_ID,
                Value::String("M-Brick".into()),
            )
            .unwrap();
        layer
            .properties
            .set(
                ValueScope::Color,
                names::ASSET_ID,
                Value::String("C-White".into()),
            )
            .unwrap();

        let mut messages = Vec::new();
        layer.build(&db, &mut messages);
        assert!(messages.is_empty());
        assert_eq!(layer.material.unwrap().color.hex, "#ffffff");
    }
}
