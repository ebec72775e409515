// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Closed enums for property scoping and runtime object kinds.
//!
//! [`ValueScope`] does double duty: it namespaces property keys
//! (`Dimension.Thickness`, `Color.AssetID`) and it classifies preset nodes
//! (a `Layer`-scope preset opens a new layer during resolution). Keeping
//! one enum for both mirrors how properties are rescoped through the node
//! that carries them.

use serde::{Deserialize, Serialize};

/// Property namespace and preset node classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ValueScope {
    #[default]
    None,
    Assembly,
    Layer,
    Profile,
    Pattern,
    Module,
    Gap,
    Mesh,
    Dimension,
    Color,
    Material,
    RawMaterial,
    Slot,
    SlotConfig,
    Part,
    Node,
}

impl ValueScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueScope::None => "None",
            ValueScope::Assembly => "Assembly",
            ValueScope::Layer => "Layer",
            ValueScope::Profile => "Profile",
            ValueScope::Pattern => "Pattern",
            ValueScope::Module => "Module",
            ValueScope::Gap => "Gap",
            ValueScope::Mesh => "Mesh",
            ValueScope::Dimension => "Dimension",
            ValueScope::Color => "Color",
            ValueScope::Material => "Material",
            ValueScope::RawMaterial => "RawMaterial",
            ValueScope::Slot => "Slot",
            ValueScope::SlotConfig => "SlotConfig",
            ValueScope::Part => "Part",
            ValueScope::Node => "Node",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "None" => Some(ValueScope::None),
            "Assembly" => Some(ValueScope::Assembly),
            "Layer" => Some(ValueScope::Layer),
            "Profile" => Some(ValueScope::Profile),
            "Pattern" => Some(ValueScope::Pattern),
            "Module" => Some(ValueScope::Module),
            "Gap" => Some(ValueScope::Gap),
            "Mesh" => Some(ValueScope::Mesh),
            "Dimension" => Some(ValueScope::Dimension),
            "Color" => Some(ValueScope::Color),
            "Material" => Some(ValueScope::Material),
            "RawMaterial" => Some(ValueScope::RawMaterial),
            "Slot" => Some(ValueScope::Slot),
            "SlotConfig" => Some(ValueScope::SlotConfig),
            "Part" => Some(ValueScope::Part),
            "Node" => Some(ValueScope::Node),
            _ => None,
        }
    }

    /// Scopes that carry a material asset reference on a layer.
    pub fn is_material(&self) -> bool {
        matches!(self, ValueScope::Material | ValueScope::RawMaterial)
    }
}

/// Which layer stack a child attachment feeds during resolution. Only
/// staircases distinguish tread and riser sub-trees; everything else
/// stays on `Default`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PinTarget {
    #[default]
    Default,
    Tread,
    Riser,
}

impl PinTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            PinTarget::Default => "Default",
            PinTarget::Tread => "Tread",
            PinTarget::Riser => "Riser",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Default" => Some(PinTarget::Default),
            "Tread" => Some(PinTarget::Tread),
            "Riser" => Some(PinTarget::Riser),
            _ => None,
        }
    }
}

/// The runtime object kind an assembly ultimately produces. `None` marks
/// intermediate/adjective presets (colors, materials, dimensions) that
/// never resolve on their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ObjectType {
    #[default]
    None,
    Wall,
    Floor,
    Ceiling,
    Roof,
    Countertop,
    Finish,
    Stair,
    Trim,
    StructureLine,
    Door,
    Window,
    Cabinet,
    Furniture,
}

impl ObjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::None => "None",
            ObjectType::Wall => "Wall",
            ObjectType::Floor => "Floor",
            ObjectType::Ceiling => "Ceiling",
            ObjectType::Roof => "Roof",
            ObjectType::Countertop => "Countertop",
            ObjectType::Finish => "Finish",
            ObjectType::Stair => "Stair",
            ObjectType::Trim => "Trim",
            ObjectType::StructureLine => "StructureLine",
            ObjectType::Door => "Door",
            ObjectType::Window => "Window",
            ObjectType::Cabinet => "Cabinet",
            ObjectType::Furniture => "Furniture",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "None" => Some(ObjectType::None),
            "Wall" => Some(ObjectType::Wall),
            "Floor" => Some(ObjectType::Floor),
            "Ceiling" => Some(ObjectType::Ceiling),
            "Roof" => Some(ObjectType::Roof),
            "Countertop" => Some(ObjectType::Countertop),
            "Finish" => Some(ObjectType::Finish),
            "Stair" => Some(ObjectType::Stair),
            "Trim" => Some(ObjectType::Trim),
            "StructureLine" => Some(ObjectType::StructureLine),
            "Door" => Some(ObjectType::Door),
            "Window" => Some(ObjectType::Window),
            "Cabinet" => Some(ObjectType::Cabinet),
            "Furniture" => Some(ObjectType::Furniture),
            _ => None,
        }
    }

    /// Object kinds that resolve into an ordered layer stack.
    pub fn is_layered(&self) -> bool {
        matches!(
            self,
            ObjectType::Wall
                | ObjectType::Floor
                | ObjectType::Ceiling
                | ObjectType::Roof
                | ObjectType::Countertop
                | ObjectType::Finish
                | ObjectType::Stair
        )
    }

    /// Object kinds that resolve into a swept profile extrusion.
    pub fn is_extruded(&self) -> bool {
        matches!(self, ObjectType::Trim | ObjectType::StructureLine)
    }

    /// Object kinds that resolve into rigged parts with slot transforms.
    pub fn is_rigged(&self) -> bool {
        matches!(
            self,
            ObjectType::Door | ObjectType::Window | ObjectType::Cabinet | ObjectType::Furniture
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_string_round_trip() {
        for scope in [
            ValueScope::None,
            ValueScope::Assembly,
            ValueScope::Layer,
            ValueScope::Profile,
            ValueScope::Pattern,
            ValueScope::Module,
            ValueScope::Gap,
            ValueScope::Mesh,
            ValueScope::Dimension,
            ValueScope::Color,
            ValueScope::Material,
            ValueScope::RawMaterial,
            ValueScope::Slot,
            ValueScope::SlotConfig,
            ValueScope::Part,
            ValueScope::Node,
        ] {
            assert_eq!(ValueScope::from_str(scope.as_str()), Some(scope));
        }
        assert_eq!(ValueScope::from_str("Nonsense"), None);
    }

    #[test]
    fn object_type_classification() {
        assert!(ObjectType::Wall.is_layered());
        assert!(ObjectType::Stair.is_layered());
        assert!(ObjectType::Trim.is_extruded());
        assert!(ObjectType::Door.is_rigged());
        assert!(!ObjectType::None.is_layered());
        assert!(!ObjectType::None.is_extruded());
        assert!(!ObjectType::None.is_rigged());
    }
}
