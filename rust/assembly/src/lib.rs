// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # BimCraft Assembly
//!
//! Resolution of authored preset trees into flat, render-ready assembly
//! specs: ordered layer stacks for walls and floors, profile extrusions
//! for trim, and rigged part lists for doors, windows, and furniture.
//!
//! Resolution is best-effort by design. A broken asset reference
//! degrades to a default and is reported on the [`Resolution`] message
//! list rather than aborting; only structural violations (cyclic preset
//! graphs, conflicting object types) are hard errors. This matches the
//! system's role as an interactive authoring tool where partially
//! invalid states are normal and fixable.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bimcraft_assembly::{from_preset, InMemoryAssetDatabase};
//! use bimcraft_core::{PresetCollection, PresetGuid};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let db = InMemoryAssetDatabase::new();
//! let collection = PresetCollection::new();
//! # let wall_guid = PresetGuid::generate();
//! let resolution = from_preset(&db, &collection, wall_guid)?;
//! println!(
//!     "{} layers, {:.1} cm thick",
//!     resolution.spec.layers.len(),
//!     resolution.spec.calculate_thickness()
//! );
//! # Ok(())
//! # }
//! ```

pub mod database;
pub mod error;
pub mod extrusion;
pub mod layer;
pub mod part;
pub mod resolver;
pub mod spec;

pub use database::{
    ArchitecturalMaterial, ArchitecturalMesh, AssetDatabase, CustomColor, InMemoryAssetDatabase,
    LayerPattern, ProfileMesh, DEFAULT_COLOR_HEX,
};
pub use error::{Error, Resolution, Result};
pub use extrusion::ExtrusionSpec;
pub use layer::{LayerFormat, LayerFunction, LayerSpec, FALLBACK_LAYER_THICKNESS};
pub use part::{PartSpec, VectorExpression};
pub use resolver::{from_layer_preset, from_preset, resolve_all};
pub use spec::AssemblySpec;
