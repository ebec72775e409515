// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # BimCraft Core
//!
//! Preset data model for BIM assembly authoring: scoped property sheets,
//! typed preset nodes, flat document records, and the preset collection
//! with its dependency and taxonomy queries.
//!
//! ## Overview
//!
//! This crate provides the data layer the editor and resolver are built on:
//!
//! - **Property Sheets**: `(scope, name) -> value` stores with one-way
//!   bindings and epsilon-tolerant matching
//! - **Presets**: typed nodes with ordered child attachments, part slots,
//!   and category tag paths
//! - **Records**: flat parallel-array serialization with load-time
//!   validation and pin-sequence regrouping
//! - **Collection**: dependency closure, slot/taxonomy search, GUID and
//!   human-readable key allocation
//!
//! ## Quick Start
//!
//! ```rust
//! use bimcraft_core::{Preset, PresetCollection, PresetGuid, Value, ValueScope};
//!
//! let mut collection = PresetCollection::new();
//! let mut layer = Preset {
//!     guid: PresetGuid::generate(),
//!     display_name: "Brick Layer".into(),
//!     node_type: "Layer".into(),
//!     node_scope: ValueScope::Layer,
//!     ..Default::default()
//! };
//! layer
//!     .properties
//!     .set(ValueScope::Dimension, "Thickness", Value::Number(9.0))
//!     .unwrap();
//! collection.add_preset(layer).unwrap();
//! ```

pub mod collection;
pub mod error;
pub mod guid;
pub mod preset;
pub mod props;
pub mod record;
pub mod scope;
pub mod tagpath;

pub use collection::{CollectionRecord, PinSetDescriptor, PresetCollection, TypeDescriptor};
pub use error::{Error, Result};
pub use guid::{BimKey, PresetGuid};
pub use preset::{ChildAttachment, PartSlot, Preset};
pub use props::{names, PropertyKey, PropertySheet, Value, NUMBER_EPSILON};
pub use record::{group_pin_sequences, PinSequence, PresetRecord};
pub use scope::{ObjectType, PinTarget, ValueScope};
pub use tagpath::{TagPath, TAG_PATH_SEPARATOR};
