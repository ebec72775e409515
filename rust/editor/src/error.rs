// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the crafting-tree node pool.

use bimcraft_core::PresetGuid;

use crate::keys::InstanceKey;

/// Result type alias for editor operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while mutating or validating the node pool.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A data-model operation failed.
    #[error(transparent)]
    Core(#[from] bimcraft_core::Error),

    /// An instance key no longer refers to a live node.
    #[error("node instance not found: {0:?}")]
    InstanceNotFound(InstanceKey),

    /// A pin set index outside the node type's declared pin sets.
    #[error("pin set index {0} out of range ({1} pin sets)")]
    PinIndexOutOfRange(u32, usize),

    /// Attaching would exceed the pin set's maximum cardinality.
    #[error("pin set {0} is full (max {1})")]
    PinFull(String, i32),

    /// The child preset is not in the pin's eligible search results.
    #[error("preset {child} is not eligible for pin set {pin}")]
    IneligibleChild { pin: String, child: PresetGuid },

    /// A read-only selector node must hold exactly one pin with exactly
    /// one child to be flattened back into a preset sequence.
    #[error("read-only preset {0} does not form a selector chain")]
    MalformedReadOnlyChain(PresetGuid),

    /// A node's recorded parent does not list it as a child, or the other
    /// way around.
    #[error("parent/child links disagree for instance {0}")]
    MismatchedParentLink(u64),

    /// More than one parentless node in the pool.
    #[error("pool has multiple root instances")]
    MultipleRoots,

    /// The instance-ID map and the instance list disagree.
    #[error("instance map and list disagree: {map} mapped, {list} listed")]
    InstanceBookkeepingMismatch { map: usize, list: usize },
}
