// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # BimCraft Editor
//!
//! Live crafting-tree node pool for interactive preset editing.
//!
//! The editor instantiates a preset sub-tree into mutable working copies:
//! each [`NodeInstance`](node::NodeInstance) owns a copy of its preset's
//! properties and pin sets, and the [`NodePool`](pool::NodePool) arena owns
//! every instance. Nodes report their staleness (`UpToDate`/`Dirty`/
//! `ReadOnly`) against the originating preset by re-serializing their
//! current state and matching it structurally.
//!
//! Storage is arena-based: `slotmap` generational keys replace shared/weak
//! ownership, so destruction cascades are a single pass and stale keys
//! fail to resolve instead of dangling.

pub mod error;
pub mod keys;
pub mod node;
pub mod pool;

pub use error::{Error, Result};
pub use keys::InstanceKey;
pub use node::{InstancePin, NodeInstance, NodeStatus};
pub use pool::NodePool;
