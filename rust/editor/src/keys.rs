// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Key type for arena-based node storage.
//!
//! Node instances live in a `slotmap::SlotMap`; keys are generational, so
//! a key held after its node is destroyed simply fails to resolve instead
//! of aliasing a newer node.

use slotmap::new_key_type;

new_key_type! {
    /// Key for a live crafting-tree node instance.
    pub struct InstanceKey;
}
