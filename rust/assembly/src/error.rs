// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types and the best-effort resolution outcome.
//!
//! Resolution is partial-failure tolerant: a broken asset reference
//! degrades to a default and is reported as a message, while structural
//! contract violations (cyclic graphs, conflicting object types) abort
//! with a hard error. The aggregate rule: any message at all marks the
//! resolution degraded, even though a spec was still produced.

use bimcraft_core::{ObjectType, PresetGuid};

use crate::spec::AssemblySpec;

/// Result type alias for resolution operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Hard failures that abort a resolution outright.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A data-model operation failed (missing root preset, bad GUID).
    #[error(transparent)]
    Core(#[from] bimcraft_core::Error),

    /// The preset graph reaches back into itself. Authored data must be
    /// acyclic; this guard turns a would-be hang into an error.
    #[error("cyclic preset graph through {0}")]
    CyclicPresetGraph(PresetGuid),

    /// Two descendants declared different non-`None` object types.
    #[error("conflicting object types in one preset tree: {first:?} then {second:?}")]
    ConflictingObjectType {
        first: ObjectType,
        second: ObjectType,
    },
}

/// A completed best-effort resolution: the compiled spec plus every soft
/// failure encountered along the way.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub spec: AssemblySpec,
    /// Warning-level messages for every reference that degraded to a
    /// default. Empty means a clean resolution.
    pub messages: Vec<String>,
}

impl Resolution {
    /// True when anything went wrong, even though a spec was produced.
    pub fn is_degraded(&self) -> bool {
        !self.messages.is_empty()
    }
}
