// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the preset data model.

use crate::guid::PresetGuid;

/// Result type alias for preset operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the preset data model and collection.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// A referenced preset was not found in the collection.
    #[error("preset not found: {0}")]
    PresetNotFound(PresetGuid),

    /// A preset names a node type with no descriptor in the collection.
    #[error("node type not found: {0}")]
    NodeTypeNotFound(String),

    /// A nil GUID was supplied where a valid preset identity is required.
    #[error("invalid preset guid")]
    InvalidGuid,

    /// Random GUID allocation failed to find a free slot within the retry
    /// bound. Only reachable with a broken random source.
    #[error("guid allocation exhausted after {0} attempts")]
    GuidAllocationExhausted(u32),

    /// A flat record's parallel arrays disagree in length. The whole record
    /// is rejected; a corrupt parallel-array record cannot be partially
    /// parsed.
    #[error("record parallel arrays disagree in length: {field} has {actual}, expected {expected}")]
    RecordArrayMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A qualified property name was not of the form `Scope.Name`.
    #[error("malformed qualified property name: {0}")]
    MalformedPropertyKey(String),

    /// An unrecognized enum string was found in a record.
    #[error("unrecognized {kind} value in record: {value}")]
    UnrecognizedEnumValue { kind: &'static str, value: String },

    /// Binding requires both the source and target slots to exist.
    #[error("cannot bind property: {0} is absent from the sheet")]
    BindSlotMissing(String),

    /// The target of a property binding is read-only.
    #[error("property {0} is the target of a binding and cannot be written")]
    BoundTargetWrite(String),
}
