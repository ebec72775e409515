// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Flat serialized form of a preset.
//!
//! Documents persist presets as [`PresetRecord`]s: child attachments,
//! part slots, and properties are flattened into parallel arrays
//! correlated by index. The arrays of one group must have equal length;
//! a mismatch invalidates the whole record at load time rather than
//! being silently truncated.
//!
//! Child entries written in sorted order group back into pin sequences:
//! adjacent entries sharing a `(pin set index, position)` pair form a
//! chain of read-only category selectors terminated by one writable
//! preset. [`group_pin_sequences`] reconstructs that structure for the
//! editor.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::{Error, Result};
use crate::guid::PresetGuid;
use crate::preset::{ChildAttachment, PartSlot, Preset};
use crate::props::{PropertyKey, PropertySheet, Value};
use crate::scope::{ObjectType, PinTarget, ValueScope};
use crate::tagpath::TagPath;

/// Flat record form of one preset. Enum fields are stored as strings so
/// documents stay loadable across enum growth.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PresetRecord {
    pub display_name: String,
    pub node_type: String,
    pub preset_guid: PresetGuid,
    pub node_scope: String,
    pub object_type: String,
    pub is_read_only: bool,

    pub property_names: Vec<String>,
    pub property_values: Vec<Value>,

    pub child_pin_set_indices: Vec<u32>,
    pub child_pin_set_positions: Vec<u32>,
    pub child_preset_guids: Vec<PresetGuid>,
    pub child_pin_targets: Vec<String>,

    pub part_slot_names: Vec<String>,
    pub part_preset_guids: Vec<PresetGuid>,
    pub part_ids: Vec<String>,
    pub part_parent_ids: Vec<String>,

    pub slot_config_preset: Option<PresetGuid>,
    pub my_tag_path: TagPath,
    pub parent_tag_paths: Vec<TagPath>,
}

fn check_len(field: &'static str, actual: usize, expected: usize) -> Result<()> {
    if actual != expected {
        return Err(Error::RecordArrayMismatch {
            field,
            expected,
            actual,
        });
    }
    Ok(())
}

impl PresetRecord {
    /// Validates that every parallel-array group is internally consistent.
    pub fn validate(&self) -> Result<()> {
        check_len(
            "property_values",
            self.property_values.len(),
            self.property_names.len(),
        )?;
        let children = self.child_pin_set_indices.len();
        check_len(
            "child_pin_set_positions",
            self.child_pin_set_positions.len(),
            children,
        )?;
        check_len("child_preset_guids", self.child_preset_guids.len(), children)?;
        check_len("child_pin_targets", self.child_pin_targets.len(), children)?;
        let parts = self.part_slot_names.len();
        check_len("part_preset_guids", self.part_preset_guids.len(), parts)?;
        check_len("part_ids", self.part_ids.len(), parts)?;
        check_len("part_parent_ids", self.part_parent_ids.len(), parts)?;
        Ok(())
    }
}

impl Preset {
    /// Flattens this preset into its record form. Children are emitted in
    /// sorted pin order so sequence grouping survives the round trip.
    pub fn to_record(&self) -> PresetRecord {
        let mut sorted = self.child_presets.clone();
        sorted.sort_by_key(|child| (child.parent_pin_set_index, child.parent_pin_set_position));

        let mut record = PresetRecord {
            display_name: self.display_name.clone(),
            node_type: self.node_type.clone(),
            preset_guid: self.guid,
            node_scope: self.node_scope.as_str().to_string(),
            object_type: self.object_type.as_str().to_string(),
            is_read_only: self.is_read_only,
            slot_config_preset: self.slot_config_preset,
            my_tag_path: self.my_tag_path.clone(),
            parent_tag_paths: self.parent_tag_paths.clone(),
            ..Default::default()
        };

        for (key, value) in self.properties.iter_sorted() {
            record.property_names.push(key.qn());
            record.property_values.push(value.clone());
        }
        for child in &sorted {
            record.child_pin_set_indices.push(child.parent_pin_set_index);
            record
                .child_pin_set_positions
                .push(child.parent_pin_set_position);
            record.child_preset_guids.push(child.preset_guid);
            record
                .child_pin_targets
                .push(child.pin_target.as_str().to_string());
        }
        for slot in &self.part_slots {
            record.part_slot_names.push(slot.slot_name.clone());
            record.part_preset_guids.push(slot.part_preset);
            record.part_ids.push(slot.id.clone());
            record.part_parent_ids.push(slot.parent_id.clone());
        }
        record
    }

    /// Rebuilds a preset from its record form. Fails on parallel-array
    /// length mismatches and unrecognized enum strings; a corrupt record
    /// yields no preset at all.
    pub fn from_record(record: &PresetRecord) -> Result<Preset> {
        record.validate()?;

        let node_scope = ValueScope::from_str(&record.node_scope).ok_or_else(|| {
            Error::UnrecognizedEnumValue {
                kind: "node scope",
                value: record.node_scope.clone(),
            }
        })?;
        let object_type = ObjectType::from_str(&record.object_type).ok_or_else(|| {
            Error::UnrecognizedEnumValue {
                kind: "object type",
                value: record.object_type.clone(),
            }
        })?;

        let mut properties = PropertySheet::new();
        for (qn, value) in record.property_names.iter().zip(&record.property_values) {
            let key = PropertyKey::from_qn(qn)?;
            properties.set(key.scope, &key.name, value.clone())?;
        }

        let mut child_presets = Vec::with_capacity(record.child_pin_set_indices.len());
        for i in 0..record.child_pin_set_indices.len() {
            let target = PinTarget::from_str(&record.child_pin_targets[i]).ok_or_else(|| {
                Error::UnrecognizedEnumValue {
                    kind: "pin target",
                    value: record.child_pin_targets[i].clone(),
                }
            })?;
            child_presets.push(
                ChildAttachment::new(
                    record.child_pin_set_indices[i],
                    record.child_pin_set_positions[i],
                    record.child_preset_guids[i],
                )
                .with_target(target),
            );
        }

        let part_slots = (0..record.part_slot_names.len())
            .map(|i| PartSlot {
                slot_name: record.part_slot_names[i].clone(),
                part_preset: record.part_preset_guids[i],
                id: record.part_ids[i].clone(),
                parent_id: record.part_parent_ids[i].clone(),
            })
            .collect();

        Ok(Preset {
            guid: record.preset_guid,
            display_name: record.display_name.clone(),
            node_type: record.node_type.clone(),
            node_scope,
            object_type,
            is_read_only: record.is_read_only,
            properties,
            child_presets,
            part_slots,
            slot_config_preset: record.slot_config_preset,
            my_tag_path: record.my_tag_path.clone(),
            parent_tag_paths: record.parent_tag_paths.clone(),
        })
    }
}

/// One pin position reconstructed from a record: a chain of read-only
/// category selectors terminated by a single writable preset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinSequence {
    pub pin_set_index: u32,
    pub pin_set_position: u32,
    pub presets: SmallVec<[PresetGuid; 4]>,
}

/// Groups a record's child entries back into pin sequences. Adjacent
/// entries with an equal `(index, position)` pair belong to one sequence;
/// the record must be in sorted child order (the order `to_record` emits).
pub fn group_pin_sequences(record: &PresetRecord) -> Result<Vec<PinSequence>> {
    record.validate()?;

    let mut sequences: Vec<PinSequence> = Vec::new();
    let entries = record
        .child_pin_set_indices
        .iter()
        .zip(&record.child_pin_set_positions)
        .zip(&record.child_preset_guids);

    for ((&index, &position), &guid) in entries {
        match sequences.last_mut() {
            Some(seq) if seq.pin_set_index == index && seq.pin_set_position == position => {
                seq.presets.push(guid);
            }
            _ => sequences.push(PinSequence {
                pin_set_index: index,
                pin_set_position: position,
                presets: SmallVec::from_slice(&[guid]),
            }),
        }
    }
    Ok(sequences)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatched_arrays_invalidate_the_record() {
        let record = PresetRecord {
            child_pin_set_indices: vec![0, 0],
            child_pin_set_positions: vec![0],
            child_preset_guids: vec![PresetGuid::generate(), PresetGuid::generate()],
            child_pin_targets: vec!["Default".into(), "Default".into()],
            ..Default::default()
        };
        assert!(matches!(
            Preset::from_record(&record),
            Err(Error::RecordArrayMismatch { .. })
        ));
        assert!(group_pin_sequences(&record).is_err());
    }

    #[test]
    fn unknown_scope_string_is_rejected() {
        let record = PresetRecord {
            node_scope: "Plasma".into(),
            object_type: "None".into(),
            ..Default::default()
        };
        assert!(matches!(
            Preset::from_record(&record),
            Err(Error::UnrecognizedEnumValue { kind: "node scope", .. })
        ));
    }
}
