// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Round-trip and pin-sequence grouping behavior of flat preset records.

use bimcraft_core::{
    group_pin_sequences, names, ChildAttachment, PartSlot, Preset, PresetGuid, TagPath, Value,
    ValueScope,
};

/// A representative preset touching every record field group.
fn sample_preset() -> Preset {
    let mut preset = Preset {
        guid: PresetGuid::generate(),
        display_name: "Interior Wall".into(),
        node_type: "Assembly".into(),
        node_scope: ValueScope::Assembly,
        object_type: bimcraft_core::ObjectType::Wall,
        is_read_only: false,
        slot_config_preset: Some(PresetGuid::generate()),
        my_tag_path: TagPath::from_str("Assembly-->Wall-->Interior"),
        parent_tag_paths: vec![TagPath::from_str("Assembly-->Wall")],
        ..Default::default()
    };
    preset
        .properties
        .set(ValueScope::Assembly, names::NAME, Value::String("W1".into()))
        .unwrap();
    preset
        .properties
        .set(ValueScope::Dimension, names::THICKNESS, Value::Number(11.4))
        .unwrap();
    preset
        .properties
        .set(ValueScope::Assembly, "HasFace", Value::Boolean(true))
        .unwrap();
    preset.child_presets = vec![
        ChildAttachment::new(0, 0, PresetGuid::generate()),
        ChildAttachment::new(0, 1, PresetGuid::generate()),
        ChildAttachment::new(1, 0, PresetGuid::generate()),
    ];
    preset.part_slots = vec![PartSlot {
        slot_name: "Panel".into(),
        part_preset: PresetGuid::generate(),
        id: "1".into(),
        parent_id: "0".into(),
    }];
    preset.sort_child_presets();
    preset
}

#[test]
fn record_round_trip_matches_both_ways() {
    let preset = sample_preset();
    let restored = Preset::from_record(&preset.to_record()).unwrap();
    assert!(preset.matches(&restored));
    assert!(restored.matches(&preset));
}

#[test]
fn record_round_trips_through_json() {
    let preset = sample_preset();
    let json = serde_json::to_string(&preset.to_record()).unwrap();
    let record = serde_json::from_str(&json).unwrap();
    let restored = Preset::from_record(&record).unwrap();
    assert!(preset.matches(&restored));
}

#[test]
fn adjacent_equal_pins_regroup_into_sequences() {
    // A 3-deep read-only category chain A -> B -> C (C writable) on pin
    // (0, 0), plus a sibling pin at a different index.
    let chain: Vec<PresetGuid> = (0..3).map(|_| PresetGuid::generate()).collect();
    let sibling = PresetGuid::generate();

    let mut preset = sample_preset();
    preset.child_presets = vec![
        ChildAttachment::new(0, 0, chain[0]),
        ChildAttachment::new(0, 0, chain[1]),
        ChildAttachment::new(0, 0, chain[2]),
        ChildAttachment::new(1, 0, sibling),
    ];

    let record = preset.to_record();
    let sequences = group_pin_sequences(&record).unwrap();

    assert_eq!(sequences.len(), 2);
    assert_eq!(sequences[0].pin_set_index, 0);
    assert_eq!(sequences[0].pin_set_position, 0);
    assert_eq!(sequences[0].presets.as_slice(), chain.as_slice());
    assert_eq!(sequences[1].pin_set_index, 1);
    assert_eq!(sequences[1].presets.as_slice(), &[sibling]);
}

#[test]
fn grouping_rejects_mismatched_arrays() {
    let mut record = sample_preset().to_record();
    record.child_pin_set_positions.pop();
    assert!(group_pin_sequences(&record).is_err());
    assert!(Preset::from_record(&record).is_err());
}
