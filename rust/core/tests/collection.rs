// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Collection queries: dependency closure, slot search, GUID and key
//! allocation.

use bimcraft_core::{
    names, ChildAttachment, Error, Preset, PresetCollection, PresetGuid, TagPath, Value,
    ValueScope,
};

fn named_preset(name: &str, scope: ValueScope) -> Preset {
    Preset {
        guid: PresetGuid::generate(),
        display_name: name.into(),
        node_type: scope.as_str().into(),
        node_scope: scope,
        ..Default::default()
    }
}

/// Root -> two layers, each layer -> one material.
fn layered_collection() -> (PresetCollection, PresetGuid) {
    let mut collection = PresetCollection::new();

    let mut materials = Vec::new();
    for name in ["Brick", "Gypsum"] {
        let material = named_preset(name, ValueScope::Material);
        materials.push(material.guid);
        collection.add_preset(material).unwrap();
    }

    let mut layers = Vec::new();
    for (i, material) in materials.iter().enumerate() {
        let mut layer = named_preset(&format!("Layer{}", i), ValueScope::Layer);
        layer.child_presets.push(ChildAttachment::new(0, 0, *material));
        layers.push(layer.guid);
        collection.add_preset(layer).unwrap();
    }

    let mut root = named_preset("Wall", ValueScope::Assembly);
    for (i, layer) in layers.iter().enumerate() {
        root.child_presets
            .push(ChildAttachment::new(0, i as u32, *layer));
    }
    let root_guid = root.guid;
    collection.add_preset(root).unwrap();
    (collection, root_guid)
}

#[test]
fn dependency_closure_includes_all_reachable_presets() {
    let (collection, root) = layered_collection();
    let closure = collection.dependent_presets(root).unwrap();
    // Root, two layers, two materials.
    assert_eq!(closure.len(), 5);
    assert!(closure.contains(&root));
}

#[test]
fn dependency_closure_terminates_on_cyclic_data() {
    let mut collection = PresetCollection::new();
    let mut a = named_preset("A", ValueScope::Layer);
    let mut b = named_preset("B", ValueScope::Layer);
    let (guid_a, guid_b) = (a.guid, b.guid);
    a.child_presets.push(ChildAttachment::new(0, 0, guid_b));
    b.child_presets.push(ChildAttachment::new(0, 0, guid_a));
    collection.add_preset(a).unwrap();
    collection.add_preset(b).unwrap();

    let closure = collection.dependent_presets(guid_a).unwrap();
    assert_eq!(closure.len(), 2);
}

#[test]
fn add_preset_rejects_nil_guid_without_modifying() {
    let mut collection = PresetCollection::new();
    let mut preset = named_preset("Orphan", ValueScope::Layer);
    preset.guid = PresetGuid::NIL;
    assert_eq!(collection.add_preset(preset), Err(Error::InvalidGuid));
    assert!(collection.presets.is_empty());
}

#[test]
fn generated_keys_deduplicate_with_numeric_suffix() {
    let (mut collection, root) = layered_collection();
    let first = collection.generate_key_for_preset(root).unwrap();
    let second = collection.generate_key_for_preset(root).unwrap();
    assert_ne!(first, second);
    assert!(second.as_str().starts_with(first.as_str()));
    assert!(second.as_str().ends_with("-1"));
    // Keys never carry whitespace, whatever the display names held.
    assert!(!first.as_str().contains(' '));
}

#[test]
fn slot_search_filters_by_supported_ncp() {
    let mut collection = PresetCollection::new();

    let mut slot = named_preset("HandleSlot", ValueScope::Slot);
    slot.properties
        .set(
            ValueScope::Slot,
            names::SUPPORTED_NCPS,
            Value::String("Part-->Hardware".into()),
        )
        .unwrap();
    let slot_guid = slot.guid;
    collection.add_preset(slot).unwrap();

    let mut handle = named_preset("BrassHandle", ValueScope::Part);
    handle.my_tag_path = TagPath::from_str("Part-->Hardware-->Handle");
    let handle_guid = handle.guid;
    collection.add_preset(handle).unwrap();

    let mut hinge = named_preset("Hinge", ValueScope::Part);
    hinge.my_tag_path = TagPath::from_str("Part-->Hardware");
    let hinge_guid = hinge.guid;
    collection.add_preset(hinge).unwrap();

    let mut panel = named_preset("Panel", ValueScope::Part);
    panel.my_tag_path = TagPath::from_str("Part-->Panel");
    collection.add_preset(panel).unwrap();

    let mut eligible = collection.presets_for_slot(slot_guid).unwrap();
    eligible.sort();
    let mut expected = vec![handle_guid, hinge_guid];
    expected.sort();
    assert_eq!(eligible, expected);
}

#[test]
fn available_guid_avoids_existing_presets() {
    let (collection, _) = layered_collection();
    let guid = collection.available_guid().unwrap();
    assert!(guid.is_valid());
    assert!(!collection.presets.contains_key(&guid));
}

#[test]
fn post_load_reports_dangling_references() {
    let (mut collection, root) = layered_collection();
    let layer = collection
        .preset(root)
        .unwrap()
        .child_presets
        .first()
        .unwrap()
        .preset_guid;
    collection.remove_preset(layer).unwrap();

    let messages = collection.post_load();
    assert!(messages.iter().any(|m| m.contains("missing child")));
}

#[test]
fn collection_record_round_trip_matches() {
    let (collection, _) = layered_collection();
    let records = collection.to_records();

    let mut restored = PresetCollection::new();
    let messages = restored.from_records(&records);
    assert!(messages.is_empty());
    assert!(collection.matches(&restored));
}
