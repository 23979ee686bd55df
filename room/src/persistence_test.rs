#![allow(clippy::float_cmp)]

use serde_json::json;

use super::*;
use crate::doc::PlacedItem;

fn fixed_clock() -> i64 {
    1_700_000_000_000
}

fn slots() -> SlotPersistence<MemoryStore> {
    SlotPersistence::new(MemoryStore::new()).with_clock(fixed_clock)
}

fn seed(slots: &mut SlotPersistence<MemoryStore>, key: &str, value: &str) {
    assert!(slots.store_mut().set(key, value).is_ok());
}

fn raw(slots: &SlotPersistence<MemoryStore>, key: &str) -> Option<String> {
    slots.store().get(key).unwrap_or(None)
}

fn scene_with(emojis: &[&str]) -> SceneStore {
    let mut scene = SceneStore::new();
    for (i, emoji) in emojis.iter().enumerate() {
        #[allow(clippy::cast_precision_loss)]
        let offset = i as f64 * 10.0;
        scene.append(PlacedItem::new(*emoji, offset + 0.75, offset - 0.75, 30.0 + offset));
    }
    scene
}

// =============================================================
// Keys
// =============================================================

#[test]
fn default_keys_match_schema() {
    let keys = StorageKeys::default();
    assert_eq!(keys.slot(1), "slot-state:1");
    assert_eq!(keys.slot(3), "slot-state:3");
    assert_eq!(keys.active_slot, "active-slot");
    assert_eq!(keys.project_name, "project-name");
}

#[test]
fn slot_validity() {
    assert!(!is_valid_slot(0));
    assert!(is_valid_slot(1));
    assert!(is_valid_slot(3));
    assert!(!is_valid_slot(4));
}

#[test]
fn clip_name_trims_and_truncates() {
    assert_eq!(clip_name("  Den  "), "Den");
    assert_eq!(clip_name(&"x".repeat(40)).chars().count(), 30);
    assert_eq!(clip_name(&"🌟".repeat(31)).chars().count(), 30);
    assert_eq!(clip_name("   "), "");
}

// =============================================================
// SceneRecord
// =============================================================

#[test]
fn record_serializes_camel_case_schema() {
    let record = SceneRecord::from_scene(2, "Den", &scene_with(&["🌟"]), 42);
    let value = serde_json::to_value(&record).unwrap();
    assert_eq!(value["slot"], 2);
    assert_eq!(value["roomName"], "Den");
    assert_eq!(value["wallColor"], DEFAULT_WALL_COLOR);
    assert_eq!(value["floorColor"], DEFAULT_FLOOR_COLOR);
    assert_eq!(value["savedAt"], 42);
    assert_eq!(value["items"][0]["emoji"], "🌟");
    assert_eq!(value["items"][0]["left"], 0);
    assert_eq!(value["items"][0]["size"], 30.0);
}

#[test]
fn record_truncates_positions_toward_zero() {
    let mut scene = SceneStore::new();
    scene.append(PlacedItem::new("🌟", -15.9, 80.9, 40.0));
    let record = SceneRecord::from_scene(1, "", &scene, 0);
    assert_eq!(record.items[0].left, -15);
    assert_eq!(record.items[0].top, 80);
}

#[test]
fn record_keeps_insertion_order() {
    let record = SceneRecord::from_scene(1, "", &scene_with(&["🅰️", "🅱️", "🌟"]), 0);
    let emojis: Vec<&str> = record.items.iter().map(|i| i.emoji.as_str()).collect();
    assert_eq!(emojis, vec!["🅰️", "🅱️", "🌟"]);
}

#[test]
fn parse_rejects_non_objects() {
    assert!(SceneRecord::parse("not json", 1).is_none());
    assert!(SceneRecord::parse("[1,2,3]", 1).is_none());
    assert!(SceneRecord::parse("42", 1).is_none());
    assert!(SceneRecord::parse("null", 1).is_none());
}

#[test]
fn from_value_is_lenient() {
    let value = json!({
        "slot": 9,
        "roomName": 5,
        "wallColor": "#FFC0CB",
        "items": [
            {"emoji": "🌟", "left": 10.7, "top": "nope", "size": 50},
            {"emoji": ""},
            {"left": 3},
            "garbage",
            {"emoji": "🪴"}
        ]
    });
    let record = SceneRecord::from_value(&value, 2).unwrap();
    assert_eq!(record.slot, 2);
    assert_eq!(record.room_name, "");
    assert_eq!(record.wall_color, "#FFC0CB");
    assert_eq!(record.floor_color, "");
    assert_eq!(record.saved_at, 0);
    assert_eq!(record.items.len(), 2);
    assert_eq!(record.items[0], RecordItem { emoji: "🌟".into(), left: 10, top: 0, size: 50.0 });
    assert_eq!(record.items[1].size, DEFAULT_ITEM_SIZE);
}

#[test]
fn from_value_non_array_items_means_empty() {
    let record = SceneRecord::from_value(&json!({"items": {"emoji": "🌟"}}), 1).unwrap();
    assert!(record.items.is_empty());
}

// =============================================================
// Migration
// =============================================================

#[test]
fn migration_copies_legacy_into_empty_slot_one() {
    let mut slots = slots();
    seed(&mut slots, "room-state", r#"{"items":[]}"#);
    assert!(slots.migrate_legacy());
    assert_eq!(raw(&slots, "slot-state:1").as_deref(), Some(r#"{"items":[]}"#));
    assert!(raw(&slots, "room-state").is_none());
}

#[test]
fn migration_runs_at_most_once() {
    let mut slots = slots();
    seed(&mut slots, "room-state", "first");
    assert!(slots.migrate_legacy());
    seed(&mut slots, "room-state", "second");
    assert!(!slots.migrate_legacy());
    assert_eq!(raw(&slots, "slot-state:1").as_deref(), Some("first"));
}

#[test]
fn migration_never_overwrites_existing_slot_one() {
    let mut slots = slots();
    seed(&mut slots, "room-state", "legacy");
    seed(&mut slots, "slot-state:1", "current");
    assert!(!slots.migrate_legacy());
    assert_eq!(raw(&slots, "slot-state:1").as_deref(), Some("current"));
    assert_eq!(raw(&slots, "room-state").as_deref(), Some("legacy"));
}

#[test]
fn migration_without_legacy_is_noop() {
    let mut slots = slots();
    assert!(!slots.migrate_legacy());
    assert!(slots.store().is_empty());
}

#[test]
fn migration_failure_keeps_legacy() {
    let mut slots = slots();
    seed(&mut slots, "room-state", "legacy");
    slots.store_mut().set_fail_writes(true);
    assert!(!slots.migrate_legacy());
    assert_eq!(raw(&slots, "room-state").as_deref(), Some("legacy"));
}

// =============================================================
// Active slot pointer
// =============================================================

#[test]
fn restore_active_slot_accepts_valid_values() {
    let mut slots = slots();
    seed(&mut slots, "active-slot", "3");
    assert_eq!(slots.restore_active_slot(), 3);
}

#[test]
fn restore_active_slot_ignores_garbage() {
    for bad in ["0", "4", "-1", "two", ""] {
        let mut slots = slots();
        seed(&mut slots, "active-slot", bad);
        assert_eq!(slots.restore_active_slot(), 1, "input {bad:?}");
    }
}

#[test]
fn set_active_slot_persists_pointer() {
    let mut slots = slots();
    assert!(slots.set_active_slot(2));
    assert_eq!(slots.active_slot(), 2);
    assert_eq!(raw(&slots, "active-slot").as_deref(), Some("2"));
    assert!(!slots.set_active_slot(7));
    assert_eq!(slots.active_slot(), 2);
}

// =============================================================
// Save / load
// =============================================================

#[test]
fn save_writes_active_slot_with_timestamp() {
    let mut slots = slots();
    let outcome = slots.save(&scene_with(&["🌟", "🪴"]));
    assert!(outcome.is_saved());
    assert_eq!(outcome.status(), "Saved Room 1");
    let LoadOutcome::Loaded(record) = slots.load(1) else {
        panic!("expected a record");
    };
    assert_eq!(record.slot, 1);
    assert_eq!(record.items.len(), 2);
    assert_eq!(record.saved_at, fixed_clock());
}

#[test]
fn save_keeps_existing_room_name() {
    let mut slots = slots();
    assert!(slots.rename_slot(1, "Reading Nook").is_saved());
    let outcome = slots.save(&scene_with(&["🌟"]));
    assert_eq!(outcome.status(), "Saved Reading Nook");
    assert_eq!(slots.custom_slot_name(1), "Reading Nook");
}

#[test]
fn save_failure_is_reported_not_raised() {
    let mut slots = slots();
    slots.store_mut().set_fail_writes(true);
    let outcome = slots.save(&scene_with(&["🌟"]));
    assert!(!outcome.is_saved());
    assert_eq!(outcome.status(), "Could not save on this browser");
    assert!(matches!(outcome, SaveOutcome::Failed(StorageError::QuotaExceeded(_))));
}

#[test]
fn load_classifies_slot_contents() {
    let mut slots = slots();
    assert_eq!(slots.load(1), LoadOutcome::Empty);
    seed(&mut slots, "slot-state:1", "{broken");
    assert_eq!(slots.load(1), LoadOutcome::Malformed);
    seed(&mut slots, "slot-state:1", "\"a string\"");
    assert_eq!(slots.load(1), LoadOutcome::Malformed);
    seed(&mut slots, "slot-state:1", "{}");
    assert!(matches!(slots.load(1), LoadOutcome::Loaded(_)));
}

#[test]
fn read_failure_is_unavailable_not_empty() {
    let mut slots = slots();
    seed(&mut slots, "slot-state:2", "{}");
    seed(&mut slots, "active-slot", "2");
    slots.store_mut().set_fail_reads(true);

    assert_eq!(slots.load(2), LoadOutcome::Unavailable);
    assert_eq!(slots.restore_active_slot(), 1);
    assert!(!slots.migrate_legacy());
    assert_eq!(slots.slot_label(2), "Room 2");
    assert_eq!(slots.project_name(), DEFAULT_PROJECT_NAME);
}

#[test]
fn empty_items_record_is_valid() {
    let mut slots = slots();
    slots.save(&SceneStore::new());
    let LoadOutcome::Loaded(record) = slots.load(1) else {
        panic!("expected a record");
    };
    assert!(record.items.is_empty());
}

// =============================================================
// Names
// =============================================================

#[test]
fn slot_label_defaults_and_overrides() {
    let mut slots = slots();
    assert_eq!(slots.slot_label(2), "Room 2");
    slots.rename_slot(2, "  Attic  ");
    assert_eq!(slots.slot_label(2), "Attic");
}

#[test]
fn rename_inactive_slot_does_not_switch() {
    let mut slots = slots();
    slots.rename_slot(3, "Garden");
    assert_eq!(slots.active_slot(), 1);
    let LoadOutcome::Loaded(record) = slots.load(3) else {
        panic!("expected a record");
    };
    assert_eq!(record.slot, 3);
    assert_eq!(record.room_name, "Garden");
    assert!(record.items.is_empty());
    assert_eq!(record.wall_color, DEFAULT_WALL_COLOR);
}

#[test]
fn rename_to_default_or_blank_resets() {
    let mut slots = slots();
    slots.rename_slot(1, "Den");
    slots.rename_slot(1, "Room 1");
    assert_eq!(slots.custom_slot_name(1), "");
    slots.rename_slot(1, "Den");
    slots.rename_slot(1, "   ");
    assert_eq!(slots.slot_label(1), "Room 1");
}

#[test]
fn rename_keeps_items() {
    let mut slots = slots();
    slots.save(&scene_with(&["🌟", "🪴"]));
    slots.rename_slot(1, "Den");
    let LoadOutcome::Loaded(record) = slots.load(1) else {
        panic!("expected a record");
    };
    assert_eq!(record.items.len(), 2);
}

#[test]
fn project_name_defaults_and_updates() {
    let mut slots = slots();
    assert_eq!(slots.project_name(), DEFAULT_PROJECT_NAME);
    let outcome = slots.set_project_name("  Castle  ");
    assert!(matches!(outcome, ProjectNameOutcome::Updated(ref n) if n == "Castle"));
    assert_eq!(outcome.status(), "Project name updated");
    assert_eq!(slots.project_name(), "Castle");
    assert_eq!(raw(&slots, "project-name").as_deref(), Some("Castle"));
}

#[test]
fn project_name_reset_removes_key() {
    let mut slots = slots();
    slots.set_project_name("Castle");
    assert!(matches!(slots.set_project_name(""), ProjectNameOutcome::Reset));
    assert!(raw(&slots, "project-name").is_none());
    slots.set_project_name("Castle");
    assert!(matches!(slots.set_project_name(DEFAULT_PROJECT_NAME), ProjectNameOutcome::Reset));
    assert_eq!(slots.project_name(), DEFAULT_PROJECT_NAME);
}

#[test]
fn project_name_failure_is_reported() {
    let mut slots = slots();
    slots.store_mut().set_fail_writes(true);
    let outcome = slots.set_project_name("Castle");
    assert_eq!(outcome.status(), "Could not save project name");
}

#[test]
fn custom_keys_are_honored() {
    let keys = StorageKeys { slot_prefix: "isla_slot_".into(), ..StorageKeys::default() };
    let mut slots = SlotPersistence::with_keys(MemoryStore::new(), keys).with_clock(fixed_clock);
    slots.save(&SceneStore::new());
    assert!(raw(&slots, "isla_slot_1").is_some());
}

#[test]
fn storage_error_codes() {
    assert_eq!(StorageError::Unavailable("x".into()).error_code(), "E_STORAGE_UNAVAILABLE");
    assert_eq!(StorageError::QuotaExceeded("x".into()).error_code(), "E_STORAGE_QUOTA");
}
