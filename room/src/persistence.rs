//! Slot persistence: scene records in a durable key-value store.
//!
//! DESIGN
//! ======
//! The durable store is a flat string map (browser `localStorage`, a JSON file,
//! or memory) behind [`KeyValueStore`]. Each of the [`MAX_SLOTS`] slots keeps
//! one serialized [`SceneRecord`]; the project name and the active-slot
//! pointer live under their own keys. A pre-slot legacy key is copied into
//! slot 1 once and then removed.
//!
//! Storage failures stop here. Every public operation converts them into an
//! outcome the controller can turn into a status line, and logs the cause.
//! Nothing in this module returns an error to the room controller.

#[cfg(test)]
#[path = "persistence_test.rs"]
mod persistence_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::consts::{DEFAULT_FLOOR_COLOR, DEFAULT_ITEM_SIZE, DEFAULT_PROJECT_NAME, DEFAULT_WALL_COLOR, MAX_NAME_CHARS, MAX_SLOTS};
use crate::doc::SceneStore;

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("storage quota exceeded: {0}")]
    QuotaExceeded(String),
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StorageError {
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "E_STORAGE_UNAVAILABLE",
            Self::QuotaExceeded(_) => "E_STORAGE_QUOTA",
            Self::Io(_) => "E_STORAGE_IO",
            Self::Json(_) => "E_STORAGE_JSON",
        }
    }
}

// =============================================================================
// STORE SEAM
// =============================================================================

/// A synchronous string key-value store.
pub trait KeyValueStore {
    /// Read a value. `Ok(None)` means the key is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read at all.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the write is rejected (quota, unavailable, io).
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a key. Deleting an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the delete.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-process store. Reads and writes can be switched to fail to exercise storage errors.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    fail_writes: bool,
    fail_reads: bool,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `set`/`remove` fail with `QuotaExceeded`.
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Make every subsequent `get` fail with `Unavailable`.
    pub fn set_fail_reads(&mut self, fail: bool) {
        self.fail_reads = fail;
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.fail_reads {
            return Err(StorageError::Unavailable(key.to_owned()));
        }
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::QuotaExceeded(key.to_owned()));
        }
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::QuotaExceeded(key.to_owned()));
        }
        self.entries.remove(key);
        Ok(())
    }
}

/// Names of the durable keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    /// Single-slot key from before slots existed; migrated into slot 1.
    pub legacy: String,
    /// Prefix of the per-slot keys; the slot number is appended.
    pub slot_prefix: String,
    /// Key holding the active slot number as a plain integer string.
    pub active_slot: String,
    /// Key holding the shared project name as a plain string.
    pub project_name: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            legacy: "room-state".to_owned(),
            slot_prefix: "slot-state:".to_owned(),
            active_slot: "active-slot".to_owned(),
            project_name: "project-name".to_owned(),
        }
    }
}

impl StorageKeys {
    #[must_use]
    pub fn slot(&self, slot: u8) -> String {
        format!("{}{slot}", self.slot_prefix)
    }
}

// =============================================================================
// RECORDS
// =============================================================================

/// One item as persisted. Positions are whole pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordItem {
    pub emoji: String,
    pub left: i64,
    pub top: i64,
    pub size: f64,
}

/// Serialized snapshot of one slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneRecord {
    pub slot: u8,
    /// Custom slot name; empty means "use the default label".
    pub room_name: String,
    pub wall_color: String,
    pub floor_color: String,
    /// Items in insertion order.
    pub items: Vec<RecordItem>,
    /// Milliseconds since the Unix epoch.
    pub saved_at: i64,
}

impl SceneRecord {
    /// A record for an untouched slot.
    #[must_use]
    pub fn empty(slot: u8, saved_at: i64) -> Self {
        Self {
            slot,
            room_name: String::new(),
            wall_color: DEFAULT_WALL_COLOR.to_owned(),
            floor_color: DEFAULT_FLOOR_COLOR.to_owned(),
            items: Vec::new(),
            saved_at,
        }
    }

    /// Snapshot a scene in insertion order.
    #[must_use]
    pub fn from_scene(slot: u8, room_name: &str, scene: &SceneStore, saved_at: i64) -> Self {
        #[allow(clippy::cast_possible_truncation)]
        let items = scene
            .items()
            .iter()
            .map(|item| RecordItem {
                emoji: item.emoji().to_owned(),
                left: item.left.trunc() as i64,
                top: item.top.trunc() as i64,
                size: item.size(),
            })
            .collect();
        Self {
            slot,
            room_name: room_name.to_owned(),
            wall_color: scene.wall_color().to_owned(),
            floor_color: scene.floor_color().to_owned(),
            items,
            saved_at,
        }
    }

    /// Read a record leniently from arbitrary JSON.
    ///
    /// Returns `None` only when `value` is not an object. Wrong-typed fields
    /// fall back to defaults, items without an emoji are skipped, and a
    /// non-array `items` field yields no items.
    #[must_use]
    pub fn from_value(value: &Value, slot: u8) -> Option<Self> {
        let obj = value.as_object()?;
        let text = |key: &str| obj.get(key).and_then(Value::as_str).unwrap_or("").to_owned();
        let items = obj
            .get("items")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(record_item_from_value).collect())
            .unwrap_or_default();
        Some(Self {
            slot: obj
                .get("slot")
                .and_then(Value::as_u64)
                .map(|n| u8::try_from(n).unwrap_or(0))
                .filter(|n| is_valid_slot(*n))
                .unwrap_or(slot),
            room_name: clip_name(&text("roomName")),
            wall_color: text("wallColor"),
            floor_color: text("floorColor"),
            items,
            saved_at: obj.get("savedAt").and_then(Value::as_i64).unwrap_or(0),
        })
    }

    /// Parse a stored string. `None` when it isn't JSON or isn't an object.
    #[must_use]
    pub fn parse(raw: &str, slot: u8) -> Option<Self> {
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => Self::from_value(&value, slot),
            Err(e) => {
                debug!(error = %e, slot, "stored scene is not valid json");
                None
            }
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn record_item_from_value(value: &Value) -> Option<RecordItem> {
    let emoji = value.get("emoji").and_then(Value::as_str).filter(|e| !e.is_empty())?;
    let coord = |key: &str| value.get(key).and_then(Value::as_f64).map_or(0, |v| v.trunc() as i64);
    Some(RecordItem {
        emoji: emoji.to_owned(),
        left: coord("left"),
        top: coord("top"),
        size: value.get("size").and_then(Value::as_f64).unwrap_or(DEFAULT_ITEM_SIZE),
    })
}

// =============================================================================
// HELPERS
// =============================================================================

/// Whether `slot` names one of the save slots.
#[must_use]
pub fn is_valid_slot(slot: u8) -> bool {
    (1..=MAX_SLOTS).contains(&slot)
}

/// Label shown for a slot with no custom name.
#[must_use]
pub fn default_slot_label(slot: u8) -> String {
    format!("Room {slot}")
}

/// Trim a user-supplied name and cut it to [`MAX_NAME_CHARS`] characters.
#[must_use]
pub fn clip_name(raw: &str) -> String {
    raw.trim().chars().take(MAX_NAME_CHARS).collect()
}

/// Milliseconds since the Unix epoch.
#[cfg(not(all(feature = "web", target_arch = "wasm32")))]
#[must_use]
pub fn now_ms() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}

/// Milliseconds since the Unix epoch.
#[cfg(all(feature = "web", target_arch = "wasm32"))]
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn now_ms() -> i64 {
    js_sys::Date::now() as i64
}

// =============================================================================
// OUTCOMES
// =============================================================================

/// Result of reading a slot.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// Nothing stored for the slot.
    Empty,
    /// Something is stored but it is not a JSON object.
    Malformed,
    /// The store could not be read.
    Unavailable,
    /// A usable record.
    Loaded(SceneRecord),
}

/// Result of a write that the user asked for.
#[derive(Debug)]
pub enum SaveOutcome {
    /// Written. `label` is the slot's display label after the write.
    Saved { label: String },
    /// Rejected by the store; the in-memory scene is unaffected.
    Failed(StorageError),
}

impl SaveOutcome {
    #[must_use]
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved { .. })
    }

    /// Status line for a scene save.
    #[must_use]
    pub fn status(&self) -> String {
        match self {
            Self::Saved { label } => format!("Saved {label}"),
            Self::Failed(_) => "Could not save on this browser".to_owned(),
        }
    }
}

/// Result of renaming the project.
#[derive(Debug)]
pub enum ProjectNameOutcome {
    /// The stored name was removed; the default title applies.
    Reset,
    /// A custom name was stored.
    Updated(String),
    /// The store rejected the change.
    Failed(StorageError),
}

impl ProjectNameOutcome {
    #[must_use]
    pub fn status(&self) -> &'static str {
        match self {
            Self::Reset => "Project name reset",
            Self::Updated(_) => "Project name updated",
            Self::Failed(_) => "Could not save project name",
        }
    }
}

// =============================================================================
// SLOT PERSISTENCE
// =============================================================================

/// Multi-slot persistence over a [`KeyValueStore`].
pub struct SlotPersistence<S> {
    store: S,
    keys: StorageKeys,
    active_slot: u8,
    default_project_name: String,
    clock: fn() -> i64,
}

impl<S: KeyValueStore> SlotPersistence<S> {
    /// Wrap a store using the default key names. The active slot starts at 1.
    pub fn new(store: S) -> Self {
        Self::with_keys(store, StorageKeys::default())
    }

    pub fn with_keys(store: S, keys: StorageKeys) -> Self {
        Self { store, keys, active_slot: 1, default_project_name: DEFAULT_PROJECT_NAME.to_owned(), clock: now_ms }
    }

    /// Replace the timestamp source used for `savedAt`.
    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the project title used when none is stored.
    #[must_use]
    pub fn with_default_project_name(mut self, name: impl Into<String>) -> Self {
        self.default_project_name = name.into();
        self
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    #[must_use]
    pub fn active_slot(&self) -> u8 {
        self.active_slot
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, code = e.error_code(), key, "storage read failed");
                None
            }
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.store.set(key, value).inspect_err(|e| {
            warn!(error = %e, code = e.error_code(), key, "storage write failed");
        })
    }

    // --- Migration / pointer ---

    /// Copy the legacy single-slot value into slot 1 if slot 1 is empty.
    ///
    /// Returns true if a migration happened. Once slot 1 exists this never fires again.
    pub fn migrate_legacy(&mut self) -> bool {
        let slot_one = self.keys.slot(1);
        if self.read(&slot_one).is_some_and(|v| !v.is_empty()) {
            return false;
        }
        let Some(legacy) = self.read(&self.keys.legacy).filter(|v| !v.is_empty()) else {
            return false;
        };
        if self.write(&slot_one, &legacy).is_err() {
            return false;
        }
        let legacy_key = self.keys.legacy.clone();
        if let Err(e) = self.store.remove(&legacy_key) {
            warn!(error = %e, "legacy key could not be removed after migration");
        }
        info!("migrated legacy room into slot 1");
        true
    }

    /// Adopt the stored active-slot pointer if it names a valid slot.
    pub fn restore_active_slot(&mut self) -> u8 {
        let stored = self
            .read(&self.keys.active_slot)
            .map(|raw| raw.trim().parse::<u8>().unwrap_or(0))
            .filter(|slot| is_valid_slot(*slot));
        if let Some(slot) = stored {
            self.active_slot = slot;
        }
        self.active_slot
    }

    /// Make `slot` active and persist the pointer. Invalid slots are ignored.
    pub fn set_active_slot(&mut self, slot: u8) -> bool {
        if !is_valid_slot(slot) {
            return false;
        }
        self.active_slot = slot;
        let key = self.keys.active_slot.clone();
        if self.write(&key, &slot.to_string()).is_err() {
            debug!(slot, "active slot kept in memory only");
        }
        true
    }

    // --- Slot records ---

    /// Read a slot's record, classifying absent and malformed data.
    #[must_use]
    pub fn load(&self, slot: u8) -> LoadOutcome {
        let raw = match self.store.get(&self.keys.slot(slot)) {
            Ok(Some(raw)) if !raw.is_empty() => raw,
            Ok(_) => return LoadOutcome::Empty,
            Err(e) => {
                warn!(error = %e, slot, "slot read failed");
                return LoadOutcome::Unavailable;
            }
        };
        match SceneRecord::parse(&raw, slot) {
            Some(record) => LoadOutcome::Loaded(record),
            None => LoadOutcome::Malformed,
        }
    }

    fn record(&self, slot: u8) -> Option<SceneRecord> {
        match self.load(slot) {
            LoadOutcome::Loaded(record) => Some(record),
            _ => None,
        }
    }

    fn write_record(&mut self, record: &SceneRecord) -> Result<(), StorageError> {
        let raw = serde_json::to_string(record)?;
        let key = self.keys.slot(record.slot);
        self.write(&key, &raw)
    }

    /// Persist `scene` into the active slot, keeping that slot's custom name.
    pub fn save(&mut self, scene: &SceneStore) -> SaveOutcome {
        let slot = self.active_slot;
        let record = SceneRecord::from_scene(slot, &self.custom_slot_name(slot), scene, (self.clock)());
        match self.write_record(&record) {
            Ok(()) => {
                debug!(slot, items = record.items.len(), "scene saved");
                SaveOutcome::Saved { label: self.slot_label(slot) }
            }
            Err(e) => SaveOutcome::Failed(e),
        }
    }

    // --- Names ---

    /// Custom name stored in a slot's record, or empty.
    #[must_use]
    pub fn custom_slot_name(&self, slot: u8) -> String {
        self.record(slot).map(|r| clip_name(&r.room_name)).unwrap_or_default()
    }

    /// Display label: the custom name, or `"Room {n}"`.
    #[must_use]
    pub fn slot_label(&self, slot: u8) -> String {
        let custom = self.custom_slot_name(slot);
        if custom.is_empty() { default_slot_label(slot) } else { custom }
    }

    /// Rename any slot without switching to it.
    ///
    /// Empty names and names equal to the default label reset to the default.
    /// An empty slot gets a fresh default record carrying the name.
    pub fn rename_slot(&mut self, slot: u8, name: &str) -> SaveOutcome {
        let now = (self.clock)();
        let mut record = self.record(slot).unwrap_or_else(|| SceneRecord::empty(slot, now));
        let name = clip_name(name);
        record.room_name = if name == default_slot_label(slot) { String::new() } else { name };
        record.slot = slot;
        record.saved_at = now;
        match self.write_record(&record) {
            Ok(()) => SaveOutcome::Saved { label: self.slot_label(slot) },
            Err(e) => SaveOutcome::Failed(e),
        }
    }

    /// Stored project name, or the default title.
    #[must_use]
    pub fn project_name(&self) -> String {
        let stored = self.read(&self.keys.project_name).map(|v| v.trim().to_owned()).unwrap_or_default();
        if stored.is_empty() { self.default_project_name.clone() } else { stored }
    }

    /// Store a new project name. Empty or default names remove the key.
    pub fn set_project_name(&mut self, name: &str) -> ProjectNameOutcome {
        let name = clip_name(name);
        let key = self.keys.project_name.clone();
        if name.is_empty() || name == self.default_project_name {
            return match self.store.remove(&key) {
                Ok(()) => ProjectNameOutcome::Reset,
                Err(e) => ProjectNameOutcome::Failed(e),
            };
        }
        match self.write(&key, &name) {
            Ok(()) => ProjectNameOutcome::Updated(name),
            Err(e) => ProjectNameOutcome::Failed(e),
        }
    }
}
