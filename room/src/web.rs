//! Browser `localStorage` backend for slot persistence.
//!
//! Compiled only with the `web` feature. Every storage call can throw in a
//! browser (private mode, disabled storage, quota), so each one maps the
//! thrown value into a [`StorageError`] instead of assuming success.

use tracing::debug;
use wasm_bindgen::JsValue;
use web_sys::Storage;

use crate::engine::{RoomConfig, RoomCore};
use crate::geometry::Rect;
use crate::persistence::{KeyValueStore, StorageError};

/// [`KeyValueStore`] over the window's `localStorage`.
pub struct LocalStorage {
    storage: Storage,
}

impl LocalStorage {
    /// Open the window's `localStorage`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] when there is no window or the
    /// browser refuses access to storage.
    pub fn open() -> Result<Self, StorageError> {
        let window = web_sys::window().ok_or_else(|| StorageError::Unavailable("no window".to_owned()))?;
        let storage = window
            .local_storage()
            .map_err(|e| StorageError::Unavailable(describe(&e)))?
            .ok_or_else(|| StorageError::Unavailable("localStorage disabled".to_owned()))?;
        Ok(Self { storage })
    }
}

fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

fn is_quota_error(value: &JsValue) -> bool {
    js_sys::Reflect::get(value, &JsValue::from_str("name"))
        .map(|name| name.as_string().is_some_and(|n| n == "QuotaExceededError"))
        .unwrap_or(false)
}

fn write_error(key: &str, value: &JsValue) -> StorageError {
    if is_quota_error(value) {
        StorageError::QuotaExceeded(key.to_owned())
    } else {
        StorageError::Unavailable(describe(value))
    }
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage.get_item(key).map_err(|e| StorageError::Unavailable(describe(&e)))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage.set_item(key, value).map_err(|e| write_error(key, &e))
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.storage.remove_item(key).map_err(|e| write_error(key, &e))
    }
}

/// Build a controller backed by `localStorage` for a room at `room` (client space).
///
/// # Errors
///
/// Returns [`StorageError::Unavailable`] when `localStorage` cannot be opened.
pub fn open_room(room: Rect, config: RoomConfig) -> Result<RoomCore<LocalStorage>, StorageError> {
    let storage = LocalStorage::open()?;
    debug!("localStorage opened");
    Ok(RoomCore::with_config(storage, room, config))
}
