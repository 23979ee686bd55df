//! Document model: placed items and the ordered scene store.
//!
//! This module defines the entity for one token in the room (`PlacedItem`),
//! the options accepted by placement (`PlaceOptions`), and the runtime store
//! that owns every live item of the active slot (`SceneStore`).
//!
//! The store keeps items in insertion order. That order is what gets
//! persisted and what undo pops from; z-order is a separate, session-wide
//! counter used only for stacking and highlight. The "active" item is a weak
//! pointer (an id), never a second owner.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use uuid::Uuid;

use crate::consts::{BASE_Z_ORDER, DEFAULT_FLOOR_COLOR, DEFAULT_WALL_COLOR, PICTURE_EMOJI};
use crate::geometry::clamp_size;

/// Unique identifier for a placed item. Lives only for the session.
pub type ItemId = Uuid;

/// Strip emoji variation selectors (U+FE0F) so glyph variants compare equal.
#[must_use]
pub fn normalize_emoji(value: &str) -> String {
    value.chars().filter(|c| *c != '\u{FE0F}').collect()
}

/// One token placed in the room.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedItem {
    /// Session identity used by remove, highlight and gesture lookups.
    pub id: ItemId,
    emoji: String,
    /// Left edge in room-local pixels.
    pub left: f64,
    /// Top edge in room-local pixels.
    pub top: f64,
    size: f64,
    /// Stacking order; higher values are drawn above lower values.
    pub z_order: i64,
}

impl PlacedItem {
    /// Create an item with a fresh id. `size` is clamped; z-order is assigned on append.
    #[must_use]
    pub fn new(emoji: impl Into<String>, left: f64, top: f64, size: f64) -> Self {
        Self { id: Uuid::new_v4(), emoji: emoji.into(), left, top, size: clamp_size(size), z_order: 0 }
    }

    /// The glyph this item shows. Immutable after creation.
    #[must_use]
    pub fn emoji(&self) -> &str {
        &self.emoji
    }

    /// Font-size-equivalent scale, always within the allowed range.
    #[must_use]
    pub fn size(&self) -> f64 {
        self.size
    }

    /// Set the size, clamping to the allowed range.
    pub fn set_size(&mut self, size: f64) {
        self.size = clamp_size(size);
    }

    /// Whether this item is a wall picture (relaxed clamp, no delete-outside).
    #[must_use]
    pub fn is_picture(&self) -> bool {
        normalize_emoji(&self.emoji) == normalize_emoji(PICTURE_EMOJI)
    }
}

/// Options accepted by placement.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceOptions {
    /// Explicit size; the default is used when absent.
    pub size: Option<f64>,
    /// Do not persist after placing (batch loads).
    pub skip_save: bool,
    /// Do not ask the host for an entrance animation.
    pub skip_animation: bool,
}

/// Result of [`SceneStore::undo_last`].
#[derive(Debug, Clone, PartialEq)]
pub enum UndoOutcome {
    /// The most recently appended item was removed.
    Removed(PlacedItem),
    /// The store was empty.
    NothingToUndo,
}

/// In-memory scene for the active slot: ordered items, colours, highlight.
#[derive(Debug, Clone)]
pub struct SceneStore {
    items: Vec<PlacedItem>,
    active: Option<ItemId>,
    top_z: i64,
    wall_color: String,
    floor_color: String,
}

impl SceneStore {
    /// Create an empty scene with the default room look.
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            active: None,
            top_z: BASE_Z_ORDER,
            wall_color: DEFAULT_WALL_COLOR.to_owned(),
            floor_color: DEFAULT_FLOOR_COLOR.to_owned(),
        }
    }

    fn next_z(&mut self) -> i64 {
        self.top_z += 1;
        self.top_z
    }

    /// Append an item at the end of the insertion order with the next z-order.
    pub fn append(&mut self, mut item: PlacedItem) -> ItemId {
        item.z_order = self.next_z();
        let id = item.id;
        self.items.push(item);
        id
    }

    /// Remove an item by identity, returning it if it was present.
    pub fn remove(&mut self, id: &ItemId) -> Option<PlacedItem> {
        let index = self.items.iter().position(|item| item.id == *id)?;
        if self.active.as_ref() == Some(id) {
            self.active = None;
        }
        Some(self.items.remove(index))
    }

    /// Remove the most recently appended item, whatever has happened to it since.
    pub fn undo_last(&mut self) -> UndoOutcome {
        let Some(item) = self.items.pop() else {
            return UndoOutcome::NothingToUndo;
        };
        if self.active == Some(item.id) {
            self.active = None;
        }
        UndoOutcome::Removed(item)
    }

    /// Remove every item and clear the highlight. Returns how many were removed.
    ///
    /// The z-order counter is not reset.
    pub fn clear_all(&mut self) -> usize {
        self.active = None;
        let count = self.items.len();
        self.items.clear();
        count
    }

    /// Make `id` the single highlighted item and raise it above everything else.
    ///
    /// Returns false if the item doesn't exist.
    pub fn set_active(&mut self, id: &ItemId) -> bool {
        if !self.items.iter().any(|item| item.id == *id) {
            return false;
        }
        let z = self.next_z();
        if let Some(item) = self.get_mut(id) {
            item.z_order = z;
        }
        self.active = Some(*id);
        true
    }

    /// Drop the highlight without touching any item.
    pub fn clear_active(&mut self) {
        self.active = None;
    }

    /// The currently highlighted item, if any.
    #[must_use]
    pub fn active(&self) -> Option<ItemId> {
        self.active
    }

    /// Return a reference to an item by id.
    #[must_use]
    pub fn get(&self, id: &ItemId) -> Option<&PlacedItem> {
        self.items.iter().find(|item| item.id == *id)
    }

    /// Return a mutable reference to an item by id.
    pub fn get_mut(&mut self, id: &ItemId) -> Option<&mut PlacedItem> {
        self.items.iter_mut().find(|item| item.id == *id)
    }

    /// Items in insertion order (the persisted order).
    #[must_use]
    pub fn items(&self) -> &[PlacedItem] {
        &self.items
    }

    /// Items sorted by z-order, bottom first.
    #[must_use]
    pub fn render_order(&self) -> Vec<&PlacedItem> {
        let mut items: Vec<&PlacedItem> = self.items.iter().collect();
        items.sort_by_key(|item| item.z_order);
        items
    }

    /// Number of items in the scene.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the scene contains no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn wall_color(&self) -> &str {
        &self.wall_color
    }

    #[must_use]
    pub fn floor_color(&self) -> &str {
        &self.floor_color
    }

    pub fn set_wall_color(&mut self, color: impl Into<String>) {
        self.wall_color = color.into();
    }

    pub fn set_floor_color(&mut self, color: impl Into<String>) {
        self.floor_color = color.into();
    }

    /// Replace both colours at once, as a load does before applying a record.
    pub fn reset_look(&mut self, wall: &str, floor: &str) {
        wall.clone_into(&mut self.wall_color);
        floor.clone_into(&mut self.floor_color);
    }
}

impl Default for SceneStore {
    fn default() -> Self {
        Self::new()
    }
}
