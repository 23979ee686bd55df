//! Shared numeric and string constants for the room crate.

// ── Item sizing ─────────────────────────────────────────────────

/// Smallest font-size-equivalent scale an item may have.
pub const MIN_ITEM_SIZE: f64 = 26.0;

/// Largest font-size-equivalent scale an item may have.
pub const MAX_ITEM_SIZE: f64 = 84.0;

/// Size given to items placed without an explicit (or valid) size.
pub const DEFAULT_ITEM_SIZE: f64 = 40.0;

/// Half of the default footprint. A drop point is the visual center of the
/// new item, so its top-left corner sits this far up and left of it.
pub const DROP_CENTER_OFFSET_PX: f64 = 20.0;

/// Pointer-resize sensitivity: size units gained per pixel of handle travel.
pub const RESIZE_DRAG_FACTOR: f64 = 0.6;

// ── Pictures ────────────────────────────────────────────────────

/// Glyph that marks an item as a wall picture.
pub const PICTURE_EMOJI: &str = "🖼️";

/// Pixels of a picture that must stay inside the room on every edge it crosses.
pub const MIN_VISIBLE_PICTURE_PX: f64 = 18.0;

// ── Stacking ────────────────────────────────────────────────────

/// Z-order counter value at session start; the first item gets `BASE_Z_ORDER + 1`.
pub const BASE_Z_ORDER: i64 = 20;

// ── Slots and names ─────────────────────────────────────────────

/// Number of independent save slots.
pub const MAX_SLOTS: u8 = 3;

/// Maximum length, in characters, of a slot name or project name.
pub const MAX_NAME_CHARS: usize = 30;

/// Project title used when none is stored.
pub const DEFAULT_PROJECT_NAME: &str = "Isla's Dream Room";

/// Wall colour of an empty or freshly loaded room.
pub const DEFAULT_WALL_COLOR: &str = "#A8D8EA";

/// Floor colour of an empty or freshly loaded room.
pub const DEFAULT_FLOOR_COLOR: &str = "#D2A679";
