//! Input model: buttons, hit parts, and the per-item gesture state machine.
//!
//! The host reports which item and which part of it was hit; the engine keeps
//! exactly one `InputState` describing the gesture in flight. A gesture owns
//! everything needed to compute the next frame from the raw pointer position
//! (start point and original geometry), so moves never accumulate drift and
//! ending a gesture is just returning to `Idle`.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::doc::ItemId;
use crate::geometry::Point;

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or pen contact).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button.
    Secondary,
}

/// Which part of a placed item received the pointer-down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HitPart {
    /// The glyph itself; starts a drag.
    #[default]
    Body,
    /// The corner resize control; starts a resize.
    ResizeHandle,
    /// The small remove button.
    RemoveControl,
}

/// The input stream a drag came from. Touch drags end on any touch release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    Pointer,
    Touch,
}

/// Feedback for the "drop outside to delete" zone while dragging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteZoneCue {
    /// A deletable item is being dragged; show the zone.
    Shown,
    /// Releasing now would delete the item.
    Armed,
    /// No deletable drag in progress.
    Hidden,
}

/// Internal state for the gesture state machine.
///
/// Each active variant carries the context captured at gesture start.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InputState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// The user is moving an item.
    Dragging {
        /// Item being dragged.
        id: ItemId,
        /// Pointer or touch stream driving the drag.
        source: InputSource,
        /// Client-space position where the drag began.
        start: Point,
        /// Item left at drag start.
        orig_left: f64,
        /// Item top at drag start.
        orig_top: f64,
    },
    /// The user is resizing an item with its resize handle.
    Resizing {
        /// Item being resized.
        id: ItemId,
        /// Client-space position where the resize began.
        start: Point,
        /// Item size at resize start.
        orig_size: f64,
    },
    /// The user is pinching an item with two fingers.
    Pinching {
        /// Item being pinched.
        id: ItemId,
        /// Distance between the two fingers at pinch start. Never zero.
        start_distance: f64,
        /// Item size at pinch start.
        orig_size: f64,
    },
}

impl InputState {
    /// The item this gesture is bound to, if one is in progress.
    #[must_use]
    pub fn item(&self) -> Option<ItemId> {
        match self {
            Self::Idle => None,
            Self::Dragging { id, .. } | Self::Resizing { id, .. } | Self::Pinching { id, .. } => Some(*id),
        }
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}
