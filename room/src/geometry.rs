//! Points, sizes, rectangles, and the clamp policies that keep items coherent.
//!
//! Two position policies exist. Strict containment keeps an item fully inside
//! the room. Near-room containment lets an item hang off an edge as long as
//! [`MIN_VISIBLE_PICTURE_PX`] of it stays visible; it is used for pictures and
//! for every item while a drag is in progress. All functions here are pure.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use crate::consts::{DEFAULT_ITEM_SIZE, MAX_ITEM_SIZE, MIN_ITEM_SIZE, MIN_VISIBLE_PICTURE_PX};

/// A point in either client space or room-local space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Width and height of an item footprint or of the room.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// A square footprint, used when an item cannot be measured.
    #[must_use]
    pub fn square(side: f64) -> Self {
        Self { width: side, height: side }
    }
}

/// An axis-aligned rectangle. `left`/`top` are the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    /// A rectangle at the origin with the given size.
    #[must_use]
    pub fn from_size(size: Size) -> Self {
        Self { left: 0.0, top: 0.0, width: size.width, height: size.height }
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    #[must_use]
    pub fn size(&self) -> Size {
        Size { width: self.width, height: self.height }
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point { x: self.left + self.width / 2.0, y: self.top + self.height / 2.0 }
    }

    /// Whether `pt` lies inside the rectangle. Edges count as inside.
    #[must_use]
    pub fn contains(&self, pt: Point) -> bool {
        pt.x >= self.left && pt.x <= self.right() && pt.y >= self.top && pt.y <= self.bottom()
    }

    /// Convert a client-space point into coordinates relative to this rectangle's origin.
    #[must_use]
    pub fn to_local(&self, pt: Point) -> Point {
        Point { x: pt.x - self.left, y: pt.y - self.top }
    }
}

/// Bound `value` to `[min, max]`. When the range is inverted the lower bound wins.
fn bound(value: f64, min: f64, max: f64) -> f64 {
    value.min(max).max(min)
}

/// Strict containment: keep the whole item inside the room.
///
/// Left is bounded to `[0, roomW - itemW]` and top to `[0, roomH - itemH]`,
/// each floored at 0 when the item is larger than the room.
#[must_use]
pub fn clamp_inside(item: Size, room: Size, proposed: Point) -> Point {
    let max_left = (room.width - item.width).max(0.0);
    let max_top = (room.height - item.height).max(0.0);
    Point { x: bound(proposed.x, 0.0, max_left), y: bound(proposed.y, 0.0, max_top) }
}

/// Near-room containment: the item may cross any edge but keeps at least
/// [`MIN_VISIBLE_PICTURE_PX`] inside the room on each axis.
#[must_use]
pub fn clamp_near(item: Size, room: Size, proposed: Point) -> Point {
    let min_left = -item.width + MIN_VISIBLE_PICTURE_PX;
    let max_left = room.width - MIN_VISIBLE_PICTURE_PX;
    let min_top = -item.height + MIN_VISIBLE_PICTURE_PX;
    let max_top = room.height - MIN_VISIBLE_PICTURE_PX;
    Point { x: bound(proposed.x, min_left, max_left), y: bound(proposed.y, min_top, max_top) }
}

/// Clamp an item size to `[MIN_ITEM_SIZE, MAX_ITEM_SIZE]`.
///
/// NaN and zero are treated as "no size given" and replaced by the default first.
#[must_use]
pub fn clamp_size(size: f64) -> f64 {
    let size = if size.is_nan() || size == 0.0 { DEFAULT_ITEM_SIZE } else { size };
    bound(size, MIN_ITEM_SIZE, MAX_ITEM_SIZE)
}

/// Euclidean distance between two points.
#[must_use]
pub fn distance(a: Point, b: Point) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}
