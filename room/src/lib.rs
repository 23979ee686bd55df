//! Placement and persistence engine for the dream room editor.
//!
//! The crate owns everything with real invariants in the editor: the placed
//! item model, the geometry clamps that keep tokens visually coherent, the
//! per-item gesture state machine, and the multi-slot save/load protocol. The
//! host layer (browser glue or the `dreamroom` CLI) is responsible only for
//! feeding input events into [`engine::RoomCore`] and presenting the returned
//! [`engine::Action`]s.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Room controller: placement, gestures, undo/clear, slot switching |
//! | [`doc`] | Placed items and the ordered scene store |
//! | [`geometry`] | Points, sizes, rectangles and the two clamp policies |
//! | [`input`] | Input event types and the gesture state machine |
//! | [`persistence`] | Key-value store seam, scene records, slot persistence |
//! | [`consts`] | Shared numeric and string constants |
//! | `web` | Browser `localStorage` backend (`web` feature) |

pub mod consts;
pub mod doc;
pub mod engine;
pub mod geometry;
pub mod input;
pub mod persistence;
#[cfg(feature = "web")]
pub mod web;
