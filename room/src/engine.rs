//! Room controller: placement, gestures, undo/clear, colours and slots.
//!
//! `RoomCore` is the single owner of the scene, the slot persistence and the
//! gesture state. Every entry point takes `&mut self`, runs to completion
//! synchronously, and returns the [`Action`]s the host must present. Discrete
//! actions (place, remove, undo, clear, colour pick, slot switch, gesture
//! release) persist immediately; pointer and touch moves only clamp and write
//! through to the item.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use tracing::{debug, info};

use crate::consts::{
    DEFAULT_FLOOR_COLOR, DEFAULT_ITEM_SIZE, DEFAULT_PROJECT_NAME, DEFAULT_WALL_COLOR, DROP_CENTER_OFFSET_PX, MAX_SLOTS,
    RESIZE_DRAG_FACTOR,
};
use crate::doc::{ItemId, PlaceOptions, PlacedItem, SceneStore, UndoOutcome};
use crate::geometry::{Point, Rect, Size, clamp_inside, clamp_near, distance};
use crate::input::{Button, DeleteZoneCue, HitPart, InputSource, InputState};
use crate::persistence::{
    KeyValueStore, LoadOutcome, ProjectNameOutcome, SaveOutcome, SlotPersistence, StorageKeys, is_valid_slot,
};

/// Actions returned from entry points for the host to present.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// A new item exists; `animate` asks for the entrance animation.
    ItemCreated { id: ItemId, animate: bool },
    /// An item's position or size changed.
    ItemUpdated { id: ItemId },
    /// An item is gone.
    ItemDeleted { id: ItemId },
    /// Every item is gone.
    SceneCleared,
    /// The highlighted item changed.
    ActiveChanged(Option<ItemId>),
    /// Wall or floor colour changed.
    ColorsChanged { wall: String, floor: String },
    /// Delete-zone feedback while dragging.
    DeleteZone(DeleteZoneCue),
    /// Undo was requested on an empty room.
    NothingToUndo,
    /// A different slot is now active.
    SlotChanged(u8),
    /// One or more slot labels may have changed.
    SlotLabelsChanged,
    /// The project title changed.
    ProjectNameChanged(String),
    /// Persistent status line text.
    Status(String),
    /// Transient notification text.
    Toast(String),
}

/// Reports an item's rendered footprint. `None` means "not measured".
pub type Measure = Box<dyn Fn(&PlacedItem) -> Option<Size>>;

/// Defaults and key names used by the controller.
#[derive(Debug, Clone)]
pub struct RoomConfig {
    pub keys: StorageKeys,
    pub default_wall_color: String,
    pub default_floor_color: String,
    pub default_project_name: String,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            keys: StorageKeys::default(),
            default_wall_color: DEFAULT_WALL_COLOR.to_owned(),
            default_floor_color: DEFAULT_FLOOR_COLOR.to_owned(),
            default_project_name: DEFAULT_PROJECT_NAME.to_owned(),
        }
    }
}

/// Position policy applied when an item is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Containment {
    None,
    Strict,
    Near,
}

/// The room controller.
pub struct RoomCore<S> {
    pub scene: SceneStore,
    pub slots: SlotPersistence<S>,
    pub input: InputState,
    room: Rect,
    measure: Measure,
    config: RoomConfig,
}

impl<S: KeyValueStore> RoomCore<S> {
    /// Create a controller over `store` for a room occupying `room` in client space.
    pub fn new(store: S, room: Rect) -> Self {
        Self::with_config(store, room, RoomConfig::default())
    }

    pub fn with_config(store: S, room: Rect, config: RoomConfig) -> Self {
        let slots = SlotPersistence::with_keys(store, config.keys.clone())
            .with_default_project_name(config.default_project_name.clone());
        Self::with_slots(slots, room, config)
    }

    /// Create a controller around an already configured persistence layer.
    pub fn with_slots(slots: SlotPersistence<S>, room: Rect, config: RoomConfig) -> Self {
        let mut scene = SceneStore::new();
        scene.reset_look(&config.default_wall_color, &config.default_floor_color);
        Self { scene, slots, input: InputState::Idle, room, measure: Box::new(|_| None), config }
    }

    /// Replace the footprint measure (defaults to the item's font size).
    #[must_use]
    pub fn with_measure(mut self, measure: impl Fn(&PlacedItem) -> Option<Size> + 'static) -> Self {
        self.measure = Box::new(measure);
        self
    }

    // --- Queries ---

    #[must_use]
    pub fn room(&self) -> Rect {
        self.room
    }

    #[must_use]
    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    #[must_use]
    pub fn active_slot(&self) -> u8 {
        self.slots.active_slot()
    }

    #[must_use]
    pub fn item(&self, id: &ItemId) -> Option<&PlacedItem> {
        self.scene.get(id)
    }

    /// Labels for every slot, in slot order.
    #[must_use]
    pub fn slot_labels(&self) -> Vec<String> {
        (1..=MAX_SLOTS).map(|slot| self.slots.slot_label(slot)).collect()
    }

    #[must_use]
    pub fn project_name(&self) -> String {
        self.slots.project_name()
    }

    /// Update the room's client-space bounding rectangle.
    pub fn set_room_rect(&mut self, room: Rect) {
        self.room = room;
    }

    /// Rendered footprint of an item, falling back to its font size.
    #[must_use]
    pub fn footprint(&self, item: &PlacedItem) -> Size {
        (self.measure)(item).unwrap_or_else(|| Size::square(item.size()))
    }

    /// Whether the item's visual center lies outside the room.
    #[must_use]
    pub fn is_outside_room(&self, item: &PlacedItem) -> bool {
        let size = self.footprint(item);
        let center = Rect::new(item.left, item.top, size.width, size.height).center();
        !Rect::from_size(self.room.size()).contains(center)
    }

    // --- Startup / persistence ---

    /// Migrate legacy data, restore the active slot and load it.
    pub fn boot(&mut self) -> Vec<Action> {
        if self.slots.migrate_legacy() {
            info!("legacy room migrated during boot");
        }
        let slot = self.slots.restore_active_slot();
        let mut actions = vec![
            Action::SlotChanged(slot),
            Action::ProjectNameChanged(self.slots.project_name()),
            Action::SlotLabelsChanged,
        ];
        actions.extend(self.load());
        actions
    }

    fn persist(&mut self, actions: &mut Vec<Action>) {
        let outcome = self.slots.save(&self.scene);
        if outcome.is_saved() {
            actions.push(Action::SlotLabelsChanged);
        }
        actions.push(Action::Status(outcome.status()));
    }

    /// Save the scene to the active slot.
    pub fn save(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        self.persist(&mut actions);
        actions
    }

    /// Replace the scene with the active slot's saved record.
    ///
    /// Absent or malformed data leaves an empty room with the default look.
    pub fn load(&mut self) -> Vec<Action> {
        self.input = InputState::Idle;
        self.scene.clear_all();
        self.scene.reset_look(&self.config.default_wall_color, &self.config.default_floor_color);
        let mut actions = vec![Action::SceneCleared, Action::ActiveChanged(None)];

        let slot = self.slots.active_slot();
        match self.slots.load(slot) {
            LoadOutcome::Empty => {
                actions.push(Action::Status(format!("{} is empty", self.slots.slot_label(slot))));
            }
            LoadOutcome::Malformed | LoadOutcome::Unavailable => {
                debug!(slot, "slot treated as empty");
                actions.push(Action::Status("Could not load saved room".to_owned()));
            }
            LoadOutcome::Loaded(record) => {
                if !record.wall_color.is_empty() {
                    self.scene.set_wall_color(record.wall_color);
                }
                if !record.floor_color.is_empty() {
                    self.scene.set_floor_color(record.floor_color);
                }
                let options = PlaceOptions { size: None, skip_save: true, skip_animation: true };
                for saved in record.items {
                    #[allow(clippy::cast_precision_loss)]
                    let drop = Point::new(
                        saved.left as f64 + DROP_CENTER_OFFSET_PX,
                        saved.top as f64 + DROP_CENTER_OFFSET_PX,
                    );
                    let options = PlaceOptions { size: Some(saved.size), ..options };
                    if let Some(id) = self.insert_item(&saved.emoji, drop, options, Containment::Near) {
                        actions.push(Action::ItemCreated { id, animate: false });
                    }
                }
                actions.push(Action::SlotLabelsChanged);
                actions.push(Action::Status(format!("Loaded {}", self.slots.slot_label(slot))));
            }
        }
        actions.push(self.colors_changed());
        actions
    }

    fn colors_changed(&self) -> Action {
        Action::ColorsChanged {
            wall: self.scene.wall_color().to_owned(),
            floor: self.scene.floor_color().to_owned(),
        }
    }

    // --- Placement ---

    fn insert_item(&mut self, emoji: &str, drop: Point, options: PlaceOptions, containment: Containment) -> Option<ItemId> {
        if emoji.is_empty() {
            return None;
        }
        let size = options.size.unwrap_or(DEFAULT_ITEM_SIZE);
        let mut item =
            PlacedItem::new(emoji, drop.x - DROP_CENTER_OFFSET_PX, drop.y - DROP_CENTER_OFFSET_PX, size);
        let proposed = Point::new(item.left, item.top);
        let placed = match containment {
            Containment::None => proposed,
            Containment::Strict => clamp_inside(self.footprint(&item), self.room.size(), proposed),
            Containment::Near => clamp_near(self.footprint(&item), self.room.size(), proposed),
        };
        item.left = placed.x;
        item.top = placed.y;
        Some(self.scene.append(item))
    }

    /// Place `emoji` so that `(x, y)` (room-local) is its visual center.
    ///
    /// No clamp is applied; callers that need containment use [`Self::drop_emoji`].
    pub fn place_item(&mut self, emoji: &str, x: f64, y: f64, options: PlaceOptions) -> Vec<Action> {
        let Some(id) = self.insert_item(emoji, Point::new(x, y), options, Containment::None) else {
            return Vec::new();
        };
        let mut actions = vec![Action::ItemCreated { id, animate: !options.skip_animation }];
        if !options.skip_save {
            self.persist(&mut actions);
        }
        actions
    }

    /// Handle a completed tray drag or tap-drop at a client-space point.
    ///
    /// Drops outside the room are ignored. Pictures may overhang an edge;
    /// everything else is pulled fully inside.
    pub fn drop_emoji(&mut self, emoji: &str, client: Point) -> Vec<Action> {
        if emoji.is_empty() || !self.room.contains(client) {
            return Vec::new();
        }
        let local = self.room.to_local(client);
        let probe = PlacedItem::new(emoji, 0.0, 0.0, DEFAULT_ITEM_SIZE);
        let containment = if probe.is_picture() { Containment::Near } else { Containment::Strict };
        let Some(id) = self.insert_item(emoji, local, PlaceOptions::default(), containment) else {
            return Vec::new();
        };
        let mut actions = vec![Action::ItemCreated { id, animate: true }];
        self.persist(&mut actions);
        actions
    }

    // --- Removal ---

    fn drop_gesture_for(&mut self, id: &ItemId) {
        if self.input.item().as_ref() == Some(id) {
            self.input = InputState::Idle;
        }
    }

    /// Remove one item (its remove control was clicked).
    pub fn remove_item(&mut self, id: &ItemId) -> Vec<Action> {
        self.drop_gesture_for(id);
        if self.scene.remove(id).is_none() {
            return Vec::new();
        }
        let mut actions = vec![Action::ItemDeleted { id: *id }];
        self.persist(&mut actions);
        actions
    }

    /// Remove the most recently placed item.
    pub fn undo(&mut self) -> Vec<Action> {
        let UndoOutcome::Removed(item) = self.scene.undo_last() else {
            return vec![Action::NothingToUndo];
        };
        self.drop_gesture_for(&item.id);
        let mut actions = vec![Action::ItemDeleted { id: item.id }];
        self.persist(&mut actions);
        actions
    }

    /// Remove every item. An empty room is left untouched.
    pub fn clear(&mut self) -> Vec<Action> {
        if self.scene.is_empty() {
            return Vec::new();
        }
        self.input = InputState::Idle;
        self.scene.clear_all();
        let mut actions = vec![Action::SceneCleared, Action::ActiveChanged(None)];
        self.persist(&mut actions);
        actions
    }

    // --- Colours ---

    /// Apply a wall swatch.
    pub fn set_wall_color(&mut self, color: &str) -> Vec<Action> {
        if color.is_empty() {
            return Vec::new();
        }
        self.scene.set_wall_color(color);
        let mut actions = vec![self.colors_changed()];
        self.persist(&mut actions);
        actions
    }

    /// Apply a floor swatch.
    pub fn set_floor_color(&mut self, color: &str) -> Vec<Action> {
        if color.is_empty() {
            return Vec::new();
        }
        self.scene.set_floor_color(color);
        let mut actions = vec![self.colors_changed()];
        self.persist(&mut actions);
        actions
    }

    // --- Slots and names ---

    /// Save the current slot, then activate and load `slot`.
    pub fn switch_slot(&mut self, slot: u8) -> Vec<Action> {
        if !is_valid_slot(slot) || slot == self.slots.active_slot() {
            return Vec::new();
        }
        let mut actions = self.finish_gesture();
        self.persist(&mut actions);
        self.slots.set_active_slot(slot);
        info!(slot, "switched slot");
        actions.push(Action::SlotChanged(slot));
        actions.extend(self.load());
        actions.push(Action::Toast(format!("Now editing {} ✨", self.slots.slot_label(slot))));
        actions
    }

    /// Rename any slot. The active slot is not changed.
    pub fn rename_slot(&mut self, slot: u8, name: &str) -> Vec<Action> {
        if !is_valid_slot(slot) {
            return Vec::new();
        }
        match self.slots.rename_slot(slot, name) {
            SaveOutcome::Saved { label } => {
                let mut actions = vec![Action::SlotLabelsChanged];
                if slot == self.slots.active_slot() {
                    actions.push(Action::Status(format!("Saved {label}")));
                }
                actions
            }
            SaveOutcome::Failed(_) => vec![Action::Status("Could not rename this room".to_owned())],
        }
    }

    /// Rename the project. Blank or default names reset the title.
    pub fn rename_project(&mut self, name: &str) -> Vec<Action> {
        let outcome = self.slots.set_project_name(name);
        let mut actions = Vec::new();
        if !matches!(outcome, ProjectNameOutcome::Failed(_)) {
            actions.push(Action::ProjectNameChanged(self.slots.project_name()));
            actions.push(Action::Toast("Project title updated ✨".to_owned()));
        }
        actions.push(Action::Status(outcome.status().to_owned()));
        actions
    }

    // --- Highlight ---

    fn activate(&mut self, id: &ItemId, actions: &mut Vec<Action>) {
        if self.scene.set_active(id) {
            actions.push(Action::ActiveChanged(Some(*id)));
        }
    }

    /// The pointer entered an item.
    pub fn hover(&mut self, id: &ItemId) -> Vec<Action> {
        let mut actions = Vec::new();
        self.activate(id, &mut actions);
        actions
    }

    /// The pointer left the room.
    pub fn leave_room(&mut self) -> Vec<Action> {
        if self.scene.active().is_none() {
            return Vec::new();
        }
        self.scene.clear_active();
        vec![Action::ActiveChanged(None)]
    }

    // --- Gestures ---

    fn begin_gesture(&mut self, state: InputState) -> Vec<Action> {
        let mut actions = self.finish_gesture();
        let Some(id) = state.item() else {
            return actions;
        };
        self.activate(&id, &mut actions);
        if let InputState::Dragging { .. } = state {
            if self.scene.get(&id).is_some_and(|item| !item.is_picture()) {
                actions.push(Action::DeleteZone(DeleteZoneCue::Shown));
            }
        }
        debug!(?state, "gesture started");
        self.input = state;
        actions
    }

    /// End the gesture in flight, if any, persisting exactly once.
    ///
    /// A drag that leaves a non-picture's center outside the room deletes it.
    pub fn finish_gesture(&mut self) -> Vec<Action> {
        let state = std::mem::take(&mut self.input);
        let mut actions = Vec::new();
        match state {
            InputState::Idle => return actions,
            InputState::Dragging { id, .. } => {
                let Some(item) = self.scene.get(&id) else {
                    return actions;
                };
                let picture = item.is_picture();
                let outside = self.is_outside_room(item);
                if !picture {
                    actions.push(Action::DeleteZone(DeleteZoneCue::Hidden));
                    if outside {
                        self.scene.remove(&id);
                        actions.push(Action::ItemDeleted { id });
                        actions.push(Action::Toast("Poof! Deleted ✨".to_owned()));
                    }
                }
            }
            InputState::Resizing { id, .. } | InputState::Pinching { id, .. } => {
                if self.scene.get(&id).is_none() {
                    return actions;
                }
            }
        }
        debug!(?state, "gesture finished");
        self.persist(&mut actions);
        actions
    }

    fn drag_to(&mut self, id: ItemId, start: Point, orig: Point, current: Point) -> Vec<Action> {
        let Some(item) = self.scene.get(&id) else {
            self.input = InputState::Idle;
            return Vec::new();
        };
        let proposed = Point::new(orig.x + current.x - start.x, orig.y + current.y - start.y);
        let next = clamp_near(self.footprint(item), self.room.size(), proposed);
        let picture = item.is_picture();
        let mut actions = Vec::new();
        if let Some(item) = self.scene.get_mut(&id) {
            item.left = next.x;
            item.top = next.y;
            actions.push(Action::ItemUpdated { id });
        }
        if !picture {
            let armed = self.scene.get(&id).is_some_and(|item| self.is_outside_room(item));
            let cue = if armed { DeleteZoneCue::Armed } else { DeleteZoneCue::Shown };
            actions.push(Action::DeleteZone(cue));
        }
        actions
    }

    fn resize_to(&mut self, id: ItemId, size: f64) -> Vec<Action> {
        let Some(item) = self.scene.get_mut(&id) else {
            self.input = InputState::Idle;
            return Vec::new();
        };
        item.set_size(size);
        vec![Action::ItemUpdated { id }]
    }

    /// Primary pointer pressed on part of an item.
    pub fn on_pointer_down(&mut self, id: &ItemId, part: HitPart, pt: Point, button: Button) -> Vec<Action> {
        if button != Button::Primary {
            return Vec::new();
        }
        let Some(item) = self.scene.get(id) else {
            return Vec::new();
        };
        let state = match part {
            HitPart::RemoveControl => return self.remove_item(id),
            HitPart::Body => InputState::Dragging {
                id: *id,
                source: InputSource::Pointer,
                start: pt,
                orig_left: item.left,
                orig_top: item.top,
            },
            HitPart::ResizeHandle => InputState::Resizing { id: *id, start: pt, orig_size: item.size() },
        };
        self.begin_gesture(state)
    }

    /// Pointer moved anywhere while a pointer gesture may be active.
    pub fn on_pointer_move(&mut self, pt: Point) -> Vec<Action> {
        match self.input {
            InputState::Dragging { id, source: InputSource::Pointer, start, orig_left, orig_top } => {
                self.drag_to(id, start, Point::new(orig_left, orig_top), pt)
            }
            InputState::Resizing { id, start, orig_size } => {
                let dx = pt.x - start.x;
                let dy = pt.y - start.y;
                self.resize_to(id, orig_size + dx.max(dy) * RESIZE_DRAG_FACTOR)
            }
            _ => Vec::new(),
        }
    }

    /// Pointer released anywhere.
    pub fn on_pointer_up(&mut self, _pt: Point) -> Vec<Action> {
        match self.input {
            InputState::Dragging { source: InputSource::Pointer, .. } | InputState::Resizing { .. } => {
                self.finish_gesture()
            }
            _ => Vec::new(),
        }
    }

    /// Touches began on part of an item. `touches` holds every active touch.
    ///
    /// One finger drags; two fingers pinch-resize. A pinch whose fingers start
    /// at the same point is abandoned. Touches on the item's controls and any
    /// other finger count are ignored.
    pub fn on_touch_start(&mut self, id: &ItemId, part: HitPart, touches: &[Point]) -> Vec<Action> {
        if part != HitPart::Body {
            return Vec::new();
        }
        let Some(item) = self.scene.get(id) else {
            return Vec::new();
        };
        match touches {
            [first] => {
                let state = InputState::Dragging {
                    id: *id,
                    source: InputSource::Touch,
                    start: *first,
                    orig_left: item.left,
                    orig_top: item.top,
                };
                self.begin_gesture(state)
            }
            [a, b] => {
                let start_distance = distance(*a, *b);
                let orig_size = item.size();
                if start_distance == 0.0 {
                    let mut actions = self.finish_gesture();
                    self.activate(id, &mut actions);
                    debug!("degenerate pinch ignored");
                    return actions;
                }
                self.begin_gesture(InputState::Pinching { id: *id, start_distance, orig_size })
            }
            _ => Vec::new(),
        }
    }

    /// Touches moved. Only the first one or two touches are tracked.
    pub fn on_touch_move(&mut self, touches: &[Point]) -> Vec<Action> {
        match self.input {
            InputState::Dragging { id, source: InputSource::Touch, start, orig_left, orig_top } => {
                let Some(first) = touches.first() else {
                    return Vec::new();
                };
                self.drag_to(id, start, Point::new(orig_left, orig_top), *first)
            }
            InputState::Pinching { id, start_distance, orig_size } => {
                let [a, b, ..] = touches else {
                    return Vec::new();
                };
                self.resize_to(id, orig_size * (distance(*a, *b) / start_distance))
            }
            _ => Vec::new(),
        }
    }

    /// A touch ended or was cancelled. `remaining` holds the touches still down.
    pub fn on_touch_end(&mut self, remaining: &[Point]) -> Vec<Action> {
        match self.input {
            InputState::Dragging { source: InputSource::Touch, .. } => self.finish_gesture(),
            InputState::Pinching { .. } if remaining.len() < 2 => self.finish_gesture(),
            _ => Vec::new(),
        }
    }
}
