//! One-shot editor commands run against a booted room.

#[cfg(test)]
#[path = "commands_test.rs"]
mod commands_test;

use clap::Subcommand;
use room::doc::{ItemId, PlaceOptions};
use room::engine::{Action, RoomCore};
use room::geometry::Point;
use room::input::{Button, HitPart};
use room::persistence::{KeyValueStore, StorageError, is_valid_slot};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("no item number {0}; run `show` to list items")]
    NoSuchItem(usize),
    #[error("slot must be between 1 and 3, got {0}")]
    InvalidSlot(u8),
    #[error("store failed: {0}")]
    Storage(#[from] StorageError),
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Print the room without changing it.
    Show,
    /// Place an emoji centered on room-local (x, y), without containment.
    Place {
        emoji: String,
        x: f64,
        y: f64,
        #[arg(long)]
        size: Option<f64>,
    },
    /// Drop an emoji from the tray at room-local (x, y).
    Drop { emoji: String, x: f64, y: f64 },
    /// Drag item `index` by (dx, dy) pixels.
    Drag {
        index: usize,
        #[arg(allow_negative_numbers = true)]
        dx: f64,
        #[arg(allow_negative_numbers = true)]
        dy: f64,
    },
    /// Pull item `index`'s resize handle by (dx, dy) pixels.
    Resize {
        index: usize,
        #[arg(allow_negative_numbers = true)]
        dx: f64,
        #[arg(allow_negative_numbers = true)]
        dy: f64,
    },
    /// Pinch item `index` from one finger spread to another.
    Pinch { index: usize, from: f64, to: f64 },
    /// Remove item `index`.
    Remove { index: usize },
    /// Remove the most recently placed item.
    Undo,
    /// Remove every item.
    Clear,
    /// Set the wall colour.
    Wall { color: String },
    /// Set the floor colour.
    Floor { color: String },
    /// Switch to slot `n`.
    Slot { n: u8 },
    /// Rename slot `n`; omit the name to restore the default label.
    RenameSlot { n: u8, name: Option<String> },
    /// Rename the project; omit the name to restore the default title.
    RenameProject { name: Option<String> },
}

/// Resolve a 1-based item number (insertion order) to an id.
fn item_at<S: KeyValueStore>(core: &RoomCore<S>, index: usize) -> Result<ItemId, CliError> {
    index
        .checked_sub(1)
        .and_then(|i| core.scene.items().get(i))
        .map(|item| item.id)
        .ok_or(CliError::NoSuchItem(index))
}

/// Run `command` against a booted room, returning every action it produced.
///
/// # Errors
///
/// Returns [`CliError`] for unknown item numbers or out-of-range slots.
pub fn execute<S: KeyValueStore>(core: &mut RoomCore<S>, command: &Command) -> Result<Vec<Action>, CliError> {
    let origin = Point::new(0.0, 0.0);
    let actions = match command {
        Command::Show => Vec::new(),
        Command::Place { emoji, x, y, size } => {
            core.place_item(emoji, *x, *y, PlaceOptions { size: *size, ..PlaceOptions::default() })
        }
        Command::Drop { emoji, x, y } => {
            let room = core.room();
            core.drop_emoji(emoji, Point::new(room.left + x, room.top + y))
        }
        Command::Drag { index, dx, dy } => {
            let id = item_at(core, *index)?;
            let mut actions = core.on_pointer_down(&id, HitPart::Body, origin, Button::Primary);
            actions.extend(core.on_pointer_move(Point::new(*dx, *dy)));
            actions.extend(core.on_pointer_up(Point::new(*dx, *dy)));
            actions
        }
        Command::Resize { index, dx, dy } => {
            let id = item_at(core, *index)?;
            let mut actions = core.on_pointer_down(&id, HitPart::ResizeHandle, origin, Button::Primary);
            actions.extend(core.on_pointer_move(Point::new(*dx, *dy)));
            actions.extend(core.on_pointer_up(Point::new(*dx, *dy)));
            actions
        }
        Command::Pinch { index, from, to } => {
            let id = item_at(core, *index)?;
            let mut actions = core.on_touch_start(&id, HitPart::Body, &[origin, Point::new(*from, 0.0)]);
            actions.extend(core.on_touch_move(&[origin, Point::new(*to, 0.0)]));
            actions.extend(core.on_touch_end(&[]));
            actions
        }
        Command::Remove { index } => {
            let id = item_at(core, *index)?;
            core.remove_item(&id)
        }
        Command::Undo => core.undo(),
        Command::Clear => core.clear(),
        Command::Wall { color } => core.set_wall_color(color),
        Command::Floor { color } => core.set_floor_color(color),
        Command::Slot { n } => {
            if !is_valid_slot(*n) {
                return Err(CliError::InvalidSlot(*n));
            }
            core.switch_slot(*n)
        }
        Command::RenameSlot { n, name } => {
            if !is_valid_slot(*n) {
                return Err(CliError::InvalidSlot(*n));
            }
            core.rename_slot(*n, name.as_deref().unwrap_or_default())
        }
        Command::RenameProject { name } => core.rename_project(name.as_deref().unwrap_or_default()),
    };
    Ok(actions)
}

/// User-facing lines for the actions worth telling the user about.
#[must_use]
pub fn messages(actions: &[Action]) -> Vec<String> {
    actions
        .iter()
        .filter_map(|action| match action {
            Action::Status(text) | Action::Toast(text) => Some(text.clone()),
            Action::NothingToUndo => Some("Nothing to undo".to_owned()),
            _ => None,
        })
        .collect()
}

/// Text rendering of the whole room: title, slots, colours and items.
#[must_use]
pub fn describe<S: KeyValueStore>(core: &RoomCore<S>) -> Vec<String> {
    let mut lines = vec![core.project_name()];
    let active = usize::from(core.active_slot());
    let slots: Vec<String> = core
        .slot_labels()
        .into_iter()
        .enumerate()
        .map(|(i, label)| if i + 1 == active { format!("[{label}]") } else { label })
        .collect();
    lines.push(format!("slots: {}", slots.join("  ")));
    lines.push(format!("wall {}  floor {}", core.scene.wall_color(), core.scene.floor_color()));
    if core.scene.is_empty() {
        lines.push("(empty room)".to_owned());
    }
    for (i, item) in core.scene.items().iter().enumerate() {
        lines.push(format!(
            "{:>2}. {} left={:.0} top={:.0} size={:.0}",
            i + 1,
            item.emoji(),
            item.left,
            item.top,
            item.size()
        ));
    }
    lines
}
