//! `dreamroom` — drive the room editor from the command line.
//!
//! Each invocation opens the JSON store, boots the room (legacy migration,
//! active slot, load), runs one command, prints the messages it produced and
//! the resulting room.

mod commands;
mod store;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use room::engine::RoomCore;
use room::geometry::Rect;
use tracing_subscriber::EnvFilter;

use crate::commands::{CliError, Command, describe, execute, messages};
use crate::store::FileStore;

#[derive(Parser, Debug)]
#[command(name = "dreamroom", about = "Decorate an emoji dream room from the terminal")]
struct Cli {
    /// JSON file holding saved slots.
    #[arg(long, env = "DREAMROOM_STORE", default_value = "dreamroom.json")]
    store: PathBuf,

    #[arg(long, env = "DREAMROOM_ROOM_WIDTH", default_value_t = 600.0)]
    room_width: f64,

    #[arg(long, env = "DREAMROOM_ROOM_HEIGHT", default_value_t = 400.0)]
    room_height: f64,

    #[command(subcommand)]
    command: Command,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(lines) => {
            for line in lines {
                println!("{line}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<Vec<String>, CliError> {
    let store = FileStore::open(&cli.store)?;
    let mut core = RoomCore::new(store, Rect::new(0.0, 0.0, cli.room_width, cli.room_height));
    let boot = core.boot();
    tracing::debug!(actions = boot.len(), "room booted");

    let actions = execute(&mut core, &cli.command)?;
    let mut lines = messages(&actions);
    lines.extend(describe(&core));
    Ok(lines)
}
