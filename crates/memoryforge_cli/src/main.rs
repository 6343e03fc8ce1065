//! Memory Forge command-line entry point.
//!
//! # Responsibility
//! - Resolve config, start logging, open the slot store.
//! - Hand the loaded entry store to a one-shot command or the shell.

mod cli;
mod commands;
mod config;
mod render;
mod shell;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use config::AppConfig;
use log::{info, warn};
use memoryforge_core::{
    db::open_db, init_logging, EntryStore, MemorySlotRepository, SqliteSlotRepository,
};
use std::io;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;
    let settings = config.resolve(cli.data_dir.as_deref(), cli.log_level.as_deref())?;

    if let Err(err) = init_logging(&settings.log_level, &settings.log_dir()) {
        eprintln!("warning: file logging disabled: {err}");
    }

    let command = cli.command.unwrap_or(Commands::Dashboard);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if cli.ephemeral {
        info!("event=store_open module=cli status=ok backend=memory");
        let mut store = EntryStore::open(MemorySlotRepository::new(), settings.storage_key.as_str());
        return commands::run(&mut store, command, &mut out);
    }

    let db_path = settings.db_path();
    let conn = open_db(&db_path)
        .with_context(|| format!("Failed to open database at {}", db_path.display()))?;
    info!(
        "event=store_open module=cli status=ok backend=sqlite path={}",
        db_path.display()
    );
    let mut store = EntryStore::open(
        SqliteSlotRepository::new(&conn),
        settings.storage_key.as_str(),
    );
    let result = commands::run(&mut store, command, &mut out);
    if store.is_mirror_stale() {
        warn!("event=store_close module=cli status=stale");
    }
    result
}
