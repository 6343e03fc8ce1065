//! One-shot subcommands: each runs a single intent and prints the result.

use crate::cli::{resolve_id, Commands, EntryArgs};
use crate::render::{render_card, render_notice, render_screen};
use crate::shell;
use anyhow::{anyhow, bail, Result};
use memoryforge_core::{
    EntryForm, EntryId, EntryStore, SaveOutcome, SlotRepository, ViewController,
};
use std::io::{self, Write};

pub fn run<R: SlotRepository>(
    store: &mut EntryStore<R>,
    command: Commands,
    out: &mut impl Write,
) -> Result<()> {
    let mut controller = ViewController::new();
    match command {
        Commands::Dashboard => render(store, &controller, out)?,
        Commands::List { entry_type } => {
            controller.select_category(entry_type);
            render(store, &controller, out)?;
        }
        Commands::Search { query } => {
            controller.submit_search(&query);
            render(store, &controller, out)?;
        }
        Commands::Show { id } => {
            let id = find_entry(store, &id)?;
            if let Some(entry) = store.get(id) {
                write!(out, "{}", render_card(entry))?;
            }
        }
        Commands::Add { entry_type, values } => {
            if values.name.is_none() {
                bail!("--name is required");
            }
            let mut form = controller.open_create(entry_type);
            apply_args(&mut form, &values)?;
            let submission = form.submit()?;
            if let SaveOutcome::Created(entry) = controller.save(store, submission) {
                write!(out, "{}", render_card(&entry))?;
            }
        }
        Commands::Edit { id, values } => {
            let id = find_entry(store, &id)?;
            let mut form = match store.get(id) {
                Some(entry) => controller.open_edit(entry),
                None => bail!("entry {id} not found"),
            };
            apply_args(&mut form, &values)?;
            let submission = form.submit()?;
            if let SaveOutcome::Missing(id) = controller.save(store, submission) {
                bail!("entry {id} no longer exists");
            }
            if let Some(entry) = store.get(id) {
                write!(out, "{}", render_card(entry))?;
            }
        }
        Commands::Delete { id } => {
            let id = find_entry(store, &id)?;
            if !controller.delete(store, id) {
                bail!("entry {id} not found");
            }
        }
        Commands::Shell => {
            let stdin = io::stdin();
            return shell::run(store, &mut controller, stdin.lock(), out);
        }
    }

    if let Some(notice) = controller.take_notice() {
        write!(out, "{}", render_notice(notice))?;
    }
    warn_if_stale(store, out)
}

fn render<R: SlotRepository>(
    store: &EntryStore<R>,
    controller: &ViewController,
    out: &mut impl Write,
) -> Result<()> {
    write!(out, "{}", render_screen(&controller.screen(store)))?;
    Ok(())
}

/// Copies command-line values into a form. Unset options keep what the form holds.
pub fn apply_args(form: &mut EntryForm, values: &EntryArgs) -> Result<()> {
    if let Some(name) = &values.name {
        form.set_name(name.as_str());
    }
    if let Some(description) = &values.description {
        form.set_description(description.as_str());
    }
    for tag in &values.remove_tags {
        form.remove_tag(tag.trim());
    }
    for tag in &values.tags {
        form.add_tag(tag);
    }
    for (field, value) in &values.fields {
        form.set_field(*field, value.as_str())?;
    }
    Ok(())
}

pub fn find_entry<R: SlotRepository>(store: &EntryStore<R>, raw: &str) -> Result<EntryId> {
    resolve_id(store.entries().iter().map(|entry| &entry.id), raw).map_err(|err| anyhow!(err))
}

pub fn warn_if_stale<R: SlotRepository>(store: &EntryStore<R>, out: &mut impl Write) -> Result<()> {
    if store.is_mirror_stale() {
        writeln!(out, "warning: changes could not be saved to disk")?;
    }
    Ok(())
}
