//! Line-oriented interactive browser.
//!
//! # Responsibility
//! - Map typed commands onto `ViewController` intents.
//! - Prompt field by field while the create/edit overlay is open.
//! - Re-render the current screen after every command.
//!
//! # Invariants
//! - End of input while a form is open discards the form; nothing is saved.
//! - Every mutation goes through the controller.

use crate::commands::{find_entry, warn_if_stale};
use crate::render::{render_card, render_notice, render_screen};
use anyhow::{bail, Result};
use log::debug;
use memoryforge_core::{
    EntryDetails, EntryField, EntryForm, EntryStore, EntryType, FormError, SaveOutcome,
    SlotRepository, ViewController,
};
use std::io::{BufRead, Lines, Write};

const HELP: &str = "\
Commands:
  open <type>      list one category (characters, places, plot-points, goals, abilities)
  new [type]       create an entry (defaults to the open category)
  edit <id>        edit an entry by id prefix
  delete <id>      delete an entry by id prefix
  show <id>        show one entry
  search <text>    search names, descriptions and tags; empty text returns home
  /<text>          same as search
  back             return to the dashboard
  help             show this help
  quit             leave
";

#[derive(Debug, Clone, PartialEq, Eq)]
enum ShellCommand {
    Help,
    Open(EntryType),
    New(Option<EntryType>),
    Edit(String),
    Delete(String),
    Show(String),
    Search(String),
    Back,
    Quit,
}

fn parse_command(line: &str) -> Result<Option<ShellCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    if let Some(query) = line.strip_prefix('/') {
        return Ok(Some(ShellCommand::Search(query.trim().to_string())));
    }
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };
    let parse_type = |raw: &str| raw.parse::<EntryType>().map_err(|err| err.to_string());
    let require = |what: &str| {
        if rest.is_empty() {
            Err(format!("usage: {verb} <{what}>"))
        } else {
            Ok(rest.to_string())
        }
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "help" | "?" => ShellCommand::Help,
        "open" | "list" => ShellCommand::Open(parse_type(&require("type")?)?),
        "new" | "add" => {
            if rest.is_empty() {
                ShellCommand::New(None)
            } else {
                ShellCommand::New(Some(parse_type(rest)?))
            }
        }
        "edit" => ShellCommand::Edit(require("id")?),
        "delete" | "rm" => ShellCommand::Delete(require("id")?),
        "show" => ShellCommand::Show(require("id")?),
        "search" => ShellCommand::Search(rest.to_string()),
        "back" | "home" => ShellCommand::Back,
        "quit" | "exit" | "q" => ShellCommand::Quit,
        other => return Err(format!("unknown command `{other}`; type `help`")),
    };
    Ok(Some(command))
}

pub fn run<R, I, W>(
    store: &mut EntryStore<R>,
    controller: &mut ViewController,
    input: I,
    out: &mut W,
) -> Result<()>
where
    R: SlotRepository,
    I: BufRead,
    W: Write,
{
    let mut lines = input.lines();
    writeln!(out, "Type `help` for commands.\n")?;
    write!(out, "{}", render_screen(&controller.screen(store)))?;

    loop {
        write!(out, "> ")?;
        out.flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;

        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                writeln!(out, "{message}")?;
                continue;
            }
        };
        debug!("event=shell_command module=cli command={command:?}");
        if command == ShellCommand::Quit {
            break;
        }
        if let Err(err) = execute(store, controller, command, &mut lines, out) {
            writeln!(out, "error: {err}")?;
        }
    }
    Ok(())
}

fn execute<R, I, W>(
    store: &mut EntryStore<R>,
    controller: &mut ViewController,
    command: ShellCommand,
    lines: &mut Lines<I>,
    out: &mut W,
) -> Result<()>
where
    R: SlotRepository,
    I: BufRead,
    W: Write,
{
    match command {
        ShellCommand::Help => {
            write!(out, "{HELP}")?;
            return Ok(());
        }
        ShellCommand::Show(raw) => {
            let id = find_entry(store, &raw)?;
            if let Some(entry) = store.get(id) {
                write!(out, "{}", render_card(entry))?;
            }
            return Ok(());
        }
        ShellCommand::Open(entry_type) => controller.select_category(entry_type),
        ShellCommand::Search(query) => controller.submit_search(&query),
        ShellCommand::Back => controller.go_back(),
        ShellCommand::New(entry_type) => {
            let entry_type = entry_type.unwrap_or_else(|| controller.selected_type());
            let mut form = controller.open_create(entry_type);
            writeln!(out, "New {}", entry_type.singular())?;
            submit_form(store, controller, &mut form, lines, out)?;
        }
        ShellCommand::Edit(raw) => {
            let id = find_entry(store, &raw)?;
            let mut form = match store.get(id) {
                Some(entry) => controller.open_edit(entry),
                None => bail!("entry {id} not found"),
            };
            writeln!(
                out,
                "Edit {} (Enter keeps the current value, `-` clears it)",
                form.entry_type().singular()
            )?;
            submit_form(store, controller, &mut form, lines, out)?;
        }
        ShellCommand::Delete(raw) => {
            let id = find_entry(store, &raw)?;
            controller.delete(store, id);
        }
        ShellCommand::Quit => return Ok(()),
    }

    if let Some(notice) = controller.take_notice() {
        write!(out, "{}", render_notice(notice))?;
    }
    warn_if_stale(store, out)?;
    write!(out, "{}", render_screen(&controller.screen(store)))?;
    Ok(())
}

fn submit_form<R, I, W>(
    store: &mut EntryStore<R>,
    controller: &mut ViewController,
    form: &mut EntryForm,
    lines: &mut Lines<I>,
    out: &mut W,
) -> Result<()>
where
    R: SlotRepository,
    I: BufRead,
    W: Write,
{
    if !fill_form(form, lines, out)? {
        controller.close_overlay();
        writeln!(out, "Cancelled.")?;
        return Ok(());
    }

    let submission = match form.submit() {
        Ok(submission) => submission,
        Err(err) => {
            controller.close_overlay();
            bail!("{err}; entry not saved");
        }
    };
    if let SaveOutcome::Missing(id) = controller.save(store, submission) {
        bail!("entry {id} no longer exists");
    }
    Ok(())
}

/// Prompts for every form value. Returns `false` when input ends first.
fn fill_form<I, W>(form: &mut EntryForm, lines: &mut Lines<I>, out: &mut W) -> Result<bool>
where
    I: BufRead,
    W: Write,
{
    loop {
        let Some(name) = prompt(lines, out, "Name", form.name())? else {
            return Ok(false);
        };
        match name {
            Answer::Keep if !form.name().trim().is_empty() => break,
            Answer::Set(name) if !name.trim().is_empty() => {
                form.set_name(name);
                break;
            }
            _ => writeln!(out, "{}", FormError::EmptyName)?,
        }
    }

    match prompt(lines, out, "Description", form.description())? {
        None => return Ok(false),
        Some(Answer::Keep) => {}
        Some(Answer::Clear) => form.set_description(""),
        Some(Answer::Set(text)) => form.set_description(text),
    }

    let current_tags = form.tags().join(", ");
    match prompt(lines, out, "Tags (comma separated)", &current_tags)? {
        None => return Ok(false),
        Some(Answer::Keep) => {}
        Some(answer) => {
            for tag in form.tags().to_vec() {
                form.remove_tag(&tag);
            }
            if let Answer::Set(text) = answer {
                for tag in text.split(',') {
                    form.add_tag(tag);
                }
            }
        }
    }

    for field in form.entry_type().fields() {
        loop {
            let label = match choice_hint(*field) {
                Some(hint) => format!("{} ({hint})", field.label()),
                None => field.label().to_string(),
            };
            let current = form.field(*field).to_string();
            let value = match prompt(lines, out, &label, &current)? {
                None => return Ok(false),
                Some(Answer::Keep) => break,
                Some(Answer::Clear) => String::new(),
                Some(Answer::Set(text)) => text,
            };
            if let Err(err) = check_choice(form.entry_type(), *field, &value) {
                writeln!(out, "{err}")?;
                continue;
            }
            form.set_field(*field, value)?;
            break;
        }
    }
    Ok(true)
}

#[derive(Debug, PartialEq, Eq)]
enum Answer {
    Keep,
    Clear,
    Set(String),
}

fn prompt<I, W>(
    lines: &mut Lines<I>,
    out: &mut W,
    label: &str,
    current: &str,
) -> Result<Option<Answer>>
where
    I: BufRead,
    W: Write,
{
    if current.is_empty() {
        write!(out, "{label}: ")?;
    } else {
        write!(out, "{label} [{current}]: ")?;
    }
    out.flush()?;

    let Some(line) = lines.next() else {
        return Ok(None);
    };
    let line = line?;
    let answer = match line.trim() {
        "" => Answer::Keep,
        "-" => Answer::Clear,
        text => Answer::Set(text.to_string()),
    };
    Ok(Some(answer))
}

fn choice_hint(field: EntryField) -> Option<&'static str> {
    match field {
        EntryField::Importance | EntryField::Priority => Some("low/medium/high"),
        EntryField::Status => Some("not_started/in_progress/completed"),
        _ => None,
    }
}

fn check_choice(entry_type: EntryType, field: EntryField, value: &str) -> Result<(), FormError> {
    if !field.is_choice() || value.trim().is_empty() {
        return Ok(());
    }
    EntryDetails::empty(entry_type).set(field, Some(value.trim()))?;
    Ok(())
}
