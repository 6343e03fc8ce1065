//! Plain-text rendering of controller screens and entries.

use chrono::{DateTime, Utc};
use memoryforge_core::{Entry, EntryCounts, EntryType, Notice, Screen};
use std::fmt::Write as _;

/// Count at which a category's progress bar is full.
const FULL_BAR_COUNT: usize = 10;
const BAR_WIDTH: usize = 10;
const SHORT_ID_LEN: usize = 8;

pub fn render_screen(screen: &Screen<'_>) -> String {
    match screen {
        Screen::Loading => "Loading...\n".to_string(),
        Screen::Dashboard { counts } => render_dashboard(counts),
        Screen::Category {
            entry_type,
            entries,
        } => render_category(*entry_type, entries),
        Screen::Search { query, results } => render_search(query, results),
    }
}

pub fn render_dashboard(counts: &EntryCounts) -> String {
    let mut out = String::from("Writing Memory Forge\n\n");
    for entry_type in EntryType::ALL {
        let count = counts.get(entry_type);
        let _ = writeln!(
            out,
            "{} {:<12} {:<12} {}",
            entry_type.icon(),
            entry_type.label(),
            count_label(count),
            progress_bar(count)
        );
    }
    out
}

pub fn render_category(entry_type: EntryType, entries: &[&Entry]) -> String {
    let mut out = format!("{} {}\n\n", entry_type.icon(), entry_type.label());
    if entries.is_empty() {
        out.push_str("No entries yet\n");
        out.push_str("Start building your story by creating your first entry.\n");
        return out;
    }
    push_cards(&mut out, entries);
    out
}

pub fn render_search(query: &str, results: &[&Entry]) -> String {
    let mut out = format!("Search Results for \"{query}\"\n\n");
    if results.is_empty() {
        out.push_str("No results found\n");
        out.push_str("Try different keywords or create a new entry.\n");
        return out;
    }
    push_cards(&mut out, results);
    out
}

pub fn render_card(entry: &Entry) -> String {
    let entry_type = entry.entry_type();
    let mut out = format!(
        "{} {}  [{}]  {}\n",
        entry_type.icon(),
        entry.name,
        short_id(entry),
        entry_type.singular()
    );
    if !entry.description.is_empty() {
        let _ = writeln!(out, "  {}", entry.description);
    }
    if !entry.tags.is_empty() {
        let tags = entry
            .tags
            .iter()
            .map(|tag| format!("#{tag}"))
            .collect::<Vec<_>>()
            .join(" ");
        let _ = writeln!(out, "  {tags}");
    }
    for (field, value) in entry.details.filled_fields() {
        if value.trim().is_empty() {
            continue;
        }
        let _ = writeln!(out, "  {}: {}", field.label(), value);
    }
    let _ = writeln!(out, "  Created {}", format_created(entry.created_at));
    out
}

pub fn render_notice(notice: Notice) -> String {
    format!("{}. {}\n", notice.title(), notice.description())
}

/// `1 entry`, `0 entries`, `2 entries`.
pub fn count_label(count: usize) -> String {
    if count == 1 {
        "1 entry".to_string()
    } else {
        format!("{count} entries")
    }
}

pub fn format_created(at: DateTime<Utc>) -> String {
    at.format("%b %-d, %Y").to_string()
}

pub fn short_id(entry: &Entry) -> String {
    entry.id.to_string().chars().take(SHORT_ID_LEN).collect()
}

fn progress_bar(count: usize) -> String {
    let filled = count.min(FULL_BAR_COUNT) * BAR_WIDTH / FULL_BAR_COUNT;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

fn push_cards(out: &mut String, entries: &[&Entry]) {
    for (index, entry) in entries.iter().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        out.push_str(&render_card(entry));
    }
}
