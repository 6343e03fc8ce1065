use clap::{Args, Parser, Subcommand};
use memoryforge_core::{EntryField, EntryId, EntryType};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "memoryforge", version)]
#[command(about = "Notebook for characters, places, plot points, goals and abilities")]
pub struct Cli {
    /// Config file (default: <config dir>/memoryforge/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Directory holding the database and logs
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
    /// trace|debug|info|warn|error
    #[arg(long, global = true)]
    pub log_level: Option<String>,
    /// Keep entries in memory only; nothing is written to disk
    #[arg(long, global = true)]
    pub ephemeral: bool,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show every category with its entry count
    Dashboard,
    /// List the entries of one category
    List { entry_type: EntryType },
    /// Search names, descriptions and tags
    Search { query: String },
    /// Show one entry by id or id prefix
    Show { id: String },
    /// Create an entry
    Add {
        entry_type: EntryType,
        #[command(flatten)]
        values: EntryArgs,
    },
    /// Edit an entry by id or id prefix
    Edit {
        id: String,
        #[command(flatten)]
        values: EntryArgs,
    },
    /// Delete an entry by id or id prefix
    Delete { id: String },
    /// Browse interactively
    Shell,
}

#[derive(Debug, Clone, Default, Args)]
pub struct EntryArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// Repeatable
    #[arg(long = "tag")]
    pub tags: Vec<String>,
    /// Repeatable
    #[arg(long = "remove-tag")]
    pub remove_tags: Vec<String>,
    /// `key=value`, repeatable; an empty value clears the field
    #[arg(long = "field", value_parser = parse_field_assignment)]
    pub fields: Vec<(EntryField, String)>,
}

/// Parses `key=value` into a field assignment.
pub fn parse_field_assignment(raw: &str) -> Result<(EntryField, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got `{raw}`"))?;
    let field = key.parse::<EntryField>().map_err(|err| err.to_string())?;
    Ok((field, value.to_string()))
}

/// Resolves a full id or a unique prefix against known ids.
pub fn resolve_id<'a, I>(ids: I, raw: &str) -> Result<EntryId, String>
where
    I: IntoIterator<Item = &'a EntryId>,
{
    let needle = raw.trim().to_ascii_lowercase();
    if needle.is_empty() {
        return Err("entry id is empty".to_string());
    }
    let matches = ids
        .into_iter()
        .filter(|id| id.to_string().starts_with(&needle))
        .copied()
        .collect::<Vec<_>>();
    match matches.as_slice() {
        [id] => Ok(*id),
        [] => Err(format!("no entry matches `{raw}`")),
        _ => Err(format!("`{raw}` matches {} entries; use more characters", matches.len())),
    }
}
