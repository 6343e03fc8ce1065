//! Rolling file logs for the whole process.
//!
//! # Responsibility
//! - Start the file logger at most once.
//! - Keep authored text out of logs: events name ids, categories and counts.
//!
//! # Invariants
//! - Repeating `init_logging` with the same level and directory is a no-op.
//! - Asking for a different level or directory after start is an error.
//! - Nothing here panics.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info, LevelFilter};
use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;

const FILE_BASENAME: &str = "memoryforge";
const ROTATE_AT_BYTES: u64 = 5 * 1024 * 1024;
const KEEP_FILES: usize = 3;
const PANIC_TEXT_LIMIT: usize = 160;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();

struct ActiveLogger {
    level: LevelFilter,
    dir: PathBuf,
    _handle: LoggerHandle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoggingError {
    UnsupportedLevel(String),
    InvalidDirectory(String),
    AlreadyInitialized { active: String, requested: String },
    Backend(String),
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedLevel(level) => {
                write!(f, "unknown log level `{level}` (use trace, debug, info, warn or error)")
            }
            Self::InvalidDirectory(message) => write!(f, "log directory: {message}"),
            Self::AlreadyInitialized { active, requested } => write!(
                f,
                "logger already running with `{active}`; refusing to switch to `{requested}`"
            ),
            Self::Backend(message) => write!(f, "logger backend: {message}"),
        }
    }
}

impl Error for LoggingError {}

/// Starts rolling file logs under `log_dir` at `level`.
///
/// # Errors
/// - `UnsupportedLevel` when `level` is not a `log` level name (`off` included).
/// - `InvalidDirectory` when `log_dir` is empty, relative or cannot be created.
/// - `AlreadyInitialized` when a logger with other settings is running.
/// - `Backend` when flexi_logger refuses to start.
pub fn init_logging(level: &str, log_dir: &Path) -> Result<(), LoggingError> {
    let level = parse_level(level)?;
    let dir = checked_dir(log_dir)?;
    let active = ACTIVE.get_or_try_init(|| start(level, &dir))?;
    ensure_matches(active, level, &dir)
}

/// Level name and directory of the running logger.
pub fn logging_status() -> Option<(&'static str, PathBuf)> {
    ACTIVE
        .get()
        .map(|active| (level_name(active.level), active.dir.clone()))
}

pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn start(level: LevelFilter, dir: &Path) -> Result<ActiveLogger, LoggingError> {
    std::fs::create_dir_all(dir).map_err(|err| {
        LoggingError::InvalidDirectory(format!("cannot create `{}`: {err}", dir.display()))
    })?;

    let handle = Logger::with(level)
        .log_to_file(FileSpec::default().directory(dir).basename(FILE_BASENAME))
        .rotate(
            Criterion::Size(ROTATE_AT_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(KEEP_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|err| LoggingError::Backend(err.to_string()))?;

    hook_panics();
    info!(
        "event=logging_init module=core status=ok level={} log_dir={} version={} os={}",
        level_name(level),
        dir.display(),
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS
    );

    Ok(ActiveLogger {
        level,
        dir: dir.to_path_buf(),
        _handle: handle,
    })
}

fn ensure_matches(active: &ActiveLogger, level: LevelFilter, dir: &Path) -> Result<(), LoggingError> {
    if active.dir != dir {
        return Err(LoggingError::AlreadyInitialized {
            active: active.dir.display().to_string(),
            requested: dir.display().to_string(),
        });
    }
    if active.level != level {
        return Err(LoggingError::AlreadyInitialized {
            active: level_name(active.level).to_string(),
            requested: level_name(level).to_string(),
        });
    }
    Ok(())
}

fn parse_level(raw: &str) -> Result<LevelFilter, LoggingError> {
    let trimmed = raw.trim();
    let candidate = if trimmed.eq_ignore_ascii_case("warning") {
        "warn"
    } else {
        trimmed
    };
    match LevelFilter::from_str(candidate) {
        Ok(LevelFilter::Off) | Err(_) => Err(LoggingError::UnsupportedLevel(trimmed.to_string())),
        Ok(level) => Ok(level),
    }
}

fn level_name(level: LevelFilter) -> &'static str {
    match level {
        LevelFilter::Off => "off",
        LevelFilter::Error => "error",
        LevelFilter::Warn => "warn",
        LevelFilter::Info => "info",
        LevelFilter::Debug => "debug",
        LevelFilter::Trace => "trace",
    }
}

fn checked_dir(dir: &Path) -> Result<PathBuf, LoggingError> {
    if dir.as_os_str().is_empty() {
        return Err(LoggingError::InvalidDirectory("path is empty".to_string()));
    }
    if dir.is_relative() {
        return Err(LoggingError::InvalidDirectory(format!(
            "`{}` must be absolute",
            dir.display()
        )));
    }
    Ok(dir.to_path_buf())
}

/// Logs panics as one flattened line before the default hook runs.
fn hook_panics() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map_or_else(|| "unknown".to_string(), |loc| format!("{}:{}", loc.file(), loc.line()));
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .map(|text| (*text).to_string())
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        error!(
            "event=panic module=core status=error location={location} payload={}",
            one_line(&payload, PANIC_TEXT_LIMIT)
        );
        previous(info);
    }));
}

/// Joins lines and caps length; panic text may quote entry content.
fn one_line(value: &str, limit: usize) -> String {
    let flat = value.replace(['\r', '\n'], " ");
    if flat.chars().count() <= limit {
        return flat;
    }
    let mut capped = flat.chars().take(limit).collect::<String>();
    capped.push_str("...");
    capped
}
