use super::migrations::apply_migrations;
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Where the slot database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbLocation {
    File(PathBuf),
    /// Private to one connection; gone when it closes.
    Memory,
}

impl Display for DbLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Memory => f.write_str(":memory:"),
        }
    }
}

/// Opens a migrated connection at `location`.
///
/// File databases get their parent directory created on demand. Emits one
/// `db_open` event with the outcome and elapsed time.
pub fn open(location: &DbLocation) -> DbResult<Connection> {
    let started_at = Instant::now();
    let result = connect(location).and_then(|mut conn| {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        apply_migrations(&mut conn)?;
        Ok(conn)
    });
    let elapsed_ms = started_at.elapsed().as_millis();

    match &result {
        Ok(_) => info!("event=db_open module=db status=ok location={location} duration_ms={elapsed_ms}"),
        Err(err) => error!(
            "event=db_open module=db status=error location={location} duration_ms={elapsed_ms} error={err}"
        ),
    }
    result
}

/// Shorthand for `open(&DbLocation::File(..))`.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    open(&DbLocation::File(path.as_ref().to_path_buf()))
}

/// Shorthand for `open(&DbLocation::Memory)`.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open(&DbLocation::Memory)
}

fn connect(location: &DbLocation) -> DbResult<Connection> {
    match location {
        DbLocation::Memory => Ok(Connection::open_in_memory()?),
        DbLocation::File(path) => {
            if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|source| DbError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
            Ok(Connection::open(path)?)
        }
    }
}
