use anyhow::{Context, Result};
use memoryforge_core::{default_log_level, DEFAULT_STORAGE_KEY};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "memoryforge";
const DB_FILE_NAME: &str = "memoryforge.db";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory for the database and logs; platform data dir when unset.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(default)]
    pub log_level: Option<String>,
    /// Slot key the entry collection is mirrored under.
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            log_level: None,
            storage_key: default_storage_key(),
        }
    }
}

/// Config with every value decided, after command-line overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub log_level: String,
    pub storage_key: String,
}

impl Settings {
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }
}

impl AppConfig {
    pub fn config_path() -> Result<PathBuf> {
        Ok(dirs::config_dir()
            .context("Cannot determine config directory")?
            .join(APP_DIR)
            .join("config.toml"))
    }

    /// Load config from `path`, or the default location when `None`.
    /// A missing file yields the default config.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::config_path()?,
        };
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config at {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("Failed to parse config at {}", path.display()))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        Ok(config)
    }

    /// Applies command-line overrides and fills in platform defaults.
    pub fn resolve(
        &self,
        data_dir: Option<&Path>,
        log_level: Option<&str>,
    ) -> Result<Settings> {
        let data_dir = match data_dir.or(self.data_dir.as_deref()) {
            Some(dir) => absolutize(dir)?,
            None => dirs::data_dir()
                .context("Cannot determine data directory")?
                .join(APP_DIR),
        };
        let log_level = log_level
            .map(str::to_string)
            .or_else(|| self.log_level.clone())
            .unwrap_or_else(|| default_log_level().to_string());
        let storage_key = if self.storage_key.trim().is_empty() {
            default_storage_key()
        } else {
            self.storage_key.trim().to_string()
        };

        Ok(Settings {
            data_dir,
            log_level,
            storage_key,
        })
    }
}

fn absolutize(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("Cannot determine current directory")?;
    Ok(cwd.join(path))
}
