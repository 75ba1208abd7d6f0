use crate::error::{Result, ShortcutsError};
use std::path::{Path, PathBuf};
use std::time::Duration;

// ---------------------------------------------------------------------------
// Environment variables and defaults
// ---------------------------------------------------------------------------

pub const DB_PATH_ENV: &str = "SHORTCUTS_DB_PATH";
pub const TIMEOUT_ENV: &str = "SHORTCUTS_DEFAULT_TIMEOUT";
pub const LOG_LEVEL_ENV: &str = "SHORTCUTS_LOG_LEVEL";
pub const SYSTEM_ACTIONS_DIR_ENV: &str = "SHORTCUTS_SYSTEM_ACTIONS_DIR";
pub const APP_ACTIONS_DIR_ENV: &str = "SHORTCUTS_APP_ACTIONS_DIR";
pub const CURATED_ACTIONS_ENV: &str = "SHORTCUTS_CURATED_ACTIONS";

/// Relative to the user's home directory.
pub const DEFAULT_DB_PATH: &str = "Library/Shortcuts/Shortcuts.sqlite";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_LOG_LEVEL: &str = "INFO";

pub const SYSTEM_FRAMEWORKS_DIR: &str = "/System/Library/PrivateFrameworks";
pub const APPLICATIONS_DIR: &str = "/Applications";
/// Curated action reference compiled into the binary.
pub const BUNDLED_CURATED_ACTIONS: &str = include_str!("../data/curated_actions.json");

// ---------------------------------------------------------------------------
// CatalogPaths
// ---------------------------------------------------------------------------

/// Filesystem locations the action catalog scans.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogPaths {
    pub system_root: PathBuf,
    pub apps_root: PathBuf,
    /// Replaces the bundled curated reference when set.
    pub curated_file: Option<PathBuf>,
}

impl Default for CatalogPaths {
    fn default() -> Self {
        Self {
            system_root: PathBuf::from(SYSTEM_FRAMEWORKS_DIR),
            apps_root: PathBuf::from(APPLICATIONS_DIR),
            curated_file: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub db_path: PathBuf,
    pub default_timeout_secs: u64,
    pub log_level: String,
    pub catalog: CatalogPaths,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let db_path = match var(DB_PATH_ENV) {
            Some(raw) => expand_tilde(raw.trim())?,
            None => default_db_path()?,
        };
        let default_timeout_secs = var(TIMEOUT_ENV)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECONDS);
        let log_level = var(LOG_LEVEL_ENV).unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

        let mut catalog = CatalogPaths::default();
        if let Some(dir) = var(SYSTEM_ACTIONS_DIR_ENV) {
            catalog.system_root = expand_tilde(&dir)?;
        }
        if let Some(dir) = var(APP_ACTIONS_DIR_ENV) {
            catalog.apps_root = expand_tilde(&dir)?;
        }
        if let Some(file) = var(CURATED_ACTIONS_ENV) {
            catalog.curated_file = Some(expand_tilde(&file)?);
        }

        Ok(Self {
            db_path,
            default_timeout_secs,
            log_level,
            catalog,
        })
    }

    pub fn with_db_path(mut self, path: impl AsRef<Path>) -> Self {
        self.db_path = path.as_ref().to_path_buf();
        self
    }

    pub fn default_timeout(&self) -> Duration {
        Duration::from_secs(self.default_timeout_secs)
    }

    /// Tracing level for the configured log level name. Accepts the Python-style
    /// `WARNING` and `CRITICAL` spellings; unknown names fall back to INFO.
    pub fn tracing_level(&self) -> tracing::Level {
        match self.log_level.trim().to_ascii_uppercase().as_str() {
            "WARNING" => tracing::Level::WARN,
            "CRITICAL" | "FATAL" => tracing::Level::ERROR,
            other => other.parse().unwrap_or(tracing::Level::INFO),
        }
    }
}

pub fn default_db_path() -> Result<PathBuf> {
    let home = home::home_dir().ok_or(ShortcutsError::HomeNotFound)?;
    Ok(home.join(DEFAULT_DB_PATH))
}

/// Expand a leading `~` to the home directory.
pub fn expand_tilde(raw: &str) -> Result<PathBuf> {
    if raw == "~" {
        return home::home_dir().ok_or(ShortcutsError::HomeNotFound);
    }
    match raw.strip_prefix("~/") {
        Some(rest) => {
            let home = home::home_dir().ok_or(ShortcutsError::HomeNotFound)?;
            Ok(home.join(rest))
        }
        None => Ok(PathBuf::from(raw)),
    }
}
