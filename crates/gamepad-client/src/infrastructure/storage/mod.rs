//! TOML-based settings persistence.
//!
//! The last-used endpoint is stored in the platform-appropriate config file
//! so the client reconnects to the same server across restarts:
//! - Windows:  `%APPDATA%\RemoteGamepad\settings.toml`
//! - Linux:    `~/.config/remote-gamepad/settings.toml`
//! - macOS:    `~/Library/Application Support/RemoteGamepad/settings.toml`
//!
//! Persistence is strictly best-effort: the supervisor logs a failed save
//! and carries on, and `main` falls back to defaults when loading fails.

use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;

use crate::domain::config::ConnectionConfig;

/// Error type for settings file operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing settings at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse settings TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The settings could not be serialized to TOML.
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Loads and saves the persisted connection settings.
#[cfg_attr(test, mockall::automock)]
pub trait SettingsStore: Send + Sync {
    /// Loads the persisted settings; `Ok(None)` when none were saved yet.
    fn load(&self) -> Result<Option<ConnectionConfig>, StorageError>;

    /// Persists the given settings, creating the directory if needed.
    fn save(&self, config: &ConnectionConfig) -> Result<(), StorageError>;
}

// ── TOML store ────────────────────────────────────────────────────────────────

/// Stores settings as TOML in the platform config directory, or at an
/// explicit path when one was given (`--config`).
#[derive(Debug, Default)]
pub struct TomlSettingsStore {
    path_override: Option<PathBuf>,
}

impl TomlSettingsStore {
    /// A store reading and writing the given file instead of the platform
    /// default location.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path_override: Some(path.into()) }
    }

    fn settings_path(&self) -> Result<PathBuf, StorageError> {
        if let Some(path) = &self.path_override {
            return Ok(path.clone());
        }
        let dir = platform_config_dir().ok_or(StorageError::NoPlatformConfigDir)?;
        Ok(dir.join("settings.toml"))
    }
}

impl SettingsStore for TomlSettingsStore {
    fn load(&self) -> Result<Option<ConnectionConfig>, StorageError> {
        let path = self.settings_path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let config: ConnectionConfig = toml::from_str(&content)?;
                debug!(?path, "loaded persisted settings");
                Ok(Some(config))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    fn save(&self, config: &ConnectionConfig) -> Result<(), StorageError> {
        let path = self.settings_path()?;
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|source| StorageError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        let content = toml::to_string_pretty(config)?;
        std::fs::write(&path, content).map_err(|source| StorageError::Io {
            path: path.clone(),
            source,
        })?;
        debug!(?path, "persisted settings");
        Ok(())
    }
}

/// Resolves the platform config base directory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("RemoteGamepad"))
    }

    #[cfg(target_os = "linux")]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("remote-gamepad"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("RemoteGamepad")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── In-memory store ───────────────────────────────────────────────────────────

/// Keeps settings in memory. Used by lifecycle tests.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    saved: std::sync::Mutex<Option<ConnectionConfig>>,
}

impl MemorySettingsStore {
    pub fn saved(&self) -> Option<ConnectionConfig> {
        self.saved.lock().unwrap().clone()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> Result<Option<ConnectionConfig>, StorageError> {
        Ok(self.saved.lock().unwrap().clone())
    }

    fn save(&self, config: &ConnectionConfig) -> Result<(), StorageError> {
        *self.saved.lock().unwrap() = Some(config.clone());
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
