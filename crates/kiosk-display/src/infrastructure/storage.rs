//! TOML-backed key-value file for values that must survive a restart.
//!
//! The kiosk display keeps exactly one entry in it, the last resolved
//! `kioskId`, so a kiosk launched once with `?kioskId=...` keeps its identity
//! on later launches without the query.
//!
//! Default location:
//! - Linux:   `~/.config/kiosk-print/storage.toml`
//! - macOS:   `~/Library/Application Support/kiosk-print/storage.toml`
//! - Windows: `%APPDATA%\kiosk-print\storage.toml`
//!
//! ```toml
//! [values]
//! kioskId = "LOBBY-1"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use kiosk_core::KeyValueStore;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Directory name under the platform config directory.
const APP_DIR: &str = "kiosk-print";
/// File name of the key-value file.
const FILE_NAME: &str = "storage.toml";

/// Error type for key-value file operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing storage at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file content is not valid TOML for this schema.
    #[error("failed to parse storage TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The values could not be serialized to TOML.
    #[error("failed to serialize storage TOML: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// On-disk layout.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StorageFile {
    #[serde(default)]
    values: BTreeMap<String, String>,
}

/// Resolves the platform default path of the key-value file.
///
/// # Errors
///
/// Returns [`StorageError::NoPlatformConfigDir`] when the platform config
/// base directory cannot be determined from the environment.
pub fn default_storage_path() -> Result<PathBuf, StorageError> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR).join(FILE_NAME))
        .ok_or(StorageError::NoPlatformConfigDir)
}

/// [`KeyValueStore`] persisted as a TOML file.
///
/// Values are cached in memory after [`FileStore::open`]; every `set` writes
/// the whole file back.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileStore {
    /// Opens the store at `path`, starting empty if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] for file-system errors other than "not
    /// found", and [`StorageError::Parse`] if the TOML is malformed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str::<StorageFile>(&content)?.values,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no storage file at {}; starting empty", path.display());
                BTreeMap::new()
            }
            Err(source) => return Err(StorageError::Io { path, source }),
        };
        Ok(Self { path, values })
    }

    /// Opens the store at the platform default location.
    ///
    /// # Errors
    ///
    /// See [`default_storage_path`] and [`FileStore::open`].
    pub fn open_default() -> Result<Self, StorageError> {
        Self::open(default_storage_path()?)
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<(), StorageError> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir).map_err(|source| StorageError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let file = StorageFile {
            values: self.values.clone(),
        };
        let content = toml::to_string_pretty(&file)?;
        std::fs::write(&self.path, content).map_err(|source| StorageError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl KeyValueStore for FileStore {
    type Error = StorageError;

    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let previous = self.values.insert(key.to_string(), value.to_string());
        if previous.as_deref() == Some(value) {
            return Ok(());
        }
        self.save()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
