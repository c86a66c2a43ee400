//! JSON record store.
//!
//! Holds every collection in memory and mirrors it to a single JSON
//! document on disk:
//!
//! ```text
//! {
//!   "users":     [ { "username": "...", ... } ],
//!   "workouts":  [ { "id": "...", "user_id": "...", ... } ],
//!   "nutrition": [ { "id": "...", "user_id": "...", ... } ],
//!   "goals":     [ { "id": "...", "user_id": "...", ... } ]
//! }
//! ```

pub mod keyed;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::models::{Goal, NutritionEntry, User, UserId, Workout};

/// All persisted collections, each keyed by record identifier in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Collections {
    #[serde(default, with = "keyed")]
    pub users: IndexMap<UserId, User>,
    #[serde(default, with = "keyed")]
    pub workouts: IndexMap<Uuid, Workout>,
    #[serde(default, with = "keyed")]
    pub nutrition: IndexMap<Uuid, NutritionEntry>,
    #[serde(default, with = "keyed")]
    pub goals: IndexMap<Uuid, Goal>,
}

impl Collections {
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
            && self.workouts.is_empty()
            && self.nutrition.is_empty()
            && self.goals.is_empty()
    }

    /// Checks that every workout, meal and goal belongs to a known user.
    pub fn check_owners(&self) -> Result<(), String> {
        let owners = self
            .workouts
            .values()
            .map(|w| ("workout", w.id, &w.user_id))
            .chain(self.nutrition.values().map(|n| ("meal", n.id, &n.user_id)))
            .chain(self.goals.values().map(|g| ("goal", g.id, &g.user_id)));

        for (kind, id, user_id) in owners {
            if !self.users.contains_key(user_id) {
                return Err(format!("{} {} references unknown user '{}'", kind, id, user_id));
            }
        }
        Ok(())
    }
}

/// In-memory collections bound to the JSON document they were loaded from.
#[derive(Debug, Clone)]
pub struct RecordStore {
    path: PathBuf,
    data: Collections,
}

impl RecordStore {
    /// Loads the document at `path`.
    ///
    /// A missing file yields empty collections. A file that exists but does
    /// not parse, or holds records owned by no user, is an error; it is left
    /// untouched on disk.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let data = match Self::read_document(&path)? {
            Some(data) => {
                tracing::info!(
                    path = %path.display(),
                    users = data.users.len(),
                    workouts = data.workouts.len(),
                    meals = data.nutrition.len(),
                    goals = data.goals.len(),
                    "Loaded data file"
                );
                data
            }
            None => {
                tracing::info!(path = %path.display(), "No data file found, starting empty");
                Collections::default()
            }
        };
        Ok(Self { path, data })
    }

    /// Reads and parses a document without binding a store to it.
    ///
    /// Returns `Ok(None)` if the file doesn't exist.
    pub fn read_document(path: &Path) -> Result<Option<Collections>, StorageError> {
        match fs::read(path) {
            Ok(bytes) => {
                let data: Collections = serde_json::from_slice(&bytes)
                    .map_err(|e| StorageError::ParseError(path.to_path_buf(), e))?;
                data.check_owners()
                    .map_err(|msg| StorageError::InvalidDocument(path.to_path_buf(), msg))?;
                Ok(Some(data))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::IoError(path.to_path_buf(), e)),
        }
    }

    /// Writes every collection back to disk.
    ///
    /// The document is written to a sibling temp file, synced, then renamed
    /// over the target, so a crash leaves either the old or the new document.
    /// The previous document is copied to `<file>.bak` first.
    pub fn save(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| StorageError::IoError(parent.to_path_buf(), e))?;
        }

        let bytes = serde_json::to_vec_pretty(&self.data).map_err(StorageError::EncodeError)?;

        let temp_path = self.temp_path();
        let mut file =
            File::create(&temp_path).map_err(|e| StorageError::IoError(temp_path.clone(), e))?;
        file.write_all(&bytes)
            .map_err(|e| StorageError::IoError(temp_path.clone(), e))?;
        file.sync_all()
            .map_err(|e| StorageError::IoError(temp_path.clone(), e))?;
        drop(file);

        self.backup_previous();

        fs::rename(&temp_path, &self.path)
            .map_err(|e| StorageError::IoError(self.path.clone(), e))?;

        tracing::debug!(path = %self.path.display(), bytes = bytes.len(), "Saved data file");
        Ok(())
    }

    /// Returns the data file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the backup written before each save.
    pub fn backup_path(&self) -> PathBuf {
        with_suffix(&self.path, ".bak")
    }

    fn temp_path(&self) -> PathBuf {
        with_suffix(&self.path, ".tmp")
    }

    fn backup_previous(&self) {
        if !self.path.exists() {
            return;
        }
        let backup = self.backup_path();
        if let Err(e) = fs::copy(&self.path, &backup) {
            tracing::warn!(path = %backup.display(), error = %e, "Failed to write backup");
        }
    }

    pub fn data(&self) -> &Collections {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut Collections {
        &mut self.data
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// Errors that can occur while reading or writing the data file.
#[derive(Debug)]
pub enum StorageError {
    /// I/O error reading or writing a file.
    IoError(PathBuf, io::Error),
    /// The document exists but is not valid JSON for the expected layout.
    ParseError(PathBuf, serde_json::Error),
    /// The document parses but breaks a cross-collection rule.
    InvalidDocument(PathBuf, String),
    /// The collections could not be serialized.
    EncodeError(serde_json::Error),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::IoError(path, e) => {
                write!(f, "I/O error for {}: {}", path.display(), e)
            }
            StorageError::ParseError(path, e) => {
                write!(f, "Failed to parse data file {}: {}", path.display(), e)
            }
            StorageError::InvalidDocument(path, msg) => {
                write!(f, "Invalid data file {}: {}", path.display(), msg)
            }
            StorageError::EncodeError(e) => write!(f, "Failed to encode data: {}", e),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::IoError(_, e) => Some(e),
            StorageError::ParseError(_, e) => Some(e),
            StorageError::InvalidDocument(_, _) => None,
            StorageError::EncodeError(e) => Some(e),
        }
    }
}
