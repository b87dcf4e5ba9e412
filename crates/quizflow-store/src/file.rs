//! File-backed flag storage.
//!
//! Flags live in a single JSON object of string values. Every operation
//! reads the file fresh, so several processes sharing a data directory see
//! each other's writes.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use quizflow_core::FlagStore;

use crate::error::StoreError;

/// File name of the flag file inside the data directory.
pub const FLAG_FILE_NAME: &str = "participation.json";

/// A [`FlagStore`] persisted as JSON in a data directory.
#[derive(Debug, Clone)]
pub struct FileFlagStore {
    path: PathBuf,
}

impl FileFlagStore {
    /// Store flags in `data_dir/participation.json`.
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(FLAG_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read all flags. A missing file is an empty map.
    pub fn try_load(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Replace all flags on disk.
    pub fn try_save(&self, flags: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(flags)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(io_err)?;
        std::fs::rename(&tmp, &self.path).map_err(io_err)?;
        Ok(())
    }

    fn update(&self, apply: impl FnOnce(&mut BTreeMap<String, String>)) {
        let mut flags = match self.try_load() {
            Ok(flags) => flags,
            Err(e) => {
                tracing::warn!("discarding unreadable flags: {e}");
                BTreeMap::new()
            }
        };
        apply(&mut flags);
        if let Err(e) = self.try_save(&flags) {
            tracing::warn!("failed to persist flags: {e}");
        }
    }
}

impl FlagStore for FileFlagStore {
    fn get(&self, key: &str) -> Option<String> {
        match self.try_load() {
            Ok(mut flags) => flags.remove(key),
            Err(e) => {
                tracing::warn!("treating flag '{key}' as unset: {e}");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) {
        self.update(|flags| {
            flags.insert(key.to_string(), value.to_string());
        });
    }

    fn remove(&self, key: &str) {
        if self.get(key).is_none() {
            return;
        }
        self.update(|flags| {
            flags.remove(key);
        });
    }
}
