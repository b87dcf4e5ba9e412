pub mod init;
pub mod play;
pub mod reset;
pub mod status;
pub mod validate;

use std::path::PathBuf;

use anyhow::Result;

use quizflow_core::ParticipationTracker;
use quizflow_store::{load_config_from, FileFlagStore, QuizflowConfig};

/// Options shared by every subcommand.
pub struct Context {
    pub config_path: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
}

impl Context {
    /// Load config, applying the `--data-dir` override.
    pub fn config(&self) -> Result<QuizflowConfig> {
        let mut config = load_config_from(self.config_path.as_deref())?;
        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        Ok(config)
    }

    /// The file-backed flag store and a tracker over it.
    pub fn tracker(&self, config: &QuizflowConfig) -> (FileFlagStore, ParticipationTracker) {
        let store = FileFlagStore::new(&config.data_dir);
        let tracker = ParticipationTracker::with_key(store.clone(), config.storage_key.clone());
        (store, tracker)
    }
}
