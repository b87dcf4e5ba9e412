//! quizflow-store: configuration loading and durable flag storage.
//!
//! Provides the file-backed [`FlagStore`](quizflow_core::FlagStore) the CLI
//! hands to the participation tracker, and the `quizflow.toml` loader.

pub mod config;
pub mod error;
pub mod file;

pub use config::{load_config, load_config_from, QuizflowConfig};
pub use error::StoreError;
pub use file::FileFlagStore;
