//! Configuration loading.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use quizflow_core::participation::PARTICIPATION_STORAGE_KEY;
use quizflow_core::AdvancePolicy;

/// Top-level quizflow configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizflowConfig {
    /// Directory holding the participation flag file.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Key the participation flag is stored under.
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    /// When advancing to the next question is allowed.
    #[serde(default)]
    pub advance_policy: AdvancePolicy,
    /// How long a notice stays visible, in milliseconds.
    #[serde(default = "default_notice_ttl")]
    pub notice_ttl_ms: u64,
}

fn default_data_dir() -> PathBuf {
    std::env::var("HOME")
        .map(|h| PathBuf::from(h).join(".local").join("share").join("quizflow"))
        .unwrap_or_else(|_| PathBuf::from(".quizflow"))
}
fn default_storage_key() -> String {
    PARTICIPATION_STORAGE_KEY.to_string()
}
fn default_notice_ttl() -> u64 {
    2200
}

impl Default for QuizflowConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            storage_key: default_storage_key(),
            advance_policy: AdvancePolicy::default(),
            notice_ttl_ms: default_notice_ttl(),
        }
    }
}

impl QuizflowConfig {
    pub fn notice_ttl(&self) -> Duration {
        Duration::from_millis(self.notice_ttl_ms)
    }

    /// Parse a config file's contents and resolve `${VAR}` references.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut config: QuizflowConfig = toml::from_str(content)?;
        config.data_dir = PathBuf::from(resolve_env_vars(&config.data_dir.to_string_lossy()));
        config.storage_key = resolve_env_vars(&config.storage_key);
        Ok(config)
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are not scanned again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    let mut cursor = 0;
    while let Some(offset) = result[cursor..].find("${") {
        let start = cursor + offset;
        let Some(end) = result[start..].find('}') else {
            break;
        };
        let value = std::env::var(&result[start + 2..start + end]).unwrap_or_default();
        result.replace_range(start..start + end + 1, &value);
        cursor = start + value.len();
    }
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `quizflow.toml` in the current directory
/// 2. `~/.config/quizflow/config.toml`
///
/// Environment variable override: `QUIZFLOW_DATA_DIR`.
pub fn load_config() -> Result<QuizflowConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizflowConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("quizflow.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            tracing::debug!(path = %path.display(), "loading config");
            QuizflowConfig::from_toml_str(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => QuizflowConfig::default(),
    };

    // Apply env var overrides
    if let Ok(dir) = std::env::var("QUIZFLOW_DATA_DIR") {
        if !dir.is_empty() {
            config.data_dir = PathBuf::from(dir);
        }
    }

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizflow"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_QUIZFLOW_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_QUIZFLOW_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_QUIZFLOW_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        std::env::remove_var("_QUIZFLOW_TEST_VAR");
    }

    #[test]
    fn resolve_env_vars_does_not_expand_values() {
        std::env::set_var("_QUIZFLOW_TEST_SELF", "${_QUIZFLOW_TEST_SELF}");
        std::env::set_var("_QUIZFLOW_TEST_NEXT", "b");
        assert_eq!(
            resolve_env_vars("a/${_QUIZFLOW_TEST_SELF}/${_QUIZFLOW_TEST_NEXT}"),
            "a/${_QUIZFLOW_TEST_SELF}/b"
        );
        std::env::remove_var("_QUIZFLOW_TEST_SELF");
        std::env::remove_var("_QUIZFLOW_TEST_NEXT");
    }

    #[test]
    fn resolve_env_vars_unterminated() {
        assert_eq!(resolve_env_vars("${OPEN"), "${OPEN");
    }

    #[test]
    fn default_config() {
        let config = QuizflowConfig::default();
        assert_eq!(config.storage_key, "marriage-quiz-participated");
        assert_eq!(config.advance_policy, AdvancePolicy::RequireAnswer);
        assert_eq!(config.notice_ttl(), Duration::from_millis(2200));
        assert!(config.data_dir.ends_with("quizflow") || config.data_dir.ends_with(".quizflow"));
    }

    #[test]
    fn parse_full_config() {
        std::env::set_var("_QUIZFLOW_TEST_ROOT", "/srv");
        let config = QuizflowConfig::from_toml_str(
            r#"
data_dir = "${_QUIZFLOW_TEST_ROOT}/quiz"
storage_key = "couple-quiz"
advance_policy = "require-check"
notice_ttl_ms = 500
"#,
        )
        .unwrap();
        std::env::remove_var("_QUIZFLOW_TEST_ROOT");

        assert_eq!(config.data_dir, PathBuf::from("/srv/quiz"));
        assert_eq!(config.storage_key, "couple-quiz");
        assert_eq!(config.advance_policy, AdvancePolicy::RequireCheck);
        assert_eq!(config.notice_ttl_ms, 500);
    }

    #[test]
    fn parse_partial_config_uses_defaults() {
        let config = QuizflowConfig::from_toml_str("advance_policy = \"unrestricted\"").unwrap();
        assert_eq!(config.advance_policy, AdvancePolicy::Unrestricted);
        assert_eq!(config.storage_key, PARTICIPATION_STORAGE_KEY);
        assert_eq!(config.notice_ttl_ms, 2200);
    }

    #[test]
    fn reject_unknown_policy() {
        assert!(QuizflowConfig::from_toml_str("advance_policy = \"sometimes\"").is_err());
    }

    #[test]
    fn explicit_missing_path_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config_from(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn load_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quizflow.toml");
        std::fs::write(&path, "storage_key = \"from-file\"\n").unwrap();

        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.storage_key, "from-file");
    }
}
