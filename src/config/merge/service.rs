//! MergeService: orchestrates sources and deserializes to CanopyConfig.

use crate::config::sources::{environment, file};
use crate::config::{CanopyConfig, CONFIG_FILE_NAME};
use config::{Config, ConfigError};
use std::path::Path;

/// Merge service for config composition.
pub struct MergeService;

impl MergeService {
    /// Precedence: defaults (lowest) -> `<dir>/canopy.toml` -> environment (highest).
    pub fn load(dir: &Path) -> Result<CanopyConfig, ConfigError> {
        let builder = Config::builder();
        let builder = file::add_to_builder(builder, &dir.join(CONFIG_FILE_NAME), false);
        let builder = environment::add_to_builder(builder);

        builder.build()?.try_deserialize()
    }

    /// Load config from a specific file with environment overlay.
    pub fn load_from_file(path: &Path) -> Result<CanopyConfig, ConfigError> {
        let builder = Config::builder();
        let builder = file::add_to_builder(builder, path, true);
        let builder = environment::add_to_builder(builder);

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{MissingPolicy, RollbackPolicy};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_without_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = MergeService::load(dir.path()).unwrap();
        assert_eq!(config.requests.latency_ms, 1000);
        assert_eq!(config.requests.rollback, RollbackPolicy::Keep);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_workspace_file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[requests]\nlatency_ms = 20\nrollback = \"revert\"\nmissing = \"ignore\"\n\n[logging]\nlevel = \"debug\"\n",
        )
        .unwrap();
        let config = MergeService::load(dir.path()).unwrap();
        assert_eq!(config.requests.latency_ms, 20);
        assert_eq!(config.requests.rollback, RollbackPolicy::Revert);
        assert_eq!(config.requests.missing, MissingPolicy::Ignore);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "text");
    }

    #[test]
    fn test_explicit_file_must_exist() {
        let dir = TempDir::new().unwrap();
        assert!(MergeService::load_from_file(&dir.path().join("absent.toml")).is_err());
    }

    #[test]
    fn test_invalid_policy_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[requests]\nrollback = \"sometimes\"\n").unwrap();
        assert!(MergeService::load_from_file(&path).is_err());
    }
}
