//! ConfigLoader facade delegating to merge service.

use super::merge::service::MergeService;
use super::CanopyConfig;
use config::ConfigError;
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from `<dir>/canopy.toml` (if present) and environment.
    pub fn load(dir: &Path) -> Result<CanopyConfig, ConfigError> {
        MergeService::load(dir)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> Result<CanopyConfig, ConfigError> {
        MergeService::load_from_file(path)
    }
}
