//! Configuration
//!
//! Layered with the `config` crate: serde defaults, then an optional
//! `canopy.toml`, then `CANOPY__*` environment variables.

pub mod facade;
pub mod merge;
pub mod sources;

pub use facade::ConfigLoader;

use crate::logging::LoggingConfig;
use crate::request::RequestConfig;
use serde::{Deserialize, Serialize};

/// Name of the config file looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "canopy.toml";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanopyConfig {
    #[serde(default)]
    pub requests: RequestConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}
