//! Configuration System
//!
//! Layered engine configuration: built-in defaults, a user-level file, the
//! workspace files, then `SITEMAP_*` environment variables.

use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub history: HistoryConfig,

    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub links: LinksConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Undo/redo settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Commands kept per document before the oldest is evicted
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_max_depth() -> usize {
    200
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
        }
    }
}

/// Bulk generation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Worker pool size when the caller does not pick one
    #[serde(default = "default_concurrency")]
    pub default_concurrency: usize,

    /// Upper bound accepted by `start`
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Per-node collaborator call timeout (seconds)
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,
}

fn default_concurrency() -> usize {
    3
}

fn default_max_concurrency() -> usize {
    10
}

fn default_call_timeout_secs() -> u64 {
    300
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            default_concurrency: default_concurrency(),
            max_concurrency: default_max_concurrency(),
            call_timeout_secs: default_call_timeout_secs(),
        }
    }
}

/// Link application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinksConfig {
    /// Concurrent content-update calls during a batch apply
    #[serde(default = "default_apply_concurrency")]
    pub apply_concurrency: usize,
}

fn default_apply_concurrency() -> usize {
    4
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            apply_concurrency: default_apply_concurrency(),
        }
    }
}

/// Storage paths
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
}

fn default_store_path() -> PathBuf {
    PathBuf::from(".sitemap/store")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
        }
    }
}

impl StorageConfig {
    /// Resolve the store path against the workspace root when relative.
    pub fn resolve_store_path(&self, workspace_root: &Path) -> PathBuf {
        if self.store_path.is_absolute() {
            self.store_path.clone()
        } else {
            workspace_root.join(&self.store_path)
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    History(String),
    Generation(String),
    Links(String),
    Storage(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::History(msg) => write!(f, "history: {}", msg),
            ValidationError::Generation(msg) => write!(f, "generation: {}", msg),
            ValidationError::Links(msg) => write!(f, "links: {}", msg),
            ValidationError::Storage(msg) => write!(f, "storage: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl EngineConfig {
    /// Validate the entire configuration, collecting every problem.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.history.max_depth == 0 {
            errors.push(ValidationError::History(
                "max_depth must be at least 1".to_string(),
            ));
        }
        if self.generation.max_concurrency == 0 {
            errors.push(ValidationError::Generation(
                "max_concurrency must be at least 1".to_string(),
            ));
        }
        if self.generation.default_concurrency == 0
            || self.generation.default_concurrency > self.generation.max_concurrency
        {
            errors.push(ValidationError::Generation(format!(
                "default_concurrency must be between 1 and {}",
                self.generation.max_concurrency
            )));
        }
        if self.generation.call_timeout_secs == 0 {
            errors.push(ValidationError::Generation(
                "call_timeout_secs must be positive".to_string(),
            ));
        }
        if self.links.apply_concurrency == 0 {
            errors.push(ValidationError::Links(
                "apply_concurrency must be at least 1".to_string(),
            ));
        }
        if self.storage.store_path.as_os_str().is_empty() {
            errors.push(ValidationError::Storage(
                "store_path cannot be empty".to_string(),
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Render as TOML, the format the config files use.
    pub fn to_toml_string(&self) -> Result<String, crate::error::SitemapError> {
        toml::to_string_pretty(self)
            .map_err(|e| crate::error::SitemapError::ConfigError(e.to_string()))
    }
}
