//! Workspace files: `config/config.toml`, then the overlay for the active
//! environment (`config/{SITEMAP_ENV}.toml`, `development` when unset).

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File};
use std::path::{Path, PathBuf};
use tracing::debug;

pub fn active_environment() -> String {
    std::env::var("SITEMAP_ENV").unwrap_or_else(|_| "development".to_string())
}

/// Existing workspace config files, base first.
pub fn existing_files(workspace_root: &Path) -> Vec<PathBuf> {
    let dir = workspace_root.join("config");
    [
        dir.join("config.toml"),
        dir.join(format!("{}.toml", active_environment())),
    ]
    .into_iter()
    .filter(|path| path.is_file())
    .collect()
}

pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    workspace_root: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let files = existing_files(workspace_root);
    debug!(count = files.len(), "Workspace configuration files");
    Ok(files.into_iter().fold(builder, |builder, path| {
        builder.add_source(File::from(path).required(false))
    }))
}
