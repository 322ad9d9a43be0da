//! Merge rules: defaults, override order, conflict handling.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("history.max_depth", 200)?
        .set_default("generation.default_concurrency", 3)?
        .set_default("generation.max_concurrency", 10)?
        .set_default("generation.call_timeout_secs", 300)?
        .set_default("links.apply_concurrency", 4)?
        .set_default("storage.store_path", ".sitemap/store")
}
