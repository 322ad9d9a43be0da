//! Environment source: `SITEMAP_GENERATION__MAX_CONCURRENCY=4` style overrides.

use config::builder::DefaultState;
use config::{ConfigBuilder, Environment};

pub fn add_to_builder(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix("SITEMAP")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    )
}
