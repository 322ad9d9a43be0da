//! Shared presentation helpers.

use crate::error::{SitemapError, StorageError};
use owo_colors::OwoColorize;
use serde::Serialize;

/// Format a section heading with bold/underline.
pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

pub(crate) fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, SitemapError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| SitemapError::Storage(StorageError::Encode(e.to_string())))
}
