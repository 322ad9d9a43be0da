//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::{ErrorKind, SitemapError};

/// Map domain errors to a one-line message prefixed with a stable category.
pub fn map_error(e: &SitemapError) -> String {
    let category = match e.kind() {
        ErrorKind::Validation => "invalid",
        ErrorKind::NotFound => "not found",
        ErrorKind::Conflict => "conflict",
        ErrorKind::State => "not allowed",
        ErrorKind::External => "external",
        ErrorKind::Storage => "storage",
        ErrorKind::Config => "config",
    };
    format!("error ({}): {}", category, e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NodeId;

    #[test]
    fn test_map_error_prefixes_category() {
        let message = map_error(&SitemapError::NodeNotFound(NodeId::from("n1")));
        assert_eq!(message, "error (not found): Node not found: n1");
    }
}
