//! Identifier newtypes shared across the engine.
//!
//! Ids are opaque strings. Fresh ids are UUID v4; ids handed out by the
//! persistence collaborator (or written by hand in tests) are wrapped as-is.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Generate a fresh random id.
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// Identity of one sitemap document.
    SitemapId
);
string_id!(
    /// Identity of a page node; stable across moves and renames.
    NodeId
);
string_id!(
    /// Identity of a link edge.
    EdgeId
);
string_id!(
    /// Identity of a generation task.
    TaskId
);
