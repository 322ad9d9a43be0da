//! CLI presentation: text and json formatters per command family.

mod documents;
mod links;
mod shared;
mod tree;

pub use documents::{format_document_list, format_init_summary};
pub use links::format_links;
pub use shared::format_section_heading;
pub use tree::format_tree;
