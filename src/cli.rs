//! CLI domain: parse, route, output, and presentation only.
//! No domain orchestration; single route table dispatches to the editor.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::{Cli, Commands};
pub use presentation::{
    format_document_list, format_init_summary, format_links, format_section_heading, format_tree,
};
pub use route::RunContext;
