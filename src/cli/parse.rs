//! CLI parse: clap types for the sitemap CLI. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Sitemap CLI - edit page hierarchies and internal links
#[derive(Parser)]
#[command(name = "sitemap")]
#[command(about = "Edit sitemap page trees and their internal link graph")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an empty sitemap whose root page is titled NAME
    Init {
        name: String,
        /// Use this id instead of a generated one
        #[arg(long)]
        id: Option<String>,
    },
    /// List stored sitemaps
    List {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show the page tree of a sitemap
    Tree {
        sitemap: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Add a page (under the root unless --parent or --orphan is given)
    Add {
        sitemap: String,
        title: String,
        /// Parent page id
        #[arg(long, conflicts_with = "orphan")]
        parent: Option<String>,
        /// Create the page without a parent
        #[arg(long)]
        orphan: bool,
        /// Slug (derived from the title when omitted)
        #[arg(long)]
        slug: Option<String>,
    },
    /// Move a page to a new parent and sibling position
    Move {
        sitemap: String,
        node: String,
        /// New parent page id (root when omitted, unless --orphan)
        #[arg(long, conflicts_with = "orphan")]
        parent: Option<String>,
        /// Detach the page and its subtree from the hierarchy
        #[arg(long)]
        orphan: bool,
        /// Sibling index (appended when omitted)
        #[arg(long)]
        index: Option<usize>,
    },
    /// Delete a page, its subtree and every link touching them
    Delete { sitemap: String, node: String },
    /// Add or update a manual link between two pages
    Link {
        sitemap: String,
        source: String,
        target: String,
        /// Anchor text for the link
        #[arg(long)]
        anchor: Option<String>,
    },
    /// Approve a planned or rejected link
    Approve { sitemap: String, edge: String },
    /// Reject a planned or approved link
    Reject { sitemap: String, edge: String },
    /// List the links of a sitemap with per-status counts
    Links {
        sitemap: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

impl Commands {
    /// Stable command name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Init { .. } => "init",
            Commands::List { .. } => "list",
            Commands::Tree { .. } => "tree",
            Commands::Add { .. } => "add",
            Commands::Move { .. } => "move",
            Commands::Delete { .. } => "delete",
            Commands::Link { .. } => "link",
            Commands::Approve { .. } => "approve",
            Commands::Reject { .. } => "reject",
            Commands::Links { .. } => "links",
        }
    }
}
