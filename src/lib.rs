//! Sitemap Engine: State for a Visual Sitemap Editor
//!
//! An in-memory engine that owns a sitemap's page hierarchy and its internal
//! link graph, records every user edit for undo/redo, and runs bulk content
//! generation with bounded concurrency. Remote publishing, content generation
//! and link suggestion are reached through collaborator traits.

pub mod cli;
pub mod config;
pub mod document;
pub mod editor;
pub mod error;
pub mod generation;
pub mod history;
pub mod links;
pub mod logging;
pub mod provider;
pub mod store;
pub mod sync;
pub mod tree;
pub mod types;
