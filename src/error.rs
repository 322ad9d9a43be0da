//! Error types for the sitemap engine.

use crate::types::{EdgeId, NodeId, SitemapId, TaskId};
use thiserror::Error;

/// Coarse error category callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    State,
    External,
    Storage,
    Config,
}

/// Storage-related errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to encode record: {0}")]
    Encode(String),

    #[error("Failed to decode record: {0}")]
    Decode(String),

    #[error("Corrupt document {0}: {1}")]
    Corrupt(SitemapId, String),
}

/// Domain errors surfaced by tree, history, link and generation operations.
#[derive(Debug, Error)]
pub enum SitemapError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Move of {node} under {new_parent} would create a cycle")]
    Cycle { node: NodeId, new_parent: NodeId },

    #[error("Edge cannot link a page to itself: {0}")]
    SelfLink(NodeId),

    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Edge not found: {0}")]
    EdgeNotFound(EdgeId),

    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    #[error("Document not found: {0}")]
    DocumentNotFound(SitemapId),

    #[error("Document already exists: {0}")]
    DocumentExists(SitemapId),

    #[error("Slug '{slug}' is already used {scope}")]
    SlugConflict { slug: String, scope: String },

    #[error("Generation task {task} is already active for sitemap {sitemap}")]
    TaskAlreadyActive { sitemap: SitemapId, task: TaskId },

    #[error("Root page cannot be {0}")]
    RootImmutable(&'static str),

    #[error("Edge {edge} cannot move from {from} to {to}")]
    EdgeTransition {
        edge: EdgeId,
        from: &'static str,
        to: &'static str,
    },

    #[error("Illegal state: {0}")]
    IllegalState(String),

    #[error("External call failed: {0}")]
    External(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl SitemapError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SitemapError::Validation(_) | SitemapError::Cycle { .. } | SitemapError::SelfLink(_) => {
                ErrorKind::Validation
            }
            SitemapError::NodeNotFound(_)
            | SitemapError::EdgeNotFound(_)
            | SitemapError::TaskNotFound(_)
            | SitemapError::DocumentNotFound(_) => ErrorKind::NotFound,
            SitemapError::DocumentExists(_)
            | SitemapError::SlugConflict { .. }
            | SitemapError::TaskAlreadyActive { .. } => ErrorKind::Conflict,
            SitemapError::RootImmutable(_)
            | SitemapError::EdgeTransition { .. }
            | SitemapError::IllegalState(_) => ErrorKind::State,
            SitemapError::External(_) => ErrorKind::External,
            SitemapError::Storage(_) => ErrorKind::Storage,
            SitemapError::ConfigError(_) => ErrorKind::Config,
        }
    }
}

impl From<config::ConfigError> for SitemapError {
    fn from(err: config::ConfigError) -> Self {
        SitemapError::ConfigError(err.to_string())
    }
}

pub type Result<T, E = SitemapError> = std::result::Result<T, E>;
