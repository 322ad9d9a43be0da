//! Shared test utilities for integration tests
//!
//! Builders for editors and documents plus in-memory collaborators.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use sitemap_engine::config::EngineConfig;
use sitemap_engine::document::SitemapDocument;
use sitemap_engine::editor::SitemapEditor;
use sitemap_engine::error::SitemapError;
use sitemap_engine::links::apply::LinkApplication;
use sitemap_engine::links::ContentUpdater;
use sitemap_engine::provider::{LinkSuggester, SuggestedLink};
use sitemap_engine::tree::NodeDraft;
use sitemap_engine::types::{EdgeId, NodeId, SitemapId};
use std::collections::HashSet;

/// Editor over a fresh document whose root is titled "Home".
pub fn new_editor(id: &str) -> SitemapEditor {
    SitemapEditor::open(
        SitemapDocument::new(SitemapId::from(id), "Home"),
        &EngineConfig::default(),
    )
}

pub fn root(editor: &SitemapEditor) -> NodeId {
    editor.document().read().tree.root_id().clone()
}

/// Create a page under `parent` through the editor (recorded in history).
pub fn page(editor: &SitemapEditor, parent: &NodeId, title: &str) -> NodeId {
    editor
        .create_node(Some(parent), NodeDraft::new(title))
        .expect("create page")
}

pub fn path(editor: &SitemapEditor, id: &NodeId) -> String {
    editor.document().read().tree.path(id).expect("path")
}

/// Content updater that records every applied edge and fails for chosen sources.
#[derive(Default)]
pub struct RecordingUpdater {
    pub failing_sources: HashSet<NodeId>,
    pub applied: Mutex<Vec<EdgeId>>,
}

impl RecordingUpdater {
    pub fn failing(sources: &[NodeId]) -> Self {
        Self {
            failing_sources: sources.iter().cloned().collect(),
            applied: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ContentUpdater for RecordingUpdater {
    async fn apply_link(&self, link: &LinkApplication) -> Result<(), SitemapError> {
        if self.failing_sources.contains(&link.source.id) {
            return Err(SitemapError::External(format!(
                "cannot update {}",
                link.source.title
            )));
        }
        self.applied.lock().push(link.edge.id.clone());
        Ok(())
    }
}

/// Suggester that returns a fixed list regardless of input.
pub struct StaticSuggester(pub Vec<SuggestedLink>);

#[async_trait]
impl LinkSuggester for StaticSuggester {
    async fn suggest_links(
        &self,
        _plan_id: &SitemapId,
        _node_ids: &[NodeId],
    ) -> Result<Vec<SuggestedLink>, SitemapError> {
        Ok(self.0.clone())
    }
}
