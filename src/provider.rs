//! AI collaborators: content generation and link suggestion.
//!
//! The engine never talks to a model directly. It hands a request to one of
//! these traits and records the outcome.

use crate::error::SitemapError;
use crate::tree::{Node, NodeTree};
use crate::types::{NodeId, SitemapId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Provider/prompt selection passed through unchanged to the generator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub provider: String,
    pub prompt: String,
    #[serde(default)]
    pub settings: BTreeMap<String, String>,
}

impl GenerationParams {
    pub fn new(provider: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            prompt: prompt.into(),
            settings: BTreeMap::new(),
        }
    }

    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }
}

/// Page fields the generator sees, taken when the node is dispatched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSnapshot {
    pub id: NodeId,
    pub title: String,
    pub slug: String,
    pub path: String,
    pub description: String,
    pub keywords: Vec<String>,
}

impl PageSnapshot {
    pub(crate) fn capture(tree: &NodeTree, node: &Node) -> Self {
        Self {
            id: node.id.clone(),
            title: node.title.clone(),
            slug: node.slug.clone(),
            path: tree.path(&node.id).unwrap_or_default(),
            description: node.description.clone(),
            keywords: node.keywords.iter().cloned().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub sitemap_id: SitemapId,
    pub page: PageSnapshot,
    pub params: GenerationParams,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedContent {
    /// Identifier of the stored article, when the generator persisted one.
    pub article_id: Option<String>,
    pub content: String,
}

#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedContent, SitemapError>;
}

/// A proposed internal link. Imported as an `ai` edge in `planned`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestedLink {
    pub source_node_id: NodeId,
    pub target_node_id: NodeId,
    pub anchor_text: Option<String>,
}

#[async_trait]
pub trait LinkSuggester: Send + Sync {
    async fn suggest_links(
        &self,
        plan_id: &SitemapId,
        node_ids: &[NodeId],
    ) -> Result<Vec<SuggestedLink>, SitemapError>;
}
