//! Page node record and the value types that describe edits to it.

use crate::types::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Content generation state of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStatus {
    #[default]
    None,
    Queued,
    Generating,
    Generated,
    Failed,
}

impl GenerationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            GenerationStatus::None => "none",
            GenerationStatus::Queued => "queued",
            GenerationStatus::Generating => "generating",
            GenerationStatus::Generated => "generated",
            GenerationStatus::Failed => "failed",
        }
    }

    /// True once a generation attempt has settled.
    pub fn is_resolved(self) -> bool {
        matches!(self, GenerationStatus::Generated | GenerationStatus::Failed)
    }
}

/// Publication state of a page in the external content store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PublishStatus {
    #[default]
    None,
    Draft,
    Pending,
    Publishing,
    Published,
    Failed,
}

impl PublishStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PublishStatus::None => "none",
            PublishStatus::Draft => "draft",
            PublishStatus::Pending => "pending",
            PublishStatus::Publishing => "publishing",
            PublishStatus::Published => "published",
            PublishStatus::Failed => "failed",
        }
    }
}

/// Design review state. The engine stores it but attaches no transitions to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DesignStatus {
    #[default]
    None,
    Pending,
    InProgress,
    Approved,
}

/// Canvas coordinates. Independent of the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One page (or placeholder slot) of the sitemap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    /// `None` for the root and for orphans.
    pub parent_id: Option<NodeId>,
    pub is_root: bool,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub keywords: BTreeSet<String>,
    pub position: Position,
    pub generation_status: GenerationStatus,
    pub publish_status: PublishStatus,
    pub design_status: DesignStatus,
    pub wp_page_id: Option<u64>,
    pub wp_url: Option<String>,
    pub article_id: Option<String>,
    /// Local edits not yet pushed to the external content store.
    pub is_modified_locally: bool,
}

impl Node {
    pub(crate) fn new(id: NodeId, parent_id: Option<NodeId>, draft: NodeDraft, slug: String) -> Self {
        Self {
            id,
            parent_id,
            is_root: false,
            title: draft.title,
            slug,
            description: draft.description,
            keywords: draft.keywords,
            position: draft.position,
            generation_status: GenerationStatus::None,
            publish_status: PublishStatus::None,
            design_status: DesignStatus::None,
            wp_page_id: None,
            wp_url: None,
            article_id: None,
            is_modified_locally: false,
        }
    }

    pub(crate) fn root(id: NodeId, title: String) -> Self {
        Self {
            id,
            parent_id: None,
            is_root: true,
            title,
            slug: String::new(),
            description: String::new(),
            keywords: BTreeSet::new(),
            position: Position::default(),
            generation_status: GenerationStatus::None,
            publish_status: PublishStatus::None,
            design_status: DesignStatus::None,
            wp_page_id: None,
            wp_url: None,
            article_id: None,
            is_modified_locally: false,
        }
    }

    /// Orphans have no parent and are not the root.
    pub fn is_orphan(&self) -> bool {
        self.parent_id.is_none() && !self.is_root
    }

    pub(crate) fn content(&self) -> NodeContent {
        NodeContent {
            title: self.title.clone(),
            slug: self.slug.clone(),
            description: self.description.clone(),
            keywords: self.keywords.clone(),
            design_status: self.design_status,
        }
    }

    pub(crate) fn restore_content(&mut self, content: &NodeContent) {
        self.title = content.title.clone();
        self.slug = content.slug.clone();
        self.description = content.description.clone();
        self.keywords = content.keywords.clone();
        self.design_status = content.design_status;
        self.mark_edited();
    }

    /// A local edit on a page that exists remotely must be pushed again.
    pub(crate) fn mark_edited(&mut self) {
        if self.wp_page_id.is_some() {
            self.is_modified_locally = true;
        }
    }
}

/// Input for creating a node.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeDraft {
    pub title: String,
    /// Derived from the title when absent.
    pub slug: Option<String>,
    pub description: String,
    pub keywords: BTreeSet<String>,
    pub position: Position,
}

impl NodeDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.position = Position::new(x, y);
        self
    }
}

/// Field-level edit of a node's content. Structural fields are not editable here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodePatch {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub keywords: Option<BTreeSet<String>>,
    pub design_status: Option<DesignStatus>,
}

impl NodePatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn slug(slug: impl Into<String>) -> Self {
        Self {
            slug: Some(slug.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.slug.is_none()
            && self.description.is_none()
            && self.keywords.is_none()
            && self.design_status.is_none()
    }

    /// Fold a later patch into this one; fields set by `later` win.
    pub fn merge(&mut self, later: NodePatch) {
        if later.title.is_some() {
            self.title = later.title;
        }
        if later.slug.is_some() {
            self.slug = later.slug;
        }
        if later.description.is_some() {
            self.description = later.description;
        }
        if later.keywords.is_some() {
            self.keywords = later.keywords;
        }
        if later.design_status.is_some() {
            self.design_status = later.design_status;
        }
    }
}

/// Snapshot of the editable content of a node, used to invert updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeContent {
    pub title: String,
    pub slug: String,
    pub description: String,
    pub keywords: BTreeSet<String>,
    pub design_status: DesignStatus,
}

/// Where a node sits: its parent (or none) and its index among siblings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub parent_id: Option<NodeId>,
    pub index: usize,
}

/// A node removed by a cascading delete, with the placement it had.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetachedNode {
    pub node: Node,
    pub index: usize,
}
