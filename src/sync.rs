//! WordPress synchronization collaborator.
//!
//! Remote sync results are applied straight to the tree. They are not user
//! edits, so none of them go through the command history.

use crate::document::SharedDocument;
use crate::error::SitemapError;
use crate::tree::{Node, PublishStatus};
use crate::types::{NodeId, SitemapId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Fields pulled from the remote site for one page. `None` leaves the local
/// value untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemotePage {
    pub node_id: NodeId,
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub wp_page_id: Option<u64>,
    pub wp_url: Option<String>,
    pub publish_status: Option<PublishStatus>,
}

impl RemotePage {
    pub fn new(node_id: NodeId) -> Self {
        Self {
            node_id,
            title: None,
            slug: None,
            description: None,
            wp_page_id: None,
            wp_url: None,
            publish_status: None,
        }
    }
}

#[async_trait]
pub trait WordPressSync: Send + Sync {
    async fn sync_from_wp(
        &self,
        sitemap_id: &SitemapId,
        node_ids: &[NodeId],
    ) -> Result<Vec<RemotePage>, SitemapError>;

    /// Push local pages. Returns the ids the remote acknowledged.
    async fn update_to_wp(&self, sitemap_id: &SitemapId, pages: &[Node]) -> Result<Vec<NodeId>, SitemapError>;

    async fn publish(&self, page: &Node) -> Result<PublishStatus, SitemapError>;

    async fn unpublish(&self, page: &Node) -> Result<PublishStatus, SitemapError>;

    async fn delete_from_wp(&self, pages: &[Node]) -> Result<(), SitemapError>;
}

/// Overwrite local fields with the pulled ones; the page is in sync afterwards.
/// Pages deleted locally in the meantime are skipped. Returns the updated ids.
pub(crate) fn apply_remote_pages(document: &SharedDocument, pages: Vec<RemotePage>) -> Vec<NodeId> {
    let mut doc = document.write();
    let mut updated = Vec::with_capacity(pages.len());
    for page in pages {
        let slug = page.slug.filter(|slug| {
            let available = doc.tree.slug_available(&page.node_id, slug);
            if !available {
                warn!(node_id = %page.node_id, slug = %slug, "Pulled slug collides locally; kept local slug");
            }
            available
        });
        let result = doc.tree.with_node_mut(&page.node_id, |node| {
            if node.is_root {
                return;
            }
            if let Some(title) = page.title {
                node.title = title;
            }
            if let Some(slug) = slug {
                node.slug = slug;
            }
            if let Some(description) = page.description {
                node.description = description;
            }
            if page.wp_page_id.is_some() {
                node.wp_page_id = page.wp_page_id;
            }
            if page.wp_url.is_some() {
                node.wp_url = page.wp_url;
            }
            if let Some(status) = page.publish_status {
                node.publish_status = status;
            }
            node.is_modified_locally = false;
        });
        match result {
            Ok(()) => updated.push(page.node_id),
            Err(_) => debug!(node_id = %page.node_id, "Pulled page no longer exists locally"),
        }
    }
    updated
}

pub(crate) fn mark_pushed(document: &SharedDocument, acked: &[NodeId]) {
    let mut doc = document.write();
    for id in acked {
        let _ = doc.tree.with_node_mut(id, |node| node.is_modified_locally = false);
    }
}

pub(crate) fn set_publish_status(document: &SharedDocument, id: &NodeId, status: PublishStatus) {
    let mut doc = document.write();
    if doc
        .tree
        .with_node_mut(id, |node| node.publish_status = status)
        .is_err()
    {
        debug!(node_id = %id, "Publish status dropped for deleted page");
    }
}

/// Drop remote linkage after the remote pages were deleted.
pub(crate) fn clear_remote(document: &SharedDocument, ids: &[NodeId]) {
    let mut doc = document.write();
    for id in ids {
        let _ = doc.tree.with_node_mut(id, |node| {
            node.wp_page_id = None;
            node.wp_url = None;
            node.publish_status = PublishStatus::None;
        });
    }
}
