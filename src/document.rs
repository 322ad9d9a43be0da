//! Sitemap Document
//!
//! One sitemap: its page tree and its link graph. Operations that touch both
//! (cascading deletes) live here so the two never disagree about which pages
//! exist.

use crate::error::SitemapError;
use crate::links::{Edge, LinkGraph};
use crate::tree::{DetachedNode, Node, NodeTree};
use crate::types::{NodeId, SitemapId};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// Document shared between the editor and background generation tasks.
pub type SharedDocument = Arc<RwLock<SitemapDocument>>;

#[derive(Debug, Clone)]
pub struct SitemapDocument {
    id: SitemapId,
    pub name: String,
    pub tree: NodeTree,
    pub links: LinkGraph,
}

/// What a cascading delete removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeletedSubtree {
    pub nodes: Vec<DetachedNode>,
    pub edges: Vec<Edge>,
}

impl SitemapDocument {
    /// New document whose root page carries `name` as its title.
    pub fn new(id: SitemapId, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id,
            tree: NodeTree::new(name.clone()),
            name,
            links: LinkGraph::new(),
        }
    }

    pub fn from_parts(id: SitemapId, name: String, tree: NodeTree, links: LinkGraph) -> Self {
        Self {
            id,
            name,
            tree,
            links,
        }
    }

    pub fn id(&self) -> &SitemapId {
        &self.id
    }

    pub fn into_shared(self) -> SharedDocument {
        Arc::new(RwLock::new(self))
    }

    /// Delete a page subtree and every edge that references any removed page.
    pub fn delete_node(&mut self, id: &NodeId) -> Result<DeletedSubtree, SitemapError> {
        let nodes = self.tree.delete_node(id)?;
        let removed: HashSet<NodeId> = nodes.iter().map(|d| d.node.id.clone()).collect();
        let edges = self.links.remove_touching(&removed);
        Ok(DeletedSubtree { nodes, edges })
    }

    /// Undo a cascading delete: pages first, then their edges.
    pub(crate) fn restore_subtree(&mut self, deleted: &DeletedSubtree) -> Result<(), SitemapError> {
        self.tree.restore_detached(&deleted.nodes)?;
        for edge in &deleted.edges {
            self.links.restore(edge.clone());
        }
        Ok(())
    }

    pub fn snapshot(&self) -> DocumentSnapshot {
        DocumentSnapshot {
            id: self.id.clone(),
            name: self.name.clone(),
            nodes: self.tree.ordered_nodes(),
            edges: self.links.edges().cloned().collect(),
            saved_at: Utc::now(),
        }
    }

    /// Rebuild from a snapshot, validating every tree and edge invariant.
    pub fn from_snapshot(snapshot: DocumentSnapshot) -> Result<Self, SitemapError> {
        let tree = NodeTree::from_ordered_nodes(snapshot.nodes)?;
        let links = LinkGraph::from_edges(snapshot.edges, &tree)?;
        Ok(Self {
            id: snapshot.id,
            name: snapshot.name,
            tree,
            links,
        })
    }
}

/// Serializable form of a document handed to the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSnapshot {
    pub id: SitemapId,
    pub name: String,
    /// Parents before children, siblings in order.
    pub nodes: Vec<Node>,
    /// Creation order.
    pub edges: Vec<Edge>,
    pub saved_at: DateTime<Utc>,
}

impl DocumentSnapshot {
    /// Same content, ignoring when it was taken.
    pub fn same_content(&self, other: &DocumentSnapshot) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.nodes == other.nodes
            && self.edges == other.edges
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::links::EdgeOrigin;
    use crate::tree::NodeDraft;

    #[test]
    fn test_delete_cascades_to_edges() {
        let mut doc = SitemapDocument::new(SitemapId::from("s1"), "Home");
        let root = doc.tree.root_id().clone();
        let parent = doc.tree.create_node(Some(&root), NodeDraft::new("Services")).unwrap();
        let c1 = doc.tree.create_node(Some(&parent), NodeDraft::new("Web")).unwrap();
        let c2 = doc.tree.create_node(Some(&parent), NodeDraft::new("SEO")).unwrap();
        let other = doc.tree.create_node(Some(&root), NodeDraft::new("Contact")).unwrap();

        doc.links.add_edge(&doc.tree, &c1, &c2, None, EdgeOrigin::Ai).unwrap();
        doc.links.add_edge(&doc.tree, &other, &c1, None, EdgeOrigin::Ai).unwrap();
        doc.links.add_edge(&doc.tree, &parent, &other, None, EdgeOrigin::Manual).unwrap();
        let keep = doc.links.add_edge(&doc.tree, &other, &root, None, EdgeOrigin::Manual).unwrap();

        let deleted = doc.delete_node(&parent).unwrap();
        assert_eq!(deleted.nodes.len(), 3);
        assert_eq!(deleted.edges.len(), 3);
        assert_eq!(doc.links.len(), 1);
        assert!(doc.links.get(&keep.edge_id).is_some());
        assert!(!doc.tree.contains(&c1) && !doc.tree.contains(&c2));
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut doc = SitemapDocument::new(SitemapId::from("s1"), "Home");
        let root = doc.tree.root_id().clone();
        let a = doc.tree.create_node(Some(&root), NodeDraft::new("A")).unwrap();
        doc.tree.create_node(None, NodeDraft::new("Orphan")).unwrap();
        doc.links.add_edge(&doc.tree, &a, &root, Some("home".into()), EdgeOrigin::Manual).unwrap();

        let snapshot = doc.snapshot();
        let restored = SitemapDocument::from_snapshot(snapshot.clone()).unwrap();
        assert!(restored.snapshot().same_content(&snapshot));
    }

    #[test]
    fn test_from_snapshot_rejects_dangling_edge() {
        let mut doc = SitemapDocument::new(SitemapId::from("s1"), "Home");
        let root = doc.tree.root_id().clone();
        let a = doc.tree.create_node(Some(&root), NodeDraft::new("A")).unwrap();
        doc.links.add_edge(&doc.tree, &a, &root, None, EdgeOrigin::Manual).unwrap();
        let mut snapshot = doc.snapshot();
        snapshot.nodes.retain(|n| n.id != a);
        assert!(SitemapDocument::from_snapshot(snapshot).is_err());
    }
}
