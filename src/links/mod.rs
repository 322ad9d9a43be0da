//! Internal Link Graph
//!
//! Directed edges between pages with an approval workflow. At most one edge
//! exists per ordered `(source, target)` pair; adding an existing pair is an
//! upsert. Edge endpoints are checked against the page tree on every insert.

pub mod apply;
pub mod edge;

pub use apply::{ApplyReport, ContentUpdater};
pub use edge::{Edge, EdgeOrigin, EdgeStatus};

use crate::error::SitemapError;
use crate::tree::NodeTree;
use crate::types::{EdgeId, NodeId};
use chrono::Utc;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Edge counts per status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EdgeStats {
    pub planned: usize,
    pub approved: usize,
    pub rejected: usize,
    pub applying: usize,
    pub applied: usize,
    pub failed: usize,
    pub total: usize,
}

impl EdgeStats {
    pub fn count(&self, status: EdgeStatus) -> usize {
        match status {
            EdgeStatus::Planned => self.planned,
            EdgeStatus::Approved => self.approved,
            EdgeStatus::Rejected => self.rejected,
            EdgeStatus::Applying => self.applying,
            EdgeStatus::Applied => self.applied,
            EdgeStatus::Failed => self.failed,
        }
    }
}

/// Result of an upsert: the edge id and the edge as it was before, if any.
#[derive(Debug, Clone)]
pub struct EdgeUpsert {
    pub edge_id: EdgeId,
    pub previous: Option<Edge>,
}

impl EdgeUpsert {
    pub fn created(&self) -> bool {
        self.previous.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct LinkGraph {
    edges: HashMap<EdgeId, Edge>,
    by_key: HashMap<(NodeId, NodeId), EdgeId>,
    order: Vec<EdgeId>,
}

impl LinkGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted edges, dropping nothing: every edge must be valid.
    pub fn from_edges(edges: Vec<Edge>, tree: &NodeTree) -> Result<Self, SitemapError> {
        let mut graph = Self::new();
        for edge in edges {
            Self::check_endpoints(tree, &edge.source_node_id, &edge.target_node_id)?;
            if graph.by_key.contains_key(&edge.key()) || graph.edges.contains_key(&edge.id) {
                return Err(SitemapError::Validation(format!(
                    "Duplicate edge {} ({} -> {})",
                    edge.id, edge.source_node_id, edge.target_node_id
                )));
            }
            graph.insert(edge);
        }
        Ok(graph)
    }

    fn check_endpoints(tree: &NodeTree, source: &NodeId, target: &NodeId) -> Result<(), SitemapError> {
        if source == target {
            return Err(SitemapError::SelfLink(source.clone()));
        }
        tree.node(source)?;
        tree.node(target)?;
        Ok(())
    }

    fn insert(&mut self, edge: Edge) {
        self.by_key.insert(edge.key(), edge.id.clone());
        self.order.push(edge.id.clone());
        self.edges.insert(edge.id.clone(), edge);
    }

    fn edge_mut(&mut self, id: &EdgeId) -> Result<&mut Edge, SitemapError> {
        self.edges
            .get_mut(id)
            .ok_or_else(|| SitemapError::EdgeNotFound(id.clone()))
    }

    /// Upsert the `(source, target)` edge.
    ///
    /// An existing edge keeps its id and status; a supplied anchor replaces the
    /// old one; a manual upsert promotes an AI edge to manual.
    pub fn add_edge(
        &mut self,
        tree: &NodeTree,
        source: &NodeId,
        target: &NodeId,
        anchor_text: Option<String>,
        origin: EdgeOrigin,
    ) -> Result<EdgeUpsert, SitemapError> {
        Self::check_endpoints(tree, source, target)?;

        if let Some(existing_id) = self.by_key.get(&(source.clone(), target.clone())).cloned() {
            let edge = self.edge_mut(&existing_id)?;
            let previous = edge.clone();
            if anchor_text.is_some() {
                edge.anchor_text = anchor_text;
            }
            if origin == EdgeOrigin::Manual {
                edge.origin = EdgeOrigin::Manual;
            }
            edge.updated_at = Utc::now();
            debug!(edge_id = %existing_id, "Upserted existing edge");
            return Ok(EdgeUpsert {
                edge_id: existing_id,
                previous: Some(previous),
            });
        }

        let edge = Edge::new(source.clone(), target.clone(), anchor_text, origin);
        let edge_id = edge.id.clone();
        self.insert(edge);
        debug!(edge_id = %edge_id, source = %source, target = %target, "Added edge");
        Ok(EdgeUpsert {
            edge_id,
            previous: None,
        })
    }

    pub fn get(&self, id: &EdgeId) -> Option<&Edge> {
        self.edges.get(id)
    }

    pub fn edge(&self, id: &EdgeId) -> Result<&Edge, SitemapError> {
        self.edges
            .get(id)
            .ok_or_else(|| SitemapError::EdgeNotFound(id.clone()))
    }

    pub fn between(&self, source: &NodeId, target: &NodeId) -> Option<&Edge> {
        self.by_key
            .get(&(source.clone(), target.clone()))
            .and_then(|id| self.edges.get(id))
    }

    /// All edges in creation order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.order.iter().filter_map(|id| self.edges.get(id))
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn outgoing(&self, node: &NodeId) -> Vec<&Edge> {
        self.edges().filter(|e| &e.source_node_id == node).collect()
    }

    pub fn incoming(&self, node: &NodeId) -> Vec<&Edge> {
        self.edges().filter(|e| &e.target_node_id == node).collect()
    }

    pub fn stats(&self) -> EdgeStats {
        let mut stats = EdgeStats::default();
        for edge in self.edges.values() {
            match edge.status {
                EdgeStatus::Planned => stats.planned += 1,
                EdgeStatus::Approved => stats.approved += 1,
                EdgeStatus::Rejected => stats.rejected += 1,
                EdgeStatus::Applying => stats.applying += 1,
                EdgeStatus::Applied => stats.applied += 1,
                EdgeStatus::Failed => stats.failed += 1,
            }
            stats.total += 1;
        }
        stats
    }

    /// `planned | rejected → approved`. Returns the previous status.
    pub fn approve(&mut self, id: &EdgeId) -> Result<EdgeStatus, SitemapError> {
        self.edge_mut(id)?.transition(EdgeStatus::Approved)
    }

    /// `planned | approved → rejected`. Returns the previous status.
    pub fn reject(&mut self, id: &EdgeId) -> Result<EdgeStatus, SitemapError> {
        self.edge_mut(id)?.transition(EdgeStatus::Rejected)
    }

    /// Hard-delete an edge in any status.
    pub fn remove(&mut self, id: &EdgeId) -> Result<Edge, SitemapError> {
        let edge = self
            .edges
            .remove(id)
            .ok_or_else(|| SitemapError::EdgeNotFound(id.clone()))?;
        self.by_key.remove(&edge.key());
        self.order.retain(|e| e != id);
        debug!(edge_id = %id, "Removed edge");
        Ok(edge)
    }

    fn ids_where(&self, pred: impl Fn(&Edge) -> bool) -> Vec<EdgeId> {
        self.edges().filter(|e| pred(e)).map(|e| e.id.clone()).collect()
    }

    /// Approve every planned edge. Returns `(id, previous status)` per edge changed.
    pub fn approve_all(&mut self) -> Vec<(EdgeId, EdgeStatus)> {
        self.ids_where(|e| e.status == EdgeStatus::Planned)
            .into_iter()
            .filter_map(|id| self.approve(&id).ok().map(|before| (id, before)))
            .collect()
    }

    /// Reject every planned or approved edge.
    pub fn reject_all(&mut self) -> Vec<(EdgeId, EdgeStatus)> {
        self.ids_where(|e| matches!(e.status, EdgeStatus::Planned | EdgeStatus::Approved))
            .into_iter()
            .filter_map(|id| self.reject(&id).ok().map(|before| (id, before)))
            .collect()
    }

    /// Remove every AI-originated edge.
    pub fn clear_ai_suggestions(&mut self) -> Vec<Edge> {
        self.ids_where(|e| e.origin == EdgeOrigin::Ai)
            .into_iter()
            .filter_map(|id| self.remove(&id).ok())
            .collect()
    }

    /// Remove every edge with an endpoint in `nodes`.
    pub fn remove_touching(&mut self, nodes: &HashSet<NodeId>) -> Vec<Edge> {
        self.ids_where(|e| nodes.contains(&e.source_node_id) || nodes.contains(&e.target_node_id))
            .into_iter()
            .filter_map(|id| self.remove(&id).ok())
            .collect()
    }

    /// Put back an edge exactly as captured, replacing any edge with the same key.
    pub(crate) fn restore(&mut self, edge: Edge) {
        if let Some(existing) = self.by_key.get(&edge.key()).cloned() {
            let _ = self.remove(&existing);
        }
        if self.edges.contains_key(&edge.id) {
            let _ = self.remove(&edge.id);
        }
        self.insert(edge);
    }

    /// Set a status without workflow checks, provided the edge is still in
    /// `expected`. Used to invert recorded transitions.
    pub(crate) fn force_status(
        &mut self,
        id: &EdgeId,
        expected: EdgeStatus,
        to: EdgeStatus,
    ) -> Result<(), SitemapError> {
        let edge = self.edge_mut(id)?;
        if edge.status != expected {
            return Err(SitemapError::IllegalState(format!(
                "Edge {} is {} (expected {})",
                id,
                edge.status.as_str(),
                expected.as_str()
            )));
        }
        edge.status = to;
        edge.updated_at = Utc::now();
        Ok(())
    }

    /// `approved → applying` for each approved id. Returns the edges that were
    /// started and `(id, reason)` for every id that was skipped.
    pub(crate) fn begin_apply(&mut self, ids: &[EdgeId]) -> (Vec<Edge>, Vec<(EdgeId, String)>) {
        let mut started = Vec::new();
        let mut skipped = Vec::new();
        let mut seen = HashSet::new();
        for id in ids {
            if !seen.insert(id.clone()) {
                continue;
            }
            match self.edges.get_mut(id) {
                None => skipped.push((id.clone(), "edge not found".to_string())),
                Some(edge) if edge.status != EdgeStatus::Approved => {
                    skipped.push((id.clone(), format!("edge is {}", edge.status.as_str())))
                }
                Some(edge) => {
                    if edge.transition(EdgeStatus::Applying).is_ok() {
                        started.push(edge.clone());
                    }
                }
            }
        }
        (started, skipped)
    }

    /// Settle an applying edge. Edges removed meanwhile are ignored.
    pub(crate) fn finish_apply(&mut self, id: &EdgeId, success: bool) -> bool {
        let Some(edge) = self.edges.get_mut(id) else {
            return false;
        };
        let to = if success {
            EdgeStatus::Applied
        } else {
            EdgeStatus::Failed
        };
        edge.transition(to).is_ok()
    }
}
