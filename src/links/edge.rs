//! Internal-link edge and its approval workflow.

use crate::error::SitemapError;
use crate::types::{EdgeId, NodeId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeOrigin {
    Ai,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeStatus {
    Planned,
    Approved,
    Rejected,
    Applying,
    Applied,
    Failed,
}

impl EdgeStatus {
    pub const ALL: [EdgeStatus; 6] = [
        EdgeStatus::Planned,
        EdgeStatus::Approved,
        EdgeStatus::Rejected,
        EdgeStatus::Applying,
        EdgeStatus::Applied,
        EdgeStatus::Failed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EdgeStatus::Planned => "planned",
            EdgeStatus::Approved => "approved",
            EdgeStatus::Rejected => "rejected",
            EdgeStatus::Applying => "applying",
            EdgeStatus::Applied => "applied",
            EdgeStatus::Failed => "failed",
        }
    }

    /// Whether the workflow allows moving from `self` to `to`.
    ///
    /// planned → {approved, rejected}, approved ⇄ rejected,
    /// approved → applying → {applied, failed}. Undo bypasses this check.
    pub fn can_transition_to(self, to: EdgeStatus) -> bool {
        use EdgeStatus::*;
        matches!(
            (self, to),
            (Planned, Approved)
                | (Planned, Rejected)
                | (Rejected, Approved)
                | (Approved, Rejected)
                | (Approved, Applying)
                | (Applying, Applied)
                | (Applying, Failed)
        )
    }
}

/// Directed hint that `source` should link to `target`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub source_node_id: NodeId,
    pub target_node_id: NodeId,
    pub anchor_text: Option<String>,
    pub origin: EdgeOrigin,
    pub status: EdgeStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Edge {
    pub(crate) fn new(
        source: NodeId,
        target: NodeId,
        anchor_text: Option<String>,
        origin: EdgeOrigin,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: EdgeId::generate(),
            source_node_id: source,
            target_node_id: target,
            anchor_text,
            origin,
            status: EdgeStatus::Planned,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn key(&self) -> (NodeId, NodeId) {
        (self.source_node_id.clone(), self.target_node_id.clone())
    }

    pub fn touches(&self, node: &NodeId) -> bool {
        &self.source_node_id == node || &self.target_node_id == node
    }

    pub(crate) fn transition(&mut self, to: EdgeStatus) -> Result<EdgeStatus, SitemapError> {
        if !self.status.can_transition_to(to) {
            return Err(SitemapError::EdgeTransition {
                edge: self.id.clone(),
                from: self.status.as_str(),
                to: to.as_str(),
            });
        }
        let before = self.status;
        self.status = to;
        self.updated_at = Utc::now();
        Ok(before)
    }
}
