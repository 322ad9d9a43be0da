//! Pending edit buffer for a node's edit dialog.
//!
//! Field edits are staged here while the dialog is open and committed as a
//! single update when the session ends.

use crate::tree::NodePatch;
use crate::types::NodeId;

#[derive(Debug, Clone, PartialEq)]
pub struct PendingEdit {
    node_id: NodeId,
    patch: NodePatch,
}

impl PendingEdit {
    pub fn new(node_id: NodeId) -> Self {
        Self {
            node_id,
            patch: NodePatch::default(),
        }
    }

    pub fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    pub fn stage(&mut self, patch: NodePatch) {
        self.patch.merge(patch);
    }

    pub fn patch(&self) -> &NodePatch {
        &self.patch
    }

    pub fn is_empty(&self) -> bool {
        self.patch.is_empty()
    }

    pub fn into_parts(self) -> (NodeId, NodePatch) {
        (self.node_id, self.patch)
    }
}
