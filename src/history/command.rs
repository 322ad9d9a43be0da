//! Reversible commands over a sitemap document.
//!
//! Every variant carries both sides of the change, so a command can be
//! re-applied (redo) or inverted (undo) without consulting anything else.

use crate::document::{DeletedSubtree, SitemapDocument};
use crate::error::SitemapError;
use crate::links::{Edge, EdgeStatus};
use crate::tree::{DetachedNode, Node, NodeContent, Placement, Position};
use crate::types::{EdgeId, NodeId, SitemapId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionChange {
    pub id: NodeId,
    pub before: Position,
    pub after: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CommandKind {
    CreateNode {
        node: Node,
        index: usize,
    },
    UpdateNode {
        id: NodeId,
        before: NodeContent,
        after: NodeContent,
    },
    MoveNode {
        id: NodeId,
        before: Placement,
        after: Placement,
    },
    DeleteNode {
        deleted: DeletedSubtree,
    },
    Reposition {
        changes: Vec<PositionChange>,
    },
    SetKeywords {
        id: NodeId,
        before: BTreeSet<String>,
        after: BTreeSet<String>,
    },
    UpsertEdge {
        before: Option<Edge>,
        after: Edge,
    },
    SetEdgeStatus {
        id: EdgeId,
        before: EdgeStatus,
        after: EdgeStatus,
    },
    RemoveEdge {
        edge: Edge,
    },
    /// Ordered composite; inverted back to front.
    Batch {
        commands: Vec<CommandKind>,
    },
}

impl CommandKind {
    pub fn name(&self) -> &'static str {
        match self {
            CommandKind::CreateNode { .. } => "create_node",
            CommandKind::UpdateNode { .. } => "update_node",
            CommandKind::MoveNode { .. } => "move_node",
            CommandKind::DeleteNode { .. } => "delete_node",
            CommandKind::Reposition { .. } => "reposition",
            CommandKind::SetKeywords { .. } => "set_keywords",
            CommandKind::UpsertEdge { .. } => "upsert_edge",
            CommandKind::SetEdgeStatus { .. } => "set_edge_status",
            CommandKind::RemoveEdge { .. } => "remove_edge",
            CommandKind::Batch { .. } => "batch",
        }
    }

    /// Apply the change (`Forward`) or its inverse (`Backward`).
    ///
    /// Fails without partial effect when the document no longer matches the
    /// state the command was recorded against.
    pub fn apply(&self, doc: &mut SitemapDocument, direction: Direction) -> Result<(), SitemapError> {
        use Direction::*;
        match (self, direction) {
            (CommandKind::CreateNode { node, index }, Forward) => doc.tree.restore_detached(&[DetachedNode {
                node: node.clone(),
                index: *index,
            }]),
            (CommandKind::CreateNode { node, .. }, Backward) => {
                if doc.links.edges().any(|e| e.touches(&node.id)) {
                    return Err(SitemapError::IllegalState(format!(
                        "Node {} is referenced by links and cannot be un-created",
                        node.id
                    )));
                }
                doc.tree.remove_leaf(&node.id).map(|_| ())
            }
            (CommandKind::UpdateNode { id, after, .. }, Forward) => doc.tree.restore_content(id, after),
            (CommandKind::UpdateNode { id, before, .. }, Backward) => doc.tree.restore_content(id, before),
            (CommandKind::MoveNode { id, after, .. }, Forward) => doc
                .tree
                .move_node(id, after.parent_id.as_ref(), after.index)
                .map(|_| ()),
            (CommandKind::MoveNode { id, before, .. }, Backward) => doc
                .tree
                .move_node(id, before.parent_id.as_ref(), before.index)
                .map(|_| ()),
            (CommandKind::DeleteNode { deleted }, Forward) => {
                let top = deleted.nodes.first().ok_or_else(|| {
                    SitemapError::IllegalState("Empty delete command".to_string())
                })?;
                doc.delete_node(&top.node.id).map(|_| ())
            }
            (CommandKind::DeleteNode { deleted }, Backward) => doc.restore_subtree(deleted),
            (CommandKind::Reposition { changes }, direction) => {
                for change in changes {
                    doc.tree.node(&change.id)?;
                }
                for change in changes {
                    let to = if direction == Forward {
                        change.after
                    } else {
                        change.before
                    };
                    doc.tree.update_position(&change.id, to)?;
                }
                Ok(())
            }
            (CommandKind::SetKeywords { id, after, .. }, Forward) => doc.tree.restore_keywords(id, after),
            (CommandKind::SetKeywords { id, before, .. }, Backward) => doc.tree.restore_keywords(id, before),
            (CommandKind::UpsertEdge { after, .. }, Forward) => {
                doc.tree.node(&after.source_node_id)?;
                doc.tree.node(&after.target_node_id)?;
                doc.links.restore(after.clone());
                Ok(())
            }
            (CommandKind::UpsertEdge { before, after }, Backward) => {
                match before {
                    Some(before) => doc.links.restore(before.clone()),
                    None => {
                        doc.links.remove(&after.id)?;
                    }
                }
                Ok(())
            }
            (CommandKind::SetEdgeStatus { id, before, after }, Forward) => {
                doc.links.force_status(id, *before, *after)
            }
            (CommandKind::SetEdgeStatus { id, before, after }, Backward) => {
                doc.links.force_status(id, *after, *before)
            }
            (CommandKind::RemoveEdge { edge }, Forward) => doc.links.remove(&edge.id).map(|_| ()),
            (CommandKind::RemoveEdge { edge }, Backward) => {
                doc.tree.node(&edge.source_node_id)?;
                doc.tree.node(&edge.target_node_id)?;
                doc.links.restore(edge.clone());
                Ok(())
            }
            (CommandKind::Batch { commands }, direction) => {
                // scratch copy keeps a half-applied batch from leaking
                let mut scratch = doc.clone();
                if direction == Forward {
                    for command in commands {
                        command.apply(&mut scratch, Forward)?;
                    }
                } else {
                    for command in commands.iter().rev() {
                        command.apply(&mut scratch, Backward)?;
                    }
                }
                *doc = scratch;
                Ok(())
            }
        }
    }
}

/// A recorded, reversible unit of change scoped to one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub sitemap_id: SitemapId,
    pub label: String,
    pub kind: CommandKind,
    pub recorded_at: DateTime<Utc>,
}

impl Command {
    pub fn new(sitemap_id: SitemapId, label: impl Into<String>, kind: CommandKind) -> Self {
        Self {
            sitemap_id,
            label: label.into(),
            kind,
            recorded_at: Utc::now(),
        }
    }
}
