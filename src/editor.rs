//! Sitemap Editor
//!
//! Entry point for user-initiated changes to one document. Every successful
//! mutation is applied to the shared document and recorded as one command in
//! the history; remote sync and generation bypass the history.

use crate::config::{EngineConfig, LinksConfig};
use crate::document::{DeletedSubtree, SharedDocument, SitemapDocument};
use crate::error::SitemapError;
use crate::history::{
    Command, CommandHistory, CommandKind, HistoryState, PendingEdit, PositionChange,
};
use crate::links::apply::{self, ApplyReport, ContentUpdater};
use crate::links::{Edge, EdgeOrigin, EdgeStats, EdgeStatus};
use crate::provider::{LinkSuggester, SuggestedLink};
use crate::store::SitemapStore;
use crate::sync::{self, WordPressSync};
use crate::tree::{Node, NodeDraft, NodePatch, Position, PublishStatus, TreeView};
use crate::types::{EdgeId, NodeId, SitemapId};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome of importing AI link suggestions.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    /// Edge ids created or refreshed, in suggestion order.
    pub imported: Vec<EdgeId>,
    pub skipped: Vec<(SuggestedLink, String)>,
}

pub struct SitemapEditor {
    document: SharedDocument,
    history: Arc<Mutex<CommandHistory>>,
    pending: Mutex<Option<PendingEdit>>,
    links: LinksConfig,
}

impl SitemapEditor {
    /// Editor sharing `history` with other open documents.
    pub fn new(document: SitemapDocument, history: Arc<Mutex<CommandHistory>>, links: LinksConfig) -> Self {
        Self {
            document: document.into_shared(),
            history,
            pending: Mutex::new(None),
            links,
        }
    }

    /// Editor with its own history, configured from `config`.
    pub fn open(document: SitemapDocument, config: &EngineConfig) -> Self {
        let history = Arc::new(Mutex::new(CommandHistory::new(&config.history)));
        Self::new(document, history, config.links.clone())
    }

    /// Load a stored document, validating its invariants.
    pub fn load(
        store: &dyn SitemapStore,
        id: &SitemapId,
        config: &EngineConfig,
    ) -> Result<Self, SitemapError> {
        let snapshot = store
            .load(id)?
            .ok_or_else(|| SitemapError::DocumentNotFound(id.clone()))?;
        let document = SitemapDocument::from_snapshot(snapshot)?;
        Ok(Self::open(document, config))
    }

    pub fn save(&self, store: &dyn SitemapStore) -> Result<(), SitemapError> {
        let snapshot = self.document.read().snapshot();
        store.save(&snapshot)?;
        debug!(sitemap_id = %snapshot.id, "Document saved");
        Ok(())
    }

    /// Shared handle, e.g. for the generation controller.
    pub fn document(&self) -> &SharedDocument {
        &self.document
    }

    pub fn sitemap_id(&self) -> SitemapId {
        self.document.read().id().clone()
    }

    /// Run a mutation and record the command it produces. Nothing is
    /// recorded when the mutation fails.
    fn perform<T>(
        &self,
        label: impl Into<String>,
        mutate: impl FnOnce(&mut SitemapDocument) -> Result<(T, Option<CommandKind>), SitemapError>,
    ) -> Result<T, SitemapError> {
        let mut doc = self.document.write();
        let (out, kind) = mutate(&mut doc)?;
        if let Some(kind) = kind {
            let command = Command::new(doc.id().clone(), label, kind);
            self.history.lock().record(command);
        }
        Ok(out)
    }

    // --- pages ---

    pub fn create_node(&self, parent: Option<&NodeId>, draft: NodeDraft) -> Result<NodeId, SitemapError> {
        let label = format!("Create '{}'", draft.title);
        self.perform(label, |doc| {
            let id = doc.tree.create_node(parent, draft)?;
            let node = doc.tree.node(&id)?.clone();
            let index = doc.tree.placement(&id)?.index;
            Ok((id, Some(CommandKind::CreateNode { node, index })))
        })
    }

    pub fn update_node(&self, id: &NodeId, patch: &NodePatch) -> Result<(), SitemapError> {
        if self.document.read().tree.node(id)?.is_root {
            return Err(SitemapError::RootImmutable("edited"));
        }
        if patch.is_empty() {
            return Ok(());
        }
        self.perform(format!("Edit {}", id), |doc| {
            let before = doc.tree.update_node(id, patch)?;
            let after = doc.tree.node(id)?.content();
            let kind = (before != after).then(|| CommandKind::UpdateNode {
                id: id.clone(),
                before,
                after,
            });
            Ok(((), kind))
        })
    }

    pub fn move_node(&self, id: &NodeId, new_parent: Option<&NodeId>, index: usize) -> Result<(), SitemapError> {
        self.perform(format!("Move {}", id), |doc| {
            let before = doc.tree.move_node(id, new_parent, index)?;
            let after = doc.tree.placement(id)?;
            let kind = (before != after).then(|| CommandKind::MoveNode {
                id: id.clone(),
                before,
                after,
            });
            Ok(((), kind))
        })
    }

    /// Delete a page subtree and its edges. Returns what was removed.
    pub fn delete_node(&self, id: &NodeId) -> Result<DeletedSubtree, SitemapError> {
        self.perform(format!("Delete {}", id), |doc| {
            let deleted = doc.delete_node(id)?;
            Ok((deleted.clone(), Some(CommandKind::DeleteNode { deleted })))
        })
    }

    /// Apply a layout result as one undoable step. All ids are checked first.
    pub fn update_positions(&self, positions: &[(NodeId, Position)]) -> Result<(), SitemapError> {
        if positions.is_empty() {
            return Ok(());
        }
        self.perform("Rearrange", |doc| {
            for (id, _) in positions {
                doc.tree.node(id)?;
            }
            let mut changes = Vec::with_capacity(positions.len());
            for (id, position) in positions {
                let before = doc.tree.update_position(id, *position)?;
                changes.push(PositionChange {
                    id: id.clone(),
                    before,
                    after: *position,
                });
            }
            Ok(((), Some(CommandKind::Reposition { changes })))
        })
    }

    pub fn update_position(&self, id: &NodeId, position: Position) -> Result<(), SitemapError> {
        self.update_positions(&[(id.clone(), position)])
    }

    pub fn set_keywords<I, S>(&self, id: &NodeId, keywords: I) -> Result<(), SitemapError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.perform(format!("Keywords of {}", id), |doc| {
            let before = doc.tree.set_keywords(id, keywords)?;
            Ok(((), keyword_change(doc, id, before)?))
        })
    }

    pub fn add_keyword(&self, id: &NodeId, keyword: &str) -> Result<(), SitemapError> {
        self.perform(format!("Add keyword '{}'", keyword), |doc| {
            let before = doc.tree.add_keyword(id, keyword)?;
            Ok(((), keyword_change(doc, id, before)?))
        })
    }

    pub fn remove_keyword(&self, id: &NodeId, keyword: &str) -> Result<(), SitemapError> {
        self.perform(format!("Remove keyword '{}'", keyword), |doc| {
            let before = doc.tree.remove_keyword(id, keyword)?;
            Ok(((), keyword_change(doc, id, before)?))
        })
    }

    // --- edit dialog ---

    /// Open an edit session for `id`, replacing any uncommitted one.
    pub fn begin_edit(&self, id: &NodeId) -> Result<(), SitemapError> {
        self.document.read().tree.node(id)?;
        let mut pending = self.pending.lock();
        if let Some(previous) = pending.as_ref().filter(|p| !p.is_empty()) {
            warn!(node_id = %previous.node_id(), "Discarding uncommitted edit");
        }
        *pending = Some(PendingEdit::new(id.clone()));
        Ok(())
    }

    pub fn stage_edit(&self, patch: NodePatch) -> Result<(), SitemapError> {
        let mut pending = self.pending.lock();
        let edit = pending
            .as_mut()
            .ok_or_else(|| SitemapError::IllegalState("No edit session is open".to_string()))?;
        edit.stage(patch);
        Ok(())
    }

    pub fn pending_edit(&self) -> Option<PendingEdit> {
        self.pending.lock().clone()
    }

    /// Close the session, applying the merged patch as a single command.
    /// On failure the session stays open so the caller can fix and retry.
    pub fn commit_edit(&self) -> Result<(), SitemapError> {
        let mut pending = self.pending.lock();
        let Some(edit) = pending.as_ref() else {
            return Ok(());
        };
        if !edit.is_empty() {
            self.update_node(edit.node_id(), edit.patch())?;
        }
        *pending = None;
        Ok(())
    }

    pub fn discard_edit(&self) {
        self.pending.lock().take();
    }

    // --- links ---

    pub fn add_edge(
        &self,
        source: &NodeId,
        target: &NodeId,
        anchor_text: Option<String>,
        origin: EdgeOrigin,
    ) -> Result<EdgeId, SitemapError> {
        self.perform(format!("Link {} -> {}", source, target), |doc| {
            let (edge_id, kind) = upsert(doc, source, target, anchor_text, origin)?;
            Ok((edge_id, kind))
        })
    }

    pub fn approve(&self, id: &EdgeId) -> Result<(), SitemapError> {
        self.perform(format!("Approve {}", id), |doc| {
            let before = doc.links.approve(id)?;
            Ok(((), Some(status_change(id, before, EdgeStatus::Approved))))
        })
    }

    pub fn reject(&self, id: &EdgeId) -> Result<(), SitemapError> {
        self.perform(format!("Reject {}", id), |doc| {
            let before = doc.links.reject(id)?;
            Ok(((), Some(status_change(id, before, EdgeStatus::Rejected))))
        })
    }

    pub fn remove_edge(&self, id: &EdgeId) -> Result<(), SitemapError> {
        self.perform(format!("Remove link {}", id), |doc| {
            let edge = doc.links.remove(id)?;
            Ok(((), Some(CommandKind::RemoveEdge { edge })))
        })
    }

    /// Returns how many edges changed.
    pub fn approve_all(&self) -> usize {
        self.bulk_status("Approve all links", EdgeStatus::Approved, |doc| doc.links.approve_all())
    }

    pub fn reject_all(&self) -> usize {
        self.bulk_status("Reject all links", EdgeStatus::Rejected, |doc| doc.links.reject_all())
    }

    fn bulk_status(
        &self,
        label: &str,
        to: EdgeStatus,
        change: impl FnOnce(&mut SitemapDocument) -> Vec<(EdgeId, EdgeStatus)>,
    ) -> usize {
        let result = self.perform(label, |doc| {
            let changed = change(doc);
            let count = changed.len();
            let kind = (!changed.is_empty()).then(|| CommandKind::Batch {
                commands: changed
                    .into_iter()
                    .map(|(id, before)| status_change(&id, before, to))
                    .collect(),
            });
            Ok((count, kind))
        });
        result.unwrap_or_default()
    }

    /// Remove every AI-suggested edge. Returns how many were removed.
    pub fn clear_ai_suggestions(&self) -> usize {
        let result = self.perform("Clear AI suggestions", |doc| {
            let removed = doc.links.clear_ai_suggestions();
            let count = removed.len();
            let kind = (!removed.is_empty()).then(|| CommandKind::Batch {
                commands: removed
                    .into_iter()
                    .map(|edge| CommandKind::RemoveEdge { edge })
                    .collect(),
            });
            Ok((count, kind))
        });
        result.unwrap_or_default()
    }

    /// Ask the suggester for links between `node_ids` and import them as
    /// planned AI edges, recorded as one command.
    pub async fn import_suggestions(
        &self,
        suggester: &dyn LinkSuggester,
        node_ids: &[NodeId],
    ) -> Result<ImportReport, SitemapError> {
        let plan_id = self.sitemap_id();
        let suggestions = suggester.suggest_links(&plan_id, node_ids).await?;
        Ok(self.import_links(suggestions))
    }

    pub fn import_links(&self, suggestions: Vec<SuggestedLink>) -> ImportReport {
        let result = self.perform("Import link suggestions", |doc| {
            let mut report = ImportReport::default();
            let mut commands = Vec::new();
            for suggestion in suggestions {
                match upsert(
                    doc,
                    &suggestion.source_node_id,
                    &suggestion.target_node_id,
                    suggestion.anchor_text.clone(),
                    EdgeOrigin::Ai,
                ) {
                    Ok((edge_id, kind)) => {
                        report.imported.push(edge_id);
                        commands.extend(kind);
                    }
                    Err(err) => {
                        debug!(error = %err, "Skipped link suggestion");
                        report.skipped.push((suggestion, err.to_string()));
                    }
                }
            }
            let kind = (!commands.is_empty()).then_some(CommandKind::Batch { commands });
            Ok((report, kind))
        });
        let report = result.unwrap_or_default();
        info!(
            imported = report.imported.len(),
            skipped = report.skipped.len(),
            "Imported link suggestions"
        );
        report
    }

    /// Write approved edges into page content. Not recorded in the history.
    pub async fn apply_links(&self, updater: &dyn ContentUpdater, ids: &[EdgeId]) -> ApplyReport {
        apply::apply_batch(&self.document, updater, ids, self.links.apply_concurrency).await
    }

    /// Apply every currently approved edge.
    pub async fn apply_approved(&self, updater: &dyn ContentUpdater) -> ApplyReport {
        let ids: Vec<EdgeId> = self
            .document
            .read()
            .links
            .edges()
            .filter(|e| e.status == EdgeStatus::Approved)
            .map(|e| e.id.clone())
            .collect();
        self.apply_links(updater, &ids).await
    }

    // --- history ---

    /// Returns the label of the undone command, `None` at the bottom.
    pub fn undo(&self) -> Result<Option<String>, SitemapError> {
        let mut doc = self.document.write();
        self.history.lock().undo(&mut doc)
    }

    pub fn redo(&self) -> Result<Option<String>, SitemapError> {
        let mut doc = self.document.write();
        self.history.lock().redo(&mut doc)
    }

    pub fn history_state(&self) -> HistoryState {
        let id = self.sitemap_id();
        self.history.lock().state(&id)
    }

    pub fn undo_labels(&self) -> Vec<String> {
        let id = self.sitemap_id();
        self.history.lock().undo_labels(&id)
    }

    pub fn redo_labels(&self) -> Vec<String> {
        let id = self.sitemap_id();
        self.history.lock().redo_labels(&id)
    }

    pub fn clear_history(&self) {
        let id = self.sitemap_id();
        self.history.lock().clear(&id);
    }

    // --- remote sync ---

    /// Pull remote fields for `node_ids`. Returns the ids updated locally.
    pub async fn sync_from_wp(
        &self,
        remote: &dyn WordPressSync,
        node_ids: &[NodeId],
    ) -> Result<Vec<NodeId>, SitemapError> {
        let sitemap_id = self.sitemap_id();
        let pages = remote.sync_from_wp(&sitemap_id, node_ids).await?;
        Ok(sync::apply_remote_pages(&self.document, pages))
    }

    /// Push local pages. Acknowledged pages are no longer modified locally.
    pub async fn push_to_wp(
        &self,
        remote: &dyn WordPressSync,
        node_ids: &[NodeId],
    ) -> Result<Vec<NodeId>, SitemapError> {
        let sitemap_id = self.sitemap_id();
        let pages = self.nodes(node_ids)?;
        let acked = remote.update_to_wp(&sitemap_id, &pages).await?;
        sync::mark_pushed(&self.document, &acked);
        Ok(acked)
    }

    pub async fn publish(&self, remote: &dyn WordPressSync, id: &NodeId) -> Result<PublishStatus, SitemapError> {
        self.change_publication(remote, id, true).await
    }

    pub async fn unpublish(&self, remote: &dyn WordPressSync, id: &NodeId) -> Result<PublishStatus, SitemapError> {
        self.change_publication(remote, id, false).await
    }

    async fn change_publication(
        &self,
        remote: &dyn WordPressSync,
        id: &NodeId,
        publish: bool,
    ) -> Result<PublishStatus, SitemapError> {
        let page = self.get_node(id)?;
        if page.is_root {
            return Err(SitemapError::RootImmutable("published"));
        }
        sync::set_publish_status(&self.document, id, PublishStatus::Publishing);
        let outcome = if publish {
            remote.publish(&page).await
        } else {
            remote.unpublish(&page).await
        };
        match outcome {
            Ok(status) => {
                sync::set_publish_status(&self.document, id, status);
                Ok(status)
            }
            Err(err) => {
                warn!(node_id = %id, error = %err, "Publication change failed");
                sync::set_publish_status(&self.document, id, PublishStatus::Failed);
                Err(err)
            }
        }
    }

    /// Delete the remote pages and drop their linkage locally.
    pub async fn delete_from_wp(&self, remote: &dyn WordPressSync, node_ids: &[NodeId]) -> Result<(), SitemapError> {
        let pages = self.nodes(node_ids)?;
        remote.delete_from_wp(&pages).await?;
        sync::clear_remote(&self.document, node_ids);
        Ok(())
    }

    // --- queries ---

    pub fn get_node(&self, id: &NodeId) -> Result<Node, SitemapError> {
        Ok(self.document.read().tree.node(id)?.clone())
    }

    fn nodes(&self, ids: &[NodeId]) -> Result<Vec<Node>, SitemapError> {
        let doc = self.document.read();
        ids.iter().map(|id| Ok(doc.tree.node(id)?.clone())).collect()
    }

    pub fn get_tree(&self) -> TreeView {
        self.document.read().tree.view()
    }

    pub fn get_edge(&self, id: &EdgeId) -> Result<Edge, SitemapError> {
        Ok(self.document.read().links.edge(id)?.clone())
    }

    pub fn edges(&self) -> Vec<Edge> {
        self.document.read().links.edges().cloned().collect()
    }

    pub fn outgoing(&self, id: &NodeId) -> Vec<Edge> {
        self.document.read().links.outgoing(id).into_iter().cloned().collect()
    }

    pub fn incoming(&self, id: &NodeId) -> Vec<Edge> {
        self.document.read().links.incoming(id).into_iter().cloned().collect()
    }

    pub fn link_stats(&self) -> EdgeStats {
        self.document.read().links.stats()
    }
}

fn keyword_change(
    doc: &SitemapDocument,
    id: &NodeId,
    before: std::collections::BTreeSet<String>,
) -> Result<Option<CommandKind>, SitemapError> {
    let after = doc.tree.node(id)?.keywords.clone();
    Ok((before != after).then(|| CommandKind::SetKeywords {
        id: id.clone(),
        before,
        after,
    }))
}

fn status_change(id: &EdgeId, before: EdgeStatus, after: EdgeStatus) -> CommandKind {
    CommandKind::SetEdgeStatus {
        id: id.clone(),
        before,
        after,
    }
}

fn upsert(
    doc: &mut SitemapDocument,
    source: &NodeId,
    target: &NodeId,
    anchor_text: Option<String>,
    origin: EdgeOrigin,
) -> Result<(EdgeId, Option<CommandKind>), SitemapError> {
    let upsert = doc.links.add_edge(&doc.tree, source, target, anchor_text, origin)?;
    let after = doc.links.edge(&upsert.edge_id)?.clone();
    let changed = upsert
        .previous
        .as_ref()
        .map_or(true, |before| !same_edge(before, &after));
    let kind = changed.then(|| CommandKind::UpsertEdge {
        before: upsert.previous,
        after,
    });
    Ok((upsert.edge_id, kind))
}

/// Equal apart from `updated_at`.
fn same_edge(a: &Edge, b: &Edge) -> bool {
    a.anchor_text == b.anchor_text && a.origin == b.origin && a.status == b.status
}
