//! Per-document task registry: at most one active task per sitemap.

use super::dispatch::TaskHandle;
use crate::error::SitemapError;
use crate::types::{SitemapId, TaskId};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Default)]
pub(crate) struct TaskRegistry {
    active: HashMap<SitemapId, TaskId>,
    tasks: HashMap<TaskId, Arc<TaskHandle>>,
    /// Insertion order, for stable listings.
    order: Vec<TaskId>,
}

impl TaskRegistry {
    pub(crate) fn ensure_idle(&self, sitemap_id: &SitemapId) -> Result<(), SitemapError> {
        match self.active.get(sitemap_id) {
            Some(task) => Err(SitemapError::TaskAlreadyActive {
                sitemap: sitemap_id.clone(),
                task: task.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Claim the document's slot. Callers check `ensure_idle` under the same
    /// lock first.
    pub(crate) fn insert(&mut self, sitemap_id: SitemapId, handle: Arc<TaskHandle>) {
        let task_id = handle.id().clone();
        self.active.insert(sitemap_id, task_id.clone());
        self.order.push(task_id.clone());
        self.tasks.insert(task_id, handle);
    }

    /// Free the slot if `task_id` still holds it.
    pub(crate) fn release(&mut self, sitemap_id: &SitemapId, task_id: &TaskId) {
        if self.active.get(sitemap_id) == Some(task_id) {
            self.active.remove(sitemap_id);
        }
    }

    pub(crate) fn get(&self, task_id: &TaskId) -> Option<Arc<TaskHandle>> {
        self.tasks.get(task_id).cloned()
    }

    pub(crate) fn active(&self) -> Vec<Arc<TaskHandle>> {
        self.order
            .iter()
            .filter(|id| self.active.values().any(|active| active == *id))
            .filter_map(|id| self.tasks.get(id).cloned())
            .collect()
    }

    pub(crate) fn for_sitemap(&self, sitemap_id: &SitemapId) -> Vec<Arc<TaskHandle>> {
        self.order
            .iter()
            .filter_map(|id| self.tasks.get(id))
            .filter(|handle| handle.sitemap_id() == sitemap_id)
            .cloned()
            .collect()
    }

    /// Drop terminal tasks of a document. Returns how many were removed.
    pub(crate) fn prune(&mut self, sitemap_id: &SitemapId) -> usize {
        let finished: Vec<TaskId> = self
            .tasks
            .iter()
            .filter(|(id, handle)| {
                handle.sitemap_id() == sitemap_id && self.active.get(sitemap_id) != Some(*id)
            })
            .map(|(id, _)| id.clone())
            .collect();
        for id in &finished {
            self.tasks.remove(id);
        }
        self.order.retain(|id| !finished.contains(id));
        finished.len()
    }
}
