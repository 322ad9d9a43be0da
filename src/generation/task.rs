//! Generation task state as seen by pollers.

use crate::provider::GenerationParams;
use crate::tree::GenerationStatus;
use crate::types::{NodeId, SitemapId, TaskId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Queued,
    Running,
    Paused,
    Completed,
    Failed,
    Cancelled,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Queued => "queued",
            TaskStatus::Running => "running",
            TaskStatus::Paused => "paused",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
            TaskStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Cancelled
        )
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-node view, mirroring the node's `generation_status` for this task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeProgress {
    pub status: GenerationStatus,
    pub error: Option<String>,
}

impl NodeProgress {
    fn queued() -> Self {
        Self {
            status: GenerationStatus::Queued,
            error: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskCounts {
    pub queued: usize,
    pub generating: usize,
    pub generated: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationTask {
    pub id: TaskId,
    pub sitemap_id: SitemapId,
    /// Fixed at creation, in dispatch order.
    pub target_node_ids: Vec<NodeId>,
    pub status: TaskStatus,
    pub concurrency_limit: usize,
    pub params: GenerationParams,
    pub progress: HashMap<NodeId, NodeProgress>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl GenerationTask {
    pub(crate) fn new(
        sitemap_id: SitemapId,
        target_node_ids: Vec<NodeId>,
        concurrency_limit: usize,
        params: GenerationParams,
    ) -> Self {
        let progress = target_node_ids
            .iter()
            .map(|id| (id.clone(), NodeProgress::queued()))
            .collect();
        Self {
            id: TaskId::generate(),
            sitemap_id,
            target_node_ids,
            status: TaskStatus::Queued,
            concurrency_limit,
            params,
            progress,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
        }
    }

    pub fn total(&self) -> usize {
        self.target_node_ids.len()
    }

    pub fn node(&self, id: &NodeId) -> Option<&NodeProgress> {
        self.progress.get(id)
    }

    pub fn counts(&self) -> TaskCounts {
        let mut counts = TaskCounts::default();
        for progress in self.progress.values() {
            match progress.status {
                GenerationStatus::Queued => counts.queued += 1,
                GenerationStatus::Generating => counts.generating += 1,
                GenerationStatus::Generated => counts.generated += 1,
                GenerationStatus::Failed => counts.failed += 1,
                GenerationStatus::None => {}
            }
        }
        counts
    }

    /// Resolved share of the targets, rounded down.
    pub fn progress_percent(&self) -> u8 {
        let total = self.total();
        if total == 0 {
            return 100;
        }
        let resolved = self
            .progress
            .values()
            .filter(|p| p.status.is_resolved())
            .count();
        ((resolved * 100) / total) as u8
    }

    pub fn is_active(&self) -> bool {
        !self.status.is_terminal()
    }

    pub(crate) fn set_node(&mut self, id: &NodeId, status: GenerationStatus, error: Option<String>) {
        if let Some(progress) = self.progress.get_mut(id) {
            progress.status = status;
            progress.error = error;
        }
    }

    pub(crate) fn all_failed(&self) -> bool {
        self.progress
            .values()
            .all(|p| p.status == GenerationStatus::Failed)
    }
}
