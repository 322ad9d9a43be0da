//! Dispatch loop for one generation task.
//!
//! Lock order is document, then task state. The document lock is never held
//! across a collaborator call.

use super::registry::TaskRegistry;
use super::task::{GenerationTask, TaskStatus};
use crate::document::SharedDocument;
use crate::error::SitemapError;
use crate::provider::{ContentGenerator, GeneratedContent, GenerationRequest, PageSnapshot};
use crate::tree::GenerationStatus;
use crate::types::{NodeId, SitemapId, TaskId};
use chrono::Utc;
use futures::stream::{FuturesUnordered, StreamExt};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Notify};
use tracing::{debug, info, warn};

const NODE_DELETED: &str = "node deleted";
const CANCELLED: &str = "cancelled";

struct TaskState {
    task: GenerationTask,
    /// Targets not yet dispatched, in input order.
    pending: VecDeque<NodeId>,
    /// `generation_status` of each target before the task queued it.
    prior: HashMap<NodeId, GenerationStatus>,
    in_flight: usize,
}

/// Shared handle to a task: the poller side and the dispatch loop both hold one.
pub(crate) struct TaskHandle {
    id: TaskId,
    sitemap_id: SitemapId,
    document: SharedDocument,
    state: Mutex<TaskState>,
    wake: Notify,
    status_tx: watch::Sender<TaskStatus>,
}

impl TaskHandle {
    pub(crate) fn new(
        document: SharedDocument,
        task: GenerationTask,
        prior: HashMap<NodeId, GenerationStatus>,
    ) -> Self {
        let (status_tx, _) = watch::channel(task.status);
        Self {
            id: task.id.clone(),
            sitemap_id: task.sitemap_id.clone(),
            document,
            state: Mutex::new(TaskState {
                pending: task.target_node_ids.iter().cloned().collect(),
                task,
                prior,
                in_flight: 0,
            }),
            wake: Notify::new(),
            status_tx,
        }
    }

    pub(crate) fn id(&self) -> &TaskId {
        &self.id
    }

    pub(crate) fn sitemap_id(&self) -> &SitemapId {
        &self.sitemap_id
    }

    pub(crate) fn snapshot(&self) -> GenerationTask {
        self.state.lock().task.clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<TaskStatus> {
        self.status_tx.subscribe()
    }

    fn set_status(&self, state: &mut TaskState, status: TaskStatus) {
        state.task.status = status;
        self.status_tx.send_replace(status);
    }

    pub(crate) fn mark_running(&self) {
        let mut state = self.state.lock();
        state.task.started_at = Some(Utc::now());
        self.set_status(&mut state, TaskStatus::Running);
    }

    pub(crate) fn pause(&self) -> Result<(), SitemapError> {
        let mut state = self.state.lock();
        match state.task.status {
            TaskStatus::Running => {
                self.set_status(&mut state, TaskStatus::Paused);
                info!(task_id = %self.id, "Generation task paused");
                Ok(())
            }
            TaskStatus::Paused => Ok(()),
            other => Err(illegal(&self.id, "paused", other)),
        }
    }

    pub(crate) fn resume(&self) -> Result<(), SitemapError> {
        let mut state = self.state.lock();
        match state.task.status {
            TaskStatus::Paused => {
                self.set_status(&mut state, TaskStatus::Running);
                drop(state);
                info!(task_id = %self.id, "Generation task resumed");
                self.wake.notify_one();
                Ok(())
            }
            TaskStatus::Running => Ok(()),
            other => Err(illegal(&self.id, "resumed", other)),
        }
    }

    /// Stop dispatching. Never-started targets go back to their pre-task
    /// status right away; in-flight calls settle later as failed.
    pub(crate) fn cancel(&self) -> Result<(), SitemapError> {
        let mut doc = self.document.write();
        let mut state = self.state.lock();
        if state.task.status.is_terminal() {
            return Err(illegal(&self.id, "cancelled", state.task.status));
        }
        self.set_status(&mut state, TaskStatus::Cancelled);

        let reverted: Vec<NodeId> = state.pending.drain(..).collect();
        for id in &reverted {
            let prior = state.prior.get(id).copied().unwrap_or_default();
            if doc.tree.set_generation_status(id, prior).is_err() {
                debug!(task_id = %self.id, node_id = %id, "Skipped revert of deleted node");
            }
            state.task.set_node(id, prior, None);
        }
        let in_flight = state.in_flight;
        drop(state);
        drop(doc);

        info!(
            task_id = %self.id,
            reverted = reverted.len(),
            in_flight,
            "Generation task cancelled"
        );
        self.wake.notify_one();
        Ok(())
    }

    /// Move queued targets to `generating` while the task runs and the pool
    /// has room. Targets deleted from the tree resolve as failed here.
    pub(crate) fn next_batch(&self) -> Vec<GenerationRequest> {
        let mut doc = self.document.write();
        let mut state = self.state.lock();
        let mut batch = Vec::new();
        while state.task.status == TaskStatus::Running
            && state.in_flight < state.task.concurrency_limit
        {
            let Some(id) = state.pending.pop_front() else {
                break;
            };
            let page = match doc.tree.get(&id) {
                Some(node) => PageSnapshot::capture(&doc.tree, node),
                None => {
                    warn!(task_id = %self.id, node_id = %id, "Target deleted before dispatch");
                    state
                        .task
                        .set_node(&id, GenerationStatus::Failed, Some(NODE_DELETED.to_string()));
                    continue;
                }
            };
            let _ = doc.tree.set_generation_status(&id, GenerationStatus::Generating);
            state.task.set_node(&id, GenerationStatus::Generating, None);
            state.in_flight += 1;
            debug!(task_id = %self.id, node_id = %id, "Dispatching node");
            batch.push(GenerationRequest {
                sitemap_id: self.sitemap_id.clone(),
                page,
                params: state.task.params.clone(),
            });
        }
        batch
    }

    /// Record the outcome of one collaborator call.
    fn settle(&self, id: &NodeId, outcome: Result<GeneratedContent, SitemapError>) {
        let mut doc = self.document.write();
        let mut state = self.state.lock();
        state.in_flight = state.in_flight.saturating_sub(1);

        if !doc.tree.contains(id) {
            warn!(task_id = %self.id, node_id = %id, "Target deleted during generation");
            state
                .task
                .set_node(id, GenerationStatus::Failed, Some(NODE_DELETED.to_string()));
            return;
        }

        let (status, error) = if state.task.status == TaskStatus::Cancelled {
            (GenerationStatus::Failed, Some(CANCELLED.to_string()))
        } else {
            match outcome {
                Ok(content) => {
                    let _ = doc.tree.with_node_mut(id, |node| {
                        if content.article_id.is_some() {
                            node.article_id = content.article_id;
                        }
                        node.is_modified_locally = true;
                    });
                    (GenerationStatus::Generated, None)
                }
                Err(err) => {
                    warn!(task_id = %self.id, node_id = %id, error = %err, "Node generation failed");
                    (GenerationStatus::Failed, Some(err.to_string()))
                }
            }
        };
        let _ = doc.tree.set_generation_status(id, status);
        state.task.set_node(id, status, error);
        debug!(task_id = %self.id, node_id = %id, status = status.as_str(), "Node settled");
    }

    /// Nothing in flight and nothing left that could be dispatched.
    fn drained(&self) -> bool {
        let state = self.state.lock();
        state.in_flight == 0
            && (state.pending.is_empty() || state.task.status == TaskStatus::Cancelled)
    }

    /// Final status, then release the document's slot. Both happen under the
    /// registry lock so a new `start` never sees a half-finished task.
    fn finish(&self, registry: &Mutex<TaskRegistry>) {
        let mut registry = registry.lock();
        let mut state = self.state.lock();
        if state.task.status != TaskStatus::Cancelled {
            let status = if state.task.all_failed() {
                TaskStatus::Failed
            } else {
                TaskStatus::Completed
            };
            self.set_status(&mut state, status);
        }
        state.task.completed_at = Some(Utc::now());
        let counts = state.task.counts();
        let status = state.task.status;
        drop(state);
        registry.release(&self.sitemap_id, &self.id);

        info!(
            task_id = %self.id,
            sitemap_id = %self.sitemap_id,
            status = status.as_str(),
            generated = counts.generated,
            failed = counts.failed,
            "Generation task finished"
        );
    }
}

fn illegal(id: &TaskId, action: &str, status: TaskStatus) -> SitemapError {
    SitemapError::IllegalState(format!(
        "Task {} is {} and cannot be {}",
        id, status, action
    ))
}

async fn call(
    generator: &dyn ContentGenerator,
    request: GenerationRequest,
    timeout: Duration,
) -> (NodeId, Result<GeneratedContent, SitemapError>) {
    let outcome = match tokio::time::timeout(timeout, generator.generate(&request)).await {
        Ok(outcome) => outcome,
        Err(_) => Err(SitemapError::External(format!(
            "Generation timed out after {}s",
            timeout.as_secs()
        ))),
    };
    (request.page.id, outcome)
}

/// Drive a task until it drains. `initial` is the batch `start` already
/// marked as generating.
pub(crate) async fn run(
    handle: Arc<TaskHandle>,
    generator: Arc<dyn ContentGenerator>,
    registry: Arc<Mutex<TaskRegistry>>,
    initial: Vec<GenerationRequest>,
    timeout: Duration,
) {
    let mut in_flight = FuturesUnordered::new();
    for request in initial {
        in_flight.push(call(generator.as_ref(), request, timeout));
    }

    loop {
        for request in handle.next_batch() {
            in_flight.push(call(generator.as_ref(), request, timeout));
        }
        if in_flight.is_empty() && handle.drained() {
            break;
        }

        tokio::select! {
            Some((id, outcome)) = in_flight.next() => handle.settle(&id, outcome),
            _ = handle.wake.notified() => {}
        }
    }

    handle.finish(&registry);
}
