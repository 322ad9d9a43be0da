//! Bulk Content Generation
//!
//! Runs a concurrency-bounded, pausable and cancellable generation task over
//! a subset of a document's pages. Progress is pulled by polling
//! [`GenerationController::get_task`]; nothing is pushed to callers.
//!
//! Generation writes page status fields only and is never recorded in the
//! command history.

mod dispatch;
mod registry;
pub mod task;

pub use task::{GenerationTask, NodeProgress, TaskCounts, TaskStatus};

use crate::config::GenerationConfig;
use crate::document::SharedDocument;
use crate::error::SitemapError;
use crate::provider::{ContentGenerator, GenerationParams};
use crate::tree::GenerationStatus;
use crate::types::{NodeId, SitemapId, TaskId};
use dispatch::TaskHandle;
use parking_lot::Mutex;
use registry::TaskRegistry;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub struct GenerationController {
    generator: Arc<dyn ContentGenerator>,
    registry: Arc<Mutex<TaskRegistry>>,
    config: GenerationConfig,
}

impl GenerationController {
    pub fn new(generator: Arc<dyn ContentGenerator>, config: GenerationConfig) -> Self {
        Self {
            generator,
            registry: Arc::new(Mutex::new(TaskRegistry::default())),
            config,
        }
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Queue `node_ids` for generation and start dispatching.
    ///
    /// The first `concurrency_limit` targets are already `generating` when
    /// this returns. Must be called from within a Tokio runtime.
    pub fn start(
        &self,
        document: &SharedDocument,
        node_ids: &[NodeId],
        concurrency_limit: Option<usize>,
        params: GenerationParams,
    ) -> Result<TaskId, SitemapError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| {
            SitemapError::IllegalState("Generation requires a Tokio runtime".to_string())
        })?;

        let limit = concurrency_limit.unwrap_or(self.config.default_concurrency);
        if limit == 0 || limit > self.config.max_concurrency {
            return Err(SitemapError::Validation(format!(
                "concurrency limit must be between 1 and {}",
                self.config.max_concurrency
            )));
        }
        let mut seen = HashSet::new();
        let targets: Vec<NodeId> = node_ids
            .iter()
            .filter(|id| seen.insert((*id).clone()))
            .cloned()
            .collect();
        if targets.is_empty() {
            return Err(SitemapError::Validation(
                "at least one node is required".to_string(),
            ));
        }

        let handle = {
            let mut registry = self.registry.lock();
            let mut doc = document.write();
            registry.ensure_idle(doc.id())?;
            for id in &targets {
                doc.tree.node(id)?;
            }

            let mut prior = HashMap::with_capacity(targets.len());
            for id in &targets {
                let before = doc.tree.set_generation_status(id, GenerationStatus::Queued)?;
                prior.insert(id.clone(), before);
            }
            let task = GenerationTask::new(doc.id().clone(), targets, limit, params);
            let handle = Arc::new(TaskHandle::new(document.clone(), task, prior));
            registry.insert(doc.id().clone(), handle.clone());
            handle
        };

        handle.mark_running();
        let initial = handle.next_batch();
        info!(
            task_id = %handle.id(),
            sitemap_id = %handle.sitemap_id(),
            nodes = seen.len(),
            concurrency = limit,
            "Generation task started"
        );

        runtime.spawn(dispatch::run(
            handle.clone(),
            self.generator.clone(),
            self.registry.clone(),
            initial,
            Duration::from_secs(self.config.call_timeout_secs),
        ));
        Ok(handle.id().clone())
    }

    pub fn pause(&self, task_id: &TaskId) -> Result<(), SitemapError> {
        self.handle(task_id)?.pause()
    }

    pub fn resume(&self, task_id: &TaskId) -> Result<(), SitemapError> {
        self.handle(task_id)?.resume()
    }

    pub fn cancel(&self, task_id: &TaskId) -> Result<(), SitemapError> {
        self.handle(task_id)?.cancel()
    }

    pub fn get_task(&self, task_id: &TaskId) -> Result<GenerationTask, SitemapError> {
        Ok(self.handle(task_id)?.snapshot())
    }

    /// Non-terminal tasks across all documents.
    pub fn list_active_tasks(&self) -> Vec<GenerationTask> {
        let handles = self.registry.lock().active();
        handles
            .iter()
            .map(|h| h.snapshot())
            .filter(GenerationTask::is_active)
            .collect()
    }

    /// Every task started for a document, oldest first.
    pub fn list_tasks(&self, sitemap_id: &SitemapId) -> Vec<GenerationTask> {
        let handles = self.registry.lock().for_sitemap(sitemap_id);
        handles.iter().map(|h| h.snapshot()).collect()
    }

    /// Forget finished tasks of a document.
    pub fn prune_finished(&self, sitemap_id: &SitemapId) -> usize {
        self.registry.lock().prune(sitemap_id)
    }

    /// Resolve once the task reaches a terminal status.
    pub async fn wait(&self, task_id: &TaskId) -> Result<GenerationTask, SitemapError> {
        let handle = self.handle(task_id)?;
        let mut status = handle.subscribe();
        status
            .wait_for(|s| s.is_terminal())
            .await
            .map_err(|_| SitemapError::IllegalState(format!("Task {} was dropped", task_id)))?;
        Ok(handle.snapshot())
    }

    fn handle(&self, task_id: &TaskId) -> Result<Arc<TaskHandle>, SitemapError> {
        self.registry
            .lock()
            .get(task_id)
            .ok_or_else(|| SitemapError::TaskNotFound(task_id.clone()))
    }
}
