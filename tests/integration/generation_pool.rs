//! Bulk generation through the public controller API

use super::test_utils::{new_editor, page, root};
use async_trait::async_trait;
use sitemap_engine::config::GenerationConfig;
use sitemap_engine::document::SharedDocument;
use sitemap_engine::error::SitemapError;
use sitemap_engine::generation::{GenerationController, TaskStatus};
use sitemap_engine::provider::{ContentGenerator, GeneratedContent, GenerationParams, GenerationRequest};
use sitemap_engine::tree::GenerationStatus;
use sitemap_engine::types::NodeId;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Each page's call waits for one permit on its own gate.
struct Gates(HashMap<NodeId, Arc<Semaphore>>);

impl Gates {
    fn new(ids: &[NodeId]) -> Self {
        Self(ids.iter().map(|id| (id.clone(), Arc::new(Semaphore::new(0)))).collect())
    }

    fn open(&self, id: &NodeId) {
        self.0[id].add_permits(1);
    }
}

#[async_trait]
impl ContentGenerator for Gates {
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedContent, SitemapError> {
        if let Some(gate) = self.0.get(&request.page.id) {
            gate.acquire()
                .await
                .map_err(|e| SitemapError::External(e.to_string()))?
                .forget();
        }
        Ok(GeneratedContent {
            article_id: None,
            content: format!("<h1>{}</h1>", request.page.title),
        })
    }
}

fn status(doc: &SharedDocument, id: &NodeId) -> GenerationStatus {
    doc.read().tree.node(id).unwrap().generation_status
}

async fn eventually(mut check: impl FnMut() -> bool) {
    for _ in 0..500 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    panic!("condition not reached");
}

#[tokio::test]
async fn test_pool_of_two_over_three_pages() {
    let editor = new_editor("site");
    let root = root(&editor);
    let ids: Vec<NodeId> = ["One", "Two", "Three"]
        .iter()
        .map(|t| page(&editor, &root, t))
        .collect();
    let doc = editor.document().clone();
    let gates = Arc::new(Gates::new(&ids));
    let controller = GenerationController::new(gates.clone(), GenerationConfig::default());

    let task_id = controller
        .start(&doc, &ids, Some(2), GenerationParams::new("test", "Write a page"))
        .unwrap();
    assert_eq!(status(&doc, &ids[0]), GenerationStatus::Generating);
    assert_eq!(status(&doc, &ids[1]), GenerationStatus::Generating);
    assert_eq!(status(&doc, &ids[2]), GenerationStatus::Queued);

    gates.open(&ids[0]);
    eventually(|| status(&doc, &ids[2]) == GenerationStatus::Generating).await;
    assert_eq!(controller.get_task(&task_id).unwrap().progress_percent(), 33);

    gates.open(&ids[1]);
    eventually(|| controller.get_task(&task_id).unwrap().progress_percent() == 66).await;

    gates.open(&ids[2]);
    let task = controller.wait(&task_id).await.unwrap();
    assert_eq!(task.status, TaskStatus::Completed);
    assert_eq!(task.progress_percent(), 100);
    assert!(controller.list_active_tasks().is_empty());
    for id in &ids {
        assert_eq!(status(&doc, id), GenerationStatus::Generated);
    }
}

#[tokio::test]
async fn test_generation_does_not_touch_history() {
    let editor = new_editor("site");
    let root = root(&editor);
    let id = page(&editor, &root, "Landing");
    let depth = editor.history_state().size;

    let gates = Arc::new(Gates::new(&[]));
    let controller = GenerationController::new(gates, GenerationConfig::default());
    let task_id = controller
        .start(editor.document(), &[id.clone()], None, GenerationParams::default())
        .unwrap();
    controller.wait(&task_id).await.unwrap();

    assert_eq!(editor.history_state().size, depth);
    assert_eq!(editor.get_node(&id).unwrap().generation_status, GenerationStatus::Generated);
}

#[tokio::test]
async fn test_cancel_reverts_queued_pages() {
    let editor = new_editor("site");
    let root = root(&editor);
    let ids: Vec<NodeId> = ["A", "B", "C"].iter().map(|t| page(&editor, &root, t)).collect();
    let doc = editor.document().clone();
    let gates = Arc::new(Gates::new(&ids));
    let controller = GenerationController::new(gates.clone(), GenerationConfig::default());

    let task_id = controller
        .start(&doc, &ids, Some(1), GenerationParams::default())
        .unwrap();
    controller.cancel(&task_id).unwrap();
    assert_eq!(status(&doc, &ids[1]), GenerationStatus::None);
    assert_eq!(status(&doc, &ids[2]), GenerationStatus::None);

    gates.open(&ids[0]);
    let task = controller.wait(&task_id).await.unwrap();
    assert_eq!(task.status, TaskStatus::Cancelled);
    assert!(task.completed_at.is_some());
}
