//! Applying approved link edges to page content through an external updater.
//!
//! Each edge resolves on its own: one failed update never blocks or rolls
//! back its siblings. The document lock is held only while statuses change,
//! never across a collaborator call.

use crate::document::SharedDocument;
use crate::error::SitemapError;
use crate::links::Edge;
use crate::tree::Node;
use crate::types::EdgeId;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{debug, info, warn};

/// One edge to write into the source page, with both endpoints resolved.
#[derive(Debug, Clone)]
pub struct LinkApplication {
    pub edge: Edge,
    pub source: Node,
    pub target: Node,
}

/// External content-update collaborator (the CMS that hosts the pages).
#[async_trait]
pub trait ContentUpdater: Send + Sync {
    async fn apply_link(&self, link: &LinkApplication) -> Result<(), SitemapError>;
}

/// Per-edge outcomes of a batch apply.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ApplyReport {
    pub applied: Vec<EdgeId>,
    pub failed: Vec<(EdgeId, String)>,
    pub skipped: Vec<(EdgeId, String)>,
}

impl ApplyReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.skipped.is_empty()
    }
}

pub(crate) async fn apply_batch(
    document: &SharedDocument,
    updater: &dyn ContentUpdater,
    ids: &[EdgeId],
    concurrency: usize,
) -> ApplyReport {
    let mut report = ApplyReport::default();

    let work = {
        let mut doc = document.write();
        let (started, skipped) = doc.links.begin_apply(ids);
        report.skipped = skipped;
        let mut work = Vec::with_capacity(started.len());
        for edge in started {
            let endpoints = (
                doc.tree.get(&edge.source_node_id).cloned(),
                doc.tree.get(&edge.target_node_id).cloned(),
            );
            match endpoints {
                (Some(source), Some(target)) => work.push(LinkApplication { edge, source, target }),
                _ => {
                    doc.links.finish_apply(&edge.id, false);
                    report.failed.push((edge.id, "endpoint no longer exists".to_string()));
                }
            }
        }
        work
    };

    info!(edges = work.len(), skipped = report.skipped.len(), "Applying link batch");

    let mut outcomes = stream::iter(work)
        .map(|link| async move {
            let outcome = updater.apply_link(&link).await;
            (link.edge.id, outcome)
        })
        .buffer_unordered(concurrency.max(1));

    // each edge settles as soon as its own call returns
    while let Some((edge_id, outcome)) = outcomes.next().await {
        let success = outcome.is_ok();
        let settled = {
            let mut doc = document.write();
            doc.links.finish_apply(&edge_id, success)
        };
        if !settled {
            debug!(edge_id = %edge_id, "Edge removed while applying; result dropped");
            continue;
        }
        match outcome {
            Ok(()) => report.applied.push(edge_id),
            Err(err) => {
                warn!(edge_id = %edge_id, error = %err, "Link apply failed");
                report.failed.push((edge_id, err.to_string()));
            }
        }
    }

    report
}
