//! Link suggestion, review and apply workflow

use super::test_utils::{new_editor, page, root, RecordingUpdater, StaticSuggester};
use sitemap_engine::error::ErrorKind;
use sitemap_engine::links::{EdgeOrigin, EdgeStatus};
use sitemap_engine::provider::SuggestedLink;

fn suggestion(
    source: &sitemap_engine::types::NodeId,
    target: &sitemap_engine::types::NodeId,
    anchor: &str,
) -> SuggestedLink {
    SuggestedLink {
        source_node_id: source.clone(),
        target_node_id: target.clone(),
        anchor_text: Some(anchor.to_string()),
    }
}

#[tokio::test]
async fn test_rejected_edge_can_be_approved_but_applied_cannot() {
    let editor = new_editor("site");
    let root = root(&editor);
    let blog = page(&editor, &root, "Blog");
    let pricing = page(&editor, &root, "Pricing");

    let edge = editor
        .add_edge(&blog, &pricing, Some("see pricing".into()), EdgeOrigin::Ai)
        .unwrap();
    editor.reject(&edge).unwrap();
    editor.approve(&edge).unwrap();
    assert_eq!(editor.get_edge(&edge).unwrap().status, EdgeStatus::Approved);

    let updater = RecordingUpdater::default();
    let report = editor.apply_approved(&updater).await;
    assert_eq!(report.applied, vec![edge.clone()]);
    assert_eq!(editor.get_edge(&edge).unwrap().status, EdgeStatus::Applied);

    let err = editor.approve(&edge).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::State);
}

#[tokio::test]
async fn test_import_suggestions_skips_invalid_and_records_one_command() {
    let editor = new_editor("site");
    let root = root(&editor);
    let blog = page(&editor, &root, "Blog");
    let pricing = page(&editor, &root, "Pricing");
    let depth = editor.history_state().size;

    let suggester = StaticSuggester(vec![
        suggestion(&blog, &pricing, "pricing"),
        suggestion(&pricing, &pricing, "self"),
        suggestion(&pricing, &blog, "blog"),
    ]);
    let report = editor
        .import_suggestions(&suggester, &[blog.clone(), pricing.clone()])
        .await
        .unwrap();

    assert_eq!(report.imported.len(), 2);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(editor.history_state().size, depth + 1);
    assert_eq!(editor.link_stats().planned, 2);
    assert!(editor.edges().iter().all(|e| e.origin == EdgeOrigin::Ai));

    editor.undo().unwrap();
    assert!(editor.edges().is_empty());
}

#[tokio::test]
async fn test_apply_failure_is_isolated_per_edge() {
    let editor = new_editor("site");
    let root = root(&editor);
    let blog = page(&editor, &root, "Blog");
    let pricing = page(&editor, &root, "Pricing");
    let contact = page(&editor, &root, "Contact");

    let ok = editor.add_edge(&blog, &pricing, None, EdgeOrigin::Manual).unwrap();
    let bad = editor.add_edge(&contact, &pricing, None, EdgeOrigin::Manual).unwrap();
    let planned = editor.add_edge(&blog, &contact, None, EdgeOrigin::Manual).unwrap();
    editor.approve(&ok).unwrap();
    editor.approve(&bad).unwrap();

    let updater = RecordingUpdater::failing(&[contact.clone()]);
    let report = editor
        .apply_links(&updater, &[ok.clone(), bad.clone(), planned.clone()])
        .await;

    assert_eq!(report.applied, vec![ok.clone()]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, bad);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].0, planned);
    assert!(!report.is_clean());

    assert_eq!(editor.get_edge(&ok).unwrap().status, EdgeStatus::Applied);
    assert_eq!(editor.get_edge(&bad).unwrap().status, EdgeStatus::Failed);
    assert_eq!(editor.get_edge(&planned).unwrap().status, EdgeStatus::Planned);
    assert_eq!(updater.applied.lock().clone(), vec![ok]);
}

#[test]
fn test_bulk_review_is_one_undoable_step() {
    let editor = new_editor("site");
    let root = root(&editor);
    let a = page(&editor, &root, "A");
    let b = page(&editor, &root, "B");
    let c = page(&editor, &root, "C");
    editor.add_edge(&a, &b, None, EdgeOrigin::Ai).unwrap();
    editor.add_edge(&b, &c, None, EdgeOrigin::Ai).unwrap();
    editor.add_edge(&c, &a, None, EdgeOrigin::Manual).unwrap();

    assert_eq!(editor.approve_all(), 3);
    assert_eq!(editor.link_stats().approved, 3);
    editor.undo().unwrap();
    assert_eq!(editor.link_stats().planned, 3);

    assert_eq!(editor.clear_ai_suggestions(), 2);
    let remaining = editor.edges();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].origin, EdgeOrigin::Manual);
}
