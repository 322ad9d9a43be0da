//! Editing scenarios through the public editor API

use super::test_utils::{new_editor, page, path, root};
use sitemap_engine::error::ErrorKind;
use sitemap_engine::links::EdgeOrigin;
use sitemap_engine::tree::{NodeDraft, NodePatch};

#[test]
fn test_move_to_orphan_keeps_slug_path() {
    let editor = new_editor("site");
    let root = root(&editor);
    let about = editor
        .create_node(Some(&root), NodeDraft::new("About").with_slug("about"))
        .unwrap();

    editor.move_node(&about, None, 0).unwrap();

    let doc = editor.document().read();
    assert_eq!(doc.tree.node(&about).unwrap().parent_id, None);
    assert_eq!(doc.tree.path(&about).unwrap(), "/about");
    assert!(!doc.tree.children(&root).unwrap().contains(&about));
    assert_eq!(doc.tree.orphans().to_vec(), vec![about.clone()]);
}

#[test]
fn test_cascading_delete_removes_subtree_and_edges() {
    let editor = new_editor("site");
    let root = root(&editor);
    let services = page(&editor, &root, "Services");
    let seo = page(&editor, &services, "SEO");
    let ads = page(&editor, &services, "Ads");
    let contact = page(&editor, &root, "Contact");

    editor.add_edge(&contact, &seo, None, EdgeOrigin::Manual).unwrap();
    editor.add_edge(&ads, &contact, None, EdgeOrigin::Manual).unwrap();
    editor.add_edge(&services, &seo, None, EdgeOrigin::Ai).unwrap();
    let kept = editor.add_edge(&contact, &root, None, EdgeOrigin::Manual).unwrap();

    let deleted = editor.delete_node(&services).unwrap();
    assert_eq!(deleted.nodes.len(), 3);
    assert_eq!(deleted.edges.len(), 3);

    let doc = editor.document().read();
    for id in [&services, &seo, &ads] {
        assert!(!doc.tree.contains(id));
    }
    let remaining: Vec<_> = doc.links.edges().map(|e| e.id.clone()).collect();
    assert_eq!(remaining, vec![kept]);
}

#[test]
fn test_undo_of_delete_restores_pages_and_links() {
    let editor = new_editor("site");
    let root = root(&editor);
    let services = page(&editor, &root, "Services");
    let seo = page(&editor, &services, "SEO");
    let contact = page(&editor, &root, "Contact");
    editor.add_edge(&contact, &seo, Some("search".into()), EdgeOrigin::Manual).unwrap();
    let before = editor.document().read().snapshot();

    editor.delete_node(&services).unwrap();
    editor.undo().unwrap();

    let after = editor.document().read().snapshot();
    assert!(before.same_content(&after));
    assert_eq!(path(&editor, &seo), "/services/seo");
}

#[test]
fn test_new_command_after_undo_discards_redo_branch() {
    let editor = new_editor("site");
    let root = root(&editor);

    let a = page(&editor, &root, "A");
    let b = page(&editor, &root, "B");
    editor.undo().unwrap();
    {
        let doc = editor.document().read();
        assert!(doc.tree.contains(&a));
        assert!(!doc.tree.contains(&b));
    }

    let c = page(&editor, &root, "C");
    assert!(!editor.history_state().can_redo);
    assert_eq!(editor.redo().unwrap(), None);

    let doc = editor.document().read();
    assert!(doc.tree.contains(&c));
    assert!(!doc.tree.contains(&b));
}

#[test]
fn test_create_undo_redo_round_trip() {
    let editor = new_editor("site");
    let root = root(&editor);
    let empty = editor.document().read().snapshot();

    let blog = page(&editor, &root, "Blog");
    let with_blog = editor.document().read().snapshot();
    assert_eq!(editor.undo_labels(), vec!["Create 'Blog'".to_string()]);

    assert_eq!(editor.undo().unwrap().as_deref(), Some("Create 'Blog'"));
    assert!(editor.document().read().snapshot().same_content(&empty));

    editor.redo().unwrap();
    assert!(editor.document().read().snapshot().same_content(&with_blog));
    assert_eq!(path(&editor, &blog), "/blog");
}

#[test]
fn test_edit_session_commits_as_one_command() {
    let editor = new_editor("site");
    let root = root(&editor);
    let about = page(&editor, &root, "About");
    let depth = editor.history_state().size;

    editor.begin_edit(&about).unwrap();
    editor.stage_edit(NodePatch::title("About Us")).unwrap();
    editor.stage_edit(NodePatch::slug("about-us")).unwrap();
    assert_eq!(editor.history_state().size, depth);

    editor.commit_edit().unwrap();
    assert_eq!(editor.history_state().size, depth + 1);
    assert_eq!(path(&editor, &about), "/about-us");

    editor.undo().unwrap();
    let node = editor.get_node(&about).unwrap();
    assert_eq!(node.title, "About");
    assert_eq!(node.slug, "about");
}

#[test]
fn test_rejected_mutations_leave_history_untouched() {
    let editor = new_editor("site");
    let root = root(&editor);
    let services = page(&editor, &root, "Services");
    let seo = page(&editor, &services, "SEO");
    let depth = editor.history_state().size;

    let cycle = editor.move_node(&services, Some(&seo), 0).unwrap_err();
    assert_eq!(cycle.kind(), ErrorKind::Validation);

    page(&editor, &root, "Contact");
    let depth_after_contact = editor.history_state().size;
    let duplicate = editor
        .create_node(Some(&root), NodeDraft::new("Contact"))
        .unwrap_err();
    assert_eq!(duplicate.kind(), ErrorKind::Conflict);

    let root_delete = editor.delete_node(&root).unwrap_err();
    assert_eq!(root_delete.kind(), ErrorKind::State);

    assert_eq!(depth + 1, depth_after_contact);
    assert_eq!(editor.history_state().size, depth_after_contact);
}
