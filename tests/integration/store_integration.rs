//! Integration tests for the sled document store

use super::test_utils::{new_editor, page, root};
use sitemap_engine::config::EngineConfig;
use sitemap_engine::editor::SitemapEditor;
use sitemap_engine::error::ErrorKind;
use sitemap_engine::links::EdgeOrigin;
use sitemap_engine::store::{SitemapStore, SledSitemapStore};
use sitemap_engine::types::SitemapId;
use tempfile::TempDir;

/// A saved document reloads with the same pages, links and paths.
#[test]
fn test_save_and_reload_document() {
    let store_dir = TempDir::new().unwrap();
    let store = SledSitemapStore::new(store_dir.path()).unwrap();

    let editor = new_editor("acme");
    let root = root(&editor);
    let services = page(&editor, &root, "Services");
    let seo = page(&editor, &services, "SEO");
    editor.add_edge(&root, &seo, Some("seo".into()), EdgeOrigin::Manual).unwrap();
    editor.save(&store).unwrap();
    store.flush().unwrap();

    let reloaded = SitemapEditor::load(&store, &SitemapId::from("acme"), &EngineConfig::default()).unwrap();
    let original = editor.document().read().snapshot();
    assert!(reloaded.document().read().snapshot().same_content(&original));
    assert_eq!(reloaded.document().read().tree.path(&seo).unwrap(), "/services/seo");
    assert!(!reloaded.history_state().can_undo);
}

/// Data survives closing and reopening the database.
#[test]
fn test_store_persists_across_reopen() {
    let store_dir = TempDir::new().unwrap();
    {
        let store = SledSitemapStore::new(store_dir.path()).unwrap();
        let editor = new_editor("acme");
        editor.save(&store).unwrap();
        store.flush().unwrap();
    }

    let store = SledSitemapStore::new(store_dir.path()).unwrap();
    let listed = store.list().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, SitemapId::from("acme"));
    assert_eq!(listed[0].node_count, 1);
}

#[test]
fn test_duplicate_and_delete() {
    let store_dir = TempDir::new().unwrap();
    let store = SledSitemapStore::new(store_dir.path()).unwrap();
    let editor = new_editor("acme");
    let root = root(&editor);
    page(&editor, &root, "About");
    editor.save(&store).unwrap();

    let copy = store
        .duplicate(&SitemapId::from("acme"), &SitemapId::from("acme-2"), "Acme Copy")
        .unwrap()
        .unwrap();
    assert_eq!(copy.nodes.len(), 2);

    let names: Vec<String> = store.list().unwrap().into_iter().map(|d| d.name).collect();
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"Acme Copy".to_string()));

    assert!(store.delete(&SitemapId::from("acme")).unwrap());
    assert!(!store.delete(&SitemapId::from("acme")).unwrap());
    let err = SitemapEditor::load(&store, &SitemapId::from("acme"), &EngineConfig::default())
        .err()
        .unwrap();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}
