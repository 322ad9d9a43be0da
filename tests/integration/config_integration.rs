//! Integration tests for layered configuration loading

use sitemap_engine::config::{ConfigLoader, EngineConfig};
use sitemap_engine::editor::SitemapEditor;
use sitemap_engine::document::SitemapDocument;
use sitemap_engine::tree::NodeDraft;
use sitemap_engine::types::SitemapId;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_workspace_config_overrides_defaults() {
    let workspace = TempDir::new().unwrap();
    let config_dir = workspace.path().join("config");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("config.toml"),
        r#"
[history]
max_depth = 2

[generation]
default_concurrency = 5

[storage]
store_path = "data/sitemaps"
"#,
    )
    .unwrap();

    let config = ConfigLoader::load(workspace.path()).unwrap();
    assert_eq!(config.history.max_depth, 2);
    assert_eq!(config.generation.default_concurrency, 5);
    assert_eq!(config.generation.max_concurrency, 10);
    assert_eq!(
        config.storage.resolve_store_path(workspace.path()),
        workspace.path().join("data/sitemaps")
    );
}

#[test]
fn test_explicit_file_and_validation() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("engine.toml");
    fs::write(&path, "[generation]\ndefault_concurrency = 0\n").unwrap();

    let config = ConfigLoader::load_from_file(&path).unwrap();
    let errors = config.validate().unwrap_err();
    assert!(errors.iter().any(|e| e.to_string().starts_with("generation:")));
}

/// `history.max_depth` bounds how far back an editor can undo.
#[test]
fn test_history_depth_from_config_evicts_oldest() {
    let mut config = EngineConfig::default();
    config.history.max_depth = 2;
    let editor = SitemapEditor::open(SitemapDocument::new(SitemapId::from("site"), "Home"), &config);
    let root = editor.document().read().tree.root_id().clone();

    for title in ["One", "Two", "Three"] {
        editor.create_node(Some(&root), NodeDraft::new(title)).unwrap();
    }
    assert_eq!(editor.history_state().size, 2);
    assert_eq!(
        editor.undo_labels(),
        vec!["Create 'Three'".to_string(), "Create 'Two'".to_string()]
    );

    editor.undo().unwrap();
    editor.undo().unwrap();
    assert!(!editor.history_state().can_undo);
    assert_eq!(editor.document().read().tree.len(), 2);
}
