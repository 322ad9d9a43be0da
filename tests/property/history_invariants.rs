//! Property-based tests for undo/redo

use proptest::prelude::*;
use sitemap_engine::config::EngineConfig;
use sitemap_engine::document::SitemapDocument;
use sitemap_engine::editor::SitemapEditor;
use sitemap_engine::links::EdgeOrigin;
use sitemap_engine::tree::{NodeDraft, NodePatch};
use sitemap_engine::types::{NodeId, SitemapId};

#[derive(Debug, Clone)]
enum Edit {
    Create { parent: usize, title: u8 },
    Move { node: usize, parent: usize, index: usize },
    Rename { node: usize, title: u8 },
    Delete { node: usize },
    Link { source: usize, target: usize },
    ApproveAll,
}

fn edit_strategy() -> impl Strategy<Value = Edit> {
    prop_oneof![
        4 => (any::<usize>(), any::<u8>()).prop_map(|(parent, title)| Edit::Create { parent, title }),
        2 => (any::<usize>(), any::<usize>(), 0usize..3)
            .prop_map(|(node, parent, index)| Edit::Move { node, parent, index }),
        2 => (any::<usize>(), any::<u8>()).prop_map(|(node, title)| Edit::Rename { node, title }),
        1 => any::<usize>().prop_map(|node| Edit::Delete { node }),
        2 => (any::<usize>(), any::<usize>()).prop_map(|(source, target)| Edit::Link { source, target }),
        1 => Just(Edit::ApproveAll),
    ]
}

fn apply(editor: &SitemapEditor, edit: &Edit) {
    let ids: Vec<NodeId> = editor
        .document()
        .read()
        .tree
        .nodes()
        .map(|n| n.id.clone())
        .collect();
    let pick = |i: usize| ids[i % ids.len()].clone();
    let _ = match edit {
        Edit::Create { parent, title } => editor
            .create_node(Some(&pick(*parent)), NodeDraft::new(format!("Page {}", title % 8)))
            .map(|_| ()),
        Edit::Move { node, parent, index } => editor.move_node(&pick(*node), Some(&pick(*parent)), *index),
        Edit::Rename { node, title } => {
            editor.update_node(&pick(*node), &NodePatch::title(format!("Renamed {}", title)))
        }
        Edit::Delete { node } => editor.delete_node(&pick(*node)).map(|_| ()),
        Edit::Link { source, target } => editor
            .add_edge(&pick(*source), &pick(*target), None, EdgeOrigin::Manual)
            .map(|_| ()),
        Edit::ApproveAll => {
            editor.approve_all();
            Ok(())
        }
    };
}

/// Undoing every recorded edit restores the starting document, and redoing
/// them all reaches the final one again.
#[test]
fn test_undo_all_restores_initial_state_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&prop::collection::vec(edit_strategy(), 0..30), |edits| {
            let config = EngineConfig::default();
            let editor = SitemapEditor::open(SitemapDocument::new(SitemapId::from("site"), "Home"), &config);
            let initial = editor.document().read().snapshot();

            for edit in &edits {
                apply(&editor, edit);
            }
            let last = editor.document().read().snapshot();

            while editor.undo().unwrap().is_some() {}
            prop_assert!(editor.document().read().snapshot().same_content(&initial));

            while editor.redo().unwrap().is_some() {}
            let redone = editor.document().read().snapshot();
            prop_assert_eq!(&redone.nodes, &last.nodes);
            let statuses = |s: &sitemap_engine::document::DocumentSnapshot| {
                s.edges
                    .iter()
                    .map(|e| (e.id.clone(), e.status))
                    .collect::<Vec<_>>()
            };
            prop_assert_eq!(statuses(&redone), statuses(&last));
            Ok(())
        })
        .unwrap();
}
