//! Property-based tests for page tree structure

use proptest::prelude::*;
use sitemap_engine::tree::{NodeDraft, NodeTree};
use sitemap_engine::types::NodeId;
use std::collections::HashSet;

#[derive(Debug, Clone)]
enum Op {
    Create { parent: usize, orphan: bool, title: usize },
    Move { node: usize, parent: usize, orphan: bool, index: usize },
    Delete { node: usize },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (any::<usize>(), any::<bool>(), 0usize..6)
            .prop_map(|(parent, orphan, title)| Op::Create { parent, orphan, title }),
        3 => (any::<usize>(), any::<usize>(), any::<bool>(), 0usize..4)
            .prop_map(|(node, parent, orphan, index)| Op::Move { node, parent, orphan, index }),
        1 => any::<usize>().prop_map(|node| Op::Delete { node }),
    ]
}

const TITLES: [&str; 6] = ["Home Care", "About", "Blog", "Contact", "Pricing", "About"];

fn pick(ids: &[NodeId], i: usize) -> NodeId {
    ids[i % ids.len()].clone()
}

/// Apply ops, ignoring the rejected ones. Returns the resulting tree.
fn run_ops(ops: &[Op]) -> NodeTree {
    let mut tree = NodeTree::new("Home");
    for op in ops {
        let ids: Vec<NodeId> = tree.nodes().map(|n| n.id.clone()).collect();
        let _ = match op {
            Op::Create { parent, orphan, title } => {
                let parent = (!orphan).then(|| pick(&ids, *parent));
                tree.create_node(parent.as_ref(), NodeDraft::new(TITLES[*title]))
                    .map(|_| ())
            }
            Op::Move { node, parent, orphan, index } => {
                let parent = (!orphan).then(|| pick(&ids, *parent));
                tree.move_node(&pick(&ids, *node), parent.as_ref(), *index)
                    .map(|_| ())
            }
            Op::Delete { node } => tree.delete_node(&pick(&ids, *node)).map(|_| ()),
        };
    }
    tree
}

/// Exactly one root survives any sequence of edits and every invariant holds.
#[test]
fn test_single_root_and_valid_tree_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&prop::collection::vec(op_strategy(), 0..40), |ops| {
            let tree = run_ops(&ops);
            prop_assert!(tree.validate().is_ok());
            let roots: Vec<_> = tree.nodes().filter(|n| n.is_root).collect();
            prop_assert_eq!(roots.len(), 1);
            prop_assert_eq!(&roots[0].id, tree.root_id());
            Ok(())
        })
        .unwrap();
}

/// Every page reaches the root or an orphan top in at most `len` steps.
#[test]
fn test_parent_chains_are_acyclic_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&prop::collection::vec(op_strategy(), 0..40), |ops| {
            let tree = run_ops(&ops);
            for node in tree.nodes() {
                let mut seen = HashSet::new();
                let mut current = Some(node.id.clone());
                while let Some(id) = current {
                    prop_assert!(seen.insert(id.clone()), "cycle through {}", id);
                    current = tree.node(&id).unwrap().parent_id.clone();
                }
                prop_assert!(seen.len() <= tree.len());
            }
            Ok(())
        })
        .unwrap();
}

/// Sibling slugs never collide, so every path is unique within its group.
#[test]
fn test_sibling_slugs_unique_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&prop::collection::vec(op_strategy(), 0..40), |ops| {
            let tree = run_ops(&ops);
            let mut groups: Vec<Vec<NodeId>> = vec![tree.orphans().to_vec()];
            for node in tree.nodes() {
                groups.push(tree.children(&node.id).unwrap().to_vec());
            }
            for group in groups {
                let mut slugs = HashSet::new();
                for id in &group {
                    let slug = tree.node(id).unwrap().slug.clone();
                    prop_assert!(slugs.insert(slug));
                }
            }
            Ok(())
        })
        .unwrap();
}
