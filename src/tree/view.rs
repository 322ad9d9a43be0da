//! Nested read model of the page hierarchy for rendering.

use crate::tree::node::{GenerationStatus, PublishStatus};
use crate::tree::NodeTree;
use crate::types::NodeId;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeEntry {
    pub id: NodeId,
    pub title: String,
    pub slug: String,
    pub path: String,
    pub index: usize,
    pub generation_status: GenerationStatus,
    pub publish_status: PublishStatus,
    pub is_modified_locally: bool,
    pub children: Vec<TreeEntry>,
}

impl TreeEntry {
    /// Number of entries in this subtree, itself included.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(TreeEntry::count).sum::<usize>()
    }
}

/// The root subtree followed by each orphan subtree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeView {
    pub root: TreeEntry,
    pub orphans: Vec<TreeEntry>,
}

pub(crate) fn build(tree: &NodeTree) -> TreeView {
    let root = entry(tree, tree.root_id(), 0, "/".to_string()).unwrap_or_else(|| TreeEntry {
        id: tree.root_id().clone(),
        title: String::new(),
        slug: String::new(),
        path: "/".to_string(),
        index: 0,
        generation_status: GenerationStatus::None,
        publish_status: PublishStatus::None,
        is_modified_locally: false,
        children: Vec::new(),
    });
    let orphans = tree
        .orphans()
        .iter()
        .enumerate()
        .filter_map(|(index, id)| {
            let slug = &tree.get(id)?.slug;
            entry(tree, id, index, format!("/{}", slug))
        })
        .collect();
    TreeView { root, orphans }
}

fn entry(tree: &NodeTree, id: &NodeId, index: usize, path: String) -> Option<TreeEntry> {
    let node = tree.get(id)?;
    let children = tree
        .children(id)
        .unwrap_or_default()
        .iter()
        .enumerate()
        .filter_map(|(i, child)| {
            let slug = &tree.get(child)?.slug;
            let child_path = if path == "/" {
                format!("/{}", slug)
            } else {
                format!("{}/{}", path, slug)
            };
            entry(tree, child, i, child_path)
        })
        .collect();

    Some(TreeEntry {
        id: id.clone(),
        title: node.title.clone(),
        slug: node.slug.clone(),
        path,
        index,
        generation_status: node.generation_status,
        publish_status: node.publish_status,
        is_modified_locally: node.is_modified_locally,
        children,
    })
}
