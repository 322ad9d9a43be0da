//! Page Hierarchy
//!
//! Arena of page nodes keyed by id. Sibling order lives in per-parent child
//! lists; top-level orphans keep their own ordered list. All structural
//! mutators are atomic: they validate first and touch the arena only when the
//! whole operation is known to succeed.

pub mod node;
pub mod path;
pub mod view;

pub use node::{
    DesignStatus, DetachedNode, GenerationStatus, Node, NodeContent, NodeDraft, NodePatch,
    Placement, Position, PublishStatus,
};
pub use view::{TreeEntry, TreeView};

use crate::error::SitemapError;
use crate::types::NodeId;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::debug;

/// The page hierarchy of one sitemap document.
#[derive(Debug, Clone)]
pub struct NodeTree {
    nodes: HashMap<NodeId, Node>,
    children: HashMap<NodeId, Vec<NodeId>>,
    orphans: Vec<NodeId>,
    root_id: NodeId,
}

impl NodeTree {
    /// Create a tree holding only a root page.
    pub fn new(root_title: impl Into<String>) -> Self {
        Self::with_root_id(NodeId::generate(), root_title)
    }

    pub fn with_root_id(root_id: NodeId, root_title: impl Into<String>) -> Self {
        let root = Node::root(root_id.clone(), root_title.into());
        let mut nodes = HashMap::new();
        nodes.insert(root_id.clone(), root);
        let mut children = HashMap::new();
        children.insert(root_id.clone(), Vec::new());
        Self {
            nodes,
            children,
            orphans: Vec::new(),
            root_id,
        }
    }

    /// Rebuild a tree from nodes listed parents-before-children, siblings in order.
    ///
    /// The result is validated against every hierarchy invariant.
    pub fn from_ordered_nodes(ordered: Vec<Node>) -> Result<Self, SitemapError> {
        let mut roots = ordered.iter().filter(|n| n.is_root);
        let root = roots
            .next()
            .ok_or_else(|| SitemapError::Validation("Document has no root page".to_string()))?;
        if roots.next().is_some() {
            return Err(SitemapError::Validation(
                "Document has more than one root page".to_string(),
            ));
        }
        let root_id = root.id.clone();

        let mut tree = Self {
            nodes: HashMap::with_capacity(ordered.len()),
            children: HashMap::with_capacity(ordered.len()),
            orphans: Vec::new(),
            root_id,
        };

        for node in ordered {
            if tree.nodes.contains_key(&node.id) {
                return Err(SitemapError::Validation(format!(
                    "Duplicate node id {}",
                    node.id
                )));
            }
            match (&node.parent_id, node.is_root) {
                (Some(_), true) => {
                    return Err(SitemapError::Validation(
                        "Root page cannot have a parent".to_string(),
                    ))
                }
                (Some(parent), false) => {
                    let siblings = tree.children.get_mut(parent).ok_or_else(|| {
                        SitemapError::Validation(format!(
                            "Node {} listed before its parent {}",
                            node.id, parent
                        ))
                    })?;
                    siblings.push(node.id.clone());
                }
                (None, false) => tree.orphans.push(node.id.clone()),
                (None, true) => {}
            }
            tree.children.insert(node.id.clone(), Vec::new());
            tree.nodes.insert(node.id.clone(), node);
        }

        tree.validate()?;
        Ok(tree)
    }

    /// Nodes parents-before-children: the root subtree, then each orphan subtree.
    pub fn ordered_nodes(&self) -> Vec<Node> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut tops = vec![self.root_id.clone()];
        tops.extend(self.orphans.iter().cloned());
        for top in tops {
            out.push(self.nodes[&top].clone());
            for id in self.descendants(&top).unwrap_or_default() {
                out.push(self.nodes[&id].clone());
            }
        }
        out
    }

    pub fn root_id(&self) -> &NodeId {
        &self.root_id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn get(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn node(&self, id: &NodeId) -> Result<&Node, SitemapError> {
        self.nodes
            .get(id)
            .ok_or_else(|| SitemapError::NodeNotFound(id.clone()))
    }

    fn node_mut(&mut self, id: &NodeId) -> Result<&mut Node, SitemapError> {
        self.nodes
            .get_mut(id)
            .ok_or_else(|| SitemapError::NodeNotFound(id.clone()))
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Ordered children of a node.
    pub fn children(&self, id: &NodeId) -> Result<&[NodeId], SitemapError> {
        self.children
            .get(id)
            .map(Vec::as_slice)
            .ok_or_else(|| SitemapError::NodeNotFound(id.clone()))
    }

    /// Ordered top-level orphans.
    pub fn orphans(&self) -> &[NodeId] {
        &self.orphans
    }

    pub fn parent(&self, id: &NodeId) -> Result<Option<&NodeId>, SitemapError> {
        Ok(self.node(id)?.parent_id.as_ref())
    }

    fn siblings(&self, parent: Option<&NodeId>) -> &[NodeId] {
        match parent {
            Some(parent) => self
                .children
                .get(parent)
                .map(Vec::as_slice)
                .unwrap_or_default(),
            None => &self.orphans,
        }
    }

    fn siblings_mut(&mut self, parent: Option<&NodeId>) -> Result<&mut Vec<NodeId>, SitemapError> {
        match parent {
            Some(parent) => self
                .children
                .get_mut(parent)
                .ok_or_else(|| SitemapError::NodeNotFound(parent.clone())),
            None => Ok(&mut self.orphans),
        }
    }

    /// Parent and sibling index of a node. The root reports index 0.
    pub fn placement(&self, id: &NodeId) -> Result<Placement, SitemapError> {
        let node = self.node(id)?;
        if node.is_root {
            return Ok(Placement {
                parent_id: None,
                index: 0,
            });
        }
        let index = self
            .siblings(node.parent_id.as_ref())
            .iter()
            .position(|s| s == id)
            .ok_or_else(|| {
                SitemapError::IllegalState(format!("Node {} missing from its sibling list", id))
            })?;
        Ok(Placement {
            parent_id: node.parent_id.clone(),
            index,
        })
    }

    /// Ancestor chain from the parent upward. Bounded by the arena size so a
    /// corrupt parent relation reports an error instead of looping.
    pub fn ancestors(&self, id: &NodeId) -> Result<Vec<NodeId>, SitemapError> {
        let mut chain = Vec::new();
        let mut current = self.node(id)?.parent_id.clone();
        while let Some(parent) = current {
            if chain.len() > self.nodes.len() {
                return Err(SitemapError::IllegalState(format!(
                    "Parent chain of {} does not terminate",
                    id
                )));
            }
            current = self.node(&parent)?.parent_id.clone();
            chain.push(parent);
        }
        Ok(chain)
    }

    pub fn depth(&self, id: &NodeId) -> Result<usize, SitemapError> {
        Ok(self.ancestors(id)?.len())
    }

    /// Derived path: `"/"` for the root, ancestor slugs joined otherwise.
    /// An orphan subtree is rooted at `"/" + orphan slug`.
    pub fn path(&self, id: &NodeId) -> Result<String, SitemapError> {
        let node = self.node(id)?;
        if node.is_root {
            return Ok("/".to_string());
        }
        let mut slugs: Vec<&str> = vec![node.slug.as_str()];
        for ancestor in self.ancestors(id)? {
            let ancestor = self.node(&ancestor)?;
            if ancestor.is_root {
                break;
            }
            slugs.push(ancestor.slug.as_str());
        }
        slugs.reverse();
        Ok(path::join_slugs(slugs))
    }

    /// All structural descendants in pre-order, excluding `id` itself.
    pub fn descendants(&self, id: &NodeId) -> Result<Vec<NodeId>, SitemapError> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id)?.iter().rev().cloned().collect();
        while let Some(next) = stack.pop() {
            if out.len() > self.nodes.len() {
                return Err(SitemapError::IllegalState(format!(
                    "Subtree of {} does not terminate",
                    id
                )));
            }
            if let Some(kids) = self.children.get(&next) {
                stack.extend(kids.iter().rev().cloned());
            }
            out.push(next);
        }
        Ok(out)
    }

    /// True when `candidate` is `id` or lies below it.
    pub fn is_self_or_descendant(&self, candidate: &NodeId, id: &NodeId) -> Result<bool, SitemapError> {
        if candidate == id {
            return Ok(true);
        }
        Ok(self.ancestors(candidate)?.iter().any(|a| a == id))
    }

    fn ensure_slug_free(
        &self,
        parent: Option<&NodeId>,
        slug: &str,
        except: Option<&NodeId>,
    ) -> Result<(), SitemapError> {
        let taken = self
            .siblings(parent)
            .iter()
            .filter(|s| Some(*s) != except)
            .any(|s| self.nodes.get(s).is_some_and(|n| n.slug == slug));
        if taken {
            let scope = match parent {
                Some(parent) => format!("under {}", parent),
                None => "among orphans".to_string(),
            };
            return Err(SitemapError::SlugConflict {
                slug: slug.to_string(),
                scope,
            });
        }
        Ok(())
    }

    fn ensure_not_root(&self, id: &NodeId, action: &'static str) -> Result<(), SitemapError> {
        if self.node(id)?.is_root {
            debug!(node_id = %id, action, "Rejected operation on root page");
            return Err(SitemapError::RootImmutable(action));
        }
        Ok(())
    }

    /// Whether `id` could take `slug` without colliding with a sibling.
    pub(crate) fn slug_available(&self, id: &NodeId, slug: &str) -> bool {
        match self.nodes.get(id) {
            Some(node) => {
                path::validate_slug(slug).is_ok()
                    && self
                        .ensure_slug_free(node.parent_id.as_ref(), slug, Some(id))
                        .is_ok()
            }
            None => false,
        }
    }

    /// Create a page under `parent`, or an orphan when `parent` is `None`.
    /// The node is appended after its existing siblings.
    pub fn create_node(
        &mut self,
        parent: Option<&NodeId>,
        draft: NodeDraft,
    ) -> Result<NodeId, SitemapError> {
        self.create_node_with_id(NodeId::generate(), parent, draft)
    }

    pub fn create_node_with_id(
        &mut self,
        id: NodeId,
        parent: Option<&NodeId>,
        draft: NodeDraft,
    ) -> Result<NodeId, SitemapError> {
        if self.nodes.contains_key(&id) {
            return Err(SitemapError::Validation(format!("Node id {} already exists", id)));
        }
        if let Some(parent) = parent {
            self.node(parent)?;
        }
        let slug = match &draft.slug {
            Some(slug) => slug.clone(),
            None => path::slugify(&draft.title),
        };
        path::validate_slug(&slug)?;
        self.ensure_slug_free(parent, &slug, None)?;

        let node = Node::new(id.clone(), parent.cloned(), draft, slug);
        self.siblings_mut(parent)?.push(id.clone());
        self.children.insert(id.clone(), Vec::new());
        self.nodes.insert(id.clone(), node);

        debug!(node_id = %id, parent = ?parent, "Created node");
        Ok(id)
    }

    /// Apply a content patch. Returns the content as it was before.
    pub fn update_node(&mut self, id: &NodeId, patch: &NodePatch) -> Result<NodeContent, SitemapError> {
        self.ensure_not_root(id, "edited")?;
        if let Some(slug) = &patch.slug {
            path::validate_slug(slug)?;
            let parent = self.node(id)?.parent_id.clone();
            self.ensure_slug_free(parent.as_ref(), slug, Some(id))?;
        }

        let node = self.node_mut(id)?;
        let before = node.content();
        if let Some(title) = &patch.title {
            node.title = title.clone();
        }
        if let Some(slug) = &patch.slug {
            node.slug = slug.clone();
        }
        if let Some(description) = &patch.description {
            node.description = description.clone();
        }
        if let Some(keywords) = &patch.keywords {
            node.keywords = keywords.clone();
        }
        if let Some(design_status) = patch.design_status {
            node.design_status = design_status;
        }
        if !patch.is_empty() {
            node.mark_edited();
        }

        debug!(node_id = %id, "Updated node");
        Ok(before)
    }

    /// Reparent `id` under `new_parent` (or demote it to an orphan) at
    /// `index` among its new siblings. The subtree moves with it.
    /// Returns the placement it had before.
    pub fn move_node(
        &mut self,
        id: &NodeId,
        new_parent: Option<&NodeId>,
        index: usize,
    ) -> Result<Placement, SitemapError> {
        self.ensure_not_root(id, "moved")?;
        if let Some(parent) = new_parent {
            self.node(parent)?;
            if self.is_self_or_descendant(parent, id)? {
                debug!(node_id = %id, new_parent = %parent, "Rejected cyclic move");
                return Err(SitemapError::Cycle {
                    node: id.clone(),
                    new_parent: parent.clone(),
                });
            }
        }
        let slug = self.node(id)?.slug.clone();
        self.ensure_slug_free(new_parent, &slug, Some(id))?;

        let before = self.placement(id)?;
        self.siblings_mut(before.parent_id.as_ref())?
            .retain(|s| s != id);
        let siblings = self.siblings_mut(new_parent)?;
        let index = index.min(siblings.len());
        siblings.insert(index, id.clone());
        self.node_mut(id)?.parent_id = new_parent.cloned();

        debug!(node_id = %id, new_parent = ?new_parent, index, "Moved node");
        Ok(before)
    }

    /// Remove `id` and every structural descendant. Returns the removed nodes
    /// in pre-order with the sibling index each had, enough to restore them.
    pub fn delete_node(&mut self, id: &NodeId) -> Result<Vec<DetachedNode>, SitemapError> {
        self.ensure_not_root(id, "deleted")?;
        let top = self.placement(id)?;
        let mut order = vec![id.clone()];
        order.extend(self.descendants(id)?);

        let mut removed = Vec::with_capacity(order.len());
        for (i, node_id) in order.iter().enumerate() {
            let index = if i == 0 {
                top.index
            } else {
                self.placement(node_id)?.index
            };
            removed.push((node_id.clone(), index));
        }

        self.siblings_mut(top.parent_id.as_ref())?
            .retain(|s| s != id);
        let detached = removed
            .into_iter()
            .filter_map(|(node_id, index)| {
                self.children.remove(&node_id);
                self.nodes
                    .remove(&node_id)
                    .map(|node| DetachedNode { node, index })
            })
            .collect::<Vec<_>>();

        debug!(node_id = %id, removed = detached.len(), "Deleted subtree");
        Ok(detached)
    }

    /// Re-insert nodes captured by [`NodeTree::delete_node`].
    pub(crate) fn restore_detached(&mut self, detached: &[DetachedNode]) -> Result<(), SitemapError> {
        let Some(top) = detached.first() else {
            return Ok(());
        };
        if let Some(entry) = detached.iter().find(|e| self.nodes.contains_key(&e.node.id)) {
            return Err(SitemapError::IllegalState(format!(
                "Cannot restore {}: id already present",
                entry.node.id
            )));
        }
        // descendants hang off nodes restored earlier in the same batch
        let parent = top.node.parent_id.as_ref();
        if let Some(parent) = parent {
            self.node(parent)?;
        }
        self.ensure_slug_free(parent, &top.node.slug, None)?;

        for entry in detached {
            let parent = entry.node.parent_id.clone();
            let siblings = self.siblings_mut(parent.as_ref())?;
            let index = entry.index.min(siblings.len());
            siblings.insert(index, entry.node.id.clone());
            self.children.insert(entry.node.id.clone(), Vec::new());
            self.nodes.insert(entry.node.id.clone(), entry.node.clone());
        }
        Ok(())
    }

    /// Remove a single childless node. Used to invert a create.
    pub(crate) fn remove_leaf(&mut self, id: &NodeId) -> Result<Node, SitemapError> {
        self.ensure_not_root(id, "deleted")?;
        if !self.children(id)?.is_empty() {
            return Err(SitemapError::IllegalState(format!(
                "Node {} gained children and cannot be removed alone",
                id
            )));
        }
        self.delete_node(id)?
            .into_iter()
            .next()
            .map(|d| d.node)
            .ok_or_else(|| SitemapError::NodeNotFound(id.clone()))
    }

    pub(crate) fn restore_content(&mut self, id: &NodeId, content: &NodeContent) -> Result<(), SitemapError> {
        let parent = self.node(id)?.parent_id.clone();
        self.ensure_slug_free(parent.as_ref(), &content.slug, Some(id))?;
        self.node_mut(id)?.restore_content(content);
        Ok(())
    }

    /// Move a node's canvas position. No structural effect.
    pub fn update_position(&mut self, id: &NodeId, position: Position) -> Result<Position, SitemapError> {
        let node = self.node_mut(id)?;
        let before = node.position;
        node.position = position;
        Ok(before)
    }

    /// Replace the keyword set. Returns the previous set.
    pub fn set_keywords<I, S>(&mut self, id: &NodeId, keywords: I) -> Result<BTreeSet<String>, SitemapError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ensure_not_root(id, "edited")?;
        let keywords: BTreeSet<String> = keywords
            .into_iter()
            .map(Into::into)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        let node = self.node_mut(id)?;
        Ok(std::mem::replace(&mut node.keywords, keywords))
    }

    /// Add one keyword. Returns the previous set.
    pub fn add_keyword(&mut self, id: &NodeId, keyword: &str) -> Result<BTreeSet<String>, SitemapError> {
        self.ensure_not_root(id, "edited")?;
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(SitemapError::Validation("Keyword cannot be empty".to_string()));
        }
        let node = self.node_mut(id)?;
        let before = node.keywords.clone();
        node.keywords.insert(keyword.to_string());
        Ok(before)
    }

    /// Remove one keyword if present. Returns the previous set.
    pub fn remove_keyword(&mut self, id: &NodeId, keyword: &str) -> Result<BTreeSet<String>, SitemapError> {
        self.ensure_not_root(id, "edited")?;
        let node = self.node_mut(id)?;
        let before = node.keywords.clone();
        node.keywords.remove(keyword.trim());
        Ok(before)
    }

    pub(crate) fn restore_keywords(&mut self, id: &NodeId, keywords: &BTreeSet<String>) -> Result<(), SitemapError> {
        self.node_mut(id)?.keywords = keywords.clone();
        Ok(())
    }

    /// Status write used by the generation controller. Not a user edit.
    pub(crate) fn set_generation_status(
        &mut self,
        id: &NodeId,
        status: GenerationStatus,
    ) -> Result<GenerationStatus, SitemapError> {
        let node = self.node_mut(id)?;
        Ok(std::mem::replace(&mut node.generation_status, status))
    }

    pub(crate) fn with_node_mut<R>(
        &mut self,
        id: &NodeId,
        f: impl FnOnce(&mut Node) -> R,
    ) -> Result<R, SitemapError> {
        Ok(f(self.node_mut(id)?))
    }

    /// Check every hierarchy invariant over the whole arena.
    pub fn validate(&self) -> Result<(), SitemapError> {
        let roots: Vec<&Node> = self.nodes.values().filter(|n| n.is_root).collect();
        if roots.len() != 1 || roots[0].id != self.root_id || roots[0].parent_id.is_some() {
            return Err(SitemapError::Validation(
                "Document must have exactly one parentless root".to_string(),
            ));
        }

        for node in self.nodes.values() {
            // terminates or errors
            self.ancestors(&node.id)?;
            let listed_under = self.siblings(node.parent_id.as_ref());
            if !node.is_root && !listed_under.contains(&node.id) {
                return Err(SitemapError::Validation(format!(
                    "Node {} is missing from its parent's child list",
                    node.id
                )));
            }
        }

        let mut groups: Vec<&[NodeId]> = self.children.values().map(Vec::as_slice).collect();
        groups.push(&self.orphans);
        for group in groups {
            let mut seen = HashSet::new();
            for id in group {
                let node = self.node(id)?;
                if !seen.insert(node.slug.as_str()) {
                    return Err(SitemapError::SlugConflict {
                        slug: node.slug.clone(),
                        scope: match &node.parent_id {
                            Some(parent) => format!("under {}", parent),
                            None => "among orphans".to_string(),
                        },
                    });
                }
            }
        }
        Ok(())
    }

    /// Nested read model for rendering.
    pub fn view(&self) -> TreeView {
        view::build(self)
    }
}
