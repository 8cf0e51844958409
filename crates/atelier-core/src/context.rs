//! Derived lookup tables over a [`Document`].
//!
//! The context is always rebuilt from scratch after a structural edit
//! (insert, remove, import). It is never patched incrementally, so a stale
//! parent or child entry cannot survive an edit.

use crate::id::NodeId;
use crate::model::Document;
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentContext {
    /// Every known id: scenes and their subtrees depth-first, then
    /// unattached nodes in id order.
    pub lu_keys: Vec<NodeId>,
    /// child → parent.
    pub lu_parent: HashMap<NodeId, NodeId>,
    /// parent → ordered children.
    pub lu_children: HashMap<NodeId, Vec<NodeId>>,
}

impl DocumentContext {
    pub fn new(document: &Document) -> Self {
        let mut lu_parent = HashMap::with_capacity(document.nodes.len());
        let mut lu_children = HashMap::with_capacity(document.links.len());
        for (&parent, children) in &document.links {
            for &child in children {
                lu_parent.insert(child, parent);
            }
            lu_children.insert(parent, children.clone());
        }

        let mut ctx = Self {
            lu_keys: Vec::with_capacity(document.nodes.len()),
            lu_parent,
            lu_children,
        };

        let mut seen = HashSet::with_capacity(document.nodes.len());
        for &scene in &document.scenes_ref {
            ctx.collect_preorder(scene, &mut seen);
        }
        for &id in document.nodes.keys() {
            if !seen.contains(&id) && !ctx.lu_parent.contains_key(&id) {
                ctx.collect_preorder(id, &mut seen);
            }
        }
        log::trace!(
            "rebuilt document context: {} keys, {} links",
            ctx.lu_keys.len(),
            ctx.lu_parent.len()
        );
        ctx
    }

    fn collect_preorder(&mut self, root: NodeId, seen: &mut HashSet<NodeId>) {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            self.lu_keys.push(id);
            if let Some(children) = self.lu_children.get(&id) {
                stack.extend(children.iter().rev().copied());
            }
        }
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.lu_keys.contains(&id)
    }

    pub fn get_parent_id(&self, id: NodeId) -> Option<NodeId> {
        self.lu_parent.get(&id).copied()
    }

    pub fn get_children(&self, id: NodeId) -> &[NodeId] {
        self.lu_children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Ancestors, nearest first.
    pub fn get_ancestors(&self, id: NodeId) -> SmallVec<[NodeId; 8]> {
        let mut out = SmallVec::new();
        let mut current = id;
        while let Some(parent) = self.get_parent_id(current) {
            if parent == id || out.contains(&parent) {
                // cyclic links: stop instead of spinning
                break;
            }
            out.push(parent);
            current = parent;
        }
        out
    }

    /// All descendants in pre-order, excluding `id` itself.
    pub fn get_descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        seen.insert(id);
        let mut stack: Vec<NodeId> = self.get_children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            if !seen.insert(next) {
                continue;
            }
            out.push(next);
            stack.extend(self.get_children(next).iter().rev().copied());
        }
        out
    }

    pub fn is_ancestor_of(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.get_ancestors(node).contains(&ancestor)
    }

    /// Other children of the same parent, in order.
    pub fn get_siblings(&self, id: NodeId) -> Vec<NodeId> {
        match self.get_parent_id(id) {
            Some(parent) => self
                .get_children(parent)
                .iter()
                .copied()
                .filter(|&sibling| sibling != id)
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn get_depth(&self, id: NodeId) -> usize {
        self.get_ancestors(id).len()
    }

    /// The root of `id`'s tree (itself when it has no parent).
    pub fn get_top_id(&self, id: NodeId) -> NodeId {
        self.get_ancestors(id).last().copied().unwrap_or(id)
    }

    /// Drop every id that has an ancestor in the same list. Order of the
    /// survivors is preserved and duplicates collapse to the first
    /// occurrence.
    pub fn prune_nested_nodes(&self, ids: &[NodeId]) -> Vec<NodeId> {
        let set: HashSet<NodeId> = ids.iter().copied().collect();
        let mut kept = Vec::with_capacity(ids.len());
        for &id in ids {
            if kept.contains(&id) {
                continue;
            }
            if self.get_ancestors(id).iter().any(|a| set.contains(a)) {
                continue;
            }
            kept.push(id);
        }
        kept
    }
}
