//! Structural primitives over the document graph: import a packed
//! fragment, remove a subtree, move a node.
//!
//! Every primitive validates fully before touching the document, so a
//! failed call leaves it unchanged.

use crate::context::DocumentContext;
use crate::error::DocumentError;
use crate::id::NodeId;
use crate::model::{ChildrenConstraint, Document, SubDocument};
use std::collections::HashSet;

/// Merge `sub` into `document`, attaching its roots under `attach_to`.
///
/// `index` positions the roots among the existing children; `None`
/// appends and out-of-range values are clamped. Nodes of `sub` that no
/// root reaches are still added.
///
/// Returns the rebuilt context.
///
/// # Errors
/// - `ParentNotFound` if `attach_to` or a link parent inside `sub` is unknown.
/// - `IdConflict` if any id of `sub` already exists.
/// - `RootNotInSubDocument` if a root is missing from `sub.nodes`.
/// - `DanglingLink` if a link inside `sub` points outside it.
/// - `MultipleParents` if a root is also linked as a child inside `sub`.
/// - `NestedScene` if `sub` carries a scene node.
/// - `SingleChildScene` if `attach_to` is a single-child scene that is
///   already occupied or would receive more than one root.
pub fn import(
    document: &mut Document,
    sub: SubDocument,
    attach_to: NodeId,
    index: Option<usize>,
) -> Result<DocumentContext, DocumentError> {
    let parent = document
        .get(attach_to)
        .ok_or(DocumentError::ParentNotFound(attach_to))?;

    for (&id, node) in &sub.nodes {
        if document.contains(id) {
            return Err(DocumentError::IdConflict(id));
        }
        if node.is_scene() {
            return Err(DocumentError::NestedScene(id));
        }
    }
    for &root in &sub.roots {
        if !sub.nodes.contains_key(&root) {
            return Err(DocumentError::RootNotInSubDocument(root));
        }
    }
    let roots: HashSet<NodeId> = sub.roots.iter().copied().collect();
    let mut linked = HashSet::new();
    for (&p, children) in &sub.links {
        if !sub.nodes.contains_key(&p) {
            return Err(DocumentError::ParentNotFound(p));
        }
        for &child in children {
            if !sub.nodes.contains_key(&child) {
                return Err(DocumentError::DanglingLink(child));
            }
            if roots.contains(&child) || !linked.insert(child) {
                return Err(DocumentError::MultipleParents(child));
            }
        }
    }

    if let Some(constraints) = parent.scene_constraints()
        && constraints.children == ChildrenConstraint::Single
        && (!document.children_of(attach_to).is_empty() || sub.roots.len() > 1)
    {
        return Err(DocumentError::SingleChildScene(attach_to));
    }

    let orphans = sub
        .nodes
        .keys()
        .filter(|id| !roots.contains(id) && !linked.contains(id))
        .count();
    if orphans > 0 {
        log::debug!("import under {attach_to}: {orphans} unattached node(s) added");
    }

    let SubDocument {
        nodes,
        links,
        roots: root_order,
    } = sub;
    document.nodes.extend(nodes);
    document.links.extend(links);
    if !root_order.is_empty() {
        let siblings = document.links.entry(attach_to).or_default();
        let at = index.unwrap_or(siblings.len()).min(siblings.len());
        siblings.splice(at..at, root_order);
    }

    Ok(DocumentContext::new(document))
}

/// Remove `id` and all of its descendants. Returns the removed ids in
/// pre-order, `id` first.
///
/// Scenes go through the same path; removing one also drops it from
/// `scenes_ref` and moves the entry scene to the next remaining scene.
///
/// # Errors
/// `NodeNotFound` if `id` is not in the document.
pub fn remove(document: &mut Document, id: NodeId) -> Result<Vec<NodeId>, DocumentError> {
    if !document.contains(id) {
        return Err(DocumentError::NodeNotFound(id));
    }

    let mut removed = Vec::new();
    let mut stack = vec![id];
    while let Some(next) = stack.pop() {
        if removed.contains(&next) {
            continue;
        }
        removed.push(next);
        stack.extend(document.children_of(next).iter().rev().copied());
    }

    detach(document, id);
    for gone in &removed {
        document.nodes.remove(gone);
        document.links.remove(gone);
    }

    if document.scenes_ref.contains(&id) {
        document.scenes_ref.retain(|s| *s != id);
        if document.entry_scene_id == Some(id) {
            document.entry_scene_id = document.scenes_ref.first().copied();
        }
    }

    log::debug!("removed {id} ({} node(s))", removed.len());
    Ok(removed)
}

/// Reparent `id` under `new_parent` at `index` (clamped, `None` appends).
///
/// # Errors
/// - `NodeNotFound` / `ParentNotFound` for unknown ids.
/// - `NestedScene` when moving a scene.
/// - `Cycle` when `new_parent` is `id` or one of its descendants.
/// - `SingleChildScene` when the target scene is already occupied.
pub fn move_to(
    document: &mut Document,
    id: NodeId,
    new_parent: NodeId,
    index: Option<usize>,
) -> Result<DocumentContext, DocumentError> {
    let node = document.get(id).ok_or(DocumentError::NodeNotFound(id))?;
    if node.is_scene() {
        return Err(DocumentError::NestedScene(id));
    }
    let target = document
        .get(new_parent)
        .ok_or(DocumentError::ParentNotFound(new_parent))?;

    let ctx = DocumentContext::new(document);
    if new_parent == id || ctx.is_ancestor_of(id, new_parent) {
        return Err(DocumentError::Cycle(id));
    }
    let current_parent = ctx.get_parent_id(id);
    if let Some(constraints) = target.scene_constraints()
        && constraints.children == ChildrenConstraint::Single
        && current_parent != Some(new_parent)
        && !document.children_of(new_parent).is_empty()
    {
        return Err(DocumentError::SingleChildScene(new_parent));
    }

    detach(document, id);
    let siblings = document.links.entry(new_parent).or_default();
    let at = index.unwrap_or(siblings.len()).min(siblings.len());
    siblings.insert(at, id);

    Ok(DocumentContext::new(document))
}

/// Unlink `id` from whichever parent lists it. Empty child lists are dropped.
fn detach(document: &mut Document, id: NodeId) {
    let mut emptied = None;
    for (&parent, children) in document.links.iter_mut() {
        if let Some(pos) = children.iter().position(|c| *c == id) {
            children.remove(pos);
            if children.is_empty() {
                emptied = Some(parent);
            }
            break;
        }
    }
    if let Some(parent) = emptied {
        document.links.remove(&parent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Node, NodeKind};
    use pretty_assertions::assert_eq;

    fn id(s: &str) -> NodeId {
        NodeId::intern(s)
    }

    fn group(s: &str) -> Node {
        Node::new(id(s), NodeKind::Group)
    }

    fn document(constraint: ChildrenConstraint) -> Document {
        let mut doc = Document::new();
        doc.add_scene(Node::scene(id("tree-scene"), "Page", constraint));
        doc
    }

    fn fragment(root: &str, children: &[&str]) -> SubDocument {
        let mut sub = SubDocument::single(group(root));
        for c in children {
            sub.nodes.insert(id(c), group(c));
        }
        if !children.is_empty() {
            sub.links
                .insert(id(root), children.iter().map(|c| id(c)).collect());
        }
        sub
    }

    // ─── Import ──────────────────────────────────────────────────────────

    #[test]
    fn import_appends_by_default() {
        let mut doc = document(ChildrenConstraint::Multiple);
        import(&mut doc, fragment("tree-i1", &[]), id("tree-scene"), None).unwrap();
        let ctx = import(&mut doc, fragment("tree-i2", &["tree-i2c"]), id("tree-scene"), None)
            .unwrap();
        assert_eq!(doc.children_of(id("tree-scene")), &[id("tree-i1"), id("tree-i2")]);
        assert_eq!(ctx.get_parent_id(id("tree-i2c")), Some(id("tree-i2")));
        assert_eq!(doc.validate(), Ok(()));
    }

    #[test]
    fn import_clamps_index() {
        let mut doc = document(ChildrenConstraint::Multiple);
        import(&mut doc, fragment("tree-j1", &[]), id("tree-scene"), None).unwrap();
        import(&mut doc, fragment("tree-j2", &[]), id("tree-scene"), Some(0)).unwrap();
        import(&mut doc, fragment("tree-j3", &[]), id("tree-scene"), Some(99)).unwrap();
        assert_eq!(
            doc.children_of(id("tree-scene")),
            &[id("tree-j2"), id("tree-j1"), id("tree-j3")]
        );
    }

    #[test]
    fn import_rejects_missing_parent_without_side_effects() {
        let mut doc = document(ChildrenConstraint::Multiple);
        let before = doc.clone();
        let err = import(&mut doc, fragment("tree-k1", &[]), id("tree-nowhere"), None);
        assert_eq!(err, Err(DocumentError::ParentNotFound(id("tree-nowhere"))));
        assert_eq!(doc, before);
    }

    #[test]
    fn import_rejects_id_conflict() {
        let mut doc = document(ChildrenConstraint::Multiple);
        import(&mut doc, fragment("tree-dup", &[]), id("tree-scene"), None).unwrap();
        let err = import(&mut doc, fragment("tree-dup", &[]), id("tree-scene"), None);
        assert_eq!(err, Err(DocumentError::IdConflict(id("tree-dup"))));
    }

    #[test]
    fn import_rejects_root_outside_fragment() {
        let mut doc = document(ChildrenConstraint::Multiple);
        let mut sub = fragment("tree-r1", &[]);
        sub.roots.push(id("tree-r-missing"));
        let err = import(&mut doc, sub, id("tree-scene"), None);
        assert_eq!(err, Err(DocumentError::RootNotInSubDocument(id("tree-r-missing"))));
    }

    #[test]
    fn import_rejects_link_with_unknown_parent() {
        let mut doc = document(ChildrenConstraint::Multiple);
        let mut sub = fragment("tree-l1", &[]);
        sub.links.insert(id("tree-l-ghost"), vec![id("tree-l1")]);
        let err = import(&mut doc, sub, id("tree-scene"), None);
        assert_eq!(err, Err(DocumentError::ParentNotFound(id("tree-l-ghost"))));
    }

    #[test]
    fn import_keeps_orphans() {
        let mut doc = document(ChildrenConstraint::Multiple);
        let mut sub = fragment("tree-o1", &[]);
        sub.nodes.insert(id("tree-o-loose"), group("tree-o-loose"));
        let ctx = import(&mut doc, sub, id("tree-scene"), None).unwrap();
        assert!(doc.contains(id("tree-o-loose")));
        assert!(ctx.contains(id("tree-o-loose")));
        assert_eq!(ctx.get_parent_id(id("tree-o-loose")), None);
    }

    #[test]
    fn single_child_scene_accepts_exactly_one() {
        let mut doc = document(ChildrenConstraint::Single);
        import(&mut doc, fragment("tree-s1", &[]), id("tree-scene"), None).unwrap();
        let err = import(&mut doc, fragment("tree-s2", &[]), id("tree-scene"), None);
        assert_eq!(err, Err(DocumentError::SingleChildScene(id("tree-scene"))));
        assert!(!doc.contains(id("tree-s2")));
    }

    #[test]
    fn single_child_scene_rejects_two_roots_at_once() {
        let mut doc = document(ChildrenConstraint::Single);
        let mut sub = fragment("tree-t1", &[]);
        sub.nodes.insert(id("tree-t2"), group("tree-t2"));
        sub.roots.push(id("tree-t2"));
        let err = import(&mut doc, sub, id("tree-scene"), None);
        assert_eq!(err, Err(DocumentError::SingleChildScene(id("tree-scene"))));
    }

    // ─── Remove ──────────────────────────────────────────────────────────

    #[test]
    fn remove_returns_subtree_preorder() {
        let mut doc = document(ChildrenConstraint::Multiple);
        import(
            &mut doc,
            fragment("tree-x", &["tree-x1", "tree-x2"]),
            id("tree-scene"),
            None,
        )
        .unwrap();
        import(&mut doc, fragment("tree-y", &[]), id("tree-scene"), None).unwrap();

        let removed = remove(&mut doc, id("tree-x")).unwrap();
        assert_eq!(removed, vec![id("tree-x"), id("tree-x1"), id("tree-x2")]);
        assert!(!doc.contains(id("tree-x1")));
        assert_eq!(doc.children_of(id("tree-scene")), &[id("tree-y")]);
        assert_eq!(doc.validate(), Ok(()));
    }

    #[test]
    fn remove_last_child_drops_link_entry() {
        let mut doc = document(ChildrenConstraint::Multiple);
        import(&mut doc, fragment("tree-z", &[]), id("tree-scene"), None).unwrap();
        remove(&mut doc, id("tree-z")).unwrap();
        assert!(!doc.links.contains_key(&id("tree-scene")));
    }

    #[test]
    fn remove_unknown_fails() {
        let mut doc = document(ChildrenConstraint::Multiple);
        assert_eq!(
            remove(&mut doc, id("tree-unknown")),
            Err(DocumentError::NodeNotFound(id("tree-unknown")))
        );
    }

    #[test]
    fn remove_scene_moves_entry() {
        let mut doc = document(ChildrenConstraint::Multiple);
        doc.add_scene(Node::scene(id("tree-scene-2"), "Two", ChildrenConstraint::Multiple));
        remove(&mut doc, id("tree-scene")).unwrap();
        assert_eq!(doc.scenes_ref, vec![id("tree-scene-2")]);
        assert_eq!(doc.entry_scene_id, Some(id("tree-scene-2")));
    }

    // ─── Move ────────────────────────────────────────────────────────────

    #[test]
    fn move_refuses_descendant_target() {
        let mut doc = document(ChildrenConstraint::Multiple);
        import(&mut doc, fragment("tree-m", &["tree-m1"]), id("tree-scene"), None).unwrap();
        assert_eq!(
            move_to(&mut doc, id("tree-m"), id("tree-m1"), None),
            Err(DocumentError::Cycle(id("tree-m")))
        );
    }

    #[test]
    fn move_reparents() {
        let mut doc = document(ChildrenConstraint::Multiple);
        import(&mut doc, fragment("tree-n", &["tree-n1"]), id("tree-scene"), None).unwrap();
        let ctx = move_to(&mut doc, id("tree-n1"), id("tree-scene"), Some(0)).unwrap();
        assert_eq!(ctx.get_parent_id(id("tree-n1")), Some(id("tree-scene")));
        assert_eq!(doc.children_of(id("tree-scene")), &[id("tree-n1"), id("tree-n")]);
        assert!(doc.children_of(id("tree-n")).is_empty());
    }
}
