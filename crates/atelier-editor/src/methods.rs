//! State-level operations. Each takes the editor state by `&mut` and is
//! expected to run on a draft (see [`crate::reducer`]); none of them leave
//! the derived context stale on success.

use crate::config::NotRemovablePolicy;
use crate::error::EditorError;
use crate::selection::SelectionChange;
use crate::state::{ActiveDuplication, EditorState};
use crate::tools::{self, ContentEditMode, ContentEditModeKind, ToolMode, ToolValidity};
use atelier_core::{
    ChildrenConstraint, IdGenerator, Node, NodeId, NodeKind, NodePrototype, SubDocument, Vector2,
    tree,
};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeSet;

// ─── Selection ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectMode {
    #[default]
    Reset,
    Add,
    Toggle,
}

/// Edit the selection. Unknown ids are dropped and the result is pruned of
/// nested entries. `Reset` also ends any active duplication chain.
pub fn select_node(state: &mut EditorState, mode: SelectMode, ids: &[NodeId]) {
    let ids: Vec<NodeId> = ids
        .iter()
        .copied()
        .filter(|id| state.document.contains(*id))
        .collect();

    let next = match mode {
        SelectMode::Reset => ids,
        SelectMode::Add => {
            let mut next = state.selection.clone();
            next.extend(ids.into_iter().filter(|id| !state.selection.contains(id)));
            next
        }
        SelectMode::Toggle => {
            let mut next = state.selection.clone();
            for id in ids {
                if let Some(pos) = next.iter().position(|s| *s == id) {
                    next.remove(pos);
                } else {
                    next.push(id);
                }
            }
            next
        }
    };

    state.selection = state.context.prune_nested_nodes(&next);
    if mode == SelectMode::Reset {
        state.active_duplication = None;
    }
}

pub fn clear_selection(state: &mut EditorState) {
    state.selection.clear();
    state.active_duplication = None;
}

/// Apply a decision from [`crate::selection`].
pub fn apply_selection_change(state: &mut EditorState, change: SelectionChange) {
    match change {
        SelectionChange::Reset(id) => select_node(state, SelectMode::Reset, &[id]),
        SelectionChange::Add(id) => select_node(state, SelectMode::Add, &[id]),
        SelectionChange::Toggle(id) => select_node(state, SelectMode::Toggle, &[id]),
        SelectionChange::Clear => clear_selection(state),
    }
}

pub fn hover(state: &mut EditorState, id: Option<NodeId>) {
    state.hovered_node_id = id.filter(|id| state.document.contains(*id));
}

// ─── Insert ──────────────────────────────────────────────────────────────

/// Attach a single node under `parent`, or the active scene when `None`.
///
/// # Errors
/// See [`insert_sub_document`].
pub fn insert_node(
    state: &mut EditorState,
    parent: Option<NodeId>,
    node: Node,
) -> Result<NodeId, EditorError> {
    let id = node.id;
    insert_sub_document(state, parent, SubDocument::single(node))?;
    Ok(id)
}

/// Attach a packed fragment under `parent` (or the active scene) and
/// return its root ids.
///
/// # Errors
/// - `NoActiveScene` when `parent` is `None` and no scene is open.
/// - Any [`atelier_core::DocumentError`] from the import, including the
///   single-child refusal.
pub fn insert_sub_document(
    state: &mut EditorState,
    parent: Option<NodeId>,
    sub: SubDocument,
) -> Result<Vec<NodeId>, EditorError> {
    let parent = match parent {
        Some(id) => id,
        None => state.active_scene()?,
    };
    let roots = sub.roots.clone();
    state.context = tree::import(&mut state.document, sub, parent, None)?;
    state.refresh_fonts();
    log::debug!("inserted {} root(s) under {parent}", roots.len());
    Ok(roots)
}

// ─── Delete ──────────────────────────────────────────────────────────────

fn is_sole_child_of_single_scene(state: &EditorState, id: NodeId) -> bool {
    state
        .context
        .get_parent_id(id)
        .and_then(|p| state.document.get(p))
        .and_then(Node::scene_constraints)
        .is_some_and(|c| c.children == ChildrenConstraint::Single)
}

/// Remove `id` and its subtree, honoring the not-removable policy.
///
/// Returns whether the request was handled (removed or deactivated).
///
/// # Errors
/// - `NotRemovable` under the `throw` policy.
/// - `NodeNotFound` for unknown ids.
pub fn try_remove_node(state: &mut EditorState, id: NodeId) -> Result<bool, EditorError> {
    let node = state
        .document
        .get(id)
        .ok_or(atelier_core::DocumentError::NodeNotFound(id))?;

    if !node.removable || is_sole_child_of_single_scene(state, id) {
        match state.config.when_not_removable {
            NotRemovablePolicy::Ignore => {
                log::debug!("remove {id}: not removable, ignored");
                return Ok(false);
            }
            NotRemovablePolicy::Deactivate => {
                if let Some(node) = state.document.get_mut(id) {
                    node.active = false;
                }
                state.refresh_fonts();
                log::debug!("remove {id}: not removable, deactivated");
                return Ok(true);
            }
            NotRemovablePolicy::Throw => return Err(EditorError::NotRemovable(id)),
            NotRemovablePolicy::Force => log::debug!("remove {id}: not removable, forced"),
        }
    }

    let removed = tree::remove(&mut state.document, id)?;
    let removed: BTreeSet<NodeId> = removed.into_iter().collect();

    state.selection.retain(|s| !removed.contains(s));
    if state.hovered_node_id.is_some_and(|h| removed.contains(&h)) {
        state.hovered_node_id = None;
    }
    state.content_edit_mode = None;
    state.tool = ToolMode::Cursor;
    if let Some(dup) = &state.active_duplication
        && dup
            .origins
            .iter()
            .chain(&dup.clones)
            .any(|n| removed.contains(n))
    {
        state.active_duplication = None;
    }
    if state.scene_id.is_some_and(|s| removed.contains(&s)) {
        state.scene_id = state.document.entry_scene_id;
    }

    state.rebuild();
    Ok(true)
}

// ─── Duplicate ───────────────────────────────────────────────────────────

/// Offset to apply when duplicating `targets`.
///
/// When `targets` is exactly the clone set of the previous duplicate, the
/// previous origin→clone offset is repeated. Otherwise `None`.
///
/// # Errors
/// `DuplicationMismatch` when origins and clones no longer have the same
/// bounding size, i.e. the chain was broken by an edit in between.
pub fn repeating_translation_delta(
    state: &EditorState,
    targets: &[NodeId],
) -> Result<Option<Vector2>, EditorError> {
    let Some(dup) = &state.active_duplication else {
        return Ok(None);
    };
    let clones: BTreeSet<NodeId> = dup.clones.iter().copied().collect();
    let current: BTreeSet<NodeId> = targets.iter().copied().collect();
    if clones != current {
        return Ok(None);
    }

    let query = state.query();
    let (Some(origins), Some(clones)) = (
        query.bounding_rect(&dup.origins),
        query.bounding_rect(&dup.clones),
    ) else {
        return Ok(None);
    };
    if !origins.same_size(&clones, 1.0) {
        return Err(EditorError::DuplicationMismatch { origins, clones });
    }
    Ok(Some(origins.delta_to(&clones)))
}

/// Clone each target next to itself, select the clones, and record the
/// duplication. Scenes and unknown ids are skipped.
///
/// # Errors
/// Propagates [`repeating_translation_delta`] and import failures.
pub fn duplicate_nodes(
    state: &mut EditorState,
    ids: &[NodeId],
    gen_ids: &mut dyn IdGenerator,
) -> Result<Vec<NodeId>, EditorError> {
    let targets: Vec<NodeId> = state
        .context
        .prune_nested_nodes(ids)
        .into_iter()
        .filter(|id| state.document.get(*id).is_some_and(|n| !n.is_scene()))
        .collect();
    if targets.is_empty() {
        return Ok(Vec::new());
    }

    let delta = repeating_translation_delta(state, &targets)?;

    let mut clones = Vec::with_capacity(targets.len());
    for &target in &targets {
        let Some(proto) = NodePrototype::snapshot(&state.document, &state.context, target) else {
            continue;
        };
        let Some(parent) = state.context.get_parent_id(target) else {
            log::warn!("duplicate {target}: node has no parent, skipped");
            continue;
        };
        let index = state
            .document
            .children_of(parent)
            .iter()
            .position(|c| *c == target)
            .map(|i| i + 1);

        let sub = proto.to_sub_document(gen_ids);
        let root = sub.roots[0];
        state.context = tree::import(&mut state.document, sub, parent, index)?;

        if let Some(delta) = delta
            && let Some(node) = state.document.get_mut(root)
        {
            node.geometry.left += delta.x;
            node.geometry.top += delta.y;
        }
        clones.push(root);
    }

    state.refresh_fonts();
    select_node(state, SelectMode::Reset, &clones);
    state.active_duplication = Some(ActiveDuplication {
        origins: targets,
        clones: clones.clone(),
    });
    log::debug!("duplicated {} node(s), delta {delta:?}", clones.len());
    Ok(clones)
}

// ─── Move ────────────────────────────────────────────────────────────────

/// Nudge nodes by `delta`. Nested and locked entries are skipped.
pub fn translate_nodes(state: &mut EditorState, ids: &[NodeId], delta: Vector2) {
    for id in state.context.prune_nested_nodes(ids) {
        match state.document.get_mut(id) {
            Some(node) if !node.locked && !node.is_scene() => {
                node.geometry.left += delta.x;
                node.geometry.top += delta.y;
            }
            _ => log::trace!("translate: skipped {id}"),
        }
    }
}

// ─── Clipboard ───────────────────────────────────────────────────────────

/// Prototypes of the current selection, in selection order.
pub fn selection_prototypes(state: &EditorState) -> Vec<NodePrototype> {
    state
        .selection
        .iter()
        .filter_map(|id| NodePrototype::snapshot(&state.document, &state.context, *id))
        .collect()
}

/// Where pasted content goes: containers take it directly, other nodes
/// hand it to their parent, and an empty selection means the scene.
fn paste_parents(
    state: &EditorState,
    around: &[NodeId],
) -> Result<SmallVec<[NodeId; 4]>, EditorError> {
    if around.is_empty() {
        return Ok(SmallVec::from_elem(state.active_scene()?, 1));
    }
    let mut parents: SmallVec<[NodeId; 4]> = SmallVec::new();
    for &id in around {
        let parent = match state.document.get(id) {
            Some(node) if node.kind.accepts_children() => Some(id),
            Some(_) => state.context.get_parent_id(id),
            None => None,
        };
        if let Some(parent) = parent
            && !parents.contains(&parent)
        {
            parents.push(parent);
        }
    }
    Ok(parents)
}

/// Materialize `prototypes` under each paste parent and select the result.
///
/// # Errors
/// `NoActiveScene` for an empty target without a scene; import failures.
pub fn paste(
    state: &mut EditorState,
    prototypes: &[NodePrototype],
    around: &[NodeId],
    gen_ids: &mut dyn IdGenerator,
) -> Result<Vec<NodeId>, EditorError> {
    let parents = paste_parents(state, around)?;
    let mut inserted = Vec::new();
    for parent in parents {
        for proto in prototypes {
            let sub = proto.to_sub_document(gen_ids);
            inserted.extend(insert_sub_document(state, Some(parent), sub)?);
        }
    }
    select_node(state, SelectMode::Reset, &inserted);
    state.tool = ToolMode::Cursor;
    Ok(inserted)
}

// ─── Content edit mode ───────────────────────────────────────────────────

/// Start in-place editing of `id`. Returns `false` (and changes nothing)
/// for locked nodes and kinds without an edit mode.
///
/// # Errors
/// See [`exit_content_edit_mode`], which runs first when another node is
/// being edited.
pub fn enter_content_edit_mode(state: &mut EditorState, id: NodeId) -> Result<bool, EditorError> {
    let Some(node) = state.document.get(id) else {
        return Ok(false);
    };
    if node.locked {
        return Ok(false);
    }
    let mode = match &node.kind {
        NodeKind::Text { .. } => ContentEditMode::Text { node_id: id },
        NodeKind::Vector { .. } => ContentEditMode::Vector {
            node_id: id,
            selected_vertices: Vec::new(),
        },
        NodeKind::Bitmap { image_ref } => ContentEditMode::Bitmap {
            node_id: id,
            image_ref: image_ref.clone(),
        },
        other => {
            log::debug!("no content edit mode for {}", other.type_name());
            return Ok(false);
        }
    };

    if state.content_edit_mode.is_some() {
        exit_content_edit_mode(state)?;
        if !state.document.contains(id) {
            return Ok(false);
        }
    }
    let kind = mode.kind();
    state.content_edit_mode = Some(mode);
    select_node(state, SelectMode::Reset, &[id]);
    if !tools::is_valid_tool(kind, state.tool.kind(), ToolValidity::Select) {
        state.tool = match kind {
            ContentEditModeKind::Bitmap => ToolMode::Brush,
            _ => ToolMode::Cursor,
        };
    }
    Ok(true)
}

/// Text nodes with no text and vector nodes without a single segment
/// between two vertices.
fn is_empty_content(node: &Node) -> bool {
    match &node.kind {
        NodeKind::Text { text, .. } => text.is_empty(),
        NodeKind::Vector { network, .. } => {
            network.segments.is_empty() || network.vertices.len() < 2
        }
        _ => false,
    }
}

/// Leave in-place editing, committing a pending width profile. A node
/// left empty by the edit is removed under the not-removable policy.
///
/// # Errors
/// `NotRemovable` when an empty node is kept by the `throw` policy.
pub fn exit_content_edit_mode(state: &mut EditorState) -> Result<(), EditorError> {
    tools::leave_width_mode(state);
    let edited = state.content_edit_mode.take().map(|mode| mode.node_id());
    if !tools::is_valid_tool(
        ContentEditModeKind::None,
        state.tool.kind(),
        ToolValidity::Select,
    ) {
        state.tool = ToolMode::Cursor;
    }

    if let Some(id) = edited
        && state.config.editable
        && state.document.get(id).is_some_and(is_empty_content)
    {
        log::debug!("exit edit {id}: empty, removing");
        try_remove_node(state, id)?;
    }
    Ok(())
}
