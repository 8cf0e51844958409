//! Pointer-gesture selection decisions.
//!
//! A press may change the selection right away, or defer the change to the
//! click so that a drag can still move what is already selected. These are
//! pure functions over a caller-supplied snapshot; applying the result is
//! the caller's job (see [`crate::methods::apply_selection_change`]).

use atelier_core::{DocumentContext, NodeId};

/// A selection edit, as produced by a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionChange {
    Reset(NodeId),
    Add(NodeId),
    Toggle(NodeId),
    Clear,
}

impl SelectionChange {
    /// The node the change is keyed on; `None` for [`SelectionChange::Clear`].
    pub fn node_id(&self) -> Option<NodeId> {
        match self {
            SelectionChange::Reset(id) | SelectionChange::Add(id) | SelectionChange::Toggle(id) => {
                Some(*id)
            }
            SelectionChange::Clear => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionDecision {
    #[default]
    None,
    /// Apply on pointer-down.
    Immediate(SelectionChange),
    /// Apply on click, if no drag happened and the click lands on the same
    /// target.
    Deferred(SelectionChange),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragStartAction {
    /// Move the selection.
    Drag,
    /// Rubber-band select.
    Marquee,
}

/// Snapshot consulted by the pointer decisions.
#[derive(Debug, Clone, Copy)]
pub struct PointerDownContext<'a> {
    pub hovered_node_id: Option<NodeId>,
    pub shift_key: bool,
    pub selection: &'a [NodeId],
    pub context: &'a DocumentContext,
    /// Whether the pointer is on empty space inside the selection's
    /// bounding overlay. `None` when there is no overlay.
    pub is_empty_space_within_overlay: Option<bool>,
}

impl PointerDownContext<'_> {
    fn within_overlay(&self) -> bool {
        self.is_empty_space_within_overlay == Some(true)
    }
}

pub fn decide_pointer_down_selection(ctx: &PointerDownContext<'_>) -> SelectionDecision {
    let Some(hovered) = ctx.hovered_node_id else {
        return match (ctx.shift_key, ctx.within_overlay()) {
            (true, _) => SelectionDecision::None,
            (false, true) => SelectionDecision::Deferred(SelectionChange::Clear),
            (false, false) => SelectionDecision::Immediate(SelectionChange::Clear),
        };
    };

    let is_selected = ctx.selection.contains(&hovered);
    let under_selected = !is_selected
        && ctx
            .selection
            .iter()
            .any(|&s| ctx.context.is_ancestor_of(s, hovered));

    if under_selected {
        return SelectionDecision::Deferred(SelectionChange::Reset(hovered));
    }

    match (is_selected, ctx.shift_key) {
        (true, true) => SelectionDecision::Deferred(SelectionChange::Toggle(hovered)),
        (true, false) => SelectionDecision::Deferred(SelectionChange::Reset(hovered)),
        (false, true) => SelectionDecision::Immediate(SelectionChange::Add(hovered)),
        (false, false) => SelectionDecision::Immediate(SelectionChange::Reset(hovered)),
    }
}

/// Promote a deferred decision to an immediate one when the click target
/// matches what was recorded on pointer-down. `clicked` is `None` for a
/// click on empty space.
pub fn decide_click_selection(
    deferred: SelectionDecision,
    clicked: Option<NodeId>,
) -> SelectionDecision {
    match deferred {
        SelectionDecision::Deferred(change) if change.node_id() == clicked => {
            SelectionDecision::Immediate(change)
        }
        _ => SelectionDecision::None,
    }
}

pub fn decide_drag_start_action(ctx: &PointerDownContext<'_>) -> DragStartAction {
    if ctx.hovered_node_id.is_some() {
        return DragStartAction::Drag;
    }
    if ctx.selection.is_empty() {
        return DragStartAction::Marquee;
    }
    if ctx.within_overlay() || !ctx.shift_key {
        DragStartAction::Drag
    } else {
        DragStartAction::Marquee
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_core::{ChildrenConstraint, Document, Node, NodeKind};

    fn doc() -> (Document, DocumentContext) {
        let mut doc = Document::new();
        doc.add_scene(Node::scene(
            NodeId::intern("sel-scene"),
            "s",
            ChildrenConstraint::Multiple,
        ));
        for (parent, child) in [("sel-scene", "sel-a"), ("sel-a", "sel-b"), ("sel-scene", "sel-c")] {
            let id = NodeId::intern(child);
            doc.nodes.insert(id, Node::new(id, NodeKind::Group));
            doc.links.entry(NodeId::intern(parent)).or_default().push(id);
        }
        let ctx = DocumentContext::new(&doc);
        (doc, ctx)
    }

    fn ctx<'a>(
        context: &'a DocumentContext,
        hovered: Option<&str>,
        shift: bool,
        selection: &'a [NodeId],
        overlay: Option<bool>,
    ) -> PointerDownContext<'a> {
        PointerDownContext {
            hovered_node_id: hovered.map(NodeId::intern),
            shift_key: shift,
            selection,
            context,
            is_empty_space_within_overlay: overlay,
        }
    }

    #[test]
    fn descendant_of_selected_defers_reset_even_with_shift() {
        let (_, context) = doc();
        let sel = [NodeId::intern("sel-a")];
        for shift in [false, true] {
            let decision = decide_pointer_down_selection(&ctx(&context, Some("sel-b"), shift, &sel, None));
            assert_eq!(
                decision,
                SelectionDecision::Deferred(SelectionChange::Reset(NodeId::intern("sel-b")))
            );
        }
    }

    #[test]
    fn empty_space_rows() {
        let (_, context) = doc();
        let sel = [NodeId::intern("sel-a")];
        assert_eq!(
            decide_pointer_down_selection(&ctx(&context, None, false, &sel, Some(true))),
            SelectionDecision::Deferred(SelectionChange::Clear)
        );
        assert_eq!(
            decide_pointer_down_selection(&ctx(&context, None, false, &sel, None)),
            SelectionDecision::Immediate(SelectionChange::Clear)
        );
        assert_eq!(
            decide_pointer_down_selection(&ctx(&context, None, true, &sel, Some(true))),
            SelectionDecision::None
        );
    }

    #[test]
    fn click_mismatch_is_none() {
        let deferred = SelectionDecision::Deferred(SelectionChange::Toggle(NodeId::intern("sel-a")));
        assert_eq!(
            decide_click_selection(deferred, Some(NodeId::intern("sel-c"))),
            SelectionDecision::None
        );
        assert_eq!(decide_click_selection(deferred, None), SelectionDecision::None);
        assert_eq!(
            decide_click_selection(SelectionDecision::Immediate(SelectionChange::Clear), None),
            SelectionDecision::None
        );
    }

    #[test]
    fn shift_drag_outside_overlay_is_marquee() {
        let (_, context) = doc();
        let sel = [NodeId::intern("sel-c")];
        assert_eq!(
            decide_drag_start_action(&ctx(&context, None, true, &sel, Some(false))),
            DragStartAction::Marquee
        );
        assert_eq!(
            decide_drag_start_action(&ctx(&context, None, false, &sel, Some(false))),
            DragStartAction::Drag
        );
        assert_eq!(
            decide_drag_start_action(&ctx(&context, None, true, &sel, Some(true))),
            DragStartAction::Drag
        );
        assert_eq!(
            decide_drag_start_action(&ctx(&context, None, false, &[], None)),
            DragStartAction::Marquee
        );
    }
}
