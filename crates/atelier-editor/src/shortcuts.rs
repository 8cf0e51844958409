//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic [`ShortcutAction`]s, and those to
//! reducer [`Action`]s where the editor can act on its own. Clipboard
//! shortcuts resolve but map to no action: the host owns the system
//! clipboard and goes through `atelier-io` for the payload.

use crate::methods::SelectMode;
use crate::reducer::{Action, Target};
use crate::state::EditorState;
use crate::tools::{DrawTool, InsertNodeKind, ToolMode};
use atelier_core::Vector2;

/// Nudge distance for arrow keys, and with shift held.
pub const NUDGE: f64 = 1.0;
pub const NUDGE_LARGE: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    // ── Tools ──
    Tool(ToolMode),
    /// Back to the tool before the last switch.
    RevertTool,

    // ── Edit ──
    Delete,
    Duplicate,
    Copy,
    Cut,
    Paste,
    SelectAll,
    /// Leave content editing, or clear the selection.
    Escape,
    /// Edit the selected node in place.
    EnterEdit,

    // ── Move ──
    Nudge { dx: i8, dy: i8, large: bool },
}

/// Resolves key events into shortcut actions.
///
/// `meta` (⌘ on macOS) and `ctrl` are interchangeable.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"v"`, `"Delete"`).
    /// Returns `None` if the combo has no binding.
    pub fn resolve(
        key: &str,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
    ) -> Option<ShortcutAction> {
        let cmd = ctrl || meta;

        if let Some(nudge) = Self::arrow(key, shift) {
            return (!cmd && !alt).then_some(nudge);
        }

        if cmd {
            return match key {
                "d" | "D" => Some(ShortcutAction::Duplicate),
                "c" | "C" => Some(ShortcutAction::Copy),
                "x" | "X" => Some(ShortcutAction::Cut),
                "v" | "V" => Some(ShortcutAction::Paste),
                "a" | "A" => Some(ShortcutAction::SelectAll),
                _ => None,
            };
        }

        if alt {
            return None;
        }

        if shift {
            return match key {
                "p" | "P" => Some(ShortcutAction::Tool(ToolMode::Draw {
                    tool: DrawTool::Pencil,
                })),
                _ => None,
            };
        }

        let tool = |t| Some(ShortcutAction::Tool(t));
        let insert = |node| tool(ToolMode::Insert { node });
        match key {
            "v" | "V" => tool(ToolMode::Cursor),
            "h" | "H" => tool(ToolMode::Hand),
            "z" | "Z" => tool(ToolMode::Zoom),
            "q" | "Q" => tool(ToolMode::Lasso),
            "p" | "P" => tool(ToolMode::Path),
            "l" | "L" => tool(ToolMode::Draw {
                tool: DrawTool::Line,
            }),
            "b" | "B" => tool(ToolMode::Brush),
            "e" | "E" => tool(ToolMode::Eraser),
            "g" | "G" => tool(ToolMode::FloodFill),
            "r" | "R" => insert(InsertNodeKind::Rectangle),
            "o" | "O" => insert(InsertNodeKind::Ellipse),
            "t" | "T" => insert(InsertNodeKind::Text),
            "f" | "F" => insert(InsertNodeKind::Container),
            "Tab" => Some(ShortcutAction::RevertTool),
            "Delete" | "Backspace" => Some(ShortcutAction::Delete),
            "Escape" => Some(ShortcutAction::Escape),
            "Enter" => Some(ShortcutAction::EnterEdit),
            _ => None,
        }
    }

    fn arrow(key: &str, large: bool) -> Option<ShortcutAction> {
        let (dx, dy) = match key {
            "ArrowLeft" => (-1, 0),
            "ArrowRight" => (1, 0),
            "ArrowUp" => (0, -1),
            "ArrowDown" => (0, 1),
            _ => return None,
        };
        Some(ShortcutAction::Nudge { dx, dy, large })
    }
}

impl ShortcutAction {
    /// The reducer action this shortcut means in `state`, if any.
    pub fn to_action(self, state: &EditorState) -> Option<Action> {
        match self {
            ShortcutAction::Tool(tool) => Some(Action::SelectTool { tool }),
            ShortcutAction::RevertTool => Some(Action::RevertTool),
            ShortcutAction::Delete => Some(Action::Delete {
                target: Target::Selection,
            }),
            ShortcutAction::Duplicate => Some(Action::Duplicate {
                target: Target::Selection,
            }),
            ShortcutAction::Copy | ShortcutAction::Cut | ShortcutAction::Paste => None,
            ShortcutAction::SelectAll => {
                let scene = state.scene_id?;
                Some(Action::Select {
                    mode: SelectMode::Reset,
                    ids: state.context.get_children(scene).to_vec(),
                })
            }
            ShortcutAction::Escape if state.content_edit_mode.is_some() => {
                Some(Action::ExitContentEditMode)
            }
            ShortcutAction::Escape => Some(Action::ClearSelection),
            ShortcutAction::EnterEdit => match state.selection.as_slice() {
                [id] => Some(Action::EnterContentEditMode { id: *id }),
                _ => None,
            },
            ShortcutAction::Nudge { dx, dy, large } => {
                let step = if large { NUDGE_LARGE } else { NUDGE };
                Some(Action::Translate {
                    target: Target::Selection,
                    delta: Vector2::new(f64::from(dx) * step, f64::from(dy) * step),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use atelier_core::{ChildrenConstraint, Document, Node, NodeId};

    #[test]
    fn resolve_tool_shortcuts() {
        assert_eq!(
            ShortcutMap::resolve("v", false, false, false, false),
            Some(ShortcutAction::Tool(ToolMode::Cursor))
        );
        assert_eq!(
            ShortcutMap::resolve("r", false, false, false, false),
            Some(ShortcutAction::Tool(ToolMode::Insert {
                node: InsertNodeKind::Rectangle
            }))
        );
        assert_eq!(
            ShortcutMap::resolve("P", false, true, false, false),
            Some(ShortcutAction::Tool(ToolMode::Draw {
                tool: DrawTool::Pencil
            }))
        );
        assert_eq!(
            ShortcutMap::resolve("Tab", false, false, false, false),
            Some(ShortcutAction::RevertTool)
        );
    }

    #[test]
    fn resolve_edit_shortcuts() {
        assert_eq!(
            ShortcutMap::resolve("d", true, false, false, false),
            Some(ShortcutAction::Duplicate)
        );
        assert_eq!(
            ShortcutMap::resolve("d", false, false, false, true),
            Some(ShortcutAction::Duplicate)
        );
        assert_eq!(
            ShortcutMap::resolve("Backspace", false, false, false, false),
            Some(ShortcutAction::Delete)
        );
    }

    #[test]
    fn resolve_nudge() {
        assert_eq!(
            ShortcutMap::resolve("ArrowLeft", false, true, false, false),
            Some(ShortcutAction::Nudge {
                dx: -1,
                dy: 0,
                large: true
            })
        );
        assert_eq!(ShortcutMap::resolve("ArrowUp", true, false, false, false), None);
    }

    #[test]
    fn resolve_unbound() {
        assert_eq!(ShortcutMap::resolve("k", false, false, false, false), None);
        assert_eq!(ShortcutMap::resolve("v", false, false, true, false), None);
    }

    #[test]
    fn escape_depends_on_edit_mode() {
        let mut doc = Document::new();
        doc.add_scene(Node::scene(
            NodeId::intern("sc-scene"),
            "Page",
            ChildrenConstraint::Multiple,
        ));
        let state = EditorState::new(doc, EditorConfig::default()).unwrap();
        assert_eq!(
            ShortcutAction::Escape.to_action(&state),
            Some(Action::ClearSelection)
        );
        assert_eq!(ShortcutAction::Paste.to_action(&state), None);
        assert_eq!(
            ShortcutAction::Nudge {
                dx: 0,
                dy: 1,
                large: true
            }
            .to_action(&state),
            Some(Action::Translate {
                target: Target::Selection,
                delta: Vector2::new(0.0, 10.0)
            })
        );
    }
}
