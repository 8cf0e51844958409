//! The command interface: every user-level action goes through [`reduce`].
//!
//! Actions run on a cloned draft of the state. The draft replaces the
//! current state only when the whole action succeeded, so callers never
//! observe a partially applied edit.

use crate::error::EditorError;
use crate::methods::{self, SelectMode};
use crate::state::EditorState;
use crate::tools::{self, ToolMode};
use atelier_core::{IdGenerator, Node, NodeId, NodePrototype, SubDocument, Vector2};
use serde::{Deserialize, Serialize};

/// What an action applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum Target {
    #[default]
    Selection,
    Node(NodeId),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    Select {
        #[serde(default)]
        mode: SelectMode,
        ids: Vec<NodeId>,
    },
    ClearSelection,
    Hover {
        id: Option<NodeId>,
    },
    Insert {
        parent: Option<NodeId>,
        node: Node,
    },
    InsertSubDocument {
        parent: Option<NodeId>,
        document: SubDocument,
    },
    Delete {
        #[serde(default)]
        target: Target,
    },
    Duplicate {
        #[serde(default)]
        target: Target,
    },
    Translate {
        #[serde(default)]
        target: Target,
        delta: Vector2,
    },
    Paste {
        prototypes: Vec<NodePrototype>,
        #[serde(default)]
        target: Target,
    },
    SelectTool {
        tool: ToolMode,
    },
    RevertTool,
    EnterContentEditMode {
        id: NodeId,
    },
    ExitContentEditMode,
}

impl Action {
    /// Whether the action edits the document rather than editor state.
    pub fn mutates_document(&self) -> bool {
        matches!(
            self,
            Action::Insert { .. }
                | Action::InsertSubDocument { .. }
                | Action::Delete { .. }
                | Action::Duplicate { .. }
                | Action::Translate { .. }
                | Action::Paste { .. }
        )
    }
}

fn resolve(state: &EditorState, target: Target) -> Vec<NodeId> {
    match target {
        Target::Selection => state.selection.clone(),
        Target::Node(id) => vec![id],
    }
}

/// Apply `action` to a copy of `state` and return the new state.
///
/// # Errors
/// Any [`EditorError`] raised by the operation; `state` is untouched.
pub fn reduce(
    state: &EditorState,
    action: Action,
    ids: &mut dyn IdGenerator,
) -> Result<EditorState, EditorError> {
    let mut draft = state.clone();
    apply_to_draft(&mut draft, action, ids)?;
    Ok(draft)
}

impl EditorState {
    /// In-place form of [`reduce`]: on error `self` is left as it was.
    ///
    /// # Errors
    /// See [`reduce`].
    pub fn apply(&mut self, action: Action, ids: &mut dyn IdGenerator) -> Result<(), EditorError> {
        *self = reduce(self, action, ids)?;
        Ok(())
    }
}

fn apply_to_draft(
    draft: &mut EditorState,
    action: Action,
    ids: &mut dyn IdGenerator,
) -> Result<(), EditorError> {
    if !draft.config.editable && action.mutates_document() {
        log::debug!("read-only editor: ignored {action:?}");
        return Ok(());
    }

    match action {
        Action::Select { mode, ids: picked } => methods::select_node(draft, mode, &picked),
        Action::ClearSelection => methods::clear_selection(draft),
        Action::Hover { id } => methods::hover(draft, id),
        Action::Insert { parent, node } => {
            methods::insert_node(draft, parent, node)?;
        }
        Action::InsertSubDocument { parent, document } => {
            methods::insert_sub_document(draft, parent, document)?;
        }
        Action::Delete { target } => {
            let editing = draft.content_edit_mode.as_ref().map(|m| m.node_id());
            for id in draft.context.prune_nested_nodes(&resolve(draft, target)) {
                if Some(id) == editing {
                    log::debug!("delete: {id} is being edited, skipped");
                    continue;
                }
                // removing an earlier target may already have taken this one
                if draft.document.contains(id) {
                    methods::try_remove_node(draft, id)?;
                }
            }
        }
        Action::Duplicate { target } => {
            let targets = resolve(draft, target);
            methods::duplicate_nodes(draft, &targets, ids)?;
        }
        Action::Translate { target, delta } => {
            let targets = resolve(draft, target);
            methods::translate_nodes(draft, &targets, delta);
        }
        Action::Paste { prototypes, target } => {
            let around = resolve(draft, target);
            methods::paste(draft, &prototypes, &around, ids)?;
        }
        Action::SelectTool { tool } => tools::select_tool(draft, tool),
        Action::RevertTool => tools::revert_tool(draft),
        Action::EnterContentEditMode { id } => {
            methods::enter_content_edit_mode(draft, id)?;
        }
        Action::ExitContentEditMode => methods::exit_content_edit_mode(draft)?,
    }

    if draft.config.debug
        && let Err(e) = draft.document.validate()
    {
        log::error!("document invariant violated after action: {e}");
        return Err(e.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use atelier_core::{ChildrenConstraint, Document, NodeKind, SequentialIds};

    fn state(config: EditorConfig) -> EditorState {
        let mut doc = Document::new();
        doc.add_scene(Node::scene(
            NodeId::intern("r-scene"),
            "Page",
            ChildrenConstraint::Multiple,
        ));
        EditorState::new(doc, config).unwrap()
    }

    #[test]
    fn failed_action_leaves_state_untouched() {
        let s = state(EditorConfig::default());
        let mut ids = SequentialIds::new("r");
        let err = reduce(
            &s,
            Action::Insert {
                parent: Some(NodeId::intern("r-missing")),
                node: Node::new(NodeId::intern("r-new"), NodeKind::Group),
            },
            &mut ids,
        )
        .unwrap_err();
        assert!(matches!(err, EditorError::Document(_)));
        assert!(!s.document.contains(NodeId::intern("r-new")));
    }

    #[test]
    fn read_only_ignores_mutations() {
        let mut s = state(EditorConfig {
            editable: false,
            ..EditorConfig::default()
        });
        let mut ids = SequentialIds::new("r-ro");
        s.apply(
            Action::Insert {
                parent: None,
                node: Node::new(NodeId::intern("r-ro-node"), NodeKind::Group),
            },
            &mut ids,
        )
        .unwrap();
        assert!(!s.document.contains(NodeId::intern("r-ro-node")));
    }

    #[test]
    fn action_json_shape() {
        let action: Action =
            serde_json::from_str(r#"{ "type": "delete", "target": { "type": "node", "id": "r-x" } }"#)
                .unwrap();
        assert_eq!(
            action,
            Action::Delete {
                target: Target::Node(NodeId::intern("r-x"))
            }
        );
        let action: Action = serde_json::from_str(r#"{ "type": "duplicate" }"#).unwrap();
        assert_eq!(action, Action::Duplicate { target: Target::Selection });
    }
}
