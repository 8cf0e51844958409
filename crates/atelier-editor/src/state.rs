//! The editor state: the document, its derived context, and everything
//! the interaction layer tracks on top of it.

use crate::config::EditorConfig;
use crate::error::EditorError;
use crate::fonts::FontRegistry;
use crate::tools::{ContentEditMode, ToolMode};
use atelier_core::{Document, DocumentContext, DocumentQuery, NodeId};

/// Record of the last duplicate, used to continue an offset pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveDuplication {
    pub origins: Vec<NodeId>,
    pub clones: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct EditorState {
    pub document: Document,
    /// Rebuilt after every structural edit, never patched.
    pub context: DocumentContext,
    /// The scene being edited.
    pub scene_id: Option<NodeId>,
    /// Pruned: no entry is a descendant of another.
    pub selection: Vec<NodeId>,
    pub hovered_node_id: Option<NodeId>,
    pub content_edit_mode: Option<ContentEditMode>,
    pub tool: ToolMode,
    pub tool_previous: Option<ToolMode>,
    pub active_duplication: Option<ActiveDuplication>,
    pub fonts: FontRegistry,
    pub config: EditorConfig,
}

impl EditorState {
    /// Open `document` on its entry scene.
    ///
    /// # Errors
    /// Returns the first structural problem found in `document`.
    pub fn new(document: Document, config: EditorConfig) -> Result<Self, EditorError> {
        document.validate()?;
        let context = DocumentContext::new(&document);
        let scene_id = document.entry_scene_id;
        let mut state = Self {
            document,
            context,
            scene_id,
            selection: Vec::new(),
            hovered_node_id: None,
            content_edit_mode: None,
            tool: ToolMode::default(),
            tool_previous: None,
            active_duplication: None,
            fonts: FontRegistry::default(),
            config,
        };
        state.refresh_fonts();
        Ok(state)
    }

    pub fn query(&self) -> DocumentQuery<'_> {
        DocumentQuery::new(&self.document, &self.context)
    }

    /// Rebuild the context and font registry after a structural edit.
    pub(crate) fn rebuild(&mut self) {
        self.context = DocumentContext::new(&self.document);
        self.refresh_fonts();
    }

    pub(crate) fn refresh_fonts(&mut self) {
        let query = DocumentQuery::new(&self.document, &self.context);
        self.fonts.refresh(&query);
    }

    /// Scene to attach to when no parent is given.
    pub(crate) fn active_scene(&self) -> Result<NodeId, EditorError> {
        self.scene_id
            .filter(|id| self.document.is_scene(*id))
            .ok_or(EditorError::NoActiveScene)
    }
}
