//! Tool modes and the content-edit-mode gate that decides which tools are
//! selectable.
//!
//! The editor is always in exactly one [`ToolMode`]. While a node is being
//! edited in place ([`ContentEditMode`]), only a mode-specific subset of
//! tools may be picked; everything else is ignored.

use crate::state::EditorState;
use atelier_core::{NodeId, NodeKind, WidthProfile};
use serde::{Deserialize, Serialize};

// ─── Tool modes ──────────────────────────────────────────────────────────

/// Node kinds the insert tool can place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertNodeKind {
    Text,
    Image,
    Container,
    Rectangle,
    Ellipse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawTool {
    Line,
    Pencil,
}

/// The active pointer tool, with its tool-specific options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ToolMode {
    #[default]
    Cursor,
    Hand,
    Zoom,
    Lasso,
    Bend,
    Width,
    Path,
    Insert {
        node: InsertNodeKind,
    },
    Draw {
        tool: DrawTool,
    },
    Brush,
    Eraser,
    FloodFill,
}

/// [`ToolMode`] without its options, for allow-list lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    Cursor,
    Hand,
    Zoom,
    Lasso,
    Bend,
    Width,
    Path,
    Insert,
    Draw,
    Brush,
    Eraser,
    FloodFill,
}

impl ToolMode {
    pub fn kind(&self) -> ToolKind {
        match self {
            ToolMode::Cursor => ToolKind::Cursor,
            ToolMode::Hand => ToolKind::Hand,
            ToolMode::Zoom => ToolKind::Zoom,
            ToolMode::Lasso => ToolKind::Lasso,
            ToolMode::Bend => ToolKind::Bend,
            ToolMode::Width => ToolKind::Width,
            ToolMode::Path => ToolKind::Path,
            ToolMode::Insert { .. } => ToolKind::Insert,
            ToolMode::Draw { .. } => ToolKind::Draw,
            ToolMode::Brush => ToolKind::Brush,
            ToolMode::Eraser => ToolKind::Eraser,
            ToolMode::FloodFill => ToolKind::FloodFill,
        }
    }
}

// ─── Content edit modes ──────────────────────────────────────────────────

/// In-place editing of a single node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentEditMode {
    Text {
        node_id: NodeId,
    },
    Vector {
        node_id: NodeId,
        #[serde(default)]
        selected_vertices: Vec<usize>,
    },
    /// Variable-width stroke editing. `initial_profile` is what the node
    /// carried on entry; `profile` is the working copy written back on exit.
    Width {
        node_id: NodeId,
        initial_profile: WidthProfile,
        profile: WidthProfile,
    },
    Bitmap {
        node_id: NodeId,
        image_ref: String,
    },
}

impl ContentEditMode {
    pub fn node_id(&self) -> NodeId {
        match self {
            ContentEditMode::Text { node_id }
            | ContentEditMode::Vector { node_id, .. }
            | ContentEditMode::Width { node_id, .. }
            | ContentEditMode::Bitmap { node_id, .. } => *node_id,
        }
    }

    pub fn kind(&self) -> ContentEditModeKind {
        match self {
            ContentEditMode::Text { .. } => ContentEditModeKind::Text,
            ContentEditMode::Vector { .. } => ContentEditModeKind::Vector,
            ContentEditMode::Width { .. } => ContentEditModeKind::Width,
            ContentEditMode::Bitmap { .. } => ContentEditModeKind::Bitmap,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentEditModeKind {
    None,
    Vector,
    Text,
    Bitmap,
    Width,
}

impl From<Option<&ContentEditMode>> for ContentEditModeKind {
    fn from(mode: Option<&ContentEditMode>) -> Self {
        mode.map_or(ContentEditModeKind::None, ContentEditMode::kind)
    }
}

/// Which allow-list to consult. Reverting is stricter than selecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolValidity {
    Select,
    Revert,
}

// ─── Validity ────────────────────────────────────────────────────────────

const VECTOR_TOOLS: &[ToolKind] = &[
    ToolKind::Cursor,
    ToolKind::Hand,
    ToolKind::Bend,
    ToolKind::Path,
    ToolKind::Lasso,
];

const WIDTH_TOOLS: &[ToolKind] = &[
    ToolKind::Cursor,
    ToolKind::Hand,
    ToolKind::Bend,
    ToolKind::Path,
    ToolKind::Lasso,
    ToolKind::Width,
];

const TEXT_TOOLS: &[ToolKind] = &[ToolKind::Cursor];

const BITMAP_TOOLS: &[ToolKind] = &[ToolKind::Brush, ToolKind::Eraser, ToolKind::FloodFill];

const NONE_SELECT_TOOLS: &[ToolKind] = &[
    ToolKind::Cursor,
    ToolKind::Hand,
    ToolKind::Zoom,
    ToolKind::Insert,
    ToolKind::Draw,
    ToolKind::Path,
];

const NONE_REVERT_TOOLS: &[ToolKind] = &[
    ToolKind::Cursor,
    ToolKind::Hand,
    ToolKind::Zoom,
    ToolKind::Insert,
    ToolKind::Draw,
];

/// Allow-list of tools under `mode`.
///
/// `width` is never listed for plain selection outside the width mode
/// itself; [`select_tool`] admits it as a mode transition from `vector`.
pub fn valid_tools_for_content_edit_mode(
    mode: ContentEditModeKind,
    validity: ToolValidity,
) -> &'static [ToolKind] {
    match (mode, validity) {
        (ContentEditModeKind::Vector, _) => VECTOR_TOOLS,
        (ContentEditModeKind::Width, _) => WIDTH_TOOLS,
        (ContentEditModeKind::Text, _) => TEXT_TOOLS,
        (ContentEditModeKind::Bitmap, _) => BITMAP_TOOLS,
        (ContentEditModeKind::None, ToolValidity::Select) => NONE_SELECT_TOOLS,
        (ContentEditModeKind::None, ToolValidity::Revert) => NONE_REVERT_TOOLS,
    }
}

pub fn is_valid_tool(mode: ContentEditModeKind, tool: ToolKind, validity: ToolValidity) -> bool {
    valid_tools_for_content_edit_mode(mode, validity).contains(&tool)
}

// ─── Transitions ─────────────────────────────────────────────────────────

/// Switch to `tool`, remembering the current one for [`revert_tool`].
///
/// Invalid tools for the current content-edit mode are ignored. Picking
/// `width` from vector editing enters width mode, seeding the working
/// profile from the node. Picking any other vector tool while in width mode
/// commits the profile back to the node and returns to vector mode.
pub fn select_tool(state: &mut EditorState, tool: ToolMode) {
    let mode = ContentEditModeKind::from(state.content_edit_mode.as_ref());

    if tool == ToolMode::Width {
        match &state.content_edit_mode {
            Some(ContentEditMode::Vector { node_id, .. }) => {
                let node_id = *node_id;
                let profile = width_profile_of(state, node_id);
                state.content_edit_mode = Some(ContentEditMode::Width {
                    node_id,
                    initial_profile: profile.clone(),
                    profile,
                });
                set_tool(state, tool);
            }
            Some(ContentEditMode::Width { .. }) => set_tool(state, tool),
            _ => log::debug!("width tool ignored outside vector editing"),
        }
        return;
    }

    if mode == ContentEditModeKind::Width {
        if !is_valid_tool(ContentEditModeKind::Vector, tool.kind(), ToolValidity::Select) {
            log::debug!("tool {:?} ignored in width mode", tool.kind());
            return;
        }
        leave_width_mode(state);
        set_tool(state, tool);
        return;
    }

    if !is_valid_tool(mode, tool.kind(), ToolValidity::Select) {
        log::debug!("tool {:?} ignored in {mode:?} mode", tool.kind());
        return;
    }
    set_tool(state, tool);
}

/// Restore the tool active before the last [`select_tool`], or `cursor` if
/// it is no longer valid under the current content-edit mode.
pub fn revert_tool(state: &mut EditorState) {
    let mode = ContentEditModeKind::from(state.content_edit_mode.as_ref());
    let previous = state.tool_previous.take();

    let restored = match previous {
        Some(tool) if is_valid_tool(mode, tool.kind(), ToolValidity::Revert) => tool,
        _ => ToolMode::Cursor,
    };

    if mode == ContentEditModeKind::Width && restored != ToolMode::Width {
        leave_width_mode(state);
    }
    state.tool = restored;
}

fn set_tool(state: &mut EditorState, tool: ToolMode) {
    if state.tool != tool {
        state.tool_previous = Some(state.tool);
    }
    state.tool = tool;
}

/// Write the working width profile back and drop to vector editing.
pub(crate) fn leave_width_mode(state: &mut EditorState) {
    let Some(ContentEditMode::Width {
        node_id, profile, ..
    }) = state.content_edit_mode.take()
    else {
        return;
    };

    if let Some(node) = state.document.get_mut(node_id)
        && let NodeKind::Vector { width_profile, .. } = &mut node.kind
    {
        *width_profile = if profile.stops.is_empty() {
            None
        } else {
            Some(profile)
        };
    }
    state.content_edit_mode = Some(ContentEditMode::Vector {
        node_id,
        selected_vertices: Vec::new(),
    });
}

fn width_profile_of(state: &EditorState, id: NodeId) -> WidthProfile {
    match state.document.get(id).map(|n| &n.kind) {
        Some(NodeKind::Vector {
            width_profile: Some(profile),
            ..
        }) => profile.clone(),
        _ => WidthProfile::default(),
    }
}
