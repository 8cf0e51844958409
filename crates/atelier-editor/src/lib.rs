pub mod config;
pub mod error;
pub mod fonts;
pub mod methods;
pub mod reducer;
pub mod selection;
pub mod shortcuts;
pub mod state;
pub mod tools;

pub use config::{EditorConfig, NotRemovablePolicy};
pub use error::EditorError;
pub use fonts::FontRegistry;
pub use methods::SelectMode;
pub use reducer::{Action, Target, reduce};
pub use selection::{
    DragStartAction, PointerDownContext, SelectionChange, SelectionDecision,
    decide_click_selection, decide_drag_start_action, decide_pointer_down_selection,
};
pub use shortcuts::{ShortcutAction, ShortcutMap};
pub use state::{ActiveDuplication, EditorState};
pub use tools::{ContentEditMode, ContentEditModeKind, ToolMode, ToolValidity};
