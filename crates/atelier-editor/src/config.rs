//! Editor configuration.

use serde::{Deserialize, Serialize};

/// What to do when asked to delete a node that may not be deleted
/// (`removable == false`, or the only child of a single-child scene).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotRemovablePolicy {
    /// Leave the node alone and report "not handled".
    Ignore,
    /// Set `active = false` and report "handled".
    #[default]
    Deactivate,
    /// Remove it anyway.
    Force,
    /// Fail with [`crate::EditorError::NotRemovable`].
    Throw,
}

/// Configuration for an [`crate::EditorState`].
///
/// Missing keys fall back to the defaults below when parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Delete policy for non-removable nodes. Default: **deactivate**.
    pub when_not_removable: NotRemovablePolicy,

    /// When `false`, document-mutating actions leave the state unchanged.
    /// Default: **true**.
    pub editable: bool,

    /// Re-validate document invariants after every action and log
    /// violations. Default: **false**.
    pub debug: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            when_not_removable: NotRemovablePolicy::Deactivate,
            editable: true,
            debug: false,
        }
    }
}

impl EditorConfig {
    /// Parse a (possibly partial) JSON config object.
    ///
    /// # Errors
    /// Returns the parse error for malformed JSON or unknown policy names.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
