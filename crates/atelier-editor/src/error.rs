use atelier_core::{DocumentError, NodeId, Rect};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditorError {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("no active scene")]
    NoActiveScene,

    #[error("node {0} is not removable")]
    NotRemovable(NodeId),

    #[error("active duplication is stale: origins {origins:?} and clones {clones:?} differ in size")]
    DuplicationMismatch { origins: Rect, clones: Rect },
}

impl EditorError {
    /// Expected refusals the UI may surface, as opposed to corrupted state.
    pub fn is_policy_refusal(&self) -> bool {
        match self {
            EditorError::Document(e) => e.is_policy_refusal(),
            EditorError::NotRemovable(_) => true,
            _ => false,
        }
    }
}
