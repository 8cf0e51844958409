use crate::id::NodeId;
use thiserror::Error;

/// Structural failures of the document graph.
///
/// All variants except [`DocumentError::SingleChildScene`] are invariant
/// violations: the caller handed in a state or request that cannot be
/// applied without corrupting the graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    #[error("parent node {0} not found")]
    ParentNotFound(NodeId),

    #[error("node id {0} already exists in the document")]
    IdConflict(NodeId),

    #[error("sub-document root {0} is not among its nodes")]
    RootNotInSubDocument(NodeId),

    #[error("link references unknown node {0}")]
    DanglingLink(NodeId),

    #[error("node {0} has more than one parent")]
    MultipleParents(NodeId),

    #[error("node {0} is its own ancestor")]
    Cycle(NodeId),

    #[error("scene {0} cannot be nested under another node")]
    NestedScene(NodeId),

    #[error("scene {0} only accepts a single child")]
    SingleChildScene(NodeId),
}

impl DocumentError {
    /// Expected refusals, as opposed to corrupted state.
    pub fn is_policy_refusal(&self) -> bool {
        matches!(self, DocumentError::SingleChildScene(_))
    }
}
