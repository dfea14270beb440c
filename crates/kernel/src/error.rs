use clipview_common::{ComponentId, VectorError};

/// Errors from component lifecycle and property operations.
///
/// All of these are caller mistakes; none are transient.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SceneError {
    #[error("component id {0} is already in use in this scene")]
    DuplicateId(ComponentId),
    #[error("component {0} has been destroyed")]
    UseAfterDestroy(ComponentId),
    #[error("component {0} was already destroyed")]
    AlreadyDestroyed(ComponentId),
    #[error("component {child} cannot be owned by its own descendant {owner}")]
    OwnershipCycle {
        owner: ComponentId,
        child: ComponentId,
    },
    #[error("component {0} is not a section plane")]
    NotASectionPlane(ComponentId),
    #[error(transparent)]
    InvalidVector(#[from] VectorError),
}
