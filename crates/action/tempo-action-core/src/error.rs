//! Error types for action tree operations

use tempo_api_core::ValueKind;

use crate::ids::ActionId;

/// Errors reported synchronously by tree, binding and frame operations.
/// A failing operation leaves the tree unmodified.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ActionError {
    /// The action cannot become a child (already parented, bound, playing, or an ancestor)
    #[error("Illegal child action {child:?}: {reason}")]
    IllegalChild { child: ActionId, reason: &'static str },

    /// Targets can only be bound to root actions
    #[error("Cannot bind targets to non-root action {action:?}")]
    IllegalRoot { action: ActionId },

    /// All targets of an action must share a kind
    #[error("Action {action:?} can only be bound to targets of kind {expected}, got {actual}")]
    IllegalTargetKind {
        action: ActionId,
        expected: u32,
        actual: u32,
    },

    /// Unknown action handle
    #[error("Action not found: {action:?}")]
    ActionNotFound { action: ActionId },

    /// The host does not know this target
    #[error("Target not found: {target}")]
    TargetNotFound { target: u64 },

    /// Operation requires a spawn or sequence action
    #[error("Action {action:?} is not a group action")]
    NotAGroup { action: ActionId },

    /// Operation requires a keyframe action
    #[error("Action {action:?} is not a keyframe action")]
    NotAKeyframe { action: ActionId },

    /// Child or frame index out of range
    #[error("Index {index} out of range (len {len}) in action {action:?}")]
    IndexOutOfRange {
        action: ActionId,
        index: usize,
        len: usize,
    },

    /// Value kind does not match the property
    #[error("Value kind mismatch: expected {expected:?}, got {actual:?}")]
    ValueKindMismatch {
        expected: ValueKind,
        actual: ValueKind,
    },

    /// Malformed action description
    #[error("Parse error: {reason}")]
    Parse { reason: String },
}

impl ActionError {
    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::IllegalChild { .. } | Self::IllegalRoot { .. } | Self::IllegalTargetKind { .. } => {
                "attachment"
            }
            Self::ActionNotFound { .. }
            | Self::TargetNotFound { .. }
            | Self::NotAGroup { .. }
            | Self::NotAKeyframe { .. }
            | Self::IndexOutOfRange { .. } => "lookup",
            Self::ValueKindMismatch { .. } => "validation",
            Self::Parse { .. } => "serialization",
        }
    }
}

impl From<serde_json::Error> for ActionError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse {
            reason: err.to_string(),
        }
    }
}

impl From<tempo_api_core::json::JsonError> for ActionError {
    fn from(err: tempo_api_core::json::JsonError) -> Self {
        use tempo_api_core::json::JsonError;
        match err {
            JsonError::KindMismatch { expected, actual } => {
                Self::ValueKindMismatch { expected, actual }
            }
            other => Self::Parse {
                reason: other.to_string(),
            },
        }
    }
}

/// Result type for action operations
pub type Result<T> = std::result::Result<T, ActionError>;
