//! Errors.

use crate::lifecycle::LifecyclePhase;
use thiserror::Error;

/// Configuration errors found while building or registering a view definition.
///
/// These are fatal to the definition they concern, never to other definitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    #[error("view {definition}: prop `{name}` is declared more than once")]
    DuplicateProp { definition: String, name: String },

    #[error("view {definition}: event `{name}` is declared more than once")]
    DuplicateEvent { definition: String, name: String },

    #[error("view {definition}: function `{name}` is declared more than once")]
    DuplicateFunction { definition: String, name: String },

    /// Two fields of the property bag resolve to the same prop or event name.
    #[error("view {definition}: property bag has more than one field named `{name}`")]
    DuplicateBagField { definition: String, name: String },

    #[error("a view named `{name}` is already registered")]
    AlreadyRegistered { name: String },

    #[error("no view named `{name}` is registered")]
    NotRegistered { name: String },
}

/// Failures of the script bridge collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    #[error("script bridge is unavailable")]
    Unavailable,

    #[error("script bridge rejected the request: {reason}")]
    Rejected { reason: String },
}

/// Failures while dispatching lifecycle hooks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HookError {
    #[error("{phase:?} hook failed: {message}")]
    Failed {
        phase: LifecyclePhase,
        message: String,
    },

    #[error("hook expects a `{expected}` view, got `{found}`")]
    ViewTypeMismatch { expected: String, found: String },
}

impl HookError {
    /// Shorthand for a failed hook.
    pub fn failed(phase: LifecyclePhase, message: impl Into<String>) -> HookError {
        HookError::Failed {
            phase,
            message: message.into(),
        }
    }
}

/// Failures while applying a prop update.
#[derive(Debug, Error)]
pub enum PropError {
    #[error("unknown prop `{name}`")]
    UnknownProp { name: String },

    #[error("invalid value for prop `{name}`")]
    InvalidValue {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("field is not a prop")]
    NotAProp,

    /// The view handle does not belong to the definition it was used with.
    #[error("prop update expects a `{expected}` view, got `{found}`")]
    ViewTypeMismatch { expected: String, found: String },
}

/// Failures while calling an exposed function.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FunctionError {
    #[error("no function named `{name}`")]
    Unknown { name: String },

    #[error("function `{name}` failed: {message}")]
    Failed { name: String, message: String },
}

/// Failures while updating a view’s props through the registry.
#[derive(Debug, Error)]
pub enum UpdateError {
    #[error(transparent)]
    Prop(#[from] PropError),

    #[error(transparent)]
    Hook(#[from] HookError),
}
