//! Build errors for machine and transition builders.

use crate::effects::MachineError;
use thiserror::Error;

/// Errors that can occur when building machines and transitions.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Transition name is empty")]
    EmptyTransitionName,

    #[error("Transition '{transition}' names an empty state")]
    EmptyStateName { transition: String },

    #[error("Transition '{transition}' has no origin. Call .from(state) or .from_any()")]
    NoOrigins { transition: String },

    #[error("Transitions '{first}' and '{second}' both map to method '{method}'")]
    MethodCollision {
        method: String,
        first: String,
        second: String,
    },

    #[error("Initial transition failed: {0}")]
    Init(#[source] MachineError),
}
