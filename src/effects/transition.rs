//! Outcomes and errors of fired transitions.

use super::observer::HookError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Result of a transition that was not rejected by an error.
#[derive(Clone, Debug, PartialEq)]
pub enum TransitionOutcome {
    /// Every phase ran. Carries the last value an observer produced, if any.
    Completed(Option<Value>),

    /// An observer returned `false` and the pipeline stopped.
    Cancelled,

    /// An overridden invalid/pending handler returned this instead of
    /// raising.
    Substituted(Value),
}

impl TransitionOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Collapse the outcome into a single value: `true` for a completed
    /// transition without a result, `false` for a cancelled one.
    pub fn into_value(self) -> Value {
        match self {
            Self::Completed(Some(value)) | Self::Substituted(value) => value,
            Self::Completed(None) => Value::Bool(true),
            Self::Cancelled => Value::Bool(false),
        }
    }
}

/// Why a transition was refused before its pipeline started.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectionKind {
    /// No destination resolves for the current state.
    Invalid,
    /// Another transition is still in flight.
    Pending,
}

impl RejectionKind {
    pub fn message(self) -> &'static str {
        match self {
            Self::Invalid => "transition is invalid in current state",
            Self::Pending => "transition is invalid while previous transition is still in progress",
        }
    }
}

/// Structured error for refused transitions.
#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize, Deserialize)]
#[error("{message} (transition '{transition}' from '{from}', current state '{current}')")]
pub struct TransitionError {
    pub kind: RejectionKind,
    pub message: String,
    pub transition: String,
    pub from: String,
    pub to: Option<String>,
    pub current: String,
}

impl TransitionError {
    pub fn new(
        kind: RejectionKind,
        transition: &str,
        from: &str,
        to: Option<&str>,
        current: &str,
    ) -> Self {
        Self {
            kind,
            message: kind.message().to_string(),
            transition: transition.to_string(),
            from: from.to_string(),
            to: to.map(str::to_string),
            current: current.to_string(),
        }
    }
}

/// Errors returned by the engine.
#[derive(Debug, Error)]
pub enum MachineError {
    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error("observer for '{phase}' failed during transition '{transition}': {source}")]
    Hook {
        transition: String,
        phase: String,
        #[source]
        source: HookError,
    },

    #[error("destination of transition '{transition}' could not be computed: {source}")]
    Destination {
        transition: String,
        #[source]
        source: HookError,
    },

    #[error("no method named '{0}'")]
    UnknownMethod(String),
}

impl MachineError {
    /// The structured rejection, if this error is one.
    pub fn as_transition_error(&self) -> Option<&TransitionError> {
        match self {
            Self::Transition(error) => Some(error),
            _ => None,
        }
    }

    pub fn is_invalid(&self) -> bool {
        self.as_transition_error()
            .is_some_and(|e| e.kind == RejectionKind::Invalid)
    }

    pub fn is_pending(&self) -> bool {
        self.as_transition_error()
            .is_some_and(|e| e.kind == RejectionKind::Pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_error_carries_all_fields() {
        let error = TransitionError::new(RejectionKind::Invalid, "melt", "gas", None, "gas");

        assert_eq!(error.message, "transition is invalid in current state");
        assert_eq!(error.transition, "melt");
        assert_eq!(error.from, "gas");
        assert_eq!(error.to, None);
        assert_eq!(error.current, "gas");
        assert_eq!(
            error.to_string(),
            "transition is invalid in current state (transition 'melt' from 'gas', current state 'gas')"
        );
    }

    #[test]
    fn machine_error_classifies_rejections() {
        let pending: MachineError =
            TransitionError::new(RejectionKind::Pending, "step", "A", Some("B"), "A").into();
        assert!(pending.is_pending());
        assert!(!pending.is_invalid());

        let unknown = MachineError::UnknownMethod("jump".into());
        assert!(unknown.as_transition_error().is_none());
    }

    #[test]
    fn outcome_collapses_to_value() {
        assert_eq!(TransitionOutcome::Completed(None).into_value(), Value::Bool(true));
        assert_eq!(TransitionOutcome::Cancelled.into_value(), Value::Bool(false));
        assert_eq!(
            TransitionOutcome::Completed(Some(Value::from(7))).into_value(),
            Value::from(7)
        );
    }

    #[test]
    fn transition_error_serializes() {
        let error = TransitionError::new(RejectionKind::Pending, "step", "A", Some("B"), "A");
        let json = serde_json::to_string(&error).unwrap();
        let back: TransitionError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, back);
    }
}
