//! Declarative transition descriptors.

use crate::effects::{Deferred, HookError, Machine};
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Origin of a transition.
///
/// The wildcard is its own variant rather than a reserved label, so a state
/// may carry any name at all.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Source {
    /// Usable from any known state.
    Any,
    /// Usable from each of the listed states.
    States(Vec<String>),
}

impl Source {
    pub fn state(state: impl Into<String>) -> Self {
        Self::States(vec![state.into()])
    }
}

/// Result of a destination-computing function.
pub enum Destination {
    /// The transition leads to this state.
    State(String),
    /// No destination; the transition is invalid for this call.
    Unresolved,
    /// The destination is known once the future settles. `Ok(None)` is
    /// treated like [`Destination::Unresolved`].
    Deferred(Deferred<Option<String>>),
}

impl Destination {
    /// Wrap an async computation as a deferred destination.
    pub fn deferred<F>(future: F) -> Self
    where
        F: Future<Output = Result<Option<String>, HookError>> + Send + 'static,
    {
        Self::Deferred(Box::pin(future))
    }
}

impl fmt::Debug for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::State(state) => f.debug_tuple("State").field(state).finish(),
            Self::Unresolved => f.write_str("Unresolved"),
            Self::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

/// Computes a destination from the call arguments and the firing machine.
pub type DestinationFn =
    Arc<dyn Fn(&[Value], &Machine) -> Result<Destination, HookError> + Send + Sync>;

/// Where a transition leads.
#[derive(Clone)]
pub enum Target {
    /// Self-loop: the destination is whatever the current state is.
    Same,
    /// A fixed destination state.
    State(String),
    /// A destination computed each time the transition fires.
    Computed(DestinationFn),
}

impl Target {
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&[Value], &Machine) -> Result<Destination, HookError> + Send + Sync + 'static,
    {
        Self::Computed(Arc::new(f))
    }

    /// The fixed state this target names, if any.
    pub fn state(&self) -> Option<&str> {
        match self {
            Self::State(state) => Some(state),
            Self::Same | Self::Computed(_) => None,
        }
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Same => f.write_str("Same"),
            Self::State(state) => f.debug_tuple("State").field(state).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// A named transition: `{ name, from, to }`.
#[derive(Clone, Debug)]
pub struct TransitionDescriptor {
    pub name: String,
    pub from: Source,
    pub to: Target,
}

impl TransitionDescriptor {
    pub fn new(name: impl Into<String>, from: Source, to: Target) -> Self {
        Self {
            name: name.into(),
            from,
            to,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_state_source() {
        assert_eq!(Source::state("A"), Source::States(vec!["A".to_string()]));
    }

    #[test]
    fn target_state_is_only_for_fixed_targets() {
        assert_eq!(Target::State("B".into()).state(), Some("B"));
        assert_eq!(Target::Same.state(), None);
        let computed = Target::computed(|_, _| Ok(Destination::Unresolved));
        assert_eq!(computed.state(), None);
    }

    #[test]
    fn debug_hides_closures() {
        let computed = Target::computed(|_, _| Ok(Destination::State("X".into())));
        assert_eq!(format!("{computed:?}"), "Computed(..)");
        let deferred = Destination::deferred(async { Ok(Some("X".to_string())) });
        assert_eq!(format!("{deferred:?}"), "Deferred(..)");
    }
}
