//! Builder API for ergonomic machine construction.
//!
//! This module provides fluent builders and macros for declaring transitions
//! and compiling them into machines with minimal boilerplate.

pub mod error;
pub mod machine;
pub mod macros;
pub mod transition;

pub use error::BuildError;
pub use machine::{MachineBuilder, MachineFactory};
pub use transition::TransitionBuilder;

use crate::core::{Destination, Source, Target, TransitionDescriptor};
use serde_json::Value;

/// Create a transition from one state to another.
///
/// # Example
///
/// ```
/// use statehook::builder::simple_transition;
///
/// let transition = simple_transition("melt", "solid", "liquid");
/// assert_eq!(transition.to.state(), Some("liquid"));
/// ```
pub fn simple_transition(
    name: impl Into<String>,
    from: impl Into<String>,
    to: impl Into<String>,
) -> TransitionDescriptor {
    TransitionDescriptor::new(name, Source::state(from), Target::State(to.into()))
}

/// Create a transition usable from any state whose destination is its
/// first call argument.
///
/// Firing it without a string argument is an invalid transition.
///
/// # Example
///
/// ```
/// use statehook::builder::goto_transition;
/// use statehook::core::Source;
///
/// let transition = goto_transition("goto");
/// assert_eq!(transition.from, Source::Any);
/// ```
pub fn goto_transition(name: impl Into<String>) -> TransitionDescriptor {
    TransitionDescriptor::new(
        name,
        Source::Any,
        Target::computed(|args, _| {
            Ok(args
                .first()
                .and_then(Value::as_str)
                .map_or(Destination::Unresolved, |state| {
                    Destination::State(state.to_string())
                }))
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Resolution, TableConfig, TransitionTable};

    #[test]
    fn simple_transition_builds() {
        let transition = simple_transition("step", "A", "B");

        assert_eq!(transition.name, "step");
        assert_eq!(transition.from, Source::state("A"));
        assert_eq!(transition.to.state(), Some("B"));
    }

    #[test]
    fn goto_transition_is_computed_from_anywhere() {
        let mut table = TransitionTable::new(TableConfig::default());
        table.register(simple_transition("step", "A", "B"));
        table.register(goto_transition("goto"));

        assert!(matches!(table.destination("B", "goto"), Resolution::Computed(_)));
        assert!(matches!(table.destination("Q", "goto"), Resolution::Computed(_)));
    }
}
