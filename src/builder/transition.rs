//! Builder for constructing transition descriptors.

use crate::builder::error::BuildError;
use crate::core::{Destination, Source, Target, TransitionDescriptor};
use crate::effects::{HookError, Machine};
use serde_json::Value;

/// Builder for constructing transitions with a fluent API.
///
/// Without `.from(..)` the transition is usable from any state; without
/// `.to(..)` it loops back to the state it was fired from.
pub struct TransitionBuilder {
    name: String,
    from: Source,
    to: Target,
}

impl TransitionBuilder {
    /// Create a builder for the transition called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            from: Source::Any,
            to: Target::Same,
        }
    }

    /// Add an origin state. May be called repeatedly.
    pub fn from(mut self, state: impl Into<String>) -> Self {
        match &mut self.from {
            Source::States(states) => states.push(state.into()),
            Source::Any => self.from = Source::state(state),
        }
        self
    }

    /// Set the origin states.
    pub fn from_states<I>(mut self, states: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.from = Source::States(states.into_iter().map(Into::into).collect());
        self
    }

    /// Make the transition usable from any state.
    pub fn from_any(mut self) -> Self {
        self.from = Source::Any;
        self
    }

    /// Set a fixed destination state.
    pub fn to(mut self, state: impl Into<String>) -> Self {
        self.to = Target::State(state.into());
        self
    }

    /// Loop back to the current state.
    pub fn to_same(mut self) -> Self {
        self.to = Target::Same;
        self
    }

    /// Compute the destination each time the transition fires.
    pub fn to_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&[Value], &Machine) -> Result<Destination, HookError> + Send + Sync + 'static,
    {
        self.to = Target::computed(f);
        self
    }

    /// Build the descriptor.
    pub fn build(self) -> Result<TransitionDescriptor, BuildError> {
        let descriptor = TransitionDescriptor::new(self.name, self.from, self.to);
        validate(&descriptor)?;
        Ok(descriptor)
    }
}

/// Check that a descriptor names its transition and every state it lists.
pub fn validate(descriptor: &TransitionDescriptor) -> Result<(), BuildError> {
    if descriptor.name.is_empty() {
        return Err(BuildError::EmptyTransitionName);
    }

    let empty_state = || BuildError::EmptyStateName {
        transition: descriptor.name.clone(),
    };
    if let Source::States(states) = &descriptor.from {
        if states.is_empty() {
            return Err(BuildError::NoOrigins {
                transition: descriptor.name.clone(),
            });
        }
        if states.iter().any(String::is_empty) {
            return Err(empty_state());
        }
    }
    if descriptor.to.state().is_some_and(str::is_empty) {
        return Err(empty_state());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_wildcard_self_loop() {
        let descriptor = TransitionBuilder::new("noop").build().unwrap();

        assert_eq!(descriptor.from, Source::Any);
        assert!(matches!(descriptor.to, Target::Same));
    }

    #[test]
    fn from_accumulates_origins() {
        let descriptor = TransitionBuilder::new("melt")
            .from("solid")
            .from("slush")
            .to("liquid")
            .build()
            .unwrap();

        assert_eq!(
            descriptor.from,
            Source::States(vec!["solid".into(), "slush".into()])
        );
        assert_eq!(descriptor.to.state(), Some("liquid"));
    }

    #[test]
    fn from_any_resets_origins() {
        let descriptor = TransitionBuilder::new("reset")
            .from("A")
            .from_any()
            .to("A")
            .build()
            .unwrap();

        assert_eq!(descriptor.from, Source::Any);
    }

    #[test]
    fn builder_validates_names() {
        let result = TransitionBuilder::new("").to("B").build();
        assert!(matches!(result, Err(BuildError::EmptyTransitionName)));

        let result = TransitionBuilder::new("step").from("A").to("").build();
        assert!(matches!(result, Err(BuildError::EmptyStateName { .. })));

        let result = TransitionBuilder::new("step").from("").to("B").build();
        assert!(matches!(result, Err(BuildError::EmptyStateName { .. })));
    }

    #[test]
    fn builder_rejects_empty_origin_list() {
        let result = TransitionBuilder::new("step")
            .from_states(Vec::<String>::new())
            .to("B")
            .build();

        assert!(matches!(result, Err(BuildError::NoOrigins { .. })));
    }

    #[test]
    fn to_fn_builds_computed_target() {
        let descriptor = TransitionBuilder::new("goto")
            .to_fn(|args, _| {
                Ok(args
                    .first()
                    .and_then(Value::as_str)
                    .map_or(Destination::Unresolved, |s| Destination::State(s.into())))
            })
            .build()
            .unwrap();

        assert!(matches!(descriptor.to, Target::Computed(_)));
    }
}
