//! Lifecycle observers and the values they hand back to the pipeline.

use super::lifecycle::LifecycleContext;
use super::transition::MachineError;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

/// A value that settles later. Awaiting it suspends the pipeline.
pub type Deferred<T> = Pin<Box<dyn Future<Output = Result<T, HookError>> + Send + 'static>>;

/// Error raised by an observer or a destination function.
#[derive(Debug, Error)]
pub enum HookError {
    #[error("{0}")]
    Rejected(String),

    #[error(transparent)]
    Machine(Box<MachineError>),
}

impl HookError {
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected(reason.into())
    }
}

impl From<MachineError> for HookError {
    fn from(error: MachineError) -> Self {
        Self::Machine(Box::new(error))
    }
}

/// What an observer returns for one phase.
pub enum HookOutcome {
    /// Nothing to report; the running result is left as is.
    Continue,
    /// Abort the transition. No later phase runs.
    Cancel,
    /// Replace the running result. A literal `false` aborts like [`Cancel`].
    ///
    /// [`Cancel`]: HookOutcome::Cancel
    Value(Value),
    /// Suspend until the future settles. A settled value replaces the
    /// running result; a failure aborts the transition.
    Deferred(Deferred<Option<Value>>),
}

impl HookOutcome {
    /// Wrap an async computation as a deferred outcome.
    ///
    /// # Example
    ///
    /// ```rust
    /// use statehook::effects::HookOutcome;
    /// use serde_json::json;
    ///
    /// let outcome = HookOutcome::deferred(async { Ok(Some(json!("saved"))) });
    /// assert!(outcome.is_deferred());
    /// ```
    pub fn deferred<F>(future: F) -> Self
    where
        F: Future<Output = Result<Option<Value>, HookError>> + Send + 'static,
    {
        Self::Deferred(Box::pin(future))
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, Self::Deferred(_))
    }
}

impl From<bool> for HookOutcome {
    fn from(proceed: bool) -> Self {
        if proceed {
            Self::Value(Value::Bool(true))
        } else {
            Self::Cancel
        }
    }
}

impl From<()> for HookOutcome {
    fn from(_: ()) -> Self {
        Self::Continue
    }
}

impl From<Value> for HookOutcome {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl fmt::Debug for HookOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Continue => f.write_str("Continue"),
            Self::Cancel => f.write_str("Cancel"),
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

/// A phase handler.
pub type Handler =
    Arc<dyn Fn(&LifecycleContext) -> Result<HookOutcome, HookError> + Send + Sync>;

/// A set of phase handlers attached together.
///
/// Handlers are grouped by phase name when the observer is built, so the
/// engine never probes an observer for the phases it implements.
#[derive(Clone, Default)]
pub struct Observer {
    handlers: Vec<(String, Handler)>,
}

impl Observer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle the named phase.
    pub fn on<F>(mut self, phase: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&LifecycleContext) -> Result<HookOutcome, HookError> + Send + Sync + 'static,
    {
        self.handlers.push((phase.into(), Arc::new(handler)));
        self
    }

    pub fn phases(&self) -> impl Iterator<Item = &str> {
        self.handlers.iter().map(|(phase, _)| phase.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub(crate) fn into_handlers(self) -> impl Iterator<Item = (String, Handler)> {
        self.handlers.into_iter()
    }
}

impl fmt::Debug for Observer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observer")
            .field("phases", &self.phases().collect::<Vec<_>>())
            .finish()
    }
}

/// Observers attached to one machine, grouped by phase in attachment order.
#[derive(Clone, Default)]
pub(crate) struct ObserverRegistry {
    by_phase: HashMap<String, Vec<Handler>>,
}

impl ObserverRegistry {
    pub(crate) fn attach(&mut self, phase: String, handler: Handler) {
        self.by_phase.entry(phase).or_default().push(handler);
    }

    pub(crate) fn handlers(&self, phase: &str) -> &[Handler] {
        self.by_phase.get(phase).map(Vec::as_slice).unwrap_or_default()
    }

    pub(crate) fn len(&self) -> usize {
        self.by_phase.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_converts_to_cancel_or_value() {
        assert!(matches!(HookOutcome::from(false), HookOutcome::Cancel));
        assert!(matches!(
            HookOutcome::from(true),
            HookOutcome::Value(Value::Bool(true))
        ));
        assert!(matches!(HookOutcome::from(()), HookOutcome::Continue));
    }

    #[test]
    fn observer_keeps_declaration_order() {
        let observer = Observer::new()
            .on("enterB", |_| Ok(HookOutcome::Continue))
            .on("beforeStep", |_| Ok(HookOutcome::Continue))
            .on("enterB", |_| Ok(HookOutcome::Cancel));

        assert_eq!(
            observer.phases().collect::<Vec<_>>(),
            vec!["enterB", "beforeStep", "enterB"]
        );
    }

    #[test]
    fn registry_groups_by_phase() {
        let mut registry = ObserverRegistry::default();
        let observer = Observer::new()
            .on("enterB", |_| Ok(HookOutcome::Continue))
            .on("leaveA", |_| Ok(HookOutcome::Continue))
            .on("enterB", |_| Ok(HookOutcome::Continue));
        for (phase, handler) in observer.into_handlers() {
            registry.attach(phase, handler);
        }

        assert_eq!(registry.handlers("enterB").len(), 2);
        assert_eq!(registry.handlers("leaveA").len(), 1);
        assert!(registry.handlers("onStep").is_empty());
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn machine_errors_nest_inside_hook_errors() {
        let error = HookError::from(MachineError::UnknownMethod("jump".into()));
        assert_eq!(error.to_string(), "no method named 'jump'");
    }
}
