//! The transition engine: one machine instance driven through the lifecycle.

use super::lifecycle::{phase_plan, LifecycleContext, Phase};
use super::observer::{Handler, HookError, HookOutcome, Observer, ObserverRegistry};
use super::plugin::Plugin;
use super::transition::{MachineError, RejectionKind, TransitionError, TransitionOutcome};
use crate::core::{Destination, Resolution, TransitionTable};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, trace};
use uuid::Uuid;

/// Replacement for the default invalid/pending behavior.
///
/// Receives the structured error the engine would otherwise return and may
/// return any outcome instead.
pub type RejectionHandler =
    Arc<dyn Fn(&Machine, &TransitionError) -> Result<TransitionOutcome, MachineError> + Send + Sync>;

/// Everything machines built from the same definition share: the table,
/// the declared phase handlers, the method dispatch table and the plugins.
pub(crate) struct Blueprint {
    pub(crate) table: RwLock<TransitionTable>,
    pub(crate) handlers: HashMap<String, Handler>,
    pub(crate) methods: HashMap<String, String>,
    pub(crate) plugins: Vec<Arc<dyn Plugin>>,
    pub(crate) on_invalid: Option<RejectionHandler>,
    pub(crate) on_pending: Option<RejectionHandler>,
}

struct Runtime {
    state: String,
    pending: bool,
}

struct Instance {
    id: Uuid,
    blueprint: Arc<Blueprint>,
    runtime: Mutex<Runtime>,
    observers: RwLock<ObserverRegistry>,
}

/// Outcome of trying to mark a transition in flight.
enum Begin {
    Started,
    Pending,
    /// The machine is no longer in the origin the destination was
    /// resolved for.
    Moved(String),
}

/// Result of one observer after any deferred value has settled.
enum Settled {
    Continue,
    Cancel,
    Value(Value),
}

async fn settle(handler: &Handler, lifecycle: &LifecycleContext) -> Result<Settled, HookError> {
    Ok(match handler(lifecycle)? {
        HookOutcome::Continue => Settled::Continue,
        HookOutcome::Cancel | HookOutcome::Value(Value::Bool(false)) => Settled::Cancel,
        HookOutcome::Value(value) => Settled::Value(value),
        HookOutcome::Deferred(deferred) => {
            trace!(phase = %lifecycle.phase, "transition suspended");
            match deferred.await? {
                Some(value) => Settled::Value(value),
                None => Settled::Continue,
            }
        }
    })
}

/// A running state machine.
///
/// Cloning a `Machine` clones a handle to the same instance. At most one
/// transition is in flight per instance; any transition fired while another
/// is pending is rejected before any of its phases run.
#[derive(Clone)]
pub struct Machine {
    inner: Arc<Instance>,
}

impl Machine {
    pub(crate) fn new(blueprint: Arc<Blueprint>) -> Self {
        let state = blueprint
            .table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .config()
            .init_from
            .clone();

        Self {
            inner: Arc::new(Instance {
                id: Uuid::new_v4(),
                blueprint,
                runtime: Mutex::new(Runtime {
                    state,
                    pending: false,
                }),
                observers: RwLock::new(ObserverRegistry::default()),
            }),
        }
    }

    fn runtime(&self) -> MutexGuard<'_, Runtime> {
        self.inner
            .runtime
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn table(&self) -> RwLockReadGuard<'_, TransitionTable> {
        self.inner
            .blueprint
            .table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn table_mut(&self) -> RwLockWriteGuard<'_, TransitionTable> {
        self.inner
            .blueprint
            .table
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn observers(&self) -> RwLockReadGuard<'_, ObserverRegistry> {
        self.inner
            .observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Unique identifier of this instance.
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// Current state (pure). There is no setter; the state only changes
    /// through the commit step of a transition.
    pub fn state(&self) -> String {
        self.runtime().state.clone()
    }

    /// Whether the current state is `state` (pure).
    pub fn is(&self, state: &str) -> bool {
        self.runtime().state == state
    }

    /// Whether the current state is any of `states` (pure).
    pub fn is_any<I>(&self, states: I) -> bool
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let current = self.state();
        states.into_iter().any(|s| s.as_ref() == current)
    }

    /// Whether a transition is in flight (pure).
    pub fn is_pending(&self) -> bool {
        self.runtime().pending
    }

    /// Whether `transition` may fire now (pure).
    ///
    /// Always false while another transition is pending. Destination
    /// functions are not invoked.
    pub fn can(&self, transition: &str) -> bool {
        let (state, pending) = {
            let runtime = self.runtime();
            (runtime.state.clone(), runtime.pending)
        };
        !pending && !self.table().destination(&state, transition).is_unknown()
    }

    pub fn cannot(&self, transition: &str) -> bool {
        !self.can(transition)
    }

    /// Transition names usable from the current state (pure).
    pub fn transitions(&self) -> Vec<String> {
        let state = self.state();
        self.table().transitions_for(&state)
    }

    /// Every state the table knows, including those discovered at runtime.
    pub fn all_states(&self) -> Vec<String> {
        self.table().states().to_vec()
    }

    /// Every transition name the table knows.
    pub fn all_transitions(&self) -> Vec<String> {
        self.table().transitions().to_vec()
    }

    /// Names accepted by [`Machine::call`], sorted.
    pub fn methods(&self) -> Vec<String> {
        let mut methods: Vec<String> = self.inner.blueprint.methods.keys().cloned().collect();
        methods.sort();
        methods
    }

    /// Attach a handler for one phase.
    ///
    /// Observers run after the machine's own declared handler for the same
    /// phase, in attachment order. They cannot be removed.
    pub fn observe<F>(&self, phase: impl Into<String>, handler: F)
    where
        F: Fn(&LifecycleContext) -> Result<HookOutcome, HookError> + Send + Sync + 'static,
    {
        self.observe_with(Observer::new().on(phase, handler));
    }

    /// Attach every handler of `observer`.
    pub fn observe_with(&self, observer: Observer) {
        {
            let table = self.table();
            for phase in observer.phases() {
                if !table.lifecycle().is_known(phase) {
                    debug!(machine = %self.id(), phase, "observing a phase the table does not know yet");
                }
            }
        }

        let mut registry = self
            .inner
            .observers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        for (phase, handler) in observer.into_handlers() {
            registry.attach(phase, handler);
        }
    }

    /// Number of attached observer handlers.
    pub fn observer_count(&self) -> usize {
        self.observers().len()
    }

    /// Fire a transition by its camelized method name.
    pub async fn call(
        &self,
        method: &str,
        args: Vec<Value>,
    ) -> Result<TransitionOutcome, MachineError> {
        let Some(transition) = self.inner.blueprint.methods.get(method) else {
            return Err(MachineError::UnknownMethod(method.to_string()));
        };
        self.fire(transition, args).await
    }

    /// Fire a transition.
    ///
    /// Resolves the destination for the current state (invoking and awaiting
    /// a destination function if the transition has one), then runs the
    /// lifecycle pipeline.
    ///
    /// The destination is resolved for the state the machine is in when
    /// `fire` is called. If that state has changed by the time a deferred
    /// destination settles, the transition is invalid.
    pub async fn fire(
        &self,
        transition: &str,
        args: Vec<Value>,
    ) -> Result<TransitionOutcome, MachineError> {
        let from = self.state();
        let to = self.seek(transition, &from, &args).await?;
        self.transit(transition, from, to, args).await
    }

    pub(crate) async fn init(&self) -> Result<Option<TransitionOutcome>, MachineError> {
        let name = self.table().init_transition().map(str::to_string);
        match name {
            Some(name) => self.fire(&name, Vec::new()).await.map(Some),
            None => Ok(None),
        }
    }

    pub(crate) fn plugins(&self) -> &[Arc<dyn Plugin>] {
        &self.inner.blueprint.plugins
    }

    async fn seek(
        &self,
        transition: &str,
        from: &str,
        args: &[Value],
    ) -> Result<Option<String>, MachineError> {
        let resolution = self.table().destination(from, transition);

        let compute = match resolution {
            Resolution::Unknown => return Ok(None),
            Resolution::State(to) => return Ok(Some(to)),
            Resolution::Computed(compute) => compute,
        };

        let destination_error = |source| MachineError::Destination {
            transition: transition.to_string(),
            source,
        };
        match compute(args, self).map_err(destination_error)? {
            Destination::State(to) => Ok(Some(to)),
            Destination::Unresolved => Ok(None),
            Destination::Deferred(deferred) => deferred.await.map_err(destination_error),
        }
    }

    fn reject(
        &self,
        kind: RejectionKind,
        transition: &str,
        from: &str,
        to: Option<&str>,
    ) -> Result<TransitionOutcome, MachineError> {
        let error = TransitionError::new(kind, transition, from, to, &self.state());
        debug!(machine = %self.id(), transition, from, ?to, ?kind, "transition rejected");

        let blueprint = &self.inner.blueprint;
        let handler = match kind {
            RejectionKind::Invalid => blueprint.on_invalid.as_ref(),
            RejectionKind::Pending => blueprint.on_pending.as_ref(),
        };
        match handler {
            Some(handler) => handler(self, &error),
            None => Err(error.into()),
        }
    }

    /// Mark a transition from `from` in flight.
    fn begin(&self, from: &str) -> Begin {
        let mut runtime = self.runtime();
        if runtime.pending {
            return Begin::Pending;
        }
        if runtime.state != from {
            return Begin::Moved(runtime.state.clone());
        }
        runtime.pending = true;
        Begin::Started
    }

    fn end(&self) {
        self.runtime().pending = false;
    }

    fn commit(&self, to: &str) {
        self.runtime().state = to.to_string();
    }

    fn handlers_for(&self, phase: &Phase) -> Vec<Handler> {
        let Some(name) = phase.name() else {
            return Vec::new();
        };
        let own = self.inner.blueprint.handlers.get(name).cloned();
        let observers = self.observers();
        own.into_iter()
            .chain(observers.handlers(name).iter().cloned())
            .collect()
    }

    fn notify(&self, lifecycle: &LifecycleContext) {
        for plugin in self.plugins() {
            plugin.lifecycle(self, lifecycle);
        }
    }

    async fn transit(
        &self,
        transition: &str,
        from: String,
        to: Option<String>,
        args: Vec<Value>,
    ) -> Result<TransitionOutcome, MachineError> {
        let Some(to) = to.filter(|to| !to.is_empty()) else {
            return self.reject(RejectionKind::Invalid, transition, &from, None);
        };
        match self.begin(&from) {
            Begin::Started => {}
            Begin::Pending => {
                return self.reject(RejectionKind::Pending, transition, &from, Some(&to));
            }
            Begin::Moved(current) => {
                debug!(machine = %self.id(), transition, from = %from, current = %current, "state moved while the destination settled");
                return self.reject(RejectionKind::Invalid, transition, &current, None);
            }
        }

        let plan = {
            let mut table = self.table_mut();
            table.add_state(&to);
            let changed = table.config().observe_unchanged_state || from != to;
            phase_plan(table.lifecycle(), transition, &from, &to, changed)
        };
        let phases: Vec<(Phase, Vec<Handler>)> = plan
            .into_iter()
            .map(|phase| {
                let handlers = self.handlers_for(&phase);
                (phase, handlers)
            })
            .collect();

        debug!(machine = %self.id(), transition, from = %from, to = %to, "transition started");

        let mut lifecycle = LifecycleContext::new(self.clone(), transition, &from, &to, args);
        let mut last: Option<Value> = None;
        let mut previous: Option<String> = None;

        for (phase, handlers) in phases {
            let name = match phase {
                Phase::Commit => {
                    self.commit(&to);
                    lifecycle.phase.clear();
                    previous = None;
                    trace!(machine = %self.id(), state = %to, "state committed");
                    continue;
                }
                Phase::Observed(name) => name,
            };

            lifecycle.phase = name;
            if previous.as_deref() != Some(lifecycle.phase.as_str()) {
                self.notify(&lifecycle);
            }
            previous = Some(lifecycle.phase.clone());
            trace!(machine = %self.id(), phase = %lifecycle.phase, observers = handlers.len(), "phase");

            for handler in &handlers {
                match settle(handler, &lifecycle).await {
                    Ok(Settled::Continue) => {}
                    Ok(Settled::Value(value)) => last = Some(value),
                    Ok(Settled::Cancel) => {
                        self.end();
                        debug!(machine = %self.id(), transition, phase = %lifecycle.phase, "transition cancelled");
                        return Ok(TransitionOutcome::Cancelled);
                    }
                    Err(source) => {
                        self.end();
                        debug!(machine = %self.id(), transition, phase = %lifecycle.phase, error = %source, "transition failed");
                        return Err(MachineError::Hook {
                            transition: transition.to_string(),
                            phase: lifecycle.phase.clone(),
                            source,
                        });
                    }
                }
            }
        }

        self.end();
        debug!(machine = %self.id(), transition, state = %to, "transition completed");
        Ok(TransitionOutcome::Completed(last))
    }
}

impl fmt::Debug for Machine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let runtime = self.runtime();
        f.debug_struct("Machine")
            .field("id", &self.inner.id)
            .field("state", &runtime.state)
            .field("pending", &runtime.pending)
            .field("observers", &self.observers().len())
            .finish()
    }
}
