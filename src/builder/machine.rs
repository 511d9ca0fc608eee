//! Builder for constructing machines.

use crate::builder::error::BuildError;
use crate::builder::transition::{validate, TransitionBuilder};
use crate::config::MachineConfig;
use crate::core::{camelize, TableConfig, TransitionDescriptor, TransitionTable};
use crate::effects::{
    Blueprint, Handler, HookError, HookOutcome, LifecycleContext, Machine, MachineError, Plugin,
    RejectionHandler, TransitionError, TransitionOutcome,
};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Builder for constructing machines with a fluent API.
pub struct MachineBuilder {
    config: TableConfig,
    transitions: Vec<TransitionDescriptor>,
    handlers: HashMap<String, Handler>,
    plugins: Vec<Arc<dyn Plugin>>,
    on_invalid: Option<RejectionHandler>,
    on_pending: Option<RejectionHandler>,
}

impl MachineBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            config: TableConfig::default(),
            transitions: Vec::new(),
            handlers: HashMap::new(),
            plugins: Vec::new(),
            on_invalid: None,
            on_pending: None,
        }
    }

    /// Start from a declarative configuration.
    pub fn from_config(config: MachineConfig) -> Self {
        let descriptors = config.descriptors();
        Self::new().config(config.table).transitions(descriptors)
    }

    /// Replace the table settings.
    pub fn config(mut self, config: TableConfig) -> Self {
        self.config = config;
        self
    }

    /// Enter `state` through the initial transition when a machine is created.
    pub fn init(mut self, state: impl Into<String>) -> Self {
        self.config.init = Some(state.into());
        self
    }

    /// Run the leave/commit/enter phases for transitions that keep the state.
    pub fn observe_unchanged_state(mut self, observe: bool) -> Self {
        self.config.observe_unchanged_state = observe;
        self
    }

    /// Add a transition using a builder.
    /// Returns an error if the builder fails validation.
    pub fn transition(mut self, builder: TransitionBuilder) -> Result<Self, BuildError> {
        let transition = builder.build()?;
        self.transitions.push(transition);
        Ok(self)
    }

    /// Add a pre-built transition.
    pub fn add_transition(mut self, transition: TransitionDescriptor) -> Self {
        self.transitions.push(transition);
        self
    }

    /// Add multiple transitions at once.
    pub fn transitions(mut self, transitions: Vec<TransitionDescriptor>) -> Self {
        self.transitions.extend(transitions);
        self
    }

    /// Declare the machine's own handler for a phase. It runs before any
    /// attached observer. Declaring the same phase twice keeps the last one.
    pub fn on<F>(mut self, phase: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&LifecycleContext) -> Result<HookOutcome, HookError> + Send + Sync + 'static,
    {
        self.handlers.insert(phase.into(), Arc::new(handler));
        self
    }

    /// Install a plugin.
    pub fn plugin<P: Plugin + 'static>(mut self, plugin: P) -> Self {
        self.plugins.push(Arc::new(plugin));
        self
    }

    /// Replace the default "raise" behavior for invalid transitions.
    pub fn on_invalid_transition<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Machine, &TransitionError) -> Result<TransitionOutcome, MachineError>
            + Send
            + Sync
            + 'static,
    {
        self.on_invalid = Some(Arc::new(handler));
        self
    }

    /// Replace the default "raise" behavior for transitions fired while
    /// another one is pending.
    pub fn on_pending_transition<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Machine, &TransitionError) -> Result<TransitionOutcome, MachineError>
            + Send
            + Sync
            + 'static,
    {
        self.on_pending = Some(Arc::new(handler));
        self
    }

    /// Compile the table once. Every machine the factory creates shares it.
    pub fn build_factory(self) -> Result<MachineFactory, BuildError> {
        let mut table = TransitionTable::new(self.config);
        for plugin in &self.plugins {
            for name in plugin.lifecycle_names() {
                table.reserve_lifecycle_name(name);
            }
        }
        for descriptor in self.transitions {
            validate(&descriptor)?;
            table.register(descriptor);
        }

        let mut methods: HashMap<String, String> = HashMap::new();
        for transition in table.transitions() {
            let method = camelize(transition).into_owned();
            if let Some(first) = methods.get(&method) {
                return Err(BuildError::MethodCollision {
                    method,
                    first: first.clone(),
                    second: transition.clone(),
                });
            }
            methods.insert(method, transition.clone());
        }

        debug!(
            states = table.states().len(),
            transitions = table.transitions().len(),
            plugins = self.plugins.len(),
            "transition table compiled"
        );

        Ok(MachineFactory {
            blueprint: Arc::new(Blueprint {
                table: RwLock::new(table),
                handlers: self.handlers,
                methods,
                plugins: self.plugins,
                on_invalid: self.on_invalid,
                on_pending: self.on_pending,
            }),
        })
    }

    /// Build a single machine and run its initial transition.
    pub async fn build(self) -> Result<Machine, BuildError> {
        self.build_factory()?.create().await
    }
}

impl Default for MachineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MachineBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MachineBuilder")
            .field("config", &self.config)
            .field("transitions", &self.transitions)
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .field("plugins", &self.plugins.iter().map(|p| p.name()).collect::<Vec<_>>())
            .finish()
    }
}

/// Creates independent machines from one compiled table.
///
/// Instances share the table (including states discovered at runtime), the
/// declared handlers and the plugins. Each has its own state, pending flag
/// and observers.
#[derive(Clone)]
pub struct MachineFactory {
    blueprint: Arc<Blueprint>,
}

impl MachineFactory {
    /// Create a machine, run every plugin's `init`, then fire the initial
    /// transition (if any) to completion.
    pub async fn create(&self) -> Result<Machine, BuildError> {
        let machine = Machine::new(Arc::clone(&self.blueprint));
        for plugin in machine.plugins() {
            debug!(machine = %machine.id(), plugin = plugin.name(), "plugin init");
            plugin.init(&machine);
        }
        machine.init().await.map_err(BuildError::Init)?;
        Ok(machine)
    }
}

impl fmt::Debug for MachineFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MachineFactory")
            .field("methods", &self.blueprint.methods)
            .finish()
    }
}
