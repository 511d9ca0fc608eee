//! Transition table compiler.
//!
//! Turns a list of [`TransitionDescriptor`]s into the lookup structures the
//! engine consults on every fire: the known states, the known transition
//! names, a `(state, transition) -> descriptor` map with a wildcard fallback,
//! and the [`LifecycleNameMap`].

use super::naming::LifecycleNameMap;
use super::transition::{DestinationFn, Source, Target, TransitionDescriptor};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Table-wide settings, passed explicitly at construction.
///
/// There are no process-wide defaults; two tables built from two configs
/// never influence each other.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Name of the implicit initial transition.
    pub init_name: String,
    /// Origin of the initial transition, the "no state yet" label.
    pub init_from: String,
    /// State reached by the initial transition. No initial transition is
    /// registered when this is `None`.
    pub init: Option<String>,
    /// Run the leave/commit/enter phases even when a transition does not
    /// change the state.
    pub observe_unchanged_state: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            init_name: "init".to_string(),
            init_from: "none".to_string(),
            init: None,
            observe_unchanged_state: false,
        }
    }
}

impl TableConfig {
    /// Default settings with an initial transition into `state`.
    pub fn with_init(state: impl Into<String>) -> Self {
        Self {
            init: Some(state.into()),
            ..Self::default()
        }
    }
}

/// Transitions usable from one origin, keyed by name, in registration order.
#[derive(Clone, Debug, Default)]
pub struct TableEntry {
    order: Vec<String>,
    by_name: HashMap<String, TransitionDescriptor>,
}

impl TableEntry {
    fn insert(&mut self, descriptor: TransitionDescriptor) {
        if !self.by_name.contains_key(&descriptor.name) {
            self.order.push(descriptor.name.clone());
        }
        self.by_name.insert(descriptor.name.clone(), descriptor);
    }

    pub fn get(&self, name: &str) -> Option<&TransitionDescriptor> {
        self.by_name.get(name)
    }

    /// Transition names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Effective destination of a `(state, transition)` lookup.
#[derive(Clone)]
pub enum Resolution {
    /// No transition with that name is usable from the state.
    Unknown,
    /// The transition leads to this state. Self-loops resolve to the
    /// current state.
    State(String),
    /// The caller must invoke the function to learn the destination.
    Computed(DestinationFn),
}

impl std::fmt::Debug for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => f.write_str("Unknown"),
            Self::State(state) => f.debug_tuple("State").field(state).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl Resolution {
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }
}

/// Compiled lookup structures for a set of transitions.
///
/// States and transition names are only ever added. The wildcard origin
/// entry always exists, even when empty.
#[derive(Clone, Debug)]
pub struct TransitionTable {
    config: TableConfig,
    states: Vec<String>,
    transitions: Vec<String>,
    entries: HashMap<String, TableEntry>,
    wildcard: TableEntry,
    lifecycle: LifecycleNameMap,
}

impl TransitionTable {
    /// Create a table, registering the initial transition if the config
    /// names an initial state.
    ///
    /// # Example
    ///
    /// ```rust
    /// use statehook::core::{Resolution, TableConfig, TransitionTable};
    /// use statehook::transitions;
    ///
    /// let mut table = TransitionTable::new(TableConfig::with_init("A"));
    /// for descriptor in transitions! { "step": "A" => "B" } {
    ///     table.register(descriptor);
    /// }
    ///
    /// assert_eq!(table.states(), ["none", "A", "B"]);
    /// assert!(matches!(table.destination("A", "step"), Resolution::State(s) if s == "B"));
    /// ```
    pub fn new(config: TableConfig) -> Self {
        let mut table = Self {
            config,
            states: Vec::new(),
            transitions: Vec::new(),
            entries: HashMap::new(),
            wildcard: TableEntry::default(),
            lifecycle: LifecycleNameMap::new(),
        };

        if let Some(init) = table.config.init.clone() {
            let descriptor = TransitionDescriptor::new(
                table.config.init_name.clone(),
                Source::state(table.config.init_from.clone()),
                Target::State(init),
            );
            table.register(descriptor);
        }
        table
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Name of the initial transition, if one was registered.
    pub fn init_transition(&self) -> Option<&str> {
        self.config
            .init
            .as_ref()
            .map(|_| self.config.init_name.as_str())
    }

    /// Register a descriptor.
    ///
    /// Fixed origins and destinations join the state set; a computed
    /// destination is registered lazily when it is first reached. A repeated
    /// `(origin, name)` pair overwrites the earlier descriptor.
    pub fn register(&mut self, descriptor: TransitionDescriptor) {
        if let Source::States(states) = &descriptor.from {
            for state in states {
                self.add_state(state);
            }
        }

        if let Target::State(to) = &descriptor.to {
            self.add_state(to);
        }

        if !self.transitions.contains(&descriptor.name) {
            self.transitions.push(descriptor.name.clone());
            self.lifecycle.insert(&descriptor.name);
        }

        match descriptor.from.clone() {
            Source::Any => self.wildcard.insert(descriptor),
            Source::States(states) => {
                for state in states {
                    self.entries
                        .entry(state)
                        .or_default()
                        .insert(descriptor.clone());
                }
            }
        }
    }

    /// Add a state discovered at runtime. Returns `true` if it was new.
    pub fn add_state(&mut self, state: &str) -> bool {
        if self.has_state(state) {
            return false;
        }
        self.states.push(state.to_string());
        self.lifecycle.insert(state);
        true
    }

    /// Reserve an extra phase name in the lifecycle map.
    pub fn reserve_lifecycle_name(&mut self, name: impl Into<String>) {
        self.lifecycle.reserve(name);
    }

    /// The descriptor that applies to `(state, transition)`, preferring an
    /// exact entry over the wildcard entry.
    pub fn resolve(&self, state: &str, transition: &str) -> Option<&TransitionDescriptor> {
        self.entries
            .get(state)
            .and_then(|entry| entry.get(transition))
            .or_else(|| self.wildcard.get(transition))
    }

    /// The effective destination of `transition` fired from `state`.
    pub fn destination(&self, state: &str, transition: &str) -> Resolution {
        match self.resolve(state, transition).map(|d| &d.to) {
            None => Resolution::Unknown,
            Some(Target::Same) => Resolution::State(state.to_string()),
            Some(Target::State(to)) => Resolution::State(to.clone()),
            Some(Target::Computed(f)) => Resolution::Computed(f.clone()),
        }
    }

    /// Transition names usable from `state`: exact entries first, then
    /// wildcard entries, without duplicates.
    pub fn transitions_for(&self, state: &str) -> Vec<String> {
        let exact = self.entries.get(state).into_iter().flat_map(TableEntry::names);

        let mut names: Vec<String> = Vec::new();
        for name in exact.chain(self.wildcard.names()) {
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
        names
    }

    /// The entry for an exact origin state.
    pub fn entry(&self, state: &str) -> Option<&TableEntry> {
        self.entries.get(state)
    }

    /// The wildcard origin entry.
    pub fn wildcard(&self) -> &TableEntry {
        &self.wildcard
    }

    pub fn has_state(&self, state: &str) -> bool {
        self.states.iter().any(|s| s == state)
    }

    /// Known states in registration order.
    pub fn states(&self) -> &[String] {
        &self.states
    }

    /// Known transition names in registration order.
    pub fn transitions(&self) -> &[String] {
        &self.transitions
    }

    pub fn lifecycle(&self) -> &LifecycleNameMap {
        &self.lifecycle
    }
}
