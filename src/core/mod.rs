//! Core transition table types and logic.
//!
//! This module contains the table side of the engine:
//! - Lifecycle hook naming derived from state and transition labels
//! - Declarative transition descriptors
//! - The compiled transition table and its lookups
//!
//! Nothing in this module runs user code. Computed destinations are typed
//! against [`crate::effects::Machine`] and [`crate::effects::HookError`] and
//! are stored here, but only the engine in [`crate::effects`] invokes them.

mod naming;
mod table;
mod transition;

pub use naming::{
    camelize, prefixed, HookNames, LifecycleNameMap, AFTER_TRANSITION, BEFORE_TRANSITION,
    ENTER_STATE, GENERIC_PHASES, LEAVE_STATE, ON_TRANSITION,
};
pub use table::{Resolution, TableConfig, TableEntry, TransitionTable};
pub use transition::{Destination, DestinationFn, Source, Target, TransitionDescriptor};
