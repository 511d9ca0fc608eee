//! The transition engine around the pure table.
//!
//! This module runs user code: destination functions, phase observers and
//! plugins. It owns the single-in-flight guarantee and the ordered lifecycle
//! pipeline.
//!
//! # Key Concepts
//!
//! - **Machine**: one instance with its current state, pending flag and observers
//! - **Lifecycle**: the twelve ordered phases run for every transition
//! - **Deferred values**: observers may return a future; the pipeline
//!   suspends at that observer and resumes with the next one once it settles

mod lifecycle;
mod machine;
mod observer;
mod plugin;
mod transition;

pub(crate) use machine::Blueprint;
pub use lifecycle::{phase_plan, LifecycleContext, Phase};
pub use machine::{Machine, RejectionHandler};
pub use observer::{Deferred, Handler, HookError, HookOutcome, Observer};
pub use plugin::Plugin;
pub use transition::{MachineError, RejectionKind, TransitionError, TransitionOutcome};
