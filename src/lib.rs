//! Statehook: a hookable finite state machine
//!
//! Statehook compiles a declarative transition table once and drives machine
//! instances through it. Every transition runs an ordered lifecycle of named
//! phases that observers can watch, cancel, or suspend with a deferred value.
//!
//! The crate splits table logic from execution:
//!
//! - **core**: labels, descriptors, lifecycle names and the compiled table.
//!   Destination functions are stored here with signatures taken from the
//!   engine's types, but nothing here calls them.
//! - **effects**: the engine. It resolves destinations, guards against
//!   concurrent transitions and runs the phase pipeline.
//! - **builder**: fluent construction, the `transitions!` macro and factories.
//! - **config**: machines described as JSON.
//!
//! # Example
//!
//! ```rust
//! use statehook::builder::MachineBuilder;
//! use statehook::effects::HookOutcome;
//! use statehook::transitions;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let machine = MachineBuilder::new()
//!     .init("solid")
//!     .transitions(transitions! {
//!         "melt": "solid" => "liquid",
//!         "freeze": "liquid" => "solid",
//!     })
//!     .on("enterLiquid", |_| Ok(HookOutcome::Continue))
//!     .build()
//!     .await
//!     .unwrap();
//!
//! assert!(machine.can("melt"));
//! machine.call("melt", vec![]).await.unwrap();
//! assert_eq!(machine.state(), "liquid");
//! # }
//! ```

pub mod builder;
pub mod config;
pub mod core;
pub mod effects;

// Re-export commonly used types
pub use builder::{BuildError, MachineBuilder, MachineFactory, TransitionBuilder};
pub use config::{ConfigError, MachineConfig};
pub use core::{Source, TableConfig, Target, TransitionDescriptor, TransitionTable};
pub use effects::{
    HookError, HookOutcome, LifecycleContext, Machine, MachineError, Observer, Plugin,
    TransitionError, TransitionOutcome,
};
