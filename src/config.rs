//! Declarative machine configuration.
//!
//! A [`MachineConfig`] describes a machine as data, typically JSON:
//!
//! ```json
//! {
//!   "init": "solid",
//!   "transitions": [
//!     { "name": "melt",     "from": "solid",  "to": "liquid" },
//!     { "name": "freeze",   "from": "liquid", "to": "solid" },
//!     { "name": "vaporize", "from": ["liquid", "solid"], "to": "gas" },
//!     { "name": "reset",    "from": "*",      "to": "solid" },
//!     { "name": "noop",     "from": "*" }
//!   ]
//! }
//! ```
//!
//! The wildcard token is only meaningful here. It is translated into
//! [`Source::Any`] and [`Target::Same`] and never reaches the table as a
//! state label.

use crate::core::{Source, TableConfig, Target, TransitionDescriptor};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_WILDCARD: &str = "*";

fn default_wildcard() -> String {
    DEFAULT_WILDCARD.to_string()
}

/// Errors raised while loading a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid machine configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Wildcard token must not be empty")]
    EmptyWildcard,
}

/// One state or a list of states.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StateList {
    One(String),
    Many(Vec<String>),
}

impl StateList {
    fn contains(&self, state: &str) -> bool {
        match self {
            Self::One(one) => one == state,
            Self::Many(many) => many.iter().any(|s| s == state),
        }
    }

    fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(one) => vec![one],
            Self::Many(many) => many,
        }
    }
}

/// A transition as data. A missing `from` means any state; a missing `to`
/// means the transition keeps the current state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionConfig {
    pub name: String,
    #[serde(default)]
    pub from: Option<StateList>,
    #[serde(default)]
    pub to: Option<String>,
}

/// A complete machine definition without behavior.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineConfig {
    #[serde(flatten)]
    pub table: TableConfig,
    #[serde(default = "default_wildcard")]
    pub wildcard: String,
    #[serde(default)]
    pub transitions: Vec<TransitionConfig>,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            table: TableConfig::default(),
            wildcard: default_wildcard(),
            transitions: Vec::new(),
        }
    }
}

impl MachineConfig {
    /// Parse a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        if config.wildcard.is_empty() {
            return Err(ConfigError::EmptyWildcard);
        }
        Ok(config)
    }

    /// Translate the declared transitions into descriptors.
    pub fn descriptors(&self) -> Vec<TransitionDescriptor> {
        self.transitions
            .iter()
            .map(|transition| {
                let from = match &transition.from {
                    Some(states) if !states.contains(&self.wildcard) => {
                        Source::States(states.clone().into_vec())
                    }
                    _ => Source::Any,
                };
                let to = match &transition.to {
                    Some(state) if *state != self.wildcard => Target::State(state.clone()),
                    _ => Target::Same,
                };
                TransitionDescriptor::new(transition.name.clone(), from, to)
            })
            .collect()
    }
}
