//! The per-transition lifecycle: its context value and its ordered phases.

use super::machine::Machine;
use crate::core::{
    LifecycleNameMap, AFTER_TRANSITION, BEFORE_TRANSITION, ENTER_STATE, LEAVE_STATE,
    ON_TRANSITION,
};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// One step of the pipeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    /// A named phase whose observers are invoked in order.
    Observed(String),
    /// The internal step that assigns the destination as current state.
    Commit,
}

impl Phase {
    /// The observable name, `None` for the commit step.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Observed(name) => Some(name),
            Self::Commit => None,
        }
    }
}

/// The ordered phases of `transition` from `from` to `to`.
///
/// When `changed` is false the leave, commit and enter phases (and the
/// destination shortcut) are left out.
pub fn phase_plan(
    names: &LifecycleNameMap,
    transition: &str,
    from: &str,
    to: &str,
    changed: bool,
) -> Vec<Phase> {
    let event = names.names_for(transition);
    let origin = names.names_for(from);
    let destination = names.names_for(to);
    let observed = |name: &str| Some(Phase::Observed(name.to_string()));
    let when_changed = |phase: Option<Phase>| phase.filter(|_| changed);

    [
        observed(BEFORE_TRANSITION),
        observed(&event.before),
        when_changed(observed(LEAVE_STATE)),
        when_changed(observed(&origin.leave)),
        observed(ON_TRANSITION),
        when_changed(Some(Phase::Commit)),
        when_changed(observed(ENTER_STATE)),
        when_changed(observed(&destination.enter)),
        when_changed(observed(&destination.on)),
        observed(AFTER_TRANSITION),
        observed(&event.after),
        observed(&event.on),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Transient description of the transition being run.
///
/// Created when the pipeline starts, advanced phase by phase, and dropped
/// when the transition ends. Every observer receives it.
#[derive(Clone)]
pub struct LifecycleContext {
    pub transition: String,
    pub from: String,
    pub to: String,
    /// Name of the phase being run; empty during the commit step.
    pub phase: String,
    pub args: Vec<Value>,
    pub started_at: DateTime<Utc>,
    machine: Machine,
}

impl LifecycleContext {
    pub(crate) fn new(
        machine: Machine,
        transition: &str,
        from: &str,
        to: &str,
        args: Vec<Value>,
    ) -> Self {
        Self {
            transition: transition.to_string(),
            from: from.to_string(),
            to: to.to_string(),
            phase: String::new(),
            args,
            started_at: Utc::now(),
            machine,
        }
    }

    /// The machine running this transition.
    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    /// Positional call argument.
    pub fn arg(&self, index: usize) -> Option<&Value> {
        self.args.get(index)
    }

    /// Time since the transition started.
    pub fn elapsed(&self) -> Duration {
        Utc::now()
            .signed_duration_since(self.started_at)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }
}

impl fmt::Debug for LifecycleContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleContext")
            .field("transition", &self.transition)
            .field("from", &self.from)
            .field("to", &self.to)
            .field("phase", &self.phase)
            .field("args", &self.args)
            .field("started_at", &self.started_at)
            .field("machine", &self.machine.id())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(plan: &[Phase]) -> Vec<&str> {
        plan.iter().map(|p| p.name().unwrap_or("<commit>")).collect()
    }

    #[test]
    fn changed_transition_runs_twelve_phases() {
        let plan = phase_plan(&LifecycleNameMap::new(), "step", "A", "B", true);

        assert_eq!(
            names(&plan),
            vec![
                "beforeTransition",
                "beforeStep",
                "leaveState",
                "leaveA",
                "onTransition",
                "<commit>",
                "enterState",
                "enterB",
                "onB",
                "afterTransition",
                "afterStep",
                "onStep",
            ]
        );
    }

    #[test]
    fn unchanged_transition_skips_leave_commit_enter() {
        let plan = phase_plan(&LifecycleNameMap::new(), "noop", "A", "A", false);

        assert_eq!(
            names(&plan),
            vec![
                "beforeTransition",
                "beforeNoop",
                "onTransition",
                "afterTransition",
                "afterNoop",
                "onNoop",
            ]
        );
        assert!(!plan.contains(&Phase::Commit));
    }

    #[test]
    fn plan_camelizes_labels() {
        let plan = phase_plan(&LifecycleNameMap::new(), "warm-up", "COLD", "too_hot", true);
        let plan = names(&plan);

        assert!(plan.contains(&"beforeWarmUp"));
        assert!(plan.contains(&"leaveCold"));
        assert!(plan.contains(&"enterTooHot"));
        assert!(plan.contains(&"onTooHot"));
        assert!(plan.contains(&"onWarmUp"));
    }
}
