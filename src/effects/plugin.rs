//! Extension points consumed at construction and during every transition.

use super::lifecycle::LifecycleContext;
use super::machine::Machine;

/// A construction-time extension.
///
/// Plugins never take part in a phase the way observers do. They are told
/// about each phase as it is reached, which is enough to record history or
/// trace a run without altering it.
pub trait Plugin: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Extra phase names to reserve in the lifecycle name map before any
    /// transition is compiled.
    fn lifecycle_names(&self) -> Vec<String> {
        Vec::new()
    }

    /// Called once for every machine instance, before its initial transition.
    fn init(&self, _machine: &Machine) {}

    /// Called once per distinct phase reached while a transition runs,
    /// whether or not that phase has observers. The commit step is not
    /// reported.
    fn lifecycle(&self, _machine: &Machine, _lifecycle: &LifecycleContext) {}
}
