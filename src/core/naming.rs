//! Derivation of lifecycle hook identifiers.
//!
//! Every transition and state label maps to a fixed set of hook identifiers
//! (`beforeStep`, `leaveA`, `enterB`, ...). Derivation is a pure function of
//! the raw label so observers can be attached by name before a state is ever
//! reached.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::{BTreeSet, HashMap};

/// Generic phase fired before every transition.
pub const BEFORE_TRANSITION: &str = "beforeTransition";
/// Generic phase fired after every transition.
pub const AFTER_TRANSITION: &str = "afterTransition";
/// Generic phase fired between leaving and entering.
pub const ON_TRANSITION: &str = "onTransition";
/// Generic phase fired when any state is entered.
pub const ENTER_STATE: &str = "enterState";
/// Generic phase fired when any state is left.
pub const LEAVE_STATE: &str = "leaveState";

/// The five generic phase names, in no particular order.
pub const GENERIC_PHASES: [&str; 5] = [
    BEFORE_TRANSITION,
    AFTER_TRANSITION,
    ON_TRANSITION,
    ENTER_STATE,
    LEAVE_STATE,
];

/// Normalize a raw identifier into lower camel case.
///
/// The label is split on `-` and `_`. A single word whose first character is
/// not uppercase is returned untouched. Otherwise the first word is lowercased
/// and every following word is title-cased, so `DO_IT`, `do_it` and `do-it`
/// all become `doIt`.
///
/// # Example
///
/// ```rust
/// use statehook::core::camelize;
///
/// assert_eq!(camelize("do-with-dash"), "doWithDash");
/// assert_eq!(camelize("DO_IT"), "doIt");
/// assert_eq!(camelize("alreadyCamelized"), "alreadyCamelized");
/// ```
pub fn camelize(label: &str) -> Cow<'_, str> {
    let mut words = label.split(['-', '_']);
    let first = words.next().unwrap_or_default();

    if first.len() == label.len() && !first.chars().next().is_some_and(char::is_uppercase) {
        return Cow::Borrowed(label);
    }

    let mut result = first.to_lowercase();
    for word in words {
        let mut chars = word.chars();
        if let Some(head) = chars.next() {
            result.extend(head.to_uppercase());
            result.push_str(&chars.as_str().to_lowercase());
        }
    }
    Cow::Owned(result)
}

/// Build a prefixed hook identifier: `prefixed("enter", "solid")` is `enterSolid`.
pub fn prefixed(prefix: &str, label: &str) -> String {
    let label = camelize(label);
    let mut chars = label.chars();
    let mut result = String::with_capacity(prefix.len() + label.len());
    result.push_str(prefix);
    if let Some(head) = chars.next() {
        result.extend(head.to_uppercase());
        result.push_str(chars.as_str());
    }
    result
}

/// The hook identifiers derived from one raw transition or state label.
///
/// `before`, `after` and `on` are used when the label names a transition;
/// `enter`, `leave` and `on` when it names a state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookNames {
    pub before: String,
    pub after: String,
    pub on: String,
    pub enter: String,
    pub leave: String,
}

impl HookNames {
    /// Derive all five hook identifiers for `identifier`.
    pub fn derive(identifier: &str) -> Self {
        Self {
            before: prefixed("before", identifier),
            after: prefixed("after", identifier),
            on: prefixed("on", identifier),
            enter: prefixed("enter", identifier),
            leave: prefixed("leave", identifier),
        }
    }

    fn contains(&self, hook: &str) -> bool {
        [&self.before, &self.after, &self.on, &self.enter, &self.leave]
            .into_iter()
            .any(|name| name == hook)
    }
}

/// Registry of every hook identifier a table knows about.
///
/// Holds the derived names for each known state and transition, plus any
/// extra names reserved by plugins. Entries are only ever added.
#[derive(Clone, Debug, Default)]
pub struct LifecycleNameMap {
    names: HashMap<String, HookNames>,
    reserved: BTreeSet<String>,
}

impl LifecycleNameMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the derived names for `identifier`. Idempotent.
    pub fn insert(&mut self, identifier: &str) -> &HookNames {
        self.names
            .entry(identifier.to_string())
            .or_insert_with(|| HookNames::derive(identifier))
    }

    /// Reserve an additional phase name (used by plugins).
    pub fn reserve(&mut self, hook: impl Into<String>) {
        self.reserved.insert(hook.into());
    }

    /// Derived names for a raw identifier, if it has been registered.
    pub fn get(&self, identifier: &str) -> Option<&HookNames> {
        self.names.get(identifier)
    }

    /// Derived names for a raw identifier, computing them if unregistered.
    pub fn names_for(&self, identifier: &str) -> Cow<'_, HookNames> {
        match self.names.get(identifier) {
            Some(names) => Cow::Borrowed(names),
            None => Cow::Owned(HookNames::derive(identifier)),
        }
    }

    /// Whether `hook` is a generic, derived or reserved phase name.
    pub fn is_known(&self, hook: &str) -> bool {
        GENERIC_PHASES.contains(&hook)
            || self.reserved.contains(hook)
            || self.names.values().any(|names| names.contains(hook))
    }

    /// Names reserved by plugins.
    pub fn reserved(&self) -> impl Iterator<Item = &str> {
        self.reserved.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camelize_handles_separators() {
        assert_eq!(camelize("do-with-dash"), "doWithDash");
        assert_eq!(camelize("do_with_underscore"), "doWithUnderscore");
        assert_eq!(camelize("mixed-sep_arators"), "mixedSepArators");
    }

    #[test]
    fn camelize_lowercases_shouting_identifiers() {
        assert_eq!(camelize("DO_IT"), "doIt");
        assert_eq!(camelize("do_it"), "doIt");
        assert_eq!(camelize("FOO"), "foo");
        assert_eq!(camelize("Foo"), "foo");
    }

    #[test]
    fn camelize_leaves_normalized_identifiers_untouched() {
        assert!(matches!(camelize("alreadyCamelized"), Cow::Borrowed(_)));
        assert_eq!(camelize("alreadyCamelized"), "alreadyCamelized");
        assert_eq!(camelize("step"), "step");
        assert_eq!(camelize(""), "");
    }

    #[test]
    fn camelize_skips_empty_words() {
        assert_eq!(camelize("a--b"), "aB");
        assert_eq!(camelize("trailing-"), "trailing");
    }

    #[test]
    fn prefixed_capitalizes_the_label() {
        assert_eq!(prefixed("before", "step"), "beforeStep");
        assert_eq!(prefixed("enter", "do-it"), "enterDoIt");
        assert_eq!(prefixed("on", "DO_IT"), "onDoIt");
        assert_eq!(prefixed("leave", "none"), "leaveNone");
    }

    #[test]
    fn hook_names_derive_all_five() {
        let names = HookNames::derive("warm-up");
        assert_eq!(names.before, "beforeWarmUp");
        assert_eq!(names.after, "afterWarmUp");
        assert_eq!(names.on, "onWarmUp");
        assert_eq!(names.enter, "enterWarmUp");
        assert_eq!(names.leave, "leaveWarmUp");
    }

    #[test]
    fn name_map_insert_is_idempotent() {
        let mut map = LifecycleNameMap::new();
        map.insert("solid");
        map.insert("solid");
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("solid").map(|n| n.enter.as_str()), Some("enterSolid"));
    }

    #[test]
    fn name_map_knows_generic_derived_and_reserved_names() {
        let mut map = LifecycleNameMap::new();
        map.insert("melt");
        map.reserve("onHistoryChange");

        assert!(map.is_known(ENTER_STATE));
        assert!(map.is_known("beforeMelt"));
        assert!(map.is_known("onHistoryChange"));
        assert!(!map.is_known("beforeFreeze"));
        assert_eq!(map.reserved().collect::<Vec<_>>(), vec!["onHistoryChange"]);
    }

    #[test]
    fn names_for_falls_back_to_derivation() {
        let map = LifecycleNameMap::new();
        assert_eq!(map.names_for("gas").leave, "leaveGas");
    }
}
