//! Property-based tests for the pure transition table.
//!
//! These tests use proptest to verify properties hold across
//! many randomly generated inputs.

use proptest::prelude::*;
use statehook::core::{
    camelize, prefixed, HookNames, Resolution, Source, TableConfig, Target, TransitionDescriptor,
    TransitionTable,
};

prop_compose! {
    fn arbitrary_label()(label in "[a-z][a-z0-9]{0,5}([-_][a-z][a-z0-9]{0,5}){0,3}") -> String {
        label
    }
}

prop_compose! {
    fn arbitrary_state()(variant in 0..5u8) -> String {
        ["A", "B", "C", "D", "E"][variant as usize].to_string()
    }
}

prop_compose! {
    fn arbitrary_descriptor()(
        name in prop::sample::select(vec!["step", "reset", "goto"]),
        origins in prop::collection::vec(arbitrary_state(), 0..3),
        to in arbitrary_state(),
    ) -> TransitionDescriptor {
        let from = if origins.is_empty() {
            Source::Any
        } else {
            Source::States(origins)
        };
        TransitionDescriptor::new(name, from, Target::State(to))
    }
}

fn compile(descriptors: &[TransitionDescriptor]) -> TransitionTable {
    let mut table = TransitionTable::new(TableConfig::default());
    for descriptor in descriptors {
        table.register(descriptor.clone());
    }
    table
}

proptest! {
    #[test]
    fn camelize_is_deterministic(label in arbitrary_label()) {
        prop_assert_eq!(camelize(&label), camelize(&label));
    }

    #[test]
    fn camelize_is_idempotent(label in arbitrary_label()) {
        let once = camelize(&label).into_owned();
        let twice = camelize(&once).into_owned();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn camelized_labels_have_no_separators(label in arbitrary_label()) {
        let camel = camelize(&label);
        prop_assert!(!camel.contains('-'));
        prop_assert!(!camel.contains('_'));
    }

    #[test]
    fn hook_names_carry_their_prefix(label in arbitrary_label()) {
        let names = HookNames::derive(&label);
        prop_assert!(names.before.starts_with("before"));
        prop_assert!(names.after.starts_with("after"));
        prop_assert!(names.enter.starts_with("enter"));
        prop_assert!(names.leave.starts_with("leave"));
        prop_assert_eq!(names.on, prefixed("on", &label));
    }

    #[test]
    fn exact_entries_win_over_wildcard(
        descriptors in prop::collection::vec(arbitrary_descriptor(), 1..12),
        state in arbitrary_state(),
    ) {
        let table = compile(&descriptors);

        for name in table.transitions() {
            let exact = descriptors.iter().rev().find(|d| {
                d.name == *name && matches!(&d.from, Source::States(s) if s.contains(&state))
            });
            let wildcard = descriptors
                .iter()
                .rev()
                .find(|d| d.name == *name && d.from == Source::Any);
            let expected = exact.or(wildcard).and_then(|d| d.to.state());

            match table.destination(&state, name) {
                Resolution::State(to) => prop_assert_eq!(Some(to.as_str()), expected),
                Resolution::Unknown => prop_assert_eq!(expected, None),
                Resolution::Computed(_) => prop_assert!(false, "no computed targets registered"),
            }
        }
    }

    #[test]
    fn transitions_for_lists_exactly_the_usable_names(
        descriptors in prop::collection::vec(arbitrary_descriptor(), 0..12),
        state in arbitrary_state(),
    ) {
        let table = compile(&descriptors);
        let usable = table.transitions_for(&state);

        let mut unique = usable.clone();
        unique.sort();
        unique.dedup();
        prop_assert_eq!(unique.len(), usable.len());

        for name in table.transitions() {
            let resolvable = !table.destination(&state, name).is_unknown();
            prop_assert_eq!(usable.contains(name), resolvable);
        }
    }

    #[test]
    fn registered_states_are_unique(
        descriptors in prop::collection::vec(arbitrary_descriptor(), 0..12),
    ) {
        let table = compile(&descriptors);
        let mut states = table.states().to_vec();
        states.sort();
        states.dedup();
        prop_assert_eq!(states.len(), table.states().len());
    }
}
