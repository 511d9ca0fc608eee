//! Macros for ergonomic transition declaration.

/// Declare transition descriptors in table form.
///
/// Origins are a state, a list of states, or `*` for any state.
/// Destinations are a state or `*` to keep the current state.
///
/// # Example
///
/// ```
/// use statehook::core::{Source, Target};
/// use statehook::transitions;
///
/// let descriptors = transitions! {
///     "melt": "solid" => "liquid",
///     "vaporize": ["solid", "liquid"] => "gas",
///     "reset": * => "solid",
///     "noop": * => *,
/// };
///
/// assert_eq!(descriptors.len(), 4);
/// assert_eq!(descriptors[2].from, Source::Any);
/// assert!(matches!(descriptors[3].to, Target::Same));
/// ```
#[macro_export]
macro_rules! transitions {
    (@from *) => {
        $crate::core::Source::Any
    };
    (@from [ $($state:literal),* $(,)? ]) => {
        $crate::core::Source::States(::std::vec![$(::std::string::String::from($state)),*])
    };
    (@from $state:literal) => {
        $crate::core::Source::state($state)
    };
    (@to *) => {
        $crate::core::Target::Same
    };
    (@to $state:literal) => {
        $crate::core::Target::State(::std::string::String::from($state))
    };
    (
        $( $name:literal : $from:tt => $to:tt ),* $(,)?
    ) => {
        ::std::vec![
            $(
                $crate::core::TransitionDescriptor::new(
                    $name,
                    $crate::transitions!(@from $from),
                    $crate::transitions!(@to $to),
                )
            ),*
        ]
    };
}

#[cfg(test)]
mod tests {
    use crate::core::{Source, Target, TransitionDescriptor};

    #[test]
    fn transitions_macro_builds_descriptors() {
        let descriptors = transitions! {
            "step": "A" => "B",
            "step": "B" => "C",
        };

        assert_eq!(descriptors.len(), 2);
        assert_eq!(descriptors[0].name, "step");
        assert_eq!(descriptors[0].from, Source::state("A"));
        assert_eq!(descriptors[1].to.state(), Some("C"));
    }

    #[test]
    fn transitions_macro_supports_wildcards_and_lists() {
        let descriptors = transitions! {
            "melt": ["solid", "slush"] => "liquid",
            "reset": * => "solid",
            "noop": * => *
        };

        assert_eq!(
            descriptors[0].from,
            Source::States(vec!["solid".into(), "slush".into()])
        );
        assert_eq!(descriptors[1].from, Source::Any);
        assert!(matches!(descriptors[2].to, Target::Same));
    }

    #[test]
    fn transitions_macro_accepts_empty_input() {
        let descriptors: Vec<TransitionDescriptor> = transitions! {};
        assert!(descriptors.is_empty());
    }
}
