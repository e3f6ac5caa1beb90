use goap_core::{Registry, WorldState};
use proptest::prelude::*;

const ATOMS: usize = 8;

/// `(atom, value)` pairs; later duplicates overwrite earlier ones.
fn conditions() -> impl Strategy<Value = Vec<(usize, bool)>> {
    prop::collection::vec((0..ATOMS, any::<bool>()), 0..ATOMS)
}

fn registry_with(pre: &[(usize, bool)], post: &[(usize, bool)]) -> Registry {
    let mut reg = Registry::new();
    for i in 0..ATOMS {
        reg.declare_atom(&format!("a{i}")).unwrap();
    }
    reg.declare_action("act", 1).unwrap();
    for &(atom, value) in pre {
        reg.set_precondition("act", &format!("a{atom}"), value).unwrap();
    }
    for &(atom, value) in post {
        reg.set_effect("act", &format!("a{atom}"), value).unwrap();
    }
    reg
}

proptest! {
    #[test]
    fn apply_respects_conditions(
        pre in conditions(),
        post in conditions(),
        values in any::<u8>(),
    ) {
        let reg = registry_with(&pre, &post);
        let state = WorldState::from_bits(u64::from(values), reg.universe_mask());
        let action = reg.action(0).unwrap();

        match reg.apply(0, &state) {
            None => prop_assert!(!state.satisfies(action.preconditions())),
            Some(next) => {
                for (atom, value) in action.preconditions().iter() {
                    prop_assert_eq!(state.get(atom), Some(value));
                }
                for (atom, value) in action.effects().iter() {
                    prop_assert_eq!(next.get(atom), Some(value));
                }
                for atom in 0..ATOMS {
                    if !action.effects().is_defined(atom) {
                        prop_assert_eq!(next.get(atom), state.get(atom));
                    }
                }
            }
        }
    }

    #[test]
    fn apply_is_pure(pre in conditions(), post in conditions(), values in any::<u8>()) {
        let reg = registry_with(&pre, &post);
        let state = WorldState::from_bits(u64::from(values), reg.universe_mask());
        let snapshot = state;
        let first = reg.apply(0, &state);
        let second = reg.apply(0, &state);
        prop_assert_eq!(first, second);
        prop_assert_eq!(state, snapshot);
    }

    #[test]
    fn regression_is_sound(
        pre in conditions(),
        post in conditions(),
        goal_bits in any::<u8>(),
        goal_mask in any::<u8>(),
        fill in any::<u8>(),
    ) {
        let reg = registry_with(&pre, &post);
        let action = reg.action(0).unwrap();
        let goal = WorldState::from_bits(u64::from(goal_bits), u64::from(goal_mask));

        if let Some(before) = action.regress(&goal) {
            // Any concrete state satisfying the regressed goal reaches the goal in one step.
            let concrete = WorldState::from_bits(u64::from(fill), reg.universe_mask())
                .overwrite(&before);
            let next = action.apply(&concrete);
            prop_assert!(next.is_some());
            prop_assert!(next.unwrap().satisfies(&goal));
        }
    }
}
