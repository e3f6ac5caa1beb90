use std::collections::BTreeSet;

use goap_ground::{AtomExpr, LiftedDomain, Resolver};
use proptest::prelude::*;

fn use_domain(facts: &BTreeSet<u8>, goal: u8) -> LiftedDomain {
    let mut domain = LiftedDomain::new();
    domain.declare_atom("Has(item)", false).unwrap();
    domain.declare_atom("Used(item)", false).unwrap();
    domain.declare_action("Use(item)", 1).unwrap();
    domain.precondition("Use(item)", "Has(item)", true).unwrap();
    domain.effect("Use(item)", "Used(item)", true).unwrap();
    for n in facts {
        domain.initial(&format!("Has({n})"), true).unwrap();
    }
    domain.goal(&format!("Used({goal})"), true).unwrap();
    domain
}

#[test]
fn constants_may_come_from_the_goal_alone() {
    let domain = use_domain(&BTreeSet::new(), 3);
    let problem = Resolver::new(&domain).ground().unwrap();
    assert_eq!(problem.registry.action_name(0), Some("Use(3)"));
    let has = problem.registry.atom_index("Has(3)").unwrap();
    assert_eq!(problem.start.get(has), Some(false));
}

#[test]
fn string_constants_keep_their_quotes() {
    let mut domain = LiftedDomain::new();
    domain.declare_atom("Tab(name)", false).unwrap();
    domain.declare_atom("Focused", false).unwrap();
    domain.declare_action("focus(name)", 2).unwrap();
    domain.precondition("focus(name)", "Tab(name)", true).unwrap();
    domain.effect("focus(name)", "Focused", true).unwrap();
    domain.initial("Tab(\"a b\")", true).unwrap();

    let problem = Resolver::new(&domain).ground().unwrap();
    let action = problem.registry.action(0).unwrap();
    assert_eq!(action.name(), "focus(\"a b\")");
    assert_eq!(action.cost(), 2);
    let parsed = AtomExpr::parse(action.name()).unwrap();
    assert!(parsed.is_ground());
}

proptest! {
    #[test]
    fn one_instance_per_observed_constant(
        facts in prop::collection::btree_set(0u8..16, 0..10),
        goal in 0u8..16,
    ) {
        let domain = use_domain(&facts, goal);
        let problem = Resolver::new(&domain).ground().unwrap();

        let mut expected: BTreeSet<u8> = facts.clone();
        expected.insert(goal);
        let names: BTreeSet<String> = problem
            .registry
            .actions()
            .iter()
            .map(|a| a.name().to_string())
            .collect();
        let wanted: BTreeSet<String> = expected.iter().map(|n| format!("Use({n})")).collect();
        prop_assert_eq!(names, wanted);
        prop_assert_eq!(problem.start.defined(), problem.registry.universe_mask());
        prop_assert!(problem.diagnostics.is_empty());
    }

    #[test]
    fn grounding_is_deterministic(
        facts in prop::collection::btree_set(0u8..16, 0..10),
        goal in 0u8..16,
    ) {
        let domain = use_domain(&facts, goal);
        let first = Resolver::new(&domain).ground().unwrap();
        let second = Resolver::new(&domain).ground().unwrap();
        prop_assert_eq!(first.registry.atoms(), second.registry.atoms());
        prop_assert_eq!(first.registry.actions(), second.registry.actions());
        prop_assert_eq!(first.start, second.start);
        prop_assert_eq!(first.goal, second.goal);
    }
}
