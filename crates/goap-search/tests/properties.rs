use goap_core::{Plan, PlanningError, Registry, Result, WorldState};
use goap_search::{Planner, SearchConfig, SearchMode};
use proptest::prelude::*;

/// Per atom: 0 = unconstrained, 1 = false, 2 = true.
type Conditions = Vec<u8>;

#[derive(Debug, Clone)]
struct RandomDomain {
    atoms: usize,
    actions: Vec<(u32, Conditions, Conditions)>,
    start: Vec<bool>,
    goal: Conditions,
}

fn random_domain() -> impl Strategy<Value = RandomDomain> {
    (1usize..=5)
        .prop_flat_map(|atoms| {
            let conditions = prop::collection::vec(0u8..3, atoms);
            let action = (1u32..=4, conditions.clone(), conditions.clone());
            (
                Just(atoms),
                prop::collection::vec(action, 1..=6),
                prop::collection::vec(any::<bool>(), atoms),
                conditions,
            )
        })
        .prop_map(|(atoms, actions, start, goal)| RandomDomain {
            atoms,
            actions,
            start,
            goal,
        })
}

fn build(domain: &RandomDomain) -> (Registry, WorldState, WorldState) {
    let mut registry = Registry::new();
    let names: Vec<String> = (0..domain.atoms).map(|i| format!("a{i}")).collect();
    for name in &names {
        registry.declare_atom(name).unwrap();
    }
    for (i, (cost, pre, post)) in domain.actions.iter().enumerate() {
        let action = format!("act{i}");
        registry.declare_action(&action, *cost).unwrap();
        for (atom, &c) in names.iter().zip(pre) {
            if c > 0 {
                registry.set_precondition(&action, atom, c == 2).unwrap();
            }
        }
        for (atom, &c) in names.iter().zip(post) {
            if c > 0 {
                registry.set_effect(&action, atom, c == 2).unwrap();
            }
        }
    }

    let mut start = WorldState::new();
    for (i, &value) in domain.start.iter().enumerate() {
        start.set(i, value);
    }
    let mut goal = WorldState::new();
    for (i, &c) in domain.goal.iter().enumerate() {
        if c > 0 {
            goal.set(i, c == 2);
        }
    }
    (registry, start, goal)
}

fn run(
    registry: &Registry,
    start: &WorldState,
    goal: &WorldState,
    config: SearchConfig,
) -> Result<Plan> {
    Planner::new(registry).with_config(config).plan(start, goal)
}

fn replays(registry: &Registry, start: &WorldState, goal: &WorldState, plan: &Plan) -> bool {
    let mut state = *start;
    let mut cost = 0u64;
    for step in &plan.steps {
        match registry.apply(step.action, &state) {
            Some(next) => state = next,
            None => return false,
        }
        cost += u64::from(step.cost);
    }
    state.satisfies(goal) && cost == plan.total_cost
}

proptest! {
    #[test]
    fn plans_replay_to_the_goal(domain in random_domain()) {
        let (registry, start, goal) = build(&domain);
        for mode in SearchMode::ALL {
            let config = SearchConfig::default().with_mode(mode);
            if let Ok(plan) = run(&registry, &start, &goal, config) {
                prop_assert!(replays(&registry, &start, &goal, &plan), "{mode}: {plan:?}");
            }
        }
    }

    #[test]
    fn modes_agree_on_satisfiability(domain in random_domain()) {
        let (registry, start, goal) = build(&domain);
        let results: Vec<Result<Plan>> = SearchMode::ALL
            .iter()
            .map(|&mode| run(&registry, &start, &goal, SearchConfig::default().with_mode(mode)))
            .collect();
        for result in &results {
            prop_assert!(
                !matches!(result, Err(PlanningError::SearchBudgetExceeded { .. })),
                "tiny domains never exhaust the budget"
            );
        }
        let solvable: Vec<bool> = results.iter().map(|r| r.is_ok()).collect();
        prop_assert!(solvable.iter().all(|&s| s == solvable[0]), "{solvable:?}");
    }

    #[test]
    fn uniform_cost_modes_agree_on_cost(domain in random_domain()) {
        let (registry, start, goal) = build(&domain);
        let costs: Vec<Option<u64>> = SearchMode::ALL
            .iter()
            .map(|&mode| {
                let config = SearchConfig::default().with_mode(mode).with_heuristic_weight(0);
                run(&registry, &start, &goal, config).ok().map(|plan| plan.total_cost)
            })
            .collect();
        prop_assert!(costs.iter().all(|&c| c == costs[0]), "{costs:?}");
    }

    #[test]
    fn repeated_runs_are_identical(domain in random_domain()) {
        let (registry, start, goal) = build(&domain);
        for mode in SearchMode::ALL {
            let config = SearchConfig::default().with_mode(mode);
            let first = run(&registry, &start, &goal, config);
            let second = run(&registry, &start, &goal, config);
            prop_assert_eq!(first, second);
        }
    }
}
