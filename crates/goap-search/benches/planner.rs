use criterion::{black_box, criterion_group, criterion_main, Criterion};
use goap_core::{Registry, WorldState};
use goap_search::{plan, SearchMode};

/// `bits` independent atoms, one setter each; the goal wants all of them.
fn toy_registry(bits: usize) -> (Registry, WorldState, WorldState) {
    let mut registry = Registry::new();
    let mut goal = Vec::with_capacity(bits);
    let names: Vec<String> = (0..bits).map(|i| format!("bit{i}")).collect();
    for name in &names {
        let action = format!("set {name}");
        registry.declare_atom(name).expect("atom");
        registry.declare_action(&action, 1).expect("action");
        registry.set_precondition(&action, name, false).expect("pre");
        registry.set_effect(&action, name, true).expect("effect");
        goal.push((name.as_str(), true));
    }

    let start = registry.closed_state(&[]).expect("start");
    let goal = registry.state(&goal).expect("goal");
    (registry, start, goal)
}

fn bench_search_modes(c: &mut Criterion) {
    let (registry, start, goal) = toy_registry(12);

    for mode in SearchMode::ALL {
        c.bench_function(&format!("goap-search/plan({mode}, bits=12)"), |b| {
            b.iter(|| {
                let plan = plan(&registry, &start, &goal, mode, 1 << 20).expect("plan");
                black_box(plan.steps.len());
            })
        });
    }
}

criterion_group!(benches, bench_search_modes);
criterion_main!(benches);
