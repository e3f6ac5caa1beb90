use core::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap};

use goap_core::{
    ActionIndex, Bits, Cancellation, Plan, PlanningError, Registry, Result, StateKey, WorldState,
};
use goap_tools::{Direction, NullTraceSink, SearchOutcome, TraceEvent, TraceSink};
use tracing::{debug, trace};

use crate::config::{SearchConfig, SearchMode};
use crate::tree::{SearchNode, SearchStats, SearchTree};

/// A* planner over the ground actions of one [`Registry`].
///
/// The heuristic counts mismatched goal atoms (scaled by
/// [`SearchConfig::heuristic_weight`]). It is not admissible for every cost distribution: an
/// action fixing several atoms at once can cost less than the count. Plans are optimal whenever
/// the estimate never exceeds the true remaining cost, and always with weight `0`.
///
/// Results are deterministic: frontier ties break on lower `g`, then the lower index of the
/// action that generated the node, then insertion order.
#[derive(Debug, Clone)]
pub struct Planner<'r> {
    registry: &'r Registry,
    config: SearchConfig,
}

impl<'r> Planner<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            config: SearchConfig::default(),
        }
    }

    pub fn with_config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    pub fn plan(&self, start: &WorldState, goal: &WorldState) -> Result<Plan> {
        self.plan_with(start, goal, &Cancellation::none(), None)
    }

    /// Plan with cooperative cancellation (polled before every expansion) and an optional sink
    /// receiving every search event.
    pub fn plan_with(
        &self,
        start: &WorldState,
        goal: &WorldState,
        cancel: &Cancellation,
        trace: Option<&mut dyn TraceSink>,
    ) -> Result<Plan> {
        self.explore(start, goal, cancel, trace).0
    }

    /// Like [`Planner::plan_with`], also returning the explored arena.
    pub fn explore(
        &self,
        start: &WorldState,
        goal: &WorldState,
        cancel: &Cancellation,
        trace: Option<&mut dyn TraceSink>,
    ) -> (Result<Plan>, SearchTree) {
        let mut null = NullTraceSink;
        let sink: &mut dyn TraceSink = match trace {
            Some(sink) => sink,
            None => &mut null,
        };
        let mut search = Search {
            registry: self.registry,
            config: &self.config,
            start: *start,
            goal: *goal,
            cancel,
            sink,
            tree: SearchTree::default(),
            seq: 0,
        };

        debug!(
            mode = %self.config.mode,
            actions = self.registry.action_count(),
            budget = self.config.max_expansions,
            "search started"
        );
        let result = if start.satisfies(goal) {
            Ok(Plan::empty())
        } else {
            match self.config.mode {
                SearchMode::Forward => search.run_single(Direction::Forward),
                SearchMode::Backward => search.run_single(Direction::Backward),
                SearchMode::Bidirectional => search.run_bidirectional(),
            }
        };
        search.finish(&result);
        (result, search.tree)
    }
}

/// Plan with default settings apart from `mode` and the expansion `budget`.
pub fn plan(
    registry: &Registry,
    start: &WorldState,
    goal: &WorldState,
    mode: SearchMode,
    budget: usize,
) -> Result<Plan> {
    let config = SearchConfig::default()
        .with_mode(mode)
        .with_max_expansions(budget);
    Planner::new(registry).with_config(config).plan(start, goal)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenEntry {
    f: u64,
    g: u64,
    action: ActionIndex,
    seq: u64,
    node: usize,
}

impl OpenEntry {
    fn key(&self) -> (u64, u64, ActionIndex, u64) {
        (self.f, self.g, self.action, self.seq)
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering to make BinaryHeap behave like a min-heap.
        other.key().cmp(&self.key())
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Open list plus the best known node per state for one direction.
struct Frontier {
    direction: Direction,
    open: BinaryHeap<OpenEntry>,
    best: BTreeMap<StateKey, (u64, usize)>,
}

impl Frontier {
    fn new(direction: Direction) -> Self {
        Self {
            direction,
            open: BinaryHeap::new(),
            best: BTreeMap::new(),
        }
    }

    /// Lower bound on `f` over the live entries.
    fn min_f(&self) -> Option<u64> {
        self.open.peek().map(|e| e.f)
    }

    fn pop(&mut self, nodes: &[SearchNode]) -> Option<usize> {
        while let Some(entry) = self.open.pop() {
            let key = nodes[entry.node].state.key();
            if self.best.get(&key).map(|&(_, id)| id) == Some(entry.node) {
                return Some(entry.node);
            }
            // stale heap entry
        }
        None
    }
}

#[derive(Debug, Clone, Copy)]
struct Meet {
    cost: u64,
    forward: usize,
    backward: usize,
}

/// A forward state restricted to the atoms `mask` constrains.
fn project(state: &WorldState, mask: Bits) -> StateKey {
    WorldState::from_bits(state.values(), mask).key()
}

/// Forward nodes grouped by their projection onto every `defined` mask seen in the backward
/// frontier. A concrete state satisfies a regressed goal exactly when its projection onto the
/// goal's mask equals the goal's key, so meet tests become map lookups.
#[derive(Debug, Default)]
struct MeetIndex {
    forward: Vec<usize>,
    by_mask: BTreeMap<Bits, BTreeMap<StateKey, Vec<usize>>>,
}

impl MeetIndex {
    fn add_forward(&mut self, id: usize, state: &WorldState) {
        self.forward.push(id);
        for (&mask, groups) in &mut self.by_mask {
            groups.entry(project(state, mask)).or_default().push(id);
        }
    }

    fn masks(&self) -> impl Iterator<Item = Bits> + '_ {
        self.by_mask.keys().copied()
    }

    /// Forward nodes satisfying the partial state `key`, oldest first. The first query for a
    /// mask indexes every forward node seen so far.
    fn forward_matches(&mut self, key: StateKey, nodes: &[SearchNode]) -> &[usize] {
        let forward = &self.forward;
        let groups = self.by_mask.entry(key.defined).or_insert_with(|| {
            let mut groups: BTreeMap<StateKey, Vec<usize>> = BTreeMap::new();
            for &id in forward {
                groups
                    .entry(project(&nodes[id].state, key.defined))
                    .or_default()
                    .push(id);
            }
            groups
        });
        groups.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }
}

struct Search<'a> {
    registry: &'a Registry,
    config: &'a SearchConfig,
    start: WorldState,
    goal: WorldState,
    cancel: &'a Cancellation,
    sink: &'a mut dyn TraceSink,
    tree: SearchTree,
    seq: u64,
}

impl Search<'_> {
    fn run_single(&mut self, direction: Direction) -> Result<Plan> {
        let mut frontier = Frontier::new(direction);
        let root = match direction {
            Direction::Forward => self.start,
            Direction::Backward => self.goal,
        };
        self.push(&mut frontier, root, 0, None);

        while let Some(id) = frontier.pop(&self.tree.nodes) {
            let node = self.tree.nodes[id];
            if self.is_terminal(direction, &node.state) {
                return Ok(self.plan_from(direction, id));
            }
            self.begin_expansion(id)?;
            for (action, next) in self.successors(direction, &node.state) {
                let g = node.g + self.cost(action);
                self.push(&mut frontier, next, g, Some((id, action)));
            }
        }

        Err(PlanningError::NoPlanFound {
            explored: self.tree.stats.expanded,
        })
    }

    /// Alternates one expansion per frontier, forward first. Every new node is tested against
    /// the other frontier: a concrete forward state meets a regressed goal when it satisfies
    /// it. The cheapest meeting is kept and returned once neither frontier can still improve
    /// on it.
    fn run_bidirectional(&mut self) -> Result<Plan> {
        let mut forward = Frontier::new(Direction::Forward);
        let mut backward = Frontier::new(Direction::Backward);
        let mut best: Option<Meet> = None;

        let mut index = MeetIndex::default();

        if let Some(root) = self.push(&mut forward, self.start, 0, None) {
            self.check_meet(root, &mut index, &backward, &mut best);
        }
        if let Some(root) = self.push(&mut backward, self.goal, 0, None) {
            self.check_meet(root, &mut index, &forward, &mut best);
        }

        let mut turn = Direction::Forward;
        loop {
            let (Some(f_min), Some(b_min)) = (forward.min_f(), backward.min_f()) else {
                break;
            };
            if best.is_some_and(|meet| meet.cost <= f_min.max(b_min)) {
                break;
            }

            let (this, other) = match turn {
                Direction::Forward => (&mut forward, &backward),
                Direction::Backward => (&mut backward, &forward),
            };
            turn = match turn {
                Direction::Forward => Direction::Backward,
                Direction::Backward => Direction::Forward,
            };
            let Some(id) = this.pop(&self.tree.nodes) else {
                continue;
            };

            self.begin_expansion(id)?;
            let node = self.tree.nodes[id];
            for (action, next) in self.successors(this.direction, &node.state) {
                let g = node.g + self.cost(action);
                if let Some(child) = self.push(this, next, g, Some((id, action))) {
                    self.check_meet(child, &mut index, other, &mut best);
                }
            }
        }

        match best {
            Some(meet) => {
                let mut actions = self.path(meet.forward);
                actions.reverse();
                actions.extend(self.path(meet.backward));
                Ok(Plan::from_actions(self.registry, actions))
            }
            None => Err(PlanningError::NoPlanFound {
                explored: self.tree.stats.expanded,
            }),
        }
    }

    /// Adds a node unless the frontier already reached its state at equal or lower cost.
    fn push(
        &mut self,
        frontier: &mut Frontier,
        state: WorldState,
        g: u64,
        via: Option<(usize, ActionIndex)>,
    ) -> Option<usize> {
        let key = state.key();
        if let Some(&(best_g, _)) = frontier.best.get(&key) {
            if g >= best_g {
                return None;
            }
        }

        let direction = frontier.direction;
        let h = self.heuristic(direction, &state);
        let id = self.tree.nodes.len();
        self.tree.nodes.push(SearchNode {
            state,
            g,
            h,
            parent: via.map(|(parent, _)| parent),
            action: via.map(|(_, action)| action),
            direction,
        });
        frontier.best.insert(key, (g, id));
        frontier.open.push(OpenEntry {
            f: g.saturating_add(h),
            g,
            action: via.map_or(0, |(_, action)| action),
            seq: self.seq,
            node: id,
        });
        self.seq += 1;
        self.tree.stats.generated += 1;

        if let Some((parent, action)) = via {
            self.sink.emit(TraceEvent::Generated {
                direction,
                node: id,
                parent,
                action,
                g,
            });
        }
        Some(id)
    }

    fn check_meet(
        &mut self,
        node: usize,
        index: &mut MeetIndex,
        other: &Frontier,
        best: &mut Option<Meet>,
    ) {
        let SearchNode {
            state, g, direction, ..
        } = self.tree.nodes[node];
        let mut found = Vec::new();
        match direction {
            Direction::Forward => {
                index.add_forward(node, &state);
                for mask in index.masks() {
                    if let Some(&(other_g, other_id)) = other.best.get(&project(&state, mask)) {
                        found.push((node, other_id, g + other_g));
                    }
                }
            }
            Direction::Backward => {
                let nodes = &self.tree.nodes;
                for &other_id in index.forward_matches(state.key(), nodes) {
                    let other_node = &nodes[other_id];
                    let live = other.best.get(&other_node.state.key()).map(|&(_, id)| id);
                    if live == Some(other_id) {
                        found.push((other_id, node, other_node.g + g));
                    }
                }
            }
        }

        for (forward, backward, cost) in found {
            if best.map_or(true, |meet| cost < meet.cost) {
                trace!(forward, backward, cost, "frontiers met");
                *best = Some(Meet {
                    cost,
                    forward,
                    backward,
                });
                self.sink.emit(TraceEvent::Met {
                    forward,
                    backward,
                    cost,
                });
            }
        }
    }

    /// Polls cancellation and the budget, then counts the expansion.
    fn begin_expansion(&mut self, id: usize) -> Result<()> {
        let stats = &mut self.tree.stats;
        if self.cancel.should_stop() {
            return Err(PlanningError::Cancelled {
                expanded: stats.expanded,
            });
        }
        if stats.expanded >= self.config.max_expansions {
            return Err(PlanningError::SearchBudgetExceeded {
                expanded: stats.expanded,
                budget: self.config.max_expansions,
            });
        }

        let node = self.tree.nodes[id];
        stats.expanded += 1;
        match node.direction {
            Direction::Forward => stats.forward_expanded += 1,
            Direction::Backward => stats.backward_expanded += 1,
        }
        let step = stats.expanded;
        trace!(step, node = id, g = node.g, h = node.h, direction = ?node.direction, "expand");
        self.sink.emit(TraceEvent::Expanded {
            step,
            direction: node.direction,
            node: id,
            g: node.g,
            h: node.h,
            state: node.state.key(),
        });
        Ok(())
    }

    /// Forward: every applicable action that changes the state. Backward: every relevant
    /// action the state can be regressed through.
    fn successors(
        &self,
        direction: Direction,
        state: &WorldState,
    ) -> Vec<(ActionIndex, WorldState)> {
        let current = state.key();
        self.registry
            .actions()
            .iter()
            .enumerate()
            .filter_map(|(index, action)| {
                let next = match direction {
                    Direction::Forward => action.apply(state)?,
                    Direction::Backward => action.regress(state)?,
                };
                (next.key() != current).then_some((index, next))
            })
            .collect()
    }

    fn is_terminal(&self, direction: Direction, state: &WorldState) -> bool {
        match direction {
            Direction::Forward => state.satisfies(&self.goal),
            Direction::Backward => self.start.satisfies(state),
        }
    }

    fn heuristic(&self, direction: Direction, state: &WorldState) -> u64 {
        let missing = match direction {
            Direction::Forward => state.mismatch_count(&self.goal),
            Direction::Backward => self.start.mismatch_count(state),
        };
        u64::from(missing) * u64::from(self.config.heuristic_weight)
    }

    fn cost(&self, action: ActionIndex) -> u64 {
        self.registry
            .action(action)
            .map_or(0, |a| u64::from(a.cost()))
    }

    /// Actions from `id` up to its root, nearest first.
    fn path(&self, id: usize) -> Vec<ActionIndex> {
        let mut out = Vec::new();
        let mut current = Some(id);
        while let Some(index) = current {
            let node = &self.tree.nodes[index];
            out.extend(node.action);
            current = node.parent;
        }
        out
    }

    /// Forward paths are walked backwards; a backward path already runs in execution order,
    /// since each regression step sits in front of the one it was derived from.
    fn plan_from(&self, direction: Direction, id: usize) -> Plan {
        let mut actions = self.path(id);
        if direction == Direction::Forward {
            actions.reverse();
        }
        Plan::from_actions(self.registry, actions)
    }

    fn finish(&mut self, result: &Result<Plan>) {
        let outcome = match result {
            Ok(plan) => SearchOutcome::Found {
                cost: plan.total_cost,
            },
            Err(PlanningError::SearchBudgetExceeded { .. }) => SearchOutcome::BudgetExceeded,
            Err(PlanningError::Cancelled { .. }) => SearchOutcome::Cancelled,
            Err(_) => SearchOutcome::NoPlan,
        };
        let SearchStats {
            expanded,
            generated,
            ..
        } = self.tree.stats;
        debug!(expanded, generated, ?outcome, "search finished");
        self.sink.emit(TraceEvent::Finished {
            expanded,
            generated,
            outcome,
        });
    }
}
