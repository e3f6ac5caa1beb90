use std::collections::{BTreeMap, BTreeSet};

use goap_core::{AtomIndex, PlanningError, Registry, Result, WorldState, MAX_ATOMS};
use tracing::{debug, trace, warn};

use crate::bindings::{BindingProvider, NoBindings};
use crate::domain::{Condition, LiftedAction, LiftedDomain};
use crate::expr::{AtomExpr, Binding, Constant};

/// The ground registry plus the start and goal states of one planning request.
#[derive(Debug, Clone)]
pub struct GroundedProblem {
    pub registry: Registry,
    /// Closed-world: every registered atom is defined.
    pub start: WorldState,
    pub goal: WorldState,
    /// Non-fatal findings, currently only [`PlanningError::UnresolvedVariable`].
    pub diagnostics: Vec<PlanningError>,
}

/// Grounds a [`LiftedDomain`] against its initial and goal facts.
///
/// A variable's candidates are the constants it takes when one of the action's patterns
/// (preconditions and effects) is matched against a known ground atom. Known atoms start as the
/// ground declarations plus the initial and goal facts, and grow with the effects of every
/// grounded instance until nothing new appears.
pub struct Resolver<'a> {
    domain: &'a LiftedDomain,
    bindings: &'a dyn BindingProvider,
}

type Candidates = Vec<(String, Vec<Constant>)>;

impl<'a> Resolver<'a> {
    pub fn new(domain: &'a LiftedDomain) -> Self {
        Self {
            domain,
            bindings: &NoBindings,
        }
    }

    /// Consult `bindings` for variables that nothing else binds.
    pub fn with_bindings(mut self, bindings: &'a dyn BindingProvider) -> Self {
        self.bindings = bindings;
        self
    }

    pub fn ground(&self) -> Result<GroundedProblem> {
        let actions = self.domain.actions();
        let seeds = self.seed_atoms();
        let mut known: BTreeSet<AtomExpr> = seeds.iter().cloned().collect();
        let mut instances: Vec<BTreeSet<Binding>> = vec![BTreeSet::new(); actions.len()];
        let mut unresolved: BTreeMap<usize, Vec<String>> = BTreeMap::new();

        let mut rounds = 0usize;
        loop {
            rounds += 1;
            unresolved.clear();
            let mut grew = false;
            for (index, action) in actions.iter().enumerate() {
                let candidates = match self.candidates(action, &known) {
                    Ok(candidates) => candidates,
                    Err(missing) => {
                        unresolved.insert(index, missing);
                        continue;
                    }
                };
                for binding in cartesian(&candidates) {
                    if instances[index].contains(&binding) {
                        continue;
                    }
                    for effect in &action.effects {
                        grew |= known.insert(effect.atom.substitute(&binding));
                    }
                    instances[index].insert(binding);
                }
            }
            if known.len() > MAX_ATOMS {
                return Err(PlanningError::AtomLimitExceeded { limit: MAX_ATOMS });
            }
            if !grew {
                break;
            }
        }

        let mut builder = Builder::default();
        for atom in &seeds {
            builder.atom(atom)?;
        }
        for (action, bindings) in actions.iter().zip(&instances) {
            for binding in bindings {
                builder.action(action, binding)?;
            }
        }

        let diagnostics = self.diagnostics(&unresolved);
        let (registry, atoms) = (builder.registry, builder.atoms);
        let start = self.start_state(&registry, &atoms);
        let goal = facts_state(&registry, self.domain.goal_facts());
        debug!(
            rounds,
            atoms = registry.atom_count(),
            actions = registry.action_count(),
            unresolved = diagnostics.len(),
            "grounded domain"
        );

        Ok(GroundedProblem {
            registry,
            start,
            goal,
            diagnostics,
        })
    }

    /// Ground declarations, then initial facts, then goal facts.
    fn seed_atoms(&self) -> Vec<AtomExpr> {
        let declared = self.domain.atoms().iter().filter(|a| a.is_ground());
        let facts = self
            .domain
            .initial_facts()
            .iter()
            .chain(self.domain.goal_facts())
            .map(|f| &f.atom);
        let mut out: Vec<AtomExpr> = Vec::new();
        for atom in declared.chain(facts) {
            if !out.contains(atom) {
                out.push(atom.clone());
            }
        }
        out
    }

    /// Per-variable candidates in variable order, or the variables left without any.
    ///
    /// Effects are matched as well as preconditions, so a goal fact can bind a variable that
    /// only an effect mentions.
    fn candidates(
        &self,
        action: &LiftedAction,
        known: &BTreeSet<AtomExpr>,
    ) -> std::result::Result<Candidates, Vec<String>> {
        let mut observed: BTreeMap<String, BTreeSet<Constant>> = BTreeMap::new();
        for pattern in action.patterns() {
            for fact in known {
                if let Some(binding) = pattern.unify(fact) {
                    for (variable, value) in binding {
                        observed.entry(variable).or_default().insert(value);
                    }
                }
            }
        }

        let name = action.name.to_string();
        let mut out = Vec::new();
        let mut missing = Vec::new();
        for variable in action.variables() {
            let mut values = observed.remove(&variable).unwrap_or_default();
            if values.is_empty() {
                values.extend(self.bindings.candidates(&name, &variable));
            }
            if values.is_empty() {
                missing.push(variable);
            } else {
                out.push((variable, values.into_iter().collect()));
            }
        }
        if missing.is_empty() {
            Ok(out)
        } else {
            Err(missing)
        }
    }

    fn diagnostics(&self, unresolved: &BTreeMap<usize, Vec<String>>) -> Vec<PlanningError> {
        let actions = self.domain.actions();
        let mut out = Vec::new();
        for (&index, variables) in unresolved {
            let action = actions[index].name.to_string();
            for variable in variables {
                warn!(%action, %variable, "no candidate binding, action omitted");
                out.push(PlanningError::UnresolvedVariable {
                    action: action.clone(),
                    variable: variable.clone(),
                });
            }
        }
        out
    }

    /// Initial facts override the declared default of their signature; anything else is false.
    fn start_state(&self, registry: &Registry, atoms: &[AtomExpr]) -> WorldState {
        let mut start = WorldState::new();
        for (index, atom) in atoms.iter().enumerate() {
            let default = self.domain.default_value(&atom.signature()).unwrap_or(false);
            start.set(index, default);
        }
        start.overwrite(&facts_state(registry, self.domain.initial_facts()))
    }
}

fn facts_state(registry: &Registry, facts: &[Condition]) -> WorldState {
    let mut state = WorldState::new();
    for fact in facts {
        if let Some(index) = registry.atom_index(&fact.atom.to_string()) {
            state.set(index, fact.value);
        }
    }
    state
}

/// Every combination of one candidate per variable, in candidate order.
fn cartesian(candidates: &[(String, Vec<Constant>)]) -> Vec<Binding> {
    let mut out = vec![Binding::new()];
    for (variable, values) in candidates {
        out = out
            .into_iter()
            .flat_map(|binding| {
                values.iter().map(move |value| {
                    let mut next = binding.clone();
                    next.insert(variable.clone(), value.clone());
                    next
                })
            })
            .collect();
    }
    out
}

/// `write B(id)` bound to `id = "abc"` becomes `write B("abc")`. Variables that do not occur in
/// the name are appended as `[v=c,...]` so distinct instances keep distinct names.
fn ground_name(action: &LiftedAction, binding: &Binding) -> String {
    let mut name = action.name.substitute(binding).to_string();
    let in_name = action.name.variables();
    let extra: Vec<String> = binding
        .iter()
        .filter(|(variable, _)| !in_name.contains(&variable.as_str()))
        .map(|(variable, value)| format!("{variable}={value}"))
        .collect();
    if !extra.is_empty() {
        name.push('[');
        name.push_str(&extra.join(","));
        name.push(']');
    }
    name
}

/// Substituted conditions, or `None` when the same atom is asked for both values.
fn ground_conditions(conditions: &[Condition], binding: &Binding) -> Option<Vec<(AtomExpr, bool)>> {
    let mut out: Vec<(AtomExpr, bool)> = Vec::with_capacity(conditions.len());
    for condition in conditions {
        let atom = condition.atom.substitute(binding);
        match out.iter().find(|(seen, _)| *seen == atom) {
            Some((_, value)) if *value != condition.value => return None,
            Some(_) => {}
            None => out.push((atom, condition.value)),
        }
    }
    Some(out)
}

/// Registers ground atoms and actions, remembering the expression behind each atom index.
#[derive(Default)]
struct Builder {
    registry: Registry,
    atoms: Vec<AtomExpr>,
}

impl Builder {
    fn atom(&mut self, atom: &AtomExpr) -> Result<AtomIndex> {
        let index = self.registry.declare_atom(&atom.to_string())?;
        if index == self.atoms.len() {
            self.atoms.push(atom.clone());
        }
        Ok(index)
    }

    fn action(&mut self, action: &LiftedAction, binding: &Binding) -> Result<()> {
        let name = ground_name(action, binding);
        let (Some(pre), Some(post)) = (
            ground_conditions(&action.preconditions, binding),
            ground_conditions(&action.effects, binding),
        ) else {
            trace!(%name, "contradictory conditions, instance skipped");
            return Ok(());
        };
        if self.registry.action_index(&name).is_some() {
            warn!(%name, "ground action name already taken, instance skipped");
            return Ok(());
        }

        for (atom, _) in pre.iter().chain(&post) {
            self.atom(atom)?;
        }
        self.registry.declare_action(&name, action.cost)?;
        for (atom, value) in &pre {
            self.registry.set_precondition(&name, &atom.to_string(), *value)?;
        }
        for (atom, value) in &post {
            self.registry.set_effect(&name, &atom.to_string(), *value)?;
        }
        trace!(%name, "grounded action");
        Ok(())
    }
}
