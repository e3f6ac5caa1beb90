use std::collections::BTreeMap;

use crate::action::{ActionIndex, GroundAction};
use crate::error::{PlanningError, Result};
use crate::state::{bit, AtomIndex, Bits, WorldState, MAX_ATOMS};

/// Name <-> index tables for the atoms and ground actions of one planning session.
///
/// Every mutating call validates all of its inputs before touching the tables, so a failed call
/// leaves the registry exactly as it was. The registry is plain owned data: build one per
/// session and hand it to the search engine by reference.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    atoms: Vec<String>,
    atom_lookup: BTreeMap<String, AtomIndex>,
    actions: Vec<GroundAction>,
    action_lookup: BTreeMap<String, ActionIndex>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent: an already declared name returns its existing index.
    pub fn declare_atom(&mut self, name: &str) -> Result<AtomIndex> {
        if let Some(&index) = self.atom_lookup.get(name) {
            return Ok(index);
        }
        if self.atoms.len() >= MAX_ATOMS {
            return Err(PlanningError::AtomLimitExceeded { limit: MAX_ATOMS });
        }
        let index = self.atoms.len();
        self.atoms.push(name.to_string());
        self.atom_lookup.insert(name.to_string(), index);
        tracing::trace!(atom = name, index, "declared atom");
        Ok(index)
    }

    /// Idempotent by name; re-declaring keeps the original cost (use [`Registry::set_cost`]).
    pub fn declare_action(&mut self, name: &str, cost: u32) -> Result<ActionIndex> {
        if let Some(&index) = self.action_lookup.get(name) {
            return Ok(index);
        }
        if cost == 0 {
            return Err(PlanningError::InvalidCost {
                action: name.to_string(),
                cost,
            });
        }
        let index = self.actions.len();
        self.actions.push(GroundAction::new(name.to_string(), cost));
        self.action_lookup.insert(name.to_string(), index);
        tracing::trace!(action = name, index, cost, "declared action");
        Ok(index)
    }

    pub fn set_precondition(&mut self, action: &str, atom: &str, value: bool) -> Result<()> {
        let (a, i) = self.resolve_condition(action, atom)?;
        self.actions[a].preconditions_mut().set(i, value);
        Ok(())
    }

    pub fn set_effect(&mut self, action: &str, atom: &str, value: bool) -> Result<()> {
        let (a, i) = self.resolve_condition(action, atom)?;
        self.actions[a].effects_mut().set(i, value);
        Ok(())
    }

    pub fn set_cost(&mut self, action: &str, cost: u32) -> Result<()> {
        let index = self.require_action(action)?;
        if cost == 0 {
            return Err(PlanningError::InvalidCost {
                action: action.to_string(),
                cost,
            });
        }
        self.actions[index].set_cost(cost);
        Ok(())
    }

    fn require_action(&self, name: &str) -> Result<ActionIndex> {
        self.action_index(name)
            .ok_or_else(|| PlanningError::UnknownAction {
                name: name.to_string(),
            })
    }

    fn require_atom(&self, name: &str) -> Result<AtomIndex> {
        self.atom_index(name).ok_or_else(|| PlanningError::UnknownAtom {
            name: name.to_string(),
        })
    }

    fn resolve_condition(&self, action: &str, atom: &str) -> Result<(ActionIndex, AtomIndex)> {
        Ok((self.require_action(action)?, self.require_atom(atom)?))
    }

    /// Pure progression of `state` through `action`; `None` if the action is unknown or a
    /// precondition does not hold.
    pub fn apply(&self, action: ActionIndex, state: &WorldState) -> Option<WorldState> {
        self.actions.get(action)?.apply(state)
    }

    pub fn action(&self, index: ActionIndex) -> Option<&GroundAction> {
        self.actions.get(index)
    }

    pub fn actions(&self) -> &[GroundAction] {
        &self.actions
    }

    pub fn action_count(&self) -> usize {
        self.actions.len()
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn atoms(&self) -> &[String] {
        &self.atoms
    }

    pub fn atom_index(&self, name: &str) -> Option<AtomIndex> {
        self.atom_lookup.get(name).copied()
    }

    pub fn atom_name(&self, index: AtomIndex) -> Option<&str> {
        self.atoms.get(index).map(String::as_str)
    }

    pub fn action_index(&self, name: &str) -> Option<ActionIndex> {
        self.action_lookup.get(name).copied()
    }

    pub fn action_name(&self, index: ActionIndex) -> Option<&str> {
        self.actions.get(index).map(GroundAction::name)
    }

    /// `defined` mask covering every declared atom.
    pub fn universe_mask(&self) -> Bits {
        (0..self.atoms.len()).fold(0, |mask, i| mask | bit(i))
    }

    /// Partial state defining only the named atoms.
    pub fn state(&self, facts: &[(&str, bool)]) -> Result<WorldState> {
        let mut state = WorldState::new();
        for &(name, value) in facts {
            state.set(self.require_atom(name)?, value);
        }
        Ok(state)
    }

    /// Concrete state: every declared atom defined, `false` unless listed.
    pub fn closed_state(&self, facts: &[(&str, bool)]) -> Result<WorldState> {
        let listed = self.state(facts)?;
        Ok(WorldState::from_bits(0, self.universe_mask()).overwrite(&listed))
    }

    /// Defined atoms of `state`, true atoms upper-cased, comma separated.
    pub fn describe(&self, state: &WorldState) -> String {
        state
            .iter()
            .filter_map(|(i, value)| {
                let name = self.atom_name(i)?;
                Some(if value {
                    name.to_uppercase()
                } else {
                    name.to_string()
                })
            })
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Defined atoms of `state` as `name==0|1`, space separated.
    pub fn describe_conditions(&self, state: &WorldState) -> String {
        state
            .iter()
            .filter_map(|(i, v)| Some(format!("{}=={}", self.atom_name(i)?, u8::from(v))))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn describe_action(&self, index: ActionIndex) -> Option<String> {
        let action = self.action(index)?;
        Some(format!(
            "{} (cost {}): pre [{}] post [{}]",
            action.name(),
            action.cost(),
            self.describe_conditions(action.preconditions()),
            self.describe_conditions(action.effects())
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declarations_are_idempotent() {
        let mut reg = Registry::new();
        let a = reg.declare_atom("A").unwrap();
        assert_eq!(reg.declare_atom("A").unwrap(), a);
        let w = reg.declare_action("write A", 3).unwrap();
        assert_eq!(reg.declare_action("write A", 9).unwrap(), w);
        assert_eq!(reg.action(w).unwrap().cost(), 3);
        assert_eq!(reg.atom_count(), 1);
        assert_eq!(reg.action_count(), 1);
    }

    #[test]
    fn atom_limit_is_enforced() {
        let mut reg = Registry::new();
        for i in 0..MAX_ATOMS {
            reg.declare_atom(&format!("a{i}")).unwrap();
        }
        assert_eq!(
            reg.declare_atom("overflow"),
            Err(PlanningError::AtomLimitExceeded { limit: MAX_ATOMS })
        );
        assert_eq!(reg.declare_atom("a0").unwrap(), 0);
        assert_eq!(reg.universe_mask(), u64::MAX);
    }

    #[test]
    fn unknown_names_leave_registry_untouched() {
        let mut reg = Registry::new();
        reg.declare_atom("A").unwrap();
        reg.declare_action("act", 1).unwrap();

        assert_eq!(
            reg.set_precondition("nope", "A", true),
            Err(PlanningError::UnknownAction { name: "nope".into() })
        );
        assert_eq!(
            reg.set_effect("act", "B", true),
            Err(PlanningError::UnknownAtom { name: "B".into() })
        );
        let act = reg.action(0).unwrap();
        assert!(act.preconditions().is_empty());
        assert!(act.effects().is_empty());
    }

    #[test]
    fn zero_cost_is_rejected() {
        let mut reg = Registry::new();
        assert!(matches!(
            reg.declare_action("free", 0),
            Err(PlanningError::InvalidCost { .. })
        ));
        assert_eq!(reg.action_count(), 0);

        reg.declare_action("paid", 2).unwrap();
        assert!(reg.set_cost("paid", 0).is_err());
        reg.set_cost("paid", 7).unwrap();
        assert_eq!(reg.action(0).unwrap().cost(), 7);
    }

    #[test]
    fn apply_overwrites_only_effects() {
        let mut reg = Registry::new();
        reg.declare_atom("A").unwrap();
        reg.declare_atom("B").unwrap();
        let w = reg.declare_action("write A", 1).unwrap();
        reg.set_precondition("write A", "A", false).unwrap();
        reg.set_effect("write A", "A", true).unwrap();

        let start = reg.closed_state(&[("B", true)]).unwrap();
        let next = reg.apply(w, &start).unwrap();
        assert_eq!(next.get(0), Some(true));
        assert_eq!(next.get(1), Some(true));
        assert_eq!(reg.apply(w, &next), None);
        assert_eq!(reg.apply(42, &start), None);
    }

    #[test]
    fn describe_uppercases_true_atoms() {
        let mut reg = Registry::new();
        reg.declare_atom("slider_low").unwrap();
        reg.declare_atom("slider_high").unwrap();
        let s = reg
            .state(&[("slider_low", false), ("slider_high", true)])
            .unwrap();
        assert_eq!(reg.describe(&s), "slider_low,SLIDER_HIGH");
    }

    #[test]
    fn describe_action_lists_conditions() {
        let mut reg = Registry::new();
        reg.declare_atom("A").unwrap();
        reg.declare_action("write A", 2).unwrap();
        reg.set_precondition("write A", "A", false).unwrap();
        reg.set_effect("write A", "A", true).unwrap();
        assert_eq!(
            reg.describe_action(0).unwrap(),
            "write A (cost 2): pre [A==0] post [A==1]"
        );
    }
}
