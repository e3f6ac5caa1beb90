#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::WorldState;

pub type ActionIndex = usize;

/// A fully instantiated action: required atom values, assigned atom values, and a positive cost.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GroundAction {
    name: String,
    cost: u32,
    preconditions: WorldState,
    effects: WorldState,
}

impl GroundAction {
    pub(crate) fn new(name: String, cost: u32) -> Self {
        Self {
            name,
            cost,
            preconditions: WorldState::new(),
            effects: WorldState::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub fn preconditions(&self) -> &WorldState {
        &self.preconditions
    }

    pub fn effects(&self) -> &WorldState {
        &self.effects
    }

    pub(crate) fn set_cost(&mut self, cost: u32) {
        self.cost = cost;
    }

    pub(crate) fn preconditions_mut(&mut self) -> &mut WorldState {
        &mut self.preconditions
    }

    pub(crate) fn effects_mut(&mut self) -> &mut WorldState {
        &mut self.effects
    }

    pub fn is_applicable(&self, state: &WorldState) -> bool {
        state.satisfies(&self.preconditions)
    }

    /// Progression: `None` if a precondition does not hold, otherwise `state` with every effect
    /// atom overwritten.
    pub fn apply(&self, state: &WorldState) -> Option<WorldState> {
        if !self.is_applicable(state) {
            return None;
        }
        Some(state.overwrite(&self.effects))
    }

    /// Regression through this action.
    ///
    /// Returns the weakest partial state from which applying this action reaches a state that
    /// satisfies `goal`, or `None` when the action cannot be the last step towards `goal`:
    /// an effect contradicts a goal atom, no effect achieves a goal atom, or a precondition
    /// contradicts a goal atom the action leaves untouched.
    pub fn regress(&self, goal: &WorldState) -> Option<WorldState> {
        let eff = &self.effects;
        if eff.defined() & goal.defined() == 0 {
            return None;
        }
        if !eff.is_consistent_with(goal) {
            return None;
        }

        let untouched = goal.without(eff.defined());
        if !self.preconditions.is_consistent_with(&untouched) {
            return None;
        }
        Some(untouched.overwrite(&self.preconditions))
    }
}
