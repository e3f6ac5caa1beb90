#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::action::ActionIndex;
use crate::registry::Registry;

/// One step of a plan: which ground action to run, by index and by name.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlanStep {
    pub action: ActionIndex,
    pub name: String,
    pub cost: u32,
}

/// Ordered action sequence produced by the search engine.
///
/// Plans are immutable values: they can be handed across threads to whatever executes them.
/// Mapping a step name to a concrete effect in the host application is up to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Plan {
    pub steps: Vec<PlanStep>,
    pub total_cost: u64,
}

impl Plan {
    pub fn new(steps: Vec<PlanStep>) -> Self {
        let total_cost = steps.iter().map(|s| u64::from(s.cost)).sum();
        Self { steps, total_cost }
    }

    /// The start state already satisfies the goal.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Build a plan from action indices, looking names and costs up in `registry`.
    ///
    /// Unknown indices are skipped.
    pub fn from_actions(registry: &Registry, actions: impl IntoIterator<Item = ActionIndex>) -> Self {
        let steps = actions
            .into_iter()
            .filter_map(|index| {
                let action = registry.action(index)?;
                Some(PlanStep {
                    action: index,
                    name: action.name().to_string(),
                    cost: action.cost(),
                })
            })
            .collect();
        Self::new(steps)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn actions(&self) -> Vec<ActionIndex> {
        self.steps.iter().map(|s| s.action).collect()
    }

    /// One numbered line per step, e.g. `0: write B (cost: 1)`.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        for (i, step) in self.steps.iter().enumerate() {
            out.push_str(&format!("{i}: {} (cost: {})\n", step.name, step.cost));
        }
        out.push_str(&format!("total cost: {}\n", self.total_cost));
        out
    }
}
