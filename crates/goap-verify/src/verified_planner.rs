//! Planner wrapper that replays every plan it returns

use goap_core::{Plan, PlanningError, Registry, WorldState};
use goap_search::{Planner, SearchConfig, SearchMode};
use tracing::{info, warn};

use crate::proof_receipt::PlanProof;
use crate::verify::verify_plan;
use crate::{Result, VerifyError};

/// A plan together with the receipt of its replay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedPlan {
    pub plan: Plan,
    pub proof: PlanProof,
}

/// GOAP planner whose plans are checked before they are handed out
#[derive(Debug, Clone)]
pub struct VerifiedPlanner<'r> {
    planner: Planner<'r>,
}

impl<'r> VerifiedPlanner<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            planner: Planner::new(registry),
        }
    }

    pub fn with_config(mut self, config: SearchConfig) -> Self {
        self.planner = self.planner.with_config(config);
        self
    }

    pub fn planner(&self) -> &Planner<'r> {
        &self.planner
    }

    /// Plan without producing a receipt.
    pub fn plan(&self, start: &WorldState, goal: &WorldState) -> Result<Plan> {
        Ok(self.planner.plan(start, goal)?)
    }

    /// Plan, then replay the result against the registry.
    pub fn plan_verified(&self, start: &WorldState, goal: &WorldState) -> Result<VerifiedPlan> {
        let plan = self.planner.plan(start, goal)?;
        let proof = verify_plan(self.planner.registry(), start, goal, &plan)?;
        info!(
            mode = %self.planner.config().mode,
            steps = plan.len(),
            cost = plan.total_cost,
            hash = %proof.plan_hash,
            "plan verified"
        );
        Ok(VerifiedPlan { plan, proof })
    }
}

/// Verified plans from every search mode for the same problem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossCheck {
    pub runs: Vec<(SearchMode, VerifiedPlan)>,
}

impl CrossCheck {
    pub fn get(&self, mode: SearchMode) -> Option<&VerifiedPlan> {
        self.runs.iter().find(|(m, _)| *m == mode).map(|(_, v)| v)
    }

    /// Whether every mode found a plan of the same total cost.
    ///
    /// Only guaranteed with an admissible heuristic, so a disagreement here is informational.
    pub fn costs_agree(&self) -> bool {
        let mut costs = self.runs.iter().map(|(_, v)| v.plan.total_cost);
        match costs.next() {
            Some(first) => costs.all(|c| c == first),
            None => true,
        }
    }
}

/// Run `config` once per search mode and verify every plan.
///
/// All modes failing with [`PlanningError::NoPlanFound`] reports that error. Some modes finding a
/// plan while others prove there is none is a [`VerifyError::ModeDisagreement`]. Any other
/// planning error is returned as soon as it occurs.
pub fn cross_check(
    registry: &Registry,
    start: &WorldState,
    goal: &WorldState,
    config: SearchConfig,
) -> Result<CrossCheck> {
    let mut runs = Vec::new();
    let mut unsolved = Vec::new();
    for mode in SearchMode::ALL {
        let planner = VerifiedPlanner::new(registry).with_config(config.with_mode(mode));
        match planner.plan_verified(start, goal) {
            Ok(verified) => runs.push((mode, verified)),
            Err(err @ VerifyError::Planning(PlanningError::NoPlanFound { .. })) => {
                unsolved.push((mode, err))
            }
            Err(err) => return Err(err),
        }
    }

    if runs.is_empty() && !unsolved.is_empty() {
        return Err(unsolved.swap_remove(0).1);
    }
    if !unsolved.is_empty() {
        let solved: Vec<&str> = runs.iter().map(|(m, _)| m.as_str()).collect();
        let unsolved: Vec<&str> = unsolved.iter().map(|(m, _)| m.as_str()).collect();
        return Err(VerifyError::ModeDisagreement {
            details: format!(
                "plan found by [{}], none by [{}]",
                solved.join(", "),
                unsolved.join(", ")
            ),
        });
    }

    let check = CrossCheck { runs };
    if !check.costs_agree() {
        warn!("search modes returned plans of different cost");
    }
    Ok(check)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn via_c() -> (Registry, WorldState, WorldState) {
        let mut reg = Registry::new();
        for atom in ["A", "B", "C"] {
            reg.declare_atom(atom).unwrap();
        }
        let actions = [
            ("write A via B", 5, "B"),
            ("write A via C", 1, "C"),
        ];
        for (name, cost, via) in actions {
            reg.declare_action(name, cost).unwrap();
            reg.set_precondition(name, "A", false).unwrap();
            reg.set_precondition(name, via, true).unwrap();
            reg.set_effect(name, "A", true).unwrap();
        }
        for (name, cost, atom) in [("write B", 1, "B"), ("write C", 2, "C")] {
            reg.declare_action(name, cost).unwrap();
            reg.set_precondition(name, atom, false).unwrap();
            reg.set_effect(name, atom, true).unwrap();
        }
        let start = reg.closed_state(&[]).unwrap();
        let goal = reg.state(&[("A", true)]).unwrap();
        (reg, start, goal)
    }

    #[test]
    fn plan_verified_returns_matching_receipt() {
        let (reg, start, goal) = via_c();
        let verified = VerifiedPlanner::new(&reg)
            .plan_verified(&start, &goal)
            .unwrap();
        assert_eq!(verified.plan.names(), vec!["write C", "write A via C"]);
        assert_eq!(verified.proof.action_sequence, verified.plan.names());
        assert_eq!(verified.proof.total_cost, 3);
        assert_eq!(verified.proof.step_proofs.len(), 2);
    }

    #[test]
    fn planning_errors_pass_through() {
        let (mut reg, _, _) = via_c();
        reg.declare_atom("D").unwrap();
        let start = reg.closed_state(&[]).unwrap();
        let goal = reg.state(&[("D", true)]).unwrap();
        assert!(matches!(
            VerifiedPlanner::new(&reg).plan_verified(&start, &goal),
            Err(VerifyError::Planning(PlanningError::NoPlanFound { .. }))
        ));
    }

    #[test]
    fn cross_check_covers_every_mode() {
        let (reg, start, goal) = via_c();
        let check = cross_check(&reg, &start, &goal, SearchConfig::default()).unwrap();
        assert_eq!(check.runs.len(), SearchMode::ALL.len());
        assert!(check.costs_agree());
        for mode in SearchMode::ALL {
            assert_eq!(check.get(mode).unwrap().plan.total_cost, 3, "{mode}");
        }
    }

    #[test]
    fn cross_check_reports_unsolvable_once() {
        let mut reg = Registry::new();
        reg.declare_atom("A").unwrap();
        let start = reg.closed_state(&[]).unwrap();
        let goal = reg.state(&[("A", true)]).unwrap();
        assert!(matches!(
            cross_check(&reg, &start, &goal, SearchConfig::default()),
            Err(VerifyError::Planning(PlanningError::NoPlanFound { .. }))
        ));
    }

    #[test]
    fn budget_errors_are_not_masked() {
        let (reg, start, goal) = via_c();
        let config = SearchConfig::default().with_max_expansions(1);
        assert!(matches!(
            cross_check(&reg, &start, &goal, config),
            Err(VerifyError::Planning(
                PlanningError::SearchBudgetExceeded { .. }
            ))
        ));
    }
}
