//! Plan replay against a ground registry.

use std::time::Instant;

use goap_core::{Plan, PlanningError, Registry, WorldState};
use tracing::debug;

use crate::proof_receipt::{plan_hash, PlanProof, StepProof};
use crate::{Result, VerifyError};

/// Replay `plan` from `start` and check it against `goal`.
///
/// Every step must name the registry action at its index, and that action's preconditions must
/// hold in the replayed state. The final state must satisfy `goal`, and the cost summed from
/// the registry must equal `plan.total_cost`.
pub fn verify_plan(
    registry: &Registry,
    start: &WorldState,
    goal: &WorldState,
    plan: &Plan,
) -> Result<PlanProof> {
    let started = Instant::now();
    let names: Vec<String> = plan.steps.iter().map(|s| s.name.clone()).collect();
    let mut proof = PlanProof::new(
        plan_hash(start.key(), goal.key(), &names),
        registry.describe(start),
        registry.describe(goal),
        names,
    );

    let mut state = *start;
    for (step, planned) in plan.steps.iter().enumerate() {
        let action = registry
            .action(planned.action)
            .filter(|a| a.name() == planned.name)
            .ok_or_else(|| PlanningError::UnknownAction {
                name: planned.name.clone(),
            })?;
        let next = action
            .apply(&state)
            .ok_or_else(|| VerifyError::PreconditionFailed {
                step,
                action: planned.name.clone(),
            })?;
        state = next;
        proof.add_step(StepProof {
            step,
            action: planned.name.clone(),
            cost: action.cost(),
            precondition: registry.describe_conditions(action.preconditions()),
            effect: registry.describe_conditions(action.effects()),
            state_after: registry.describe(&state),
        });
    }

    if !state.satisfies(goal) {
        return Err(VerifyError::GoalNotReached);
    }
    if proof.total_cost != plan.total_cost {
        return Err(VerifyError::CostMismatch {
            declared: plan.total_cost,
            replayed: proof.total_cost,
        });
    }

    proof.proof_time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    debug!(steps = plan.len(), hash = %proof.plan_hash, "plan verified");
    Ok(proof)
}
