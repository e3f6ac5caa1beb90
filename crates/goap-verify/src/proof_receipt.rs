//! Proof receipts for verified plans

use chrono::{DateTime, Utc};
use goap_core::StateKey;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Proof that a plan achieves its goal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanProof {
    /// Hash of start, goal and action sequence; independent of when the proof was made
    pub plan_hash: String,

    /// Start state description
    pub start_state: String,

    /// Goal state description
    pub goal_state: String,

    /// Sequence of action names
    pub action_sequence: Vec<String>,

    /// Individual step proofs
    pub step_proofs: Vec<StepProof>,

    /// Cost summed during replay
    pub total_cost: u64,

    /// Generation timestamp
    pub generated_at: DateTime<Utc>,

    /// Replay time in milliseconds
    pub proof_time_ms: u64,
}

/// Proof for a single action step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepProof {
    /// Step index (0-based)
    pub step: usize,

    /// Action name
    pub action: String,

    pub cost: u32,

    /// Preconditions checked, as `atom==0|1`
    pub precondition: String,

    /// Effects applied, as `atom==0|1`
    pub effect: String,

    /// State after the step
    pub state_after: String,
}

impl PlanProof {
    pub fn new(
        plan_hash: String,
        start_state: String,
        goal_state: String,
        action_sequence: Vec<String>,
    ) -> Self {
        Self {
            plan_hash,
            start_state,
            goal_state,
            action_sequence,
            step_proofs: Vec::new(),
            total_cost: 0,
            generated_at: Utc::now(),
            proof_time_ms: 0,
        }
    }

    pub fn add_step(&mut self, step_proof: StepProof) {
        self.total_cost += u64::from(step_proof.cost);
        self.step_proofs.push(step_proof);
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Serialize)]
struct HashInput<'a> {
    start: StateKey,
    goal: StateKey,
    actions: &'a [String],
}

/// SHA-256 over the canonical JSON of start, goal and action names, hex encoded.
pub fn plan_hash(start: StateKey, goal: StateKey, actions: &[String]) -> String {
    let json = serde_json::to_string(&HashInput {
        start,
        goal,
        actions,
    })
    .unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    hex::encode(hasher.finalize())
}
