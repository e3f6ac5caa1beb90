//! # goap-verify
//!
//! Replay verification and proof receipts for GOAP plans.
//!
//! A plan is replayed step by step against the ground registry it was produced from: every
//! precondition is checked, the final state is checked against the goal and the replayed cost
//! against the declared one. Successful replays yield a [`PlanProof`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use goap_verify::VerifiedPlanner;
//!
//! let planner = VerifiedPlanner::new(&registry);
//! let verified = planner.plan_verified(&start, &goal)?;
//! println!("{}", verified.proof.plan_hash);
//! ```

#![forbid(unsafe_code)]

pub mod proof_receipt;
pub mod verified_planner;
pub mod verify;

pub use proof_receipt::*;
pub use verified_planner::*;
pub use verify::*;

use goap_core::PlanningError;
use thiserror::Error;

/// Errors during verified planning
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    #[error(transparent)]
    Planning(#[from] PlanningError),

    #[error("step {step}: preconditions of '{action}' do not hold")]
    PreconditionFailed { step: usize, action: String },

    #[error("plan does not reach the goal")]
    GoalNotReached,

    #[error("declared cost {declared} differs from replayed cost {replayed}")]
    CostMismatch { declared: u64, replayed: u64 },

    #[error("search modes disagree: {details}")]
    ModeDisagreement { details: String },
}

pub type Result<T> = std::result::Result<T, VerifyError>;
