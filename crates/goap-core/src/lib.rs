//! Deterministic planning primitives: bitset world states, the atom/action registry of a
//! planning session, and the plan/result model shared by the grounding and search crates.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod action;
pub mod cancel;
pub mod error;
pub mod plan;
pub mod registry;
pub mod state;

pub use action::{ActionIndex, GroundAction};
pub use cancel::{CancelFlag, Cancellation};
pub use error::{PlanningError, Result};
pub use plan::{Plan, PlanStep};
pub use registry::Registry;
pub use state::{AtomIndex, Bits, StateKey, WorldState, MAX_ATOMS};
