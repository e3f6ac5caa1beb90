//! Deterministic A* planning over a ground [`goap_core::Registry`], forward from the start,
//! backward from the goal, or from both ends until the frontiers meet.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod config;
pub mod planner;
pub mod tree;

pub use config::{SearchConfig, SearchMode};
pub use planner::{plan, Planner};
pub use tree::{SearchNode, SearchStats, SearchTree};
