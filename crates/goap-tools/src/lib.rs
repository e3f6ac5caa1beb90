//! Tooling primitives for the deterministic GOAP planner.
//!
//! Kept free of search logic: the search crate emits [`TraceEvent`]s into whatever
//! [`TraceSink`] the caller supplies, and debugging front-ends consume the recorded log.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod trace;

pub use trace::{
    Direction, LogTraceSink, NullTraceSink, SearchOutcome, TraceEvent, TraceLog, TraceSink,
    VecTraceSink,
};
