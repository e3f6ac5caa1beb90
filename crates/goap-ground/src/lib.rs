//! Lifted planning domains and their grounding.
//!
//! Authors describe atoms and actions with variables (`A(id)`, `write B(id)`); the
//! [`Resolver`] instantiates them against the constants that actually occur in a request and
//! produces a ground [`goap_core::Registry`] plus start and goal states ready for search.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod bindings;
pub mod domain;
pub mod expr;
pub mod resolver;

pub use bindings::{BindingProvider, NoBindings, StaticBindings};
pub use domain::{Condition, LiftedAction, LiftedDomain};
pub use expr::{AtomExpr, Binding, Constant, Signature, Term};
pub use resolver::{GroundedProblem, Resolver};
