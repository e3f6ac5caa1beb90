//! YAML domain files.
//!
//! ```yaml
//! atoms:
//!   A(id): false
//!   B: false
//! actions:
//!   write B(id):
//!     cost: 1
//!     pre: { A(id): true }
//!     post: { B: true }
//! initial:
//!   'A("abc")': true
//! goal:
//!   B: true
//! ```
//!
//! Maps keep their file order, which fixes atom and action indices and therefore tie-breaking.

use std::fmt;
use std::marker::PhantomData;
use std::path::Path;

use anyhow::{Context, Result};
use goap_ground::{GroundedProblem, LiftedDomain, Resolver};
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use tracing::warn;

/// Map entries in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entries<T>(pub Vec<(String, T)>);

impl<T> Default for Entries<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Entries<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for EntriesVisitor<T> {
            type Value = Entries<T>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, T>()? {
                    entries.push(entry);
                }
                Ok(Entries(entries))
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E> {
                Ok(Entries::default())
            }
        }

        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}

/// One action entry
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ActionSpec {
    #[serde(default = "default_cost")]
    pub cost: u32,

    #[serde(default)]
    pub pre: Entries<bool>,

    #[serde(default)]
    pub post: Entries<bool>,
}

fn default_cost() -> u32 {
    1
}

/// A planning problem as written on disk
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DomainFile {
    /// Atom declaration to default value
    pub atoms: Entries<bool>,
    pub actions: Entries<ActionSpec>,
    pub initial: Entries<bool>,
    pub goal: Entries<bool>,
}

impl DomainFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read domain from {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse domain from {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn to_lifted(&self) -> Result<LiftedDomain> {
        let mut domain = LiftedDomain::new();
        for (decl, default) in &self.atoms.0 {
            domain
                .declare_atom(decl, *default)
                .with_context(|| format!("atom '{decl}'"))?;
        }
        for (name, spec) in &self.actions.0 {
            domain
                .declare_action(name, spec.cost)
                .with_context(|| format!("action '{name}'"))?;
            for (atom, value) in &spec.pre.0 {
                domain
                    .precondition(name, atom, *value)
                    .with_context(|| format!("precondition '{atom}' of action '{name}'"))?;
            }
            for (atom, value) in &spec.post.0 {
                domain
                    .effect(name, atom, *value)
                    .with_context(|| format!("effect '{atom}' of action '{name}'"))?;
            }
        }
        for (fact, value) in &self.initial.0 {
            domain
                .initial(fact, *value)
                .with_context(|| format!("initial fact '{fact}'"))?;
        }
        for (fact, value) in &self.goal.0 {
            domain
                .goal(fact, *value)
                .with_context(|| format!("goal fact '{fact}'"))?;
        }
        Ok(domain)
    }

    /// Build the lifted domain and ground it. Diagnostics are logged, not fatal.
    pub fn ground(&self) -> Result<GroundedProblem> {
        let lifted = self.to_lifted()?;
        let problem = Resolver::new(&lifted)
            .ground()
            .context("Failed to ground domain")?;
        for diagnostic in &problem.diagnostics {
            warn!(%diagnostic, "grounding");
        }
        Ok(problem)
    }
}
