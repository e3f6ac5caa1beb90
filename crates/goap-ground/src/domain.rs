use std::collections::BTreeMap;

use goap_core::{PlanningError, Result};

use crate::expr::{AtomExpr, Signature};

/// A condition of a lifted action: an atom pattern and the value it must have (precondition) or
/// receives (effect).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub atom: AtomExpr,
    pub value: bool,
}

/// A parsed, validated lifted action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiftedAction {
    pub name: AtomExpr,
    pub cost: u32,
    pub preconditions: Vec<Condition>,
    pub effects: Vec<Condition>,
}

impl LiftedAction {
    /// Free variables: those of the name first, then preconditions, then effects, each in order
    /// of first occurrence.
    pub fn variables(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        let patterns = std::iter::once(&self.name).chain(self.patterns());
        for atom in patterns {
            for v in atom.variables() {
                if !out.iter().any(|seen| seen == v) {
                    out.push(v.to_string());
                }
            }
        }
        out
    }

    /// Precondition patterns followed by effect patterns.
    pub fn patterns(&self) -> impl Iterator<Item = &AtomExpr> {
        self.preconditions
            .iter()
            .chain(&self.effects)
            .map(|c| &c.atom)
    }
}

/// A lifted planning domain plus the concrete facts of one planning request.
///
/// Atom declarations fix the predicate signatures every pattern and fact must use, and carry
/// the default initial value of their instances.
#[derive(Debug, Clone, Default)]
pub struct LiftedDomain {
    atoms: Vec<AtomExpr>,
    defaults: BTreeMap<Signature, bool>,
    actions: Vec<LiftedAction>,
    initial: Vec<Condition>,
    goal: Vec<Condition>,
}

impl LiftedDomain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an atom family, e.g. `A(id)`, or a plain atom `A`. Idempotent by signature.
    pub fn declare_atom(&mut self, decl: &str, default: bool) -> Result<()> {
        let atom = AtomExpr::parse(decl)?;
        let signature = atom.signature();
        if self.defaults.contains_key(&signature) {
            return Ok(());
        }
        self.defaults.insert(signature, default);
        self.atoms.push(atom);
        Ok(())
    }

    /// Declare a possibly parameterized action such as `write B(id)`. Idempotent by name; the
    /// first declaration keeps its cost.
    pub fn declare_action(&mut self, name: &str, cost: u32) -> Result<()> {
        let parsed = AtomExpr::parse(name)?;
        if self.actions.iter().any(|a| a.name == parsed) {
            return Ok(());
        }
        if cost == 0 {
            return Err(PlanningError::InvalidCost {
                action: name.to_string(),
                cost,
            });
        }
        self.actions.push(LiftedAction {
            name: parsed,
            cost,
            preconditions: Vec::new(),
            effects: Vec::new(),
        });
        Ok(())
    }

    /// Require `atom` (a pattern over the action's variables) to hold with `value`.
    pub fn precondition(&mut self, action: &str, atom: &str, value: bool) -> Result<()> {
        let (index, atom) = self.condition_target(action, atom)?;
        self.actions[index]
            .preconditions
            .push(Condition { atom, value });
        Ok(())
    }

    pub fn effect(&mut self, action: &str, atom: &str, value: bool) -> Result<()> {
        let (index, atom) = self.condition_target(action, atom)?;
        self.actions[index].effects.push(Condition { atom, value });
        Ok(())
    }

    /// Add a ground fact to the initial state.
    pub fn initial(&mut self, fact: &str, value: bool) -> Result<()> {
        let cond = self.fact(fact, value)?;
        self.initial.push(cond);
        Ok(())
    }

    /// Add a ground fact to the goal.
    pub fn goal(&mut self, fact: &str, value: bool) -> Result<()> {
        let cond = self.fact(fact, value)?;
        self.goal.push(cond);
        Ok(())
    }

    pub fn atoms(&self) -> &[AtomExpr] {
        &self.atoms
    }

    pub fn actions(&self) -> &[LiftedAction] {
        &self.actions
    }

    pub fn initial_facts(&self) -> &[Condition] {
        &self.initial
    }

    pub fn goal_facts(&self) -> &[Condition] {
        &self.goal
    }

    /// Default initial value of atoms with this signature, if declared.
    pub fn default_value(&self, signature: &Signature) -> Option<bool> {
        self.defaults.get(signature).copied()
    }

    fn checked(&self, text: &str) -> Result<AtomExpr> {
        let atom = AtomExpr::parse(text)?;
        if !self.defaults.contains_key(&atom.signature()) {
            return Err(PlanningError::UnknownAtom {
                name: text.to_string(),
            });
        }
        Ok(atom)
    }

    fn condition_target(&self, action: &str, atom: &str) -> Result<(usize, AtomExpr)> {
        let name = AtomExpr::parse(action)?;
        let index = self
            .actions
            .iter()
            .position(|a| a.name == name)
            .ok_or_else(|| PlanningError::UnknownAction {
                name: action.to_string(),
            })?;
        Ok((index, self.checked(atom)?))
    }

    fn fact(&self, text: &str, value: bool) -> Result<Condition> {
        let atom = self.checked(text)?;
        if !atom.is_ground() {
            return Err(PlanningError::MalformedAtom {
                input: text.to_string(),
                reason: "facts must not contain variables".to_string(),
            });
        }
        Ok(Condition { atom, value })
    }
}
