#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Bit width of the state representation; a session can register at most this many atoms.
pub const MAX_ATOMS: usize = 64;

pub type AtomIndex = usize;
pub type Bits = u64;

#[inline]
pub(crate) fn bit(atom: AtomIndex) -> Bits {
    1u64.checked_shl(atom as u32).unwrap_or(0)
}

/// Deduplication key of a state during search.
///
/// Ordering is derived so keys can live in `BTreeMap`s, which keeps iteration order (and thus
/// plans) deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StateKey {
    pub values: Bits,
    pub defined: Bits,
}

/// A (possibly partial) truth assignment over the registered atoms.
///
/// `defined` marks the atoms this state constrains; `values` holds their truth values. Bits of
/// `values` outside `defined` are always zero, so reading an undefined atom through
/// [`WorldState::value`] yields `false` (closed world).
///
/// The same type describes concrete start states, goals (only the atoms the caller cares about
/// are defined), action preconditions/effects, and regressed goals during backward search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WorldState {
    values: Bits,
    defined: Bits,
}

impl WorldState {
    pub const fn new() -> Self {
        Self {
            values: 0,
            defined: 0,
        }
    }

    pub const fn from_bits(values: Bits, defined: Bits) -> Self {
        Self {
            values: values & defined,
            defined,
        }
    }

    pub fn with(mut self, atom: AtomIndex, value: bool) -> Self {
        self.set(atom, value);
        self
    }

    pub fn set(&mut self, atom: AtomIndex, value: bool) {
        let b = bit(atom);
        self.defined |= b;
        if value {
            self.values |= b;
        } else {
            self.values &= !b;
        }
    }

    /// Stop constraining `atom`.
    pub fn clear(&mut self, atom: AtomIndex) {
        let b = bit(atom);
        self.defined &= !b;
        self.values &= !b;
    }

    pub fn get(&self, atom: AtomIndex) -> Option<bool> {
        let b = bit(atom);
        if self.defined & b == 0 {
            None
        } else {
            Some(self.values & b != 0)
        }
    }

    /// Closed-world read: undefined atoms are `false`.
    pub fn value(&self, atom: AtomIndex) -> bool {
        self.values & bit(atom) != 0
    }

    pub fn is_defined(&self, atom: AtomIndex) -> bool {
        self.defined & bit(atom) != 0
    }

    pub fn values(&self) -> Bits {
        self.values
    }

    pub fn defined(&self) -> Bits {
        self.defined
    }

    pub fn is_empty(&self) -> bool {
        self.defined == 0
    }

    /// Number of defined atoms.
    pub fn len(&self) -> usize {
        self.defined.count_ones() as usize
    }

    /// Defined atoms in ascending index order, with their values.
    pub fn iter(&self) -> impl Iterator<Item = (AtomIndex, bool)> + '_ {
        (0..MAX_ATOMS).filter_map(move |i| self.get(i).map(|v| (i, v)))
    }

    /// `true` when every atom defined by `goal` has the same value here (closed-world read).
    pub fn satisfies(&self, goal: &WorldState) -> bool {
        self.mismatches(goal) == 0
    }

    /// `true` when no atom defined by both states disagrees.
    pub fn is_consistent_with(&self, other: &WorldState) -> bool {
        ((self.values ^ other.values) & self.defined & other.defined) == 0
    }

    /// Number of goal-defined atoms this state gets wrong.
    pub fn mismatch_count(&self, goal: &WorldState) -> u32 {
        self.mismatches(goal).count_ones()
    }

    fn mismatches(&self, goal: &WorldState) -> Bits {
        (self.values ^ goal.values) & goal.defined
    }

    /// Overwrite every atom defined by `assignment`, leaving the rest untouched.
    pub fn overwrite(&self, assignment: &WorldState) -> WorldState {
        let mask = assignment.defined;
        WorldState {
            values: (self.values & !mask) | assignment.values,
            defined: self.defined | mask,
        }
    }

    /// Drop every atom in `mask` from the defined set.
    pub fn without(&self, mask: Bits) -> WorldState {
        WorldState {
            values: self.values & !mask,
            defined: self.defined & !mask,
        }
    }

    /// Atoms that `other` defines and that differ from (or are undefined in) `self`.
    pub fn changed_in(&self, other: &WorldState) -> WorldState {
        let changed = ((self.values ^ other.values) | !self.defined) & other.defined;
        WorldState::from_bits(other.values, changed)
    }

    pub fn key(&self) -> StateKey {
        StateKey {
            values: self.values & self.defined,
            defined: self.defined,
        }
    }
}
