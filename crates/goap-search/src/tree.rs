use std::fmt::Write as _;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use goap_core::{ActionIndex, Registry, WorldState};
use goap_tools::Direction;

/// One arena entry. Nodes are never mutated after creation; a cheaper path to the same state
/// creates a new node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SearchNode {
    pub state: WorldState,
    pub g: u64,
    pub h: u64,
    pub parent: Option<usize>,
    /// Action applied (forward) or regressed through (backward) to reach this node.
    pub action: Option<ActionIndex>,
    pub direction: Direction,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SearchStats {
    pub expanded: usize,
    pub generated: usize,
    pub forward_expanded: usize,
    pub backward_expanded: usize,
}

/// The arena explored by one search run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SearchTree {
    pub(crate) nodes: Vec<SearchNode>,
    pub(crate) stats: SearchStats,
}

impl SearchTree {
    pub fn nodes(&self) -> &[SearchNode] {
        &self.nodes
    }

    pub fn node(&self, id: usize) -> Option<&SearchNode> {
        self.nodes.get(id)
    }

    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn roots(&self) -> impl Iterator<Item = usize> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.parent.is_none())
            .map(|(id, _)| id)
    }

    pub fn children(&self, id: usize) -> impl Iterator<Item = usize> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(move |(_, n)| n.parent == Some(id))
            .map(|(id, _)| id)
    }

    /// Indented dump of every root and its descendants, one node per line:
    ///
    /// ```text
    /// forward #0 g=0 h=1 []
    ///   write B #2 g=1 h=1 [B]
    /// ```
    pub fn render(&self, registry: &Registry) -> String {
        let children = self.child_lists();
        let mut out = String::new();
        for root in self.roots() {
            let label = match self.nodes[root].direction {
                Direction::Forward => "forward",
                Direction::Backward => "backward",
            };
            let mut stack = vec![(root, 0usize)];
            while let Some((id, depth)) = stack.pop() {
                let node = &self.nodes[id];
                let indent = "  ".repeat(depth);
                let name = match node.action {
                    Some(action) => registry.action_name(action).unwrap_or("?"),
                    None => label,
                };
                let _ = writeln!(
                    out,
                    "{indent}{name} #{id} g={} h={} [{}]",
                    node.g,
                    node.h,
                    registry.describe(&node.state)
                );
                for &child in children[id].iter().rev() {
                    stack.push((child, depth + 1));
                }
            }
        }
        out
    }

    /// Children of every node in ascending id order, built in one pass.
    fn child_lists(&self) -> Vec<Vec<usize>> {
        let mut lists = vec![Vec::new(); self.nodes.len()];
        for (id, node) in self.nodes.iter().enumerate() {
            if let Some(parent) = node.parent {
                if let Some(list) = lists.get_mut(parent) {
                    list.push(id);
                }
            }
        }
        lists
    }
}
