use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Direction of the search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SearchMode {
    /// Progression from the start state.
    #[default]
    Forward,
    /// Regression from the goal.
    Backward,
    /// Both frontiers, alternating, until they meet.
    Bidirectional,
}

impl SearchMode {
    pub const ALL: [SearchMode; 3] = [
        SearchMode::Forward,
        SearchMode::Backward,
        SearchMode::Bidirectional,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SearchMode::Forward => "forward",
            SearchMode::Backward => "backward",
            SearchMode::Bidirectional => "bidirectional",
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "forward" | "fwd" => Ok(SearchMode::Forward),
            "backward" | "bwd" | "regression" => Ok(SearchMode::Backward),
            "bidirectional" | "bidi" | "both" => Ok(SearchMode::Bidirectional),
            other => Err(format!(
                "unknown search mode '{other}' (expected forward, backward or bidirectional)"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SearchConfig {
    pub mode: SearchMode,
    /// Node expansions allowed before giving up, summed over both frontiers.
    pub max_expansions: usize,
    /// Multiplier on the mismatched-atom heuristic. `0` is uniform-cost search; larger values
    /// trade optimality for speed.
    pub heuristic_weight: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            mode: SearchMode::Forward,
            max_expansions: 4096,
            heuristic_weight: 1,
        }
    }
}

impl SearchConfig {
    pub fn with_mode(mut self, mode: SearchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_max_expansions(mut self, max_expansions: usize) -> Self {
        self.max_expansions = max_expansions;
        self
    }

    pub fn with_heuristic_weight(mut self, weight: u32) -> Self {
        self.heuristic_weight = weight;
        self
    }
}
