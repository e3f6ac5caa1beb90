//! Planner configuration loading.

use std::path::Path;

use anyhow::{Context, Result};
use goap_core::Cancellation;
use goap_search::{SearchConfig, SearchMode};
use serde::{Deserialize, Serialize};

/// Planner settings, loaded from `goap.yaml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Search direction
    #[serde(default)]
    pub mode: SearchMode,

    /// Node expansions before giving up
    #[serde(default = "default_max_expansions")]
    pub max_expansions: usize,

    /// Multiplier on the mismatch heuristic; 0 is uniform-cost search
    #[serde(default = "default_heuristic_weight")]
    pub heuristic_weight: u32,

    /// Wall-clock limit per search
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

fn default_max_expansions() -> usize {
    SearchConfig::default().max_expansions
}

fn default_heuristic_weight() -> u32 {
    SearchConfig::default().heuristic_weight
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            mode: SearchMode::default(),
            max_expansions: default_max_expansions(),
            heuristic_weight: default_heuristic_weight(),
            timeout_ms: None,
        }
    }
}

impl PlannerConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        // An empty document deserializes to unit, not to a map.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Load `path` if it exists, defaults otherwise
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn search_config(&self) -> SearchConfig {
        SearchConfig::default()
            .with_mode(self.mode)
            .with_max_expansions(self.max_expansions)
            .with_heuristic_weight(self.heuristic_weight)
    }

    pub fn cancellation(&self) -> Cancellation {
        match self.timeout_ms {
            Some(ms) => Cancellation::none().with_timeout(std::time::Duration::from_millis(ms)),
            None => Cancellation::none(),
        }
    }
}
