use thiserror::Error;

/// Every failure the planning core reports. Failures are values; nothing in the core panics on
/// bad input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanningError {
    #[error("unknown atom '{name}'")]
    UnknownAtom { name: String },

    #[error("unknown action '{name}'")]
    UnknownAction { name: String },

    #[error("atom limit of {limit} exceeded")]
    AtomLimitExceeded { limit: usize },

    #[error("action '{action}' has invalid cost {cost} (must be > 0)")]
    InvalidCost { action: String, cost: u32 },

    #[error("malformed atom expression '{input}': {reason}")]
    MalformedAtom { input: String, reason: String },

    #[error("could not resolve variable '{variable}' of action '{action}'")]
    UnresolvedVariable { action: String, variable: String },

    #[error("no plan found after exploring {explored} nodes")]
    NoPlanFound { explored: usize },

    #[error("search budget of {budget} expansions exceeded")]
    SearchBudgetExceeded { expanded: usize, budget: usize },

    #[error("search cancelled after {expanded} expansions")]
    Cancelled { expanded: usize },
}

impl PlanningError {
    /// Raised while assembling a domain; the registry is left unmodified.
    pub fn is_authoring_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownAtom { .. }
                | Self::UnknownAction { .. }
                | Self::AtomLimitExceeded { .. }
                | Self::InvalidCost { .. }
                | Self::MalformedAtom { .. }
        )
    }

    /// Raised by the search engine.
    pub fn is_search_failure(&self) -> bool {
        matches!(
            self,
            Self::NoPlanFound { .. } | Self::SearchBudgetExceeded { .. } | Self::Cancelled { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, PlanningError>;
