#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use goap_core::{ActionIndex, StateKey};

/// Which frontier a search event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    /// Progression from the start state.
    Forward,
    /// Regression from the goal.
    Backward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SearchOutcome {
    Found { cost: u64 },
    NoPlan,
    BudgetExceeded,
    Cancelled,
}

/// A search event. Node ids index the search arena of the emitting run.
///
/// Events are plain data so a run can be recorded and replayed by tooling later.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TraceEvent {
    Expanded {
        step: usize,
        direction: Direction,
        node: usize,
        g: u64,
        h: u64,
        state: StateKey,
    },
    Generated {
        direction: Direction,
        node: usize,
        parent: usize,
        action: ActionIndex,
        g: u64,
    },
    Met {
        forward: usize,
        backward: usize,
        cost: u64,
    },
    Finished {
        expanded: usize,
        generated: usize,
        outcome: SearchOutcome,
    },
}

pub trait TraceSink {
    fn emit(&mut self, event: TraceEvent);
}

#[derive(Debug, Default)]
pub struct NullTraceSink;

impl TraceSink for NullTraceSink {
    fn emit(&mut self, _event: TraceEvent) {}
}

#[derive(Debug, Default)]
pub struct VecTraceSink {
    pub events: Vec<TraceEvent>,
}

impl TraceSink for VecTraceSink {
    fn emit(&mut self, event: TraceEvent) {
        self.events.push(event);
    }
}

/// Forwards every event to `tracing` at `TRACE` level.
#[derive(Debug, Default)]
pub struct LogTraceSink;

impl TraceSink for LogTraceSink {
    fn emit(&mut self, event: TraceEvent) {
        tracing::trace!(target: "goap::search", ?event);
    }
}

/// Recorded events of one run, with small query helpers for tests and tooling.
#[derive(Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceLog {
    pub events: Vec<TraceEvent>,
}

impl TraceLog {
    pub fn push(&mut self, event: TraceEvent) {
        self.events.push(event);
    }

    pub fn expansions(&self, direction: Direction) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, TraceEvent::Expanded { direction: d, .. } if *d == direction))
            .count()
    }

    pub fn outcome(&self) -> Option<SearchOutcome> {
        self.events.iter().rev().find_map(|e| match e {
            TraceEvent::Finished { outcome, .. } => Some(*outcome),
            _ => None,
        })
    }

    pub fn meets(&self) -> impl Iterator<Item = &TraceEvent> {
        self.events
            .iter()
            .filter(|e| matches!(e, TraceEvent::Met { .. }))
    }
}

impl TraceSink for TraceLog {
    fn emit(&mut self, event: TraceEvent) {
        self.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expanded(step: usize, direction: Direction) -> TraceEvent {
        TraceEvent::Expanded {
            step,
            direction,
            node: step,
            g: 0,
            h: 0,
            state: StateKey {
                values: 0,
                defined: 0,
            },
        }
    }

    #[test]
    fn log_counts_expansions_per_direction() {
        let mut log = TraceLog::default();
        log.emit(expanded(1, Direction::Forward));
        log.emit(expanded(2, Direction::Backward));
        log.emit(expanded(3, Direction::Forward));
        assert_eq!(log.expansions(Direction::Forward), 2);
        assert_eq!(log.expansions(Direction::Backward), 1);
        assert_eq!(log.outcome(), None);
    }

    #[test]
    fn log_reports_last_outcome() {
        let mut log = TraceLog::default();
        log.emit(TraceEvent::Met {
            forward: 1,
            backward: 2,
            cost: 3,
        });
        log.emit(TraceEvent::Finished {
            expanded: 4,
            generated: 9,
            outcome: SearchOutcome::Found { cost: 3 },
        });
        assert_eq!(log.outcome(), Some(SearchOutcome::Found { cost: 3 }));
        assert_eq!(log.meets().count(), 1);
    }

    #[test]
    fn vec_sink_keeps_order() {
        let mut sink = VecTraceSink::default();
        sink.emit(expanded(1, Direction::Forward));
        sink.emit(expanded(2, Direction::Forward));
        assert_eq!(sink.events, vec![expanded(1, Direction::Forward), expanded(2, Direction::Forward)]);
    }
}
