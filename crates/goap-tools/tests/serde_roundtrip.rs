#![cfg(feature = "serde")]

use goap_core::StateKey;
use goap_tools::{Direction, SearchOutcome, TraceEvent, TraceLog};

#[test]
fn trace_log_json_roundtrip() {
    let log = TraceLog {
        events: vec![
            TraceEvent::Expanded {
                step: 1,
                direction: Direction::Forward,
                node: 0,
                g: 0,
                h: 1,
                state: StateKey {
                    values: 0,
                    defined: 0b11,
                },
            },
            TraceEvent::Generated {
                direction: Direction::Backward,
                node: 2,
                parent: 1,
                action: 4,
                g: 3,
            },
            TraceEvent::Met {
                forward: 1,
                backward: 2,
                cost: 3,
            },
            TraceEvent::Finished {
                expanded: 2,
                generated: 3,
                outcome: SearchOutcome::Found { cost: 3 },
            },
        ],
    };

    let json = serde_json::to_string(&log).expect("serialize");
    let roundtrip: TraceLog = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(roundtrip, log);
}
