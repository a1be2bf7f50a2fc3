#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Session scoring system that folds world events into score and move counters.

use match3_core::{Event, SessionCounters};

/// Pure system accumulating [`SessionCounters`] from the world's event stream.
///
/// Every applied swap counts as one move and every destroyed tile adds the
/// score value the world attached to it. Counters never decrease.
#[derive(Clone, Debug, Default)]
pub struct Scoring {
    counters: SessionCounters,
}

impl Scoring {
    /// Creates a scoring system with zeroed counters.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            counters: SessionCounters::new(),
        }
    }

    /// Current counters.
    #[must_use]
    pub const fn counters(&self) -> SessionCounters {
        self.counters
    }

    /// Consumes world events, returning `true` when a counter changed.
    pub fn handle(&mut self, events: &[Event]) -> bool {
        let mut changed = false;
        for event in events {
            match event {
                Event::SwapApplied { .. } => {
                    self.counters.add_move();
                    changed = true;
                }
                Event::TileDestroyed { score, .. } => {
                    self.counters.add_score(*score);
                    changed = true;
                }
                _ => {}
            }
        }
        changed
    }

    /// Zeroes the counters for a new session.
    pub fn reset(&mut self) {
        self.counters = SessionCounters::new();
    }
}
