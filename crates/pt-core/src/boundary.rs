//! Sorted boundary instants with per-slot claim flags.
//!
//! Position `i` stands for the slot `[instants[i], instants[i + 1])`. A slot is
//! claimed at most once and never released, which is what lets the resolver
//! hand each slot to the first (highest-priority) event that reaches it.

use chrono::{DateTime, Utc};

use crate::event::Event;

#[derive(Debug, Clone)]
pub struct BoundaryIndex {
    instants: Vec<DateTime<Utc>>,
    claimed: Vec<bool>,
}

impl BoundaryIndex {
    /// Collects every `start` and `end`, then sorts and deduplicates them.
    pub fn from_events(events: &[Event]) -> Self {
        let mut instants: Vec<DateTime<Utc>> = events
            .iter()
            .flat_map(|event| [event.start, event.end])
            .collect();
        instants.sort_unstable();
        instants.dedup();

        let claimed = vec![false; instants.len()];
        Self { instants, claimed }
    }

    pub fn len(&self) -> usize {
        self.instants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instants.is_empty()
    }

    /// Returns the position of an exact instant, if present.
    pub fn position(&self, instant: DateTime<Utc>) -> Option<usize> {
        self.instants.binary_search(&instant).ok()
    }

    /// Returns the instant at `position`.
    ///
    /// Positions come from [`Self::position`], so they are always in range.
    pub fn instant(&self, position: usize) -> DateTime<Utc> {
        self.instants[position]
    }

    pub fn is_claimed(&self, position: usize) -> bool {
        self.claimed[position]
    }

    /// Marks a slot as attributed. Claims are permanent.
    pub fn claim(&mut self, position: usize) {
        self.claimed[position] = true;
    }
}
