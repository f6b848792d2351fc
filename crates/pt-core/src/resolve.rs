//! Priority resolution and paid-time aggregation.
//!
//! # Algorithm Summary
//!
//! 1. Build a [`BoundaryIndex`] from every event's `start` and `end`
//! 2. Visit events by descending priority (stable, so ties keep input order)
//! 3. For each event, sweep its boundary slots: claimed slots belong to an
//!    earlier, higher-priority event and are skipped; each maximal run of
//!    unclaimed slots is claimed and emitted as one [`Segment`]
//! 4. Sum the durations of the paid segments
//!
//! A slot can only ever be claimed by the highest-priority event covering it,
//! so every covered instant ends up in exactly one segment.
//!
//! # Example
//!
//! ```text
//! shift   09:00-17:00 paid    p1   ████████████████████████████████
//! break   10:30-10:45 unpaid  p2         ██
//! meeting 10:35-15:10 paid    p3          ████████████████████
//! break   15:00-15:15 unpaid  p2                              ███
//! ------------------------------------------------------------------
//! result               p1 ███ p2 █ p3 ██████████████ p2 █ p1 ██████
//! ```

use std::time::Instant;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::boundary::BoundaryIndex;
use crate::event::{Event, Segment};
use crate::types::{AgentId, ValidationError};

/// How to treat two same-priority events that overlap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapPolicy {
    /// Fail with [`ResolveError::PriorityOverlap`].
    #[default]
    Reject,
    /// Skip the check; the event earlier in input order keeps the shared time.
    InputOrder,
}

/// Configuration for priority resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveConfig {
    /// Default: [`OverlapPolicy::Reject`].
    #[serde(default)]
    pub overlap_policy: OverlapPolicy,
}

/// Errors from priority resolution.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// An input event failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Two events with the same priority overlap.
    #[error(
        "events for agent {agent_id} with priority {priority} overlap: \
         {first_start}..{first_end} and {second_start}..{second_end}"
    )]
    PriorityOverlap {
        agent_id: AgentId,
        priority: i32,
        first_start: DateTime<Utc>,
        first_end: DateTime<Utc>,
        second_start: DateTime<Utc>,
        second_end: DateTime<Utc>,
    },

    /// An event boundary was missing from the index built from those same
    /// events. This is a bug, not bad input.
    #[error("internal error: boundary {instant} missing from index")]
    MissingBoundary { instant: DateTime<Utc> },
}

/// Computes the paid time implied by one agent's events.
///
/// Events must all belong to the same agent; callers filter by agent and
/// window first (see [`crate::events_for_agent`]).
pub fn resolve_paid_time(events: &[Event], config: &ResolveConfig) -> Result<Duration, ResolveError> {
    let segments = flatten(events, config)?;
    Ok(paid_duration(&segments))
}

/// Like [`resolve_paid_time`], but logs how long the resolution took.
pub fn resolve_paid_time_measured(
    events: &[Event],
    config: &ResolveConfig,
) -> Result<Duration, ResolveError> {
    let started = Instant::now();
    let segments = flatten(events, config)?;
    let paid = paid_duration(&segments);
    tracing::debug!(
        elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
        event_count = events.len(),
        segment_count = segments.len(),
        "resolved paid time"
    );
    Ok(paid)
}

/// Validates events and flattens them into non-overlapping segments.
///
/// Segments are returned in the order they were claimed: by descending
/// priority, then by position within each event.
pub fn flatten(events: &[Event], config: &ResolveConfig) -> Result<Vec<Segment>, ResolveError> {
    for event in events {
        event.validate()?;
    }
    if config.overlap_policy == OverlapPolicy::Reject {
        check_priority_overlaps(events)?;
    }

    let mut index = BoundaryIndex::from_events(events);
    sweep(events, &mut index)
}

/// Sums the durations of paid segments.
pub fn paid_duration(segments: &[Segment]) -> Duration {
    segments
        .iter()
        .filter(|segment| segment.paid)
        .fold(Duration::zero(), |total, segment| total + segment.duration())
}

fn sweep(events: &[Event], index: &mut BoundaryIndex) -> Result<Vec<Segment>, ResolveError> {
    let mut ordered: Vec<&Event> = events.iter().collect();
    // `sort_by` is stable: equal priorities keep input order.
    ordered.sort_by(|a, b| b.priority.cmp(&a.priority));

    let mut segments = Vec::new();
    for event in ordered {
        let mut cursor = locate(index, event.start)?;
        let end = locate(index, event.end)?;

        while cursor < end {
            if index.is_claimed(cursor) {
                cursor += 1;
                continue;
            }

            let run_start = cursor;
            while cursor < end && !index.is_claimed(cursor) {
                index.claim(cursor);
                cursor += 1;
            }

            segments.push(Segment {
                agent_id: event.agent_id,
                start: index.instant(run_start),
                end: index.instant(cursor),
                priority: event.priority,
                paid: event.paid,
            });
        }
    }

    Ok(segments)
}

fn locate(index: &BoundaryIndex, instant: DateTime<Utc>) -> Result<usize, ResolveError> {
    index
        .position(instant)
        .ok_or(ResolveError::MissingBoundary { instant })
}

/// Rejects same-priority events whose ranges overlap.
///
/// Sorting by (priority, start) means any overlap shows up between neighbours.
fn check_priority_overlaps(events: &[Event]) -> Result<(), ResolveError> {
    let mut sorted: Vec<&Event> = events.iter().filter(|e| e.start < e.end).collect();
    sorted.sort_by(|a, b| a.priority.cmp(&b.priority).then(a.start.cmp(&b.start)));

    for pair in sorted.windows(2) {
        let (first, second) = (pair[0], pair[1]);
        if first.priority == second.priority && first.overlaps(second) {
            return Err(ResolveError::PriorityOverlap {
                agent_id: first.agent_id,
                priority: first.priority,
                first_start: first.start,
                first_end: first.end,
                second_start: second.start,
                second_end: second.end,
            });
        }
    }
    Ok(())
}
