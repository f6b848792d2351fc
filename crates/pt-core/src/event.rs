//! Scheduled events and the flattened segments resolved from them.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{AgentId, ValidationError};

/// A scheduled interval for one agent.
///
/// Where events overlap, the one with the highest `priority` decides whether
/// the shared time is paid. Events of equal priority for the same agent are
/// expected not to overlap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// The agent this event is scheduled for.
    pub agent_id: AgentId,
    /// Inclusive start of the interval.
    pub start: DateTime<Utc>,
    /// Exclusive end of the interval.
    pub end: DateTime<Utc>,
    /// Larger values take precedence over smaller ones.
    pub priority: i32,
    /// Whether time won by this event counts as paid.
    pub paid: bool,
}

impl Event {
    /// Creates an event after checking that `start <= end`.
    pub fn new(
        agent_id: AgentId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        priority: i32,
        paid: bool,
    ) -> Result<Self, ValidationError> {
        let event = Self {
            agent_id,
            start,
            end,
            priority,
            paid,
        };
        event.validate()?;
        Ok(event)
    }

    /// Checks the interval invariant.
    ///
    /// Fields are public, so events built literally or deserialized are only
    /// checked here.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.start > self.end {
            return Err(ValidationError::InvalidInterval {
                agent_id: self.agent_id,
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Whether the half-open ranges of two events share any instant.
    ///
    /// Zero-length events never overlap anything.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// A sub-range of exactly one winning event.
///
/// Segments produced by one resolution never overlap each other and together
/// cover the union of the input events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub agent_id: AgentId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Priority of the event that won this range.
    pub priority: i32,
    pub paid: bool,
}

impl Segment {
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2022, 7, 6, hour, minute, 0).unwrap()
    }

    #[test]
    fn new_rejects_inverted_interval() {
        let err = Event::new(AgentId::new(1), at(9, 0), at(8, 0), 1, true).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidInterval { .. }));
    }

    #[test]
    fn new_accepts_zero_length_interval() {
        let event = Event::new(AgentId::new(1), at(9, 0), at(9, 0), 1, true).unwrap();
        assert_eq!(event.duration(), Duration::zero());
    }

    #[test]
    fn touching_events_do_not_overlap() {
        let a = Event::new(AgentId::new(1), at(8, 0), at(9, 0), 1, true).unwrap();
        let b = Event::new(AgentId::new(1), at(9, 0), at(10, 0), 1, true).unwrap();
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn zero_length_event_inside_another_does_not_overlap() {
        let outer = Event::new(AgentId::new(1), at(8, 0), at(10, 0), 1, true).unwrap();
        let point = Event::new(AgentId::new(1), at(9, 0), at(9, 0), 1, false).unwrap();
        assert!(!outer.overlaps(&point));
    }

    #[test]
    fn event_deserializes_from_rfc3339() {
        let json = r#"{
            "agent_id": 1,
            "start": "2022-07-06T08:00:00Z",
            "end": "2022-07-06T08:30:00Z",
            "priority": 2,
            "paid": false
        }"#;
        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event.start, at(8, 0));
        assert_eq!(event.duration(), Duration::minutes(30));
        assert!(!event.paid);
    }
}
