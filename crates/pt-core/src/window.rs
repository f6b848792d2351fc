//! Query windows and per-agent event selection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event::Event;
use crate::types::{AgentId, ValidationError};

/// A closed time range that events must fall entirely within.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl Window {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, ValidationError> {
        if start > end {
            return Err(ValidationError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Whether the event starts no earlier and ends no later than the window.
    pub fn contains(&self, event: &Event) -> bool {
        event.start >= self.start && event.end <= self.end
    }
}

/// Selects one agent's events that lie fully inside `window`.
///
/// Input order is preserved; the resolver breaks priority ties by it.
pub fn events_for_agent(events: &[Event], agent_id: AgentId, window: &Window) -> Vec<Event> {
    events
        .iter()
        .filter(|event| event.agent_id == agent_id && window.contains(event))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2022, 7, 6, hour, minute, 0).unwrap()
    }

    fn event(agent: i64, start: DateTime<Utc>, end: DateTime<Utc>) -> Event {
        Event::new(AgentId::new(agent), start, end, 1, true).unwrap()
    }

    #[test]
    fn window_rejects_inverted_range() {
        let err = Window::new(at(10, 0), at(9, 0)).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidWindow { .. }));
    }

    #[test]
    fn contains_is_inclusive_at_both_ends() {
        let window = Window::new(at(8, 0), at(10, 0)).unwrap();
        assert!(window.contains(&event(1, at(8, 0), at(10, 0))));
        assert!(!window.contains(&event(1, at(7, 59), at(9, 0))));
        assert!(!window.contains(&event(1, at(9, 0), at(10, 1))));
    }

    #[test]
    fn events_for_agent_filters_agent_and_containment() {
        let events = vec![
            event(1, at(8, 0), at(9, 0)),
            event(2, at(8, 0), at(9, 0)),
            event(1, at(7, 0), at(9, 0)),
            event(1, at(9, 30), at(10, 0)),
        ];
        let window = Window::new(at(8, 0), at(10, 0)).unwrap();

        let selected = events_for_agent(&events, AgentId::new(1), &window);
        assert_eq!(selected, vec![events[0].clone(), events[3].clone()]);
    }
}
