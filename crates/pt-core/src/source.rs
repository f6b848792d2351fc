//! Event sources and the per-agent entry points built on them.

use std::collections::BTreeMap;
use std::convert::Infallible;

use chrono::Duration;
use rayon::prelude::*;
use thiserror::Error;

use crate::event::Event;
use crate::resolve::{self, ResolveConfig, ResolveError};
use crate::types::AgentId;
use crate::window::{Window, events_for_agent};

/// Something that can hand over every stored event.
///
/// This allows resolution to work with different backends (e.g., the
/// `SQLite` store in pt-db, or an in-memory list in tests).
pub trait EventSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns all events, in a stable order.
    fn fetch_all(&self) -> Result<Vec<Event>, Self::Error>;

    /// Returns one agent's events that lie fully inside `window`, in the
    /// same relative order as [`Self::fetch_all`].
    ///
    /// Backends that can filter natively may override this, but must select
    /// exactly what [`events_for_agent`] would.
    fn fetch_for_agent(
        &self,
        agent_id: AgentId,
        window: &Window,
    ) -> Result<Vec<Event>, Self::Error> {
        let all = self.fetch_all()?;
        Ok(events_for_agent(&all, agent_id, window))
    }
}

impl EventSource for [Event] {
    type Error = Infallible;

    fn fetch_all(&self) -> Result<Vec<Event>, Self::Error> {
        Ok(self.to_vec())
    }
}

impl EventSource for Vec<Event> {
    type Error = Infallible;

    fn fetch_all(&self) -> Result<Vec<Event>, Self::Error> {
        Ok(self.clone())
    }
}

/// Failure while computing paid time from an [`EventSource`].
#[derive(Debug, Error)]
pub enum SourceError<E: std::error::Error + 'static> {
    #[error("failed to fetch events")]
    Fetch(#[source] E),

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// Paid time for one agent over one window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentPaidTime {
    pub agent_id: AgentId,
    pub paid: Duration,
    /// Number of flattened segments the agent's events resolved into.
    pub segment_count: usize,
}

/// Computes the paid time one agent is scheduled for inside `window`.
pub fn paid_time_for_agent<S: EventSource + ?Sized>(
    source: &S,
    agent_id: AgentId,
    window: &Window,
    config: &ResolveConfig,
) -> Result<Duration, SourceError<S::Error>> {
    let events = source
        .fetch_for_agent(agent_id, window)
        .map_err(SourceError::Fetch)?;
    tracing::debug!(%agent_id, selected = events.len(), "selected events for agent");
    Ok(resolve::resolve_paid_time_measured(&events, config)?)
}

/// Computes paid time for every agent with events inside `window`.
///
/// Agents are independent, so each one is resolved on the rayon pool.
/// Rows are sorted by agent ID.
pub fn paid_time_by_agent(
    events: &[Event],
    window: &Window,
    config: &ResolveConfig,
) -> Result<Vec<AgentPaidTime>, ResolveError> {
    let mut by_agent: BTreeMap<AgentId, Vec<Event>> = BTreeMap::new();
    for event in events.iter().filter(|event| window.contains(event)) {
        by_agent
            .entry(event.agent_id)
            .or_default()
            .push(event.clone());
    }

    by_agent
        .into_par_iter()
        .map(|(agent_id, agent_events)| {
            let segments = resolve::flatten(&agent_events, config)?;
            Ok(AgentPaidTime {
                agent_id,
                paid: resolve::paid_duration(&segments),
                segment_count: segments.len(),
            })
        })
        .collect()
}
