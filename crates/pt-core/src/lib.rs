//! Core domain logic for the paid-time resolver.
//!
//! This crate contains the fundamental types and logic for:
//! - Resolution: flattening overlapping, priority-ranked events into
//!   non-overlapping segments and summing the paid ones
//! - Selection: picking one agent's events inside a query window
//! - Sources: the [`EventSource`] boundary and the per-agent entry points

mod boundary;
pub mod event;
mod resolve;
mod source;
pub mod types;
mod window;

pub use boundary::BoundaryIndex;
pub use event::{Event, Segment};
pub use resolve::{
    OverlapPolicy, ResolveConfig, ResolveError, flatten, paid_duration, resolve_paid_time,
    resolve_paid_time_measured,
};
pub use source::{AgentPaidTime, EventSource, SourceError, paid_time_by_agent, paid_time_for_agent};
pub use types::{AgentId, ValidationError};
pub use window::{Window, events_for_agent};
