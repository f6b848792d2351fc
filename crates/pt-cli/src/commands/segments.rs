//! Segments command: prints one agent's flattened schedule as JSONL.
//!
//! Useful for checking which event won each stretch of time.

use std::io::Write;

use anyhow::{Context, Result};

use pt_core::{EventSource, flatten};
use pt_db::Database;

use super::util::AgentWindowArgs;
use crate::Config;

pub fn run<W: Write>(writer: &mut W, args: &AgentWindowArgs, config: &Config) -> Result<()> {
    let window = args.window.to_window()?;
    let db = Database::open(&config.database_path)
        .with_context(|| format!("failed to open {}", config.database_path.display()))?;

    let events = db
        .fetch_for_agent(args.agent, &window)
        .context("failed to load events")?;
    tracing::debug!(event_count = events.len(), "loaded events for agent");

    let mut segments = flatten(&events, &config.resolve_config())
        .with_context(|| format!("failed to resolve events for agent {}", args.agent))?;
    segments.sort_by_key(|segment| segment.start);

    for segment in segments {
        writeln!(writer, "{}", serde_json::to_string(&segment)?)?;
    }
    Ok(())
}
