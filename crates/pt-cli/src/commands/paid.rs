//! Paid command: total paid time for one agent inside a window.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use pt_core::{AgentId, Window, paid_time_for_agent};
use pt_db::Database;

use super::util::{AgentWindowArgs, format_duration, format_instant};
use crate::Config;

#[derive(Debug, Args)]
pub struct PaidArgs {
    #[command(flatten)]
    pub target: AgentWindowArgs,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

/// JSON shape of the paid command.
#[derive(Debug, Serialize)]
struct PaidOutput {
    agent_id: AgentId,
    window_start: String,
    window_end: String,
    paid_ms: i64,
}

pub fn run<W: Write>(writer: &mut W, args: &PaidArgs, config: &Config) -> Result<()> {
    let window = args.target.window.to_window()?;
    let db = Database::open(&config.database_path)
        .with_context(|| format!("failed to open {}", config.database_path.display()))?;

    let paid = paid_time_for_agent(&db, args.target.agent, &window, &config.resolve_config())
        .with_context(|| format!("failed to compute paid time for agent {}", args.target.agent))?;

    write_paid(writer, args.target.agent, &window, paid, args.json)
}

fn write_paid<W: Write>(
    writer: &mut W,
    agent_id: AgentId,
    window: &Window,
    paid: chrono::Duration,
    json: bool,
) -> Result<()> {
    if json {
        let output = PaidOutput {
            agent_id,
            window_start: format_instant(window.start()),
            window_end: format_instant(window.end()),
            paid_ms: paid.num_milliseconds(),
        };
        writeln!(writer, "{}", serde_json::to_string(&output)?)?;
        return Ok(());
    }

    writeln!(writer, "Agent:  {agent_id}")?;
    writeln!(
        writer,
        "Window: {} .. {}",
        format_instant(window.start()),
        format_instant(window.end())
    )?;
    writeln!(writer, "Paid:   {}", format_duration(paid))?;
    Ok(())
}
