//! Report command: paid time for every agent with events in a window.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use pt_core::{AgentId, AgentPaidTime, Window, paid_time_by_agent};
use pt_db::Database;

use super::util::{WindowArgs, format_duration, format_instant};
use crate::Config;

#[derive(Debug, Args)]
pub struct ReportArgs {
    #[command(flatten)]
    pub window: WindowArgs,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct JsonReport {
    window_start: String,
    window_end: String,
    agents: Vec<JsonAgent>,
}

#[derive(Debug, Serialize)]
struct JsonAgent {
    agent_id: AgentId,
    paid_ms: i64,
    segments: usize,
}

pub fn run<W: Write>(writer: &mut W, args: &ReportArgs, config: &Config) -> Result<()> {
    let window = args.window.to_window()?;
    let db = Database::open(&config.database_path)
        .with_context(|| format!("failed to open {}", config.database_path.display()))?;

    let events = db.list_events()?;
    tracing::debug!(event_count = events.len(), "loaded events for report");

    let rows = paid_time_by_agent(&events, &window, &config.resolve_config())
        .context("failed to compute paid time")?;

    if args.json {
        writeln!(writer, "{}", format_json(&window, &rows)?)?;
    } else {
        write!(writer, "{}", format_report(&window, &rows))?;
    }
    Ok(())
}

fn format_json(window: &Window, rows: &[AgentPaidTime]) -> Result<String> {
    let report = JsonReport {
        window_start: format_instant(window.start()),
        window_end: format_instant(window.end()),
        agents: rows
            .iter()
            .map(|row| JsonAgent {
                agent_id: row.agent_id,
                paid_ms: row.paid.num_milliseconds(),
                segments: row.segment_count,
            })
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

/// Formats the human-readable report.
pub fn format_report(window: &Window, rows: &[AgentPaidTime]) -> String {
    let mut output = String::new();
    let _ = writeln!(
        output,
        "Paid time {} .. {}",
        format_instant(window.start()),
        format_instant(window.end())
    );

    if rows.is_empty() {
        let _ = writeln!(output, "No events in window.");
        return output;
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "{:<10} {:>10} {:>9}", "AGENT", "PAID", "SEGMENTS");
    for row in rows {
        let _ = writeln!(
            output,
            "{:<10} {:>10} {:>9}",
            row.agent_id.to_string(),
            format_duration(row.paid),
            row.segment_count
        );
    }

    let total = rows
        .iter()
        .fold(chrono::Duration::zero(), |total, row| total + row.paid);
    let _ = writeln!(output);
    let _ = writeln!(output, "{:<10} {:>10}", "TOTAL", format_duration(total));
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{DateTime, TimeZone, Utc};
    use insta::assert_snapshot;
    use pt_core::{Event, OverlapPolicy};

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2022, 7, 6, hour, minute, 0).unwrap()
    }

    fn ev(agent: i64, start: (u32, u32), end: (u32, u32), priority: i32, paid: bool) -> Event {
        Event::new(
            AgentId::new(agent),
            at(start.0, start.1),
            at(end.0, end.1),
            priority,
            paid,
        )
        .unwrap()
    }

    fn seeded_config(temp: &tempfile::TempDir) -> Config {
        let database_path = temp.path().join("pt.db");
        let mut db = Database::open(&database_path).unwrap();
        db.insert_events(&[
            ev(1, (8, 0), (8, 30), 1, true),
            ev(1, (8, 20), (9, 30), 2, false),
            ev(1, (9, 0), (9, 40), 3, true),
            ev(2, (9, 0), (17, 0), 1, true),
            ev(2, (12, 0), (13, 0), 2, false),
            // Ends after the window, so agent 3 has no row.
            ev(3, (16, 0), (19, 0), 1, true),
        ])
        .unwrap();
        Config {
            database_path,
            overlap_policy: OverlapPolicy::Reject,
        }
    }

    fn args(json: bool) -> ReportArgs {
        ReportArgs {
            window: WindowArgs {
                start: "2022-07-06T00:00:00Z".to_string(),
                end: "2022-07-06T18:00:00Z".to_string(),
            },
            json,
        }
    }

    #[test]
    fn test_report_lists_each_agent() {
        let temp = tempfile::tempdir().unwrap();
        let config = seeded_config(&temp);
        let mut output = Vec::new();

        run(&mut output, &args(false), &config).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_snapshot!(output, @r"
        Paid time 2022-07-06T00:00:00Z .. 2022-07-06T18:00:00Z

        AGENT            PAID  SEGMENTS
        1               1h 0m         3
        2               7h 0m         3

        TOTAL           8h 0m
        ");
    }

    #[test]
    fn test_report_json() {
        let temp = tempfile::tempdir().unwrap();
        let config = seeded_config(&temp);
        let mut output = Vec::new();

        run(&mut output, &args(true), &config).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_snapshot!(output, @r#"
        {
          "window_start": "2022-07-06T00:00:00Z",
          "window_end": "2022-07-06T18:00:00Z",
          "agents": [
            {
              "agent_id": 1,
              "paid_ms": 3600000,
              "segments": 3
            },
            {
              "agent_id": 2,
              "paid_ms": 25200000,
              "segments": 3
            }
          ]
        }
        "#);
    }

    #[test]
    fn test_report_empty_window() {
        let window = Window::new(at(0, 0), at(1, 0)).unwrap();
        let output = format_report(&window, &[]);
        assert_snapshot!(output, @r"
        Paid time 2022-07-06T00:00:00Z .. 2022-07-06T01:00:00Z
        No events in window.
        ");
    }
}
