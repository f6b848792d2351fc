//! Import command for loading events into the local `SQLite` store.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};

use pt_core::Event;
use pt_db::Database;

use crate::Config;

/// Reads JSONL events from `reader` and stores them.
///
/// The whole batch is rejected if any line is invalid.
pub fn run<R: BufRead, W: Write>(reader: R, writer: &mut W, config: &Config) -> Result<usize> {
    let events = parse_events(reader)?;

    let mut db = Database::open(&config.database_path)
        .with_context(|| format!("failed to open {}", config.database_path.display()))?;
    let inserted = db.insert_events(&events)?;
    writeln!(writer, "Imported {inserted} events")?;
    Ok(inserted)
}

fn parse_events<R: BufRead>(reader: R) -> Result<Vec<Event>> {
    let mut events = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read line {}", idx + 1))?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let event: Event = serde_json::from_str(trimmed)
            .with_context(|| format!("invalid JSON on line {}", idx + 1))?;
        event
            .validate()
            .with_context(|| format!("invalid event on line {}", idx + 1))?;
        events.push(event);
    }
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    use insta::assert_snapshot;
    use pt_core::AgentId;

    const INPUT: &str = r#"{"agent_id":1,"start":"2022-07-06T08:00:00Z","end":"2022-07-06T08:30:00Z","priority":1,"paid":true}

{"agent_id":1,"start":"2022-07-06T08:20:00Z","end":"2022-07-06T09:30:00Z","priority":2,"paid":false}
"#;

    #[test]
    fn parse_events_skips_blank_lines() {
        let events = parse_events(Cursor::new(INPUT)).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].agent_id, AgentId::new(1));
        assert!(!events[1].paid);
    }

    #[test]
    fn parse_events_rejects_inverted_interval() {
        let input = r#"{"agent_id":1,"start":"2022-07-06T09:00:00Z","end":"2022-07-06T08:00:00Z","priority":1,"paid":true}"#;
        let err = parse_events(Cursor::new(input)).unwrap_err();
        assert!(err.to_string().contains("invalid event on line 1"));
    }

    #[test]
    fn parse_events_reports_bad_json_line() {
        let input = format!("{INPUT}not json\n");
        let err = parse_events(Cursor::new(input)).unwrap_err();
        assert!(err.to_string().contains("invalid JSON on line 4"));
    }

    #[test]
    fn import_stores_events() {
        let temp = tempfile::tempdir().unwrap();
        let config = Config {
            database_path: temp.path().join("pt.db"),
            overlap_policy: pt_core::OverlapPolicy::Reject,
        };
        let mut output = Vec::new();

        let inserted = run(Cursor::new(INPUT), &mut output, &config).unwrap();
        assert_eq!(inserted, 2);

        let db = Database::open(&config.database_path).unwrap();
        assert_eq!(db.list_events().unwrap().len(), 2);

        let output = String::from_utf8(output).unwrap();
        assert_snapshot!(output, @"Imported 2 events");
    }
}
