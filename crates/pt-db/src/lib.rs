//! Storage layer for the paid-time resolver.
//!
//! Provides a `SQLite` event store that implements [`pt_core::EventSource`].
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! Use one `Database` per thread, or fetch events once and share the resulting
//! `Vec<Event>`; resolution itself never touches the database.
//!
//! # Schema
//!
//! ## Timestamp Format
//!
//! Timestamps are stored as TEXT in RFC 3339 UTC with nanosecond precision
//! (e.g., `2022-07-06T08:00:00.000000000Z`), so events read back are exactly
//! the events written. The fixed width keeps lexicographic ordering equal to
//! chronological ordering, so window filters run in SQL.
//!
//! ## Row Order
//!
//! Events are always returned in insertion order (`id` ascending). The
//! resolver breaks ties between equal priorities by input order, so this order
//! is part of the contract.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, params};
use thiserror::Error;

use pt_core::{AgentId, Event, EventSource, Window};

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Failed to parse a stored timestamp.
    #[error("invalid timestamp for event {event_id}: {timestamp}")]
    TimestampParse {
        event_id: i64,
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

/// An event row as stored, before timestamp parsing.
struct EventRow {
    id: i64,
    agent_id: i64,
    start_at: String,
    end_at: String,
    priority: i32,
    paid: bool,
}

impl EventRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            agent_id: row.get(1)?,
            start_at: row.get(2)?,
            end_at: row.get(3)?,
            priority: row.get(4)?,
            paid: row.get(5)?,
        })
    }

    fn into_event(self) -> Result<Event, DbError> {
        Ok(Event {
            agent_id: AgentId::new(self.agent_id),
            start: parse_timestamp(&self.start_at, self.id)?,
            end: parse_timestamp(&self.end_at, self.id)?,
            priority: self.priority,
            paid: self.paid,
        })
    }
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            -- Events table: one scheduled interval per row
            -- start_at/end_at: RFC 3339 UTC, nanosecond precision
            -- paid: 0 or 1
            CREATE TABLE IF NOT EXISTS events (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                agent_id INTEGER NOT NULL,
                start_at TEXT NOT NULL,
                end_at TEXT NOT NULL,
                priority INTEGER NOT NULL,
                paid INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_events_agent ON events(agent_id);
            CREATE INDEX IF NOT EXISTS idx_events_start ON events(start_at);
            ",
        )?;
        Ok(())
    }

    /// Inserts a batch of events in one transaction.
    pub fn insert_events(&mut self, events: &[Event]) -> Result<usize, DbError> {
        if events.is_empty() {
            return Ok(0);
        }
        let tx = self.conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "
                INSERT INTO events (agent_id, start_at, end_at, priority, paid)
                VALUES (?, ?, ?, ?, ?)
                ",
            )?;
            for event in events {
                inserted += stmt.execute(params![
                    event.agent_id.value(),
                    format_timestamp(event.start),
                    format_timestamp(event.end),
                    event.priority,
                    event.paid,
                ])?;
            }
        }
        tx.commit()?;
        tracing::debug!(inserted, "inserted events");
        Ok(inserted)
    }

    /// Lists all events in insertion order.
    pub fn list_events(&self) -> Result<Vec<Event>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, agent_id, start_at, end_at, priority, paid
            FROM events
            ORDER BY id ASC
            ",
        )?;
        let rows = stmt.query_map([], EventRow::from_row)?;
        collect_events(rows)
    }

    /// Lists one agent's events that lie fully inside `window`, in insertion order.
    pub fn list_events_for_agent(
        &self,
        agent_id: AgentId,
        window: &Window,
    ) -> Result<Vec<Event>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, agent_id, start_at, end_at, priority, paid
            FROM events
            WHERE agent_id = ? AND start_at >= ? AND end_at <= ?
            ORDER BY id ASC
            ",
        )?;
        let rows = stmt.query_map(
            params![
                agent_id.value(),
                format_timestamp(window.start()),
                format_timestamp(window.end()),
            ],
            EventRow::from_row,
        )?;
        collect_events(rows)
    }
}

impl EventSource for Database {
    type Error = DbError;

    fn fetch_all(&self) -> Result<Vec<Event>, Self::Error> {
        self.list_events()
    }

    fn fetch_for_agent(
        &self,
        agent_id: AgentId,
        window: &Window,
    ) -> Result<Vec<Event>, Self::Error> {
        self.list_events_for_agent(agent_id, window)
    }
}

fn collect_events(
    rows: impl Iterator<Item = rusqlite::Result<EventRow>>,
) -> Result<Vec<Event>, DbError> {
    let mut events = Vec::new();
    for row in rows {
        events.push(row?.into_event()?);
    }
    Ok(events)
}

fn parse_timestamp(timestamp: &str, event_id: i64) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| DbError::TimestampParse {
            event_id,
            timestamp: timestamp.to_string(),
            source,
        })
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true)
}
