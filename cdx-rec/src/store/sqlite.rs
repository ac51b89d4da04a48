//! SQLite-backed event store
//!
//! Durable backend using a WAL-mode pool. Appends are buffered through an
//! unbounded channel to a background writer task, so `record` returns
//! without touching the disk; `flush` is the barrier that waits for the
//! writer to drain. Aggregation reads query the pool directly and may
//! observe a snapshot that trails unflushed appends slightly.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info};
use uuid::Uuid;

use cdx_common::events::{Event, EventKind, TimeWindow, Variant};

use super::EventStore;
use crate::{Error, Result};

enum WriterMsg {
    Append(Box<Event>),
    Flush(oneshot::Sender<()>),
}

pub struct SqliteEventStore {
    pool: Pool<Sqlite>,
    tx: mpsc::UnboundedSender<WriterMsg>,
}

impl SqliteEventStore {
    /// Open (creating if needed) the event database at `db_path` and spawn
    /// the background writer
    pub async fn open(db_path: &Path) -> Result<Self> {
        let newly_created = !db_path.exists();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
        let pool = SqlitePoolOptions::new()
            .max_connections(10)
            .connect(&db_url)
            .await?;

        if newly_created {
            info!("Initialized new event database: {}", db_path.display());
        } else {
            info!("Opened existing event database: {}", db_path.display());
        }

        // WAL allows concurrent readers while the writer task appends
        sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;
        sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

        create_events_table(&pool).await?;

        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(writer_task(pool.clone(), rx));

        Ok(Self { pool, tx })
    }

    /// Retention sweep: delete events older than `cutoff`. Operator
    /// maintenance on the durable backend; returns deleted row count.
    pub async fn prune_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM events WHERE timestamp < ?")
            .bind(encode_timestamp(cutoff))
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl EventStore for SqliteEventStore {
    async fn record(&self, event: Event) -> Result<()> {
        self.tx
            .send(WriterMsg::Append(Box::new(event)))
            .map_err(|_| Error::Internal("event writer task is gone".to_string()))
    }

    async fn flush(&self) -> Result<()> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.tx
            .send(WriterMsg::Flush(ack_tx))
            .map_err(|_| Error::Internal("event writer task is gone".to_string()))?;
        ack_rx
            .await
            .map_err(|_| Error::Internal("event writer task dropped flush ack".to_string()))
    }

    async fn events_for_session(&self, session_id: &str) -> Result<Vec<Event>> {
        let rows: Vec<EventRow> = sqlx::query_as(
            "SELECT event_id, kind, request_id, session_id, variant, item_id, position, timestamp
             FROM events WHERE session_id = ? ORDER BY id",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(decode_row).collect()
    }

    async fn events_in(&self, window: TimeWindow) -> Result<Vec<Event>> {
        let since = window.since.map(encode_timestamp);
        let until = window.until.map(encode_timestamp);
        let rows: Vec<EventRow> = sqlx::query_as(
            "SELECT event_id, kind, request_id, session_id, variant, item_id, position, timestamp
             FROM events
             WHERE (?1 IS NULL OR timestamp >= ?1)
               AND (?2 IS NULL OR timestamp <= ?2)
             ORDER BY id",
        )
        .bind(since)
        .bind(until)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(decode_row).collect()
    }
}

async fn create_events_table(pool: &Pool<Sqlite>) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            event_id TEXT NOT NULL UNIQUE,
            kind TEXT NOT NULL,
            request_id TEXT NOT NULL,
            session_id TEXT NOT NULL,
            variant TEXT NOT NULL,
            item_id INTEGER,
            position INTEGER,
            timestamp TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_events_session ON events(session_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_events_variant ON events(variant)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_events_timestamp ON events(timestamp)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Drains appends sequentially so each insert is atomic and append order is
/// preserved; a flush ack is sent only after every prior append completed
async fn writer_task(pool: Pool<Sqlite>, mut rx: mpsc::UnboundedReceiver<WriterMsg>) {
    while let Some(msg) = rx.recv().await {
        match msg {
            WriterMsg::Append(event) => {
                if let Err(e) = insert_event(&pool, &event).await {
                    error!("Failed to persist event {}: {e}", event.event_id);
                }
            }
            WriterMsg::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }
}

async fn insert_event(pool: &Pool<Sqlite>, event: &Event) -> Result<()> {
    sqlx::query(
        "INSERT INTO events (event_id, kind, request_id, session_id, variant, item_id, position, timestamp)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(event.event_id.to_string())
    .bind(event.kind.as_str())
    .bind(event.request_id.to_string())
    .bind(&event.session_id)
    .bind(event.variant.as_str())
    .bind(event.item_id.map(i64::from))
    .bind(event.position.map(i64::from))
    .bind(encode_timestamp(event.timestamp))
    .execute(pool)
    .await?;
    Ok(())
}

type EventRow = (
    String,
    String,
    String,
    String,
    String,
    Option<i64>,
    Option<i64>,
    String,
);

fn decode_row(row: EventRow) -> Result<Event> {
    let (event_id, kind, request_id, session_id, variant, item_id, position, timestamp) = row;
    Ok(Event {
        event_id: parse_uuid(&event_id)?,
        kind: EventKind::from_str(&kind).map_err(|e| Error::Internal(e.to_string()))?,
        request_id: parse_uuid(&request_id)?,
        session_id,
        variant: Variant::from_str(&variant).map_err(|e| Error::Internal(e.to_string()))?,
        item_id: item_id.map(|v| v as u32),
        position: position.map(|v| v as u32),
        timestamp: DateTime::parse_from_rfc3339(&timestamp)
            .map_err(|e| Error::Internal(format!("bad event timestamp: {e}")))?
            .with_timezone(&Utc),
    })
}

fn parse_uuid(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| Error::Internal(format!("bad uuid in event row: {e}")))
}

/// Fixed-width UTC encoding so lexicographic order in SQL matches
/// chronological order
fn encode_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}
