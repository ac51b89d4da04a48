//! Event types for the CDX event system
//!
//! Two event surfaces share this module:
//! - [`Event`] — the persisted, append-only funnel record (impressions,
//!   clicks, injected failures) written to an event store.
//! - [`CdxEvent`] + [`EventBus`] — live in-process fan-out for SSE/dashboard
//!   collaborators, broadcast via `tokio::broadcast`. Lossy by design: no
//!   subscriber is not an error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Experiment variant: one of the two competing ranking strategies
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Variant {
    /// Strategy A: popularity + rule boosts
    A,
    /// Strategy B: content similarity
    B,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::A => "A",
            Variant::B => "B",
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Variant {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" | "a" => Ok(Variant::A),
            "B" | "b" => Ok(Variant::B),
            other => Err(crate::Error::InvalidInput(format!(
                "unknown variant: {other}"
            ))),
        }
    }
}

/// Kind of a persisted funnel event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// An item was shown to a user as part of a result set
    Impression,
    /// A user clicked a previously shown item
    Click,
    /// A search call failed server-side (fault injection path); recorded so
    /// failed requests stay observable without ever counting as impressions
    Failure,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Impression => "impression",
            EventKind::Click => "click",
            EventKind::Failure => "failure",
        }
    }
}

impl std::str::FromStr for EventKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "impression" => Ok(EventKind::Impression),
            "click" => Ok(EventKind::Click),
            "failure" => Ok(EventKind::Failure),
            other => Err(crate::Error::InvalidInput(format!(
                "unknown event kind: {other}"
            ))),
        }
    }
}

/// Append-only funnel record
///
/// Immutable once appended; the store supports insert and read/aggregate
/// only. Per-session ordering is append order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub event_id: Uuid,
    pub kind: EventKind,
    /// Correlates impressions, clicks, and failures of one search call
    pub request_id: Uuid,
    pub session_id: String,
    pub variant: Variant,
    /// Present for impression/click events, absent for failures
    pub item_id: Option<u32>,
    /// 1-based rank position, present for impression/click events
    pub position: Option<u32>,
    pub timestamp: DateTime<Utc>,
}

impl Event {
    /// One shown item at one rank position
    pub fn impression(
        request_id: Uuid,
        session_id: impl Into<String>,
        variant: Variant,
        item_id: u32,
        position: u32,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            kind: EventKind::Impression,
            request_id,
            session_id: session_id.into(),
            variant,
            item_id: Some(item_id),
            position: Some(position),
            timestamp: Utc::now(),
        }
    }

    /// A click on a previously shown item
    pub fn click(
        request_id: Uuid,
        session_id: impl Into<String>,
        variant: Variant,
        item_id: u32,
        position: u32,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            kind: EventKind::Click,
            request_id,
            session_id: session_id.into(),
            variant,
            item_id: Some(item_id),
            position: Some(position),
            timestamp: Utc::now(),
        }
    }

    /// A server-side failure of one search call
    pub fn failure(request_id: Uuid, session_id: impl Into<String>, variant: Variant) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            kind: EventKind::Failure,
            request_id,
            session_id: session_id.into(),
            variant,
            item_id: None,
            position: None,
            timestamp: Utc::now(),
        }
    }
}

/// Half-open aggregation window over event timestamps
///
/// `None` bounds mean unbounded on that side.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TimeWindow {
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl TimeWindow {
    /// Unbounded window: every event qualifies
    pub fn all() -> Self {
        Self::default()
    }

    /// The trailing `days` days ending at `now`
    pub fn last_days(now: DateTime<Utc>, days: i64) -> Self {
        Self {
            since: Some(now - chrono::Duration::days(days)),
            until: Some(now),
        }
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        if let Some(since) = self.since {
            if ts < since {
                return false;
            }
        }
        if let Some(until) = self.until {
            if ts > until {
                return false;
            }
        }
        true
    }
}

/// Live events broadcast to in-process subscribers (SSE, dashboard)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CdxEvent {
    /// A search call completed and its impressions were queued for logging
    SearchCompleted {
        request_id: Uuid,
        session_id: String,
        variant: Variant,
        result_count: usize,
        timestamp: DateTime<Utc>,
    },
    /// A click was recorded
    ClickTracked {
        request_id: Uuid,
        session_id: String,
        variant: Variant,
        item_id: u32,
        position: u32,
        timestamp: DateTime<Utc>,
    },
    /// A search call failed server-side
    SearchFailed {
        request_id: Uuid,
        session_id: String,
        variant: Variant,
        timestamp: DateTime<Utc>,
    },
}

impl CdxEvent {
    /// Get event type as string for filtering
    pub fn event_type(&self) -> &'static str {
        match self {
            CdxEvent::SearchCompleted { .. } => "SearchCompleted",
            CdxEvent::ClickTracked { .. } => "ClickTracked",
            CdxEvent::SearchFailed { .. } => "SearchFailed",
        }
    }
}

/// Central event distribution bus for live CDX events
///
/// Backed by `tokio::broadcast`: non-blocking publish, multiple concurrent
/// subscribers, automatic cleanup when subscribers drop.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<CdxEvent>,
    capacity: usize,
}

impl EventBus {
    /// Create a bus buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<CdxEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    pub fn emit(
        &self,
        event: CdxEvent,
    ) -> Result<usize, broadcast::error::SendError<CdxEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: CdxEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
