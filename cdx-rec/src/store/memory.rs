//! In-memory event store
//!
//! Appends go straight into a `RwLock<Vec<_>>`; reads clone matching events.
//! Used by tests and embedded callers that do not need durability.

use async_trait::async_trait;
use cdx_common::events::{Event, TimeWindow};
use tokio::sync::RwLock;

use super::EventStore;
use crate::Result;

#[derive(Debug, Default)]
pub struct MemoryEventStore {
    events: RwLock<Vec<Event>>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of events recorded so far
    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn record(&self, event: Event) -> Result<()> {
        self.events.write().await.push(event);
        Ok(())
    }

    async fn flush(&self) -> Result<()> {
        // Appends are immediately visible
        Ok(())
    }

    async fn events_for_session(&self, session_id: &str) -> Result<Vec<Event>> {
        Ok(self
            .events
            .read()
            .await
            .iter()
            .filter(|e| e.session_id == session_id)
            .cloned()
            .collect())
    }

    async fn events_in(&self, window: TimeWindow) -> Result<Vec<Event>> {
        Ok(self
            .events
            .read()
            .await
            .iter()
            .filter(|e| window.contains(e.timestamp))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cdx_common::events::Variant;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_append_and_session_read_preserve_order() {
        let store = MemoryEventStore::new();
        let request_id = Uuid::new_v4();

        store
            .record(Event::impression(request_id, "sess-1", Variant::A, 1, 1))
            .await
            .unwrap();
        store
            .record(Event::click(request_id, "sess-1", Variant::A, 1, 1))
            .await
            .unwrap();
        store
            .record(Event::impression(Uuid::new_v4(), "sess-2", Variant::B, 2, 1))
            .await
            .unwrap();
        store.flush().await.unwrap();

        let events = store.events_for_session("sess-1").await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, cdx_common::events::EventKind::Impression);
        assert_eq!(events[1].kind, cdx_common::events::EventKind::Click);
        assert_eq!(events[0].request_id, events[1].request_id);
        assert_eq!(store.len().await, 3);
    }

    #[tokio::test]
    async fn test_window_filter() {
        let store = MemoryEventStore::new();
        store
            .record(Event::impression(Uuid::new_v4(), "sess-1", Variant::A, 1, 1))
            .await
            .unwrap();

        let all = store.events_in(TimeWindow::all()).await.unwrap();
        assert_eq!(all.len(), 1);

        let past = TimeWindow {
            since: None,
            until: Some(chrono::Utc::now() - chrono::Duration::days(1)),
        };
        assert!(store.events_in(past).await.unwrap().is_empty());
    }
}
