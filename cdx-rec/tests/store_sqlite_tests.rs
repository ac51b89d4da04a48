//! SQLite event store integration tests
//!
//! Uses tempfile-backed databases; `flush` is the barrier between the
//! buffered writer and read queries.

use chrono::{Duration, Utc};
use tempfile::TempDir;
use uuid::Uuid;

use cdx_common::events::{Event, EventKind, TimeWindow, Variant};
use cdx_rec::store::{EventStore, SqliteEventStore};

async fn open_store(dir: &TempDir) -> SqliteEventStore {
    SqliteEventStore::open(&dir.path().join("events.db"))
        .await
        .expect("store should open")
}

#[tokio::test]
async fn test_round_trip_preserves_fields_and_order() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;
    let request_id = Uuid::new_v4();

    let impression = Event::impression(request_id, "sess-1", Variant::A, 42, 1);
    store.record(impression.clone()).await.unwrap();
    store
        .record(Event::click(request_id, "sess-1", Variant::A, 42, 1))
        .await
        .unwrap();
    store
        .record(Event::failure(Uuid::new_v4(), "sess-2", Variant::B))
        .await
        .unwrap();
    store.flush().await.unwrap();

    let events = store.events_for_session("sess-1").await.unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].kind, EventKind::Impression);
    assert_eq!(events[1].kind, EventKind::Click);

    let restored = &events[0];
    assert_eq!(restored.event_id, impression.event_id);
    assert_eq!(restored.request_id, request_id);
    assert_eq!(restored.session_id, "sess-1");
    assert_eq!(restored.variant, Variant::A);
    assert_eq!(restored.item_id, Some(42));
    assert_eq!(restored.position, Some(1));
    // Micros precision survives the round trip
    assert_eq!(
        restored.timestamp.timestamp_micros(),
        impression.timestamp.timestamp_micros()
    );

    let sess2_events = store.events_for_session("sess-2").await.unwrap();
    assert_eq!(sess2_events[0].kind, EventKind::Failure);
    assert_eq!(sess2_events[0].item_id, None);
    assert_eq!(sess2_events[0].position, None);
}

#[tokio::test]
async fn test_aggregation_matches_memory_semantics() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;
    let request_id = Uuid::new_v4();

    for position in 1..=10 {
        store
            .record(Event::impression(request_id, "sess-1", Variant::A, position, position))
            .await
            .unwrap();
    }
    for item in [1, 2, 3] {
        store
            .record(Event::click(request_id, "sess-1", Variant::A, item, item))
            .await
            .unwrap();
    }
    store.flush().await.unwrap();

    let stats = store.aggregate_by_variant(TimeWindow::all()).await.unwrap();
    let a = &stats[&Variant::A];
    assert_eq!(a.impressions, 10);
    assert_eq!(a.clicks, 3);
    assert_eq!(a.ctr, 0.3);
    assert_eq!(stats[&Variant::B].ctr, 0.0);
}

#[tokio::test]
async fn test_window_filtering() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    store
        .record(Event::impression(Uuid::new_v4(), "sess-1", Variant::A, 1, 1))
        .await
        .unwrap();
    store.flush().await.unwrap();

    let now = Utc::now();
    assert_eq!(store.events_in(TimeWindow::all()).await.unwrap().len(), 1);
    assert_eq!(
        store
            .events_in(TimeWindow::last_days(now, 1))
            .await
            .unwrap()
            .len(),
        1
    );

    let stale = TimeWindow {
        since: None,
        until: Some(now - Duration::days(1)),
    };
    assert!(store.events_in(stale).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_prune_before_removes_expired_rows() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    store
        .record(Event::impression(Uuid::new_v4(), "sess-1", Variant::A, 1, 1))
        .await
        .unwrap();
    store
        .record(Event::impression(Uuid::new_v4(), "sess-1", Variant::A, 2, 2))
        .await
        .unwrap();
    store.flush().await.unwrap();

    // Nothing is older than yesterday
    let removed = store
        .prune_before(Utc::now() - Duration::days(1))
        .await
        .unwrap();
    assert_eq!(removed, 0);

    // Everything is older than a minute from now
    let removed = store
        .prune_before(Utc::now() + Duration::minutes(1))
        .await
        .unwrap();
    assert_eq!(removed, 2);
    assert!(store.events_in(TimeWindow::all()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_events_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let request_id = Uuid::new_v4();

    {
        let store = open_store(&dir).await;
        store
            .record(Event::impression(request_id, "sess-1", Variant::B, 9, 1))
            .await
            .unwrap();
        store.flush().await.unwrap();
    }

    let reopened = open_store(&dir).await;
    let events = reopened.events_for_session("sess-1").await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].request_id, request_id);
    assert_eq!(events[0].variant, Variant::B);
}
