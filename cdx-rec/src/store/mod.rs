//! Append-only event store
//!
//! The store is the only mutable shared resource in the engine. It supports
//! insert and read/aggregate, never update or delete; per-session ordering
//! is append order. Aggregation runs over fetched events in shared code
//! here, so every backend reports identical numbers.
//!
//! Two backends ship: [`MemoryEventStore`] for tests and embedding, and
//! [`SqliteEventStore`] with buffered background writes for durability.

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use cdx_common::events::{Event, EventKind, TimeWindow, Variant};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use uuid::Uuid;

use crate::Result;

pub use memory::MemoryEventStore;
pub use sqlite::SqliteEventStore;

/// How many items `AnalyticsSummary::top_clicked` reports
const TOP_CLICKED_LIMIT: usize = 5;

/// Funnel counters for one variant
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct VariantStats {
    pub impressions: u64,
    /// Clicks whose request_id has a matching impression
    pub clicks: u64,
    /// Clicks referencing an unknown request_id: accepted, never silently
    /// counted into `clicks`
    pub orphaned_clicks: u64,
    /// Injected-failure events
    pub failures: u64,
    /// clicks / impressions; 0.0 when there are no impressions
    pub ctr: f64,
}

/// Click count for one item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ItemClicks {
    pub item_id: u32,
    pub clicks: u64,
}

/// Cross-variant funnel summary for a time window
#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsSummary {
    pub total_sessions: u64,
    pub total_impressions: u64,
    pub total_clicks: u64,
    pub ctr: f64,
    pub variants: BTreeMap<Variant, VariantStats>,
    /// Most-clicked items, click count descending, id ascending on ties
    pub top_clicked: Vec<ItemClicks>,
}

/// Abstract append-only event store with aggregation
///
/// `record` must not block on aggregation or perform inline disk I/O on the
/// hot path; `flush` is the barrier that makes previously recorded events
/// readable (aggregation reads may otherwise observe a slightly stale
/// snapshot, which is acceptable on this analytics path).
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Append one event
    async fn record(&self, event: Event) -> Result<()>;

    /// Resolve once every previously recorded event is readable
    async fn flush(&self) -> Result<()>;

    /// All events for one session, append order
    async fn events_for_session(&self, session_id: &str) -> Result<Vec<Event>>;

    /// All events in a window, append order
    async fn events_in(&self, window: TimeWindow) -> Result<Vec<Event>>;

    /// Per-variant funnel metrics over a window
    async fn aggregate_by_variant(
        &self,
        window: TimeWindow,
    ) -> Result<BTreeMap<Variant, VariantStats>> {
        Ok(variant_stats(&self.events_in(window).await?))
    }

    /// Cross-variant summary over a window
    async fn analytics_summary(&self, window: TimeWindow) -> Result<AnalyticsSummary> {
        Ok(summarize(&self.events_in(window).await?))
    }
}

#[async_trait]
impl<T: EventStore + ?Sized> EventStore for Box<T> {
    async fn record(&self, event: Event) -> Result<()> {
        (**self).record(event).await
    }

    async fn flush(&self) -> Result<()> {
        (**self).flush().await
    }

    async fn events_for_session(&self, session_id: &str) -> Result<Vec<Event>> {
        (**self).events_for_session(session_id).await
    }

    async fn events_in(&self, window: TimeWindow) -> Result<Vec<Event>> {
        (**self).events_in(window).await
    }
}

/// Compute per-variant funnel counters. Both variants are always present in
/// the output so a variant with zero traffic reports ctr 0.0 rather than
/// being absent.
pub fn variant_stats(events: &[Event]) -> BTreeMap<Variant, VariantStats> {
    let impressed_requests: HashSet<Uuid> = events
        .iter()
        .filter(|e| e.kind == EventKind::Impression)
        .map(|e| e.request_id)
        .collect();

    let mut stats: BTreeMap<Variant, VariantStats> = BTreeMap::new();
    stats.insert(Variant::A, VariantStats::default());
    stats.insert(Variant::B, VariantStats::default());

    for event in events {
        let entry = stats.entry(event.variant).or_default();
        match event.kind {
            EventKind::Impression => entry.impressions += 1,
            EventKind::Click => {
                if impressed_requests.contains(&event.request_id) {
                    entry.clicks += 1;
                } else {
                    entry.orphaned_clicks += 1;
                }
            }
            EventKind::Failure => entry.failures += 1,
        }
    }

    for entry in stats.values_mut() {
        entry.ctr = ctr(entry.impressions, entry.clicks);
    }
    stats
}

/// Cross-variant summary over a set of events
pub fn summarize(events: &[Event]) -> AnalyticsSummary {
    let variants = variant_stats(events);
    let total_impressions: u64 = variants.values().map(|s| s.impressions).sum();
    let total_clicks: u64 = variants.values().map(|s| s.clicks).sum();

    let sessions: HashSet<&str> = events.iter().map(|e| e.session_id.as_str()).collect();

    let mut click_counts: HashMap<u32, u64> = HashMap::new();
    for event in events {
        if event.kind == EventKind::Click {
            if let Some(item_id) = event.item_id {
                *click_counts.entry(item_id).or_insert(0) += 1;
            }
        }
    }
    let mut top_clicked: Vec<ItemClicks> = click_counts
        .into_iter()
        .map(|(item_id, clicks)| ItemClicks { item_id, clicks })
        .collect();
    top_clicked.sort_by(|a, b| b.clicks.cmp(&a.clicks).then_with(|| a.item_id.cmp(&b.item_id)));
    top_clicked.truncate(TOP_CLICKED_LIMIT);

    AnalyticsSummary {
        total_sessions: sessions.len() as u64,
        total_impressions,
        total_clicks,
        ctr: ctr(total_impressions, total_clicks),
        variants,
        top_clicked,
    }
}

/// clicks / impressions, defined as 0.0 when impressions = 0
fn ctr(impressions: u64, clicks: u64) -> f64 {
    if impressions == 0 {
        0.0
    } else {
        clicks as f64 / impressions as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ctr_with_zero_impressions() {
        assert_eq!(ctr(0, 0), 0.0);
        assert_eq!(ctr(0, 5), 0.0);
        assert_eq!(ctr(10, 3), 0.3);
    }

    #[test]
    fn test_variant_stats_ctr_property() {
        // 10 impressions + 3 clicks for A, nothing for B
        let request_id = Uuid::new_v4();
        let mut events = Vec::new();
        for position in 1..=10 {
            events.push(Event::impression(
                request_id,
                "sess-1",
                Variant::A,
                position,
                position,
            ));
        }
        for item in [1, 2, 3] {
            events.push(Event::click(request_id, "sess-1", Variant::A, item, item));
        }

        let stats = variant_stats(&events);
        let a = &stats[&Variant::A];
        assert_eq!(a.impressions, 10);
        assert_eq!(a.clicks, 3);
        assert_eq!(a.ctr, 0.3);

        let b = &stats[&Variant::B];
        assert_eq!(b.impressions, 0);
        assert_eq!(b.ctr, 0.0);
    }

    #[test]
    fn test_orphaned_clicks_flagged_not_counted() {
        let known = Uuid::new_v4();
        let unknown = Uuid::new_v4();
        let events = vec![
            Event::impression(known, "sess-1", Variant::A, 1, 1),
            Event::click(known, "sess-1", Variant::A, 1, 1),
            Event::click(unknown, "sess-1", Variant::A, 9, 1),
        ];
        let stats = variant_stats(&events);
        let a = &stats[&Variant::A];
        assert_eq!(a.clicks, 1);
        assert_eq!(a.orphaned_clicks, 1);
        assert_eq!(a.ctr, 1.0);
    }

    #[test]
    fn test_failures_never_count_as_impressions() {
        let events = vec![Event::failure(Uuid::new_v4(), "sess-1", Variant::B)];
        let stats = variant_stats(&events);
        let b = &stats[&Variant::B];
        assert_eq!(b.impressions, 0);
        assert_eq!(b.failures, 1);
        assert_eq!(b.ctr, 0.0);
    }

    #[test]
    fn test_summary_counts_sessions_and_top_clicks() {
        let r1 = Uuid::new_v4();
        let r2 = Uuid::new_v4();
        let events = vec![
            Event::impression(r1, "sess-1", Variant::A, 7, 1),
            Event::impression(r1, "sess-1", Variant::A, 8, 2),
            Event::click(r1, "sess-1", Variant::A, 7, 1),
            Event::impression(r2, "sess-2", Variant::B, 7, 1),
            Event::click(r2, "sess-2", Variant::B, 7, 1),
        ];
        let summary = summarize(&events);
        assert_eq!(summary.total_sessions, 2);
        assert_eq!(summary.total_impressions, 3);
        assert_eq!(summary.total_clicks, 2);
        assert_eq!(summary.top_clicked[0], ItemClicks { item_id: 7, clicks: 2 });
    }
}
