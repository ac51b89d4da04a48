//! Recommendation orchestrator
//!
//! Composes the full pipeline for one search call: voice normalization →
//! query interpretation → experiment assignment → strategy ranking → result
//! assembly → impression logging. Also the engine's surface toward the
//! transport and dashboard collaborators: click tracking, aggregation
//! passthroughs, the live event bus, and the last-query debug snapshot.
//!
//! Catalog and similarity index are built once and shared read-only; the
//! event store is the only mutable shared resource.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use cdx_common::api::{
    ClickRequest, ClickResponse, RankedEntry, RecommendationResult, SearchRequest, SearchResponse,
};
use cdx_common::catalog::Catalog;
use cdx_common::events::{CdxEvent, Event, EventBus, TimeWindow, Variant};
use cdx_common::intent::QueryIntent;

use crate::assign::ExperimentSplit;
use crate::config::RecConfig;
use crate::error::{Error, Result};
use crate::query::QueryInterpreter;
use crate::rank::{PopularityStrategy, RankStrategy, SimilarityStrategy, TfidfIndex};
use crate::store::{AnalyticsSummary, EventStore, VariantStats};
use crate::voice::VoiceNormalizer;

/// Diagnostic snapshot of the most recent search call
#[derive(Debug, Clone, serde::Serialize)]
pub struct DebugSnapshot {
    pub raw_query: String,
    pub intent: QueryIntent,
    pub variant: Variant,
    pub result_count: usize,
    pub processing_time_ms: f64,
    pub timestamp: DateTime<Utc>,
}

/// The recommendation engine, generic over its event store backend
pub struct RecEngine<S: EventStore> {
    catalog: Arc<Catalog>,
    config: RecConfig,
    normalizer: VoiceNormalizer,
    interpreter: QueryInterpreter,
    split: ExperimentSplit,
    popularity: PopularityStrategy,
    similarity: SimilarityStrategy,
    store: S,
    bus: EventBus,
    last_query: RwLock<Option<DebugSnapshot>>,
}

impl<S: EventStore> RecEngine<S> {
    /// Build the engine: validates config, constructs the similarity index
    /// from the catalog, and wires both strategies
    pub fn new(catalog: Arc<Catalog>, config: RecConfig, store: S) -> Result<Self> {
        config.validate()?;
        let index = Arc::new(TfidfIndex::build(&catalog));
        info!(
            "Built similarity index: {} documents, {} terms",
            index.doc_count(),
            index.vocab_size()
        );
        let split = ExperimentSplit::new(config.split_basis_points)?;

        Ok(Self {
            normalizer: VoiceNormalizer::new(),
            interpreter: QueryInterpreter::new(config.recent_min_year),
            popularity: PopularityStrategy::new(&config),
            similarity: SimilarityStrategy::new(index, &config),
            bus: EventBus::new(config.event_bus_capacity),
            last_query: RwLock::new(None),
            catalog,
            config,
            split,
            store,
        })
    }

    fn strategy_for(&self, variant: Variant) -> &dyn RankStrategy {
        match variant {
            Variant::A => &self.popularity,
            Variant::B => &self.similarity,
        }
    }

    /// Run one search call end to end
    ///
    /// With `fail` set, the call completes interpretation, records a single
    /// failure event (so the request stays observable), and returns the
    /// injected failure *without* logging any impression.
    pub async fn search(&self, request: SearchRequest) -> Result<SearchResponse> {
        let started = Instant::now();

        let normalized = self.normalizer.normalize(&request.query, request.origin);
        let intent = self
            .interpreter
            .interpret(&normalized, &request.query, request.origin);
        let variant = self.split.assign(&request.session_id);
        let request_id = Uuid::new_v4();

        if request.fail {
            warn!(
                "Injected failure for request {request_id} (session {})",
                request.session_id
            );
            self.store
                .record(Event::failure(request_id, request.session_id.clone(), variant))
                .await?;
            self.bus.emit_lossy(CdxEvent::SearchFailed {
                request_id,
                session_id: request.session_id.clone(),
                variant,
                timestamp: Utc::now(),
            });
            self.snapshot(&request.query, intent, variant, 0, started).await;
            return Err(Error::InjectedFailure { request_id });
        }

        let ranked = self.strategy_for(variant).rank(&self.catalog, &intent);
        let entries: Vec<RankedEntry> = ranked
            .iter()
            .enumerate()
            .map(|(i, scored)| RankedEntry {
                item_id: scored.item_id,
                position: (i + 1) as u32,
                score: scored.score,
            })
            .collect();

        // One impression per shown item, reconstructable per-position
        for entry in &entries {
            self.store
                .record(Event::impression(
                    request_id,
                    request.session_id.clone(),
                    variant,
                    entry.item_id,
                    entry.position,
                ))
                .await?;
        }

        self.bus.emit_lossy(CdxEvent::SearchCompleted {
            request_id,
            session_id: request.session_id.clone(),
            variant,
            result_count: entries.len(),
            timestamp: Utc::now(),
        });

        debug!(
            "Search {request_id}: variant {variant}, {} results for {:?}",
            entries.len(),
            request.query
        );

        let processing_time_ms = self
            .snapshot(&request.query, intent.clone(), variant, entries.len(), started)
            .await;

        let total_results = entries.len();
        Ok(SearchResponse {
            result: RecommendationResult {
                request_id,
                variant,
                entries,
            },
            session_id: request.session_id,
            intent,
            total_results,
            processing_time_ms,
        })
    }

    /// Record a click on a previously returned item
    ///
    /// A click referencing an unknown request_id is still accepted; it
    /// surfaces as orphaned in aggregation.
    pub async fn click(&self, request: ClickRequest) -> Result<ClickResponse> {
        self.store
            .record(Event::click(
                request.request_id,
                request.session_id.clone(),
                request.variant,
                request.item_id,
                request.position,
            ))
            .await?;

        self.bus.emit_lossy(CdxEvent::ClickTracked {
            request_id: request.request_id,
            session_id: request.session_id,
            variant: request.variant,
            item_id: request.item_id,
            position: request.position,
            timestamp: Utc::now(),
        });

        debug!(
            "Click on item {} (position {}) for request {}",
            request.item_id, request.position, request.request_id
        );
        Ok(ClickResponse { accepted: true })
    }

    /// Per-variant funnel metrics over a window
    pub async fn aggregate_by_variant(
        &self,
        window: TimeWindow,
    ) -> Result<BTreeMap<Variant, VariantStats>> {
        self.store.aggregate_by_variant(window).await
    }

    /// Ordered event timeline for one session
    pub async fn session_events(&self, session_id: &str) -> Result<Vec<Event>> {
        self.store.events_for_session(session_id).await
    }

    /// Cross-variant summary over a window
    pub async fn analytics_summary(&self, window: TimeWindow) -> Result<AnalyticsSummary> {
        self.store.analytics_summary(window).await
    }

    /// Debug hook: the most recent call's intent and variant
    pub async fn debug_snapshot(&self) -> Option<DebugSnapshot> {
        self.last_query.read().await.clone()
    }

    /// Subscribe to live engine events (SSE/dashboard collaborators)
    pub fn subscribe(&self) -> broadcast::Receiver<CdxEvent> {
        self.bus.subscribe()
    }

    /// Variant a session is (and will stay) assigned to
    pub fn assign(&self, session_id: &str) -> Variant {
        self.split.assign(session_id)
    }

    /// Barrier: wait until all recorded events are readable
    pub async fn flush_events(&self) -> Result<()> {
        self.store.flush().await
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &RecConfig {
        &self.config
    }

    async fn snapshot(
        &self,
        raw_query: &str,
        intent: QueryIntent,
        variant: Variant,
        result_count: usize,
        started: Instant,
    ) -> f64 {
        let processing_time_ms = started.elapsed().as_secs_f64() * 1000.0;
        *self.last_query.write().await = Some(DebugSnapshot {
            raw_query: raw_query.to_string(),
            intent,
            variant,
            result_count,
            processing_time_ms,
            timestamp: Utc::now(),
        });
        processing_time_ms
    }
}
