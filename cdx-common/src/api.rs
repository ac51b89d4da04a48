//! Shared API request/response types
//!
//! The vocabulary exchanged between the recommendation engine and its
//! out-of-scope collaborators (HTTP transport, dashboard). Kept in the
//! common crate so both sides of the seam share one definition.

use crate::events::Variant;
use crate::intent::{QueryIntent, QueryOrigin};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One ranked entry of a recommendation result
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub item_id: u32,
    /// 1-based rank position
    pub position: u32,
    pub score: f64,
}

/// The immutable outcome of one search call
///
/// Created once per call, logged as impressions immediately, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResult {
    /// Unique per search call
    pub request_id: Uuid,
    /// Strategy that produced the ranking
    pub variant: Variant,
    pub entries: Vec<RankedEntry>,
}

/// Search call input, as supplied by the transport layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub session_id: String,
    pub query: String,
    #[serde(default)]
    pub origin: QueryOrigin,
    /// Fault injection: simulate a downstream failure after interpretation
    #[serde(default)]
    pub fail: bool,
}

/// Search call output, consumed by the transport layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub result: RecommendationResult,
    pub session_id: String,
    /// Parsed intent, echoed back for transparency/debugging
    pub intent: QueryIntent,
    pub total_results: usize,
    pub processing_time_ms: f64,
}

/// Click tracking input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClickRequest {
    /// The search call whose result was clicked
    pub request_id: Uuid,
    pub session_id: String,
    pub item_id: u32,
    /// 1-based position the item held in the result list
    pub position: u32,
    pub variant: Variant,
}

/// Click tracking output
///
/// Clicks referencing an unknown request_id are still accepted; they surface
/// as orphaned in aggregation rather than being rejected here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClickResponse {
    pub accepted: bool,
}
