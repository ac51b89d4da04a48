//! Ranking strategies
//!
//! A ranking strategy is any component exposing `rank(catalog, intent)`;
//! adding a strategy means implementing [`RankStrategy`] and registering it
//! with the experiment split, nothing more.
//!
//! Both shipped strategies share the same hard-gate and tie-break rules:
//! runtime/year constraints exclude items outright (gate, not signal), and
//! equal scores order by ascending catalog id so output never depends on
//! the iteration order of an unordered structure.

pub mod popularity;
pub mod similarity;
pub mod tfidf;

use cdx_common::catalog::{Catalog, CatalogItem};
use cdx_common::intent::QueryIntent;
use serde::Serialize;

pub use popularity::PopularityStrategy;
pub use similarity::SimilarityStrategy;
pub use tfidf::TfidfIndex;

/// One scored catalog item, pre-truncation
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoredItem {
    pub item_id: u32,
    pub score: f64,
}

/// A scoring function over (catalog, intent)
pub trait RankStrategy: Send + Sync {
    /// Strategy name for logging and diagnostics
    fn name(&self) -> &'static str;

    /// Rank the catalog against an intent. Returns at most the strategy's
    /// configured top-K items, best first.
    fn rank(&self, catalog: &Catalog, intent: &QueryIntent) -> Vec<ScoredItem>;
}

/// Hard gates: runtime and year constraints exclude non-matching items
/// entirely, in both strategies, regardless of any score
pub(crate) fn passes_gates(item: &CatalogItem, intent: &QueryIntent) -> bool {
    if let Some(runtime) = &intent.runtime {
        if !runtime.admits(item.runtime_minutes) {
            return false;
        }
    }
    if let Some(years) = &intent.years {
        if !years.admits(item.release_year) {
            return false;
        }
    }
    true
}

/// Deterministic ordering: score descending, id ascending on ties
pub(crate) fn sort_and_truncate(mut scored: Vec<ScoredItem>, k: usize) -> Vec<ScoredItem> {
    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.item_id.cmp(&b.item_id))
    });
    scored.truncate(k);
    scored
}
