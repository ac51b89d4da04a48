//! Strategy B: content similarity
//!
//! Scores items by cosine similarity between the query's pseudo-document
//! (residual keywords plus matched genre/cast/vibe terms) and each item's
//! TF-IDF vector, with small additive genre/cast boosts to cover overviews
//! that never mention the genre word. Hard gates apply exactly as in
//! Strategy A. A query that projects to the empty vector falls back to
//! popularity ordering so the result is never arbitrary or empty.

use std::sync::Arc;

use cdx_common::catalog::Catalog;
use cdx_common::intent::QueryIntent;

use super::tfidf::{tokenize, TfidfIndex};
use super::{passes_gates, sort_and_truncate, RankStrategy, ScoredItem};
use crate::config::RecConfig;

pub struct SimilarityStrategy {
    index: Arc<TfidfIndex>,
    sim_genre_boost: f64,
    sim_cast_boost: f64,
    top_k: usize,
}

impl SimilarityStrategy {
    pub fn new(index: Arc<TfidfIndex>, config: &RecConfig) -> Self {
        Self {
            index,
            sim_genre_boost: config.sim_genre_boost,
            sim_cast_boost: config.sim_cast_boost,
            top_k: config.top_k,
        }
    }

    /// Synthesize the query document from the intent: free-text keywords
    /// plus every matched categorical term
    fn query_terms(intent: &QueryIntent) -> Vec<String> {
        let mut parts: Vec<&str> = intent.keywords.iter().map(String::as_str).collect();
        parts.extend(intent.genres.iter().map(String::as_str));
        parts.extend(intent.cast.iter().map(String::as_str));
        parts.extend(intent.vibes.iter().map(String::as_str));
        tokenize(&parts.join(" "))
    }
}

impl RankStrategy for SimilarityStrategy {
    fn name(&self) -> &'static str {
        "similarity"
    }

    fn rank(&self, catalog: &Catalog, intent: &QueryIntent) -> Vec<ScoredItem> {
        let terms = Self::query_terms(intent);
        let query = self.index.query_vector(&terms);
        let fallback = query.is_empty();

        let mut scored = Vec::with_capacity(catalog.len());
        for item in catalog.items() {
            if !passes_gates(item, intent) {
                continue;
            }

            let score = if fallback {
                // No usable query text: popularity ordering, same base as
                // Strategy A
                item.popularity
            } else {
                let mut score = self.index.cosine(item.id, &query);
                let matched_genres =
                    intent.genres.iter().filter(|g| item.has_genre(g)).count();
                score += matched_genres as f64 * self.sim_genre_boost;
                if intent.cast.iter().any(|name| item.has_cast_member(name)) {
                    score += self.sim_cast_boost;
                }
                score
            };

            scored.push(ScoredItem {
                item_id: item.id,
                score,
            });
        }

        sort_and_truncate(scored, self.top_k)
    }
}
