//! Strategy A: popularity + rule boosts
//!
//! Base score is the item's static popularity signal. Genre, cast, and vibe
//! matches add independent, order-free boosts; genre boosts are capped so a
//! long requested genre list cannot run the score away. Runtime and year
//! constraints gate, they never score.

use cdx_common::catalog::Catalog;
use cdx_common::intent::QueryIntent;

use super::{passes_gates, sort_and_truncate, RankStrategy, ScoredItem};
use crate::config::RecConfig;

pub struct PopularityStrategy {
    w_genre: f64,
    genre_boost_cap: u32,
    w_cast: f64,
    w_vibe: f64,
    top_k: usize,
}

impl PopularityStrategy {
    pub fn new(config: &RecConfig) -> Self {
        Self {
            w_genre: config.w_genre,
            genre_boost_cap: config.genre_boost_cap,
            w_cast: config.w_cast,
            w_vibe: config.w_vibe,
            top_k: config.top_k,
        }
    }
}

impl RankStrategy for PopularityStrategy {
    fn name(&self) -> &'static str {
        "popularity"
    }

    fn rank(&self, catalog: &Catalog, intent: &QueryIntent) -> Vec<ScoredItem> {
        let mut scored = Vec::with_capacity(catalog.len());

        for item in catalog.items() {
            if !passes_gates(item, intent) {
                continue;
            }

            let mut score = item.popularity;

            if !intent.genres.is_empty() {
                let matched = intent.genres.iter().filter(|g| item.has_genre(g)).count() as u32;
                score += f64::from(matched.min(self.genre_boost_cap)) * self.w_genre;
            }

            if intent.cast.iter().any(|name| item.has_cast_member(name)) {
                score += self.w_cast;
            }

            if !intent.vibes.is_empty() {
                let matched = intent.vibes.iter().filter(|v| item.has_vibe(v)).count();
                score += matched as f64 * self.w_vibe;
            }

            scored.push(ScoredItem {
                item_id: item.id,
                score,
            });
        }

        sort_and_truncate(scored, self.top_k)
    }
}
