//! Catalog data model
//!
//! The catalog is loaded once at startup by an external loader and is
//! immutable thereafter. Item ids are unique and never reused; no component
//! mutates a `CatalogItem` after construction.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single piece of content in the catalog
///
/// Missing optional fields deserialize to empty/`None` and mean
/// "unconstrained", never "empty string".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Unique, immutable identifier
    pub id: u32,
    pub title: String,
    /// Genre tags, e.g. "Comedy", "Sci-Fi"
    pub genres: Vec<String>,
    /// Cast member names, billing order
    pub cast: Vec<String>,
    /// Free-text synopsis, feeds the similarity index
    pub overview: String,
    pub runtime_minutes: u32,
    pub release_year: i32,
    /// Static business popularity signal (higher is more popular)
    pub popularity: f64,
    /// Content "vibe" tags, e.g. "feel-good", "dark", "family"
    #[serde(default)]
    pub vibes: Vec<String>,
    #[serde(default)]
    pub director: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
}

impl CatalogItem {
    /// Case-insensitive genre membership test
    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres.iter().any(|g| g.eq_ignore_ascii_case(genre))
    }

    /// Case-insensitive cast membership test
    pub fn has_cast_member(&self, name: &str) -> bool {
        self.cast.iter().any(|c| c.eq_ignore_ascii_case(name))
    }

    /// Case-insensitive vibe-tag membership test
    pub fn has_vibe(&self, vibe: &str) -> bool {
        self.vibes.iter().any(|v| v.eq_ignore_ascii_case(vibe))
    }
}

/// Immutable in-memory catalog with an id index
///
/// Built once at startup; any number of concurrent readers may share it
/// (typically behind an `Arc`) without synchronization.
#[derive(Debug, Clone)]
pub struct Catalog {
    items: Vec<CatalogItem>,
    by_id: HashMap<u32, usize>,
}

impl Catalog {
    /// Build a catalog from loader-supplied items, rejecting duplicate ids
    pub fn new(items: Vec<CatalogItem>) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(items.len());
        for (idx, item) in items.iter().enumerate() {
            if by_id.insert(item.id, idx).is_some() {
                return Err(Error::InvalidInput(format!(
                    "duplicate catalog item id {}",
                    item.id
                )));
            }
        }
        Ok(Self { items, by_id })
    }

    pub fn get(&self, id: u32) -> Option<&CatalogItem> {
        self.by_id.get(&id).map(|&idx| &self.items[idx])
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items ordered by descending popularity, id ascending on ties
    pub fn by_popularity(&self) -> Vec<&CatalogItem> {
        let mut sorted: Vec<&CatalogItem> = self.items.iter().collect();
        sorted.sort_by(|a, b| {
            b.popularity
                .partial_cmp(&a.popularity)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        sorted
    }

    /// The single most popular item, if the catalog is non-empty
    pub fn most_popular(&self) -> Option<&CatalogItem> {
        self.by_popularity().into_iter().next()
    }
}
