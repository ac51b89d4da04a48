//! TF-IDF index over catalog item text
//!
//! Built once at startup from each item's title, overview, genres, and vibe
//! tags; read-only thereafter, so any number of concurrent requests can
//! score against it without synchronization. Vectors are l2-normalized at
//! build time, making cosine similarity a plain sparse dot product.

use cdx_common::catalog::Catalog;
use std::collections::{HashMap, HashSet};

use crate::query::lexicon::STOP_WORDS;

/// Tokenize text for the similarity index: lowercase, split on
/// non-alphanumerics, drop stop words and one-character tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() > 1 && !STOP_WORDS.contains(*t))
        .map(|t| t.to_string())
        .collect()
}

/// Precomputed TF-IDF representation of the catalog corpus
#[derive(Debug)]
pub struct TfidfIndex {
    vocab: HashMap<String, usize>,
    idf: Vec<f64>,
    /// item id → l2-normalized sparse vector (term id → weight)
    doc_vectors: HashMap<u32, HashMap<usize, f64>>,
}

impl TfidfIndex {
    /// Build the index from the full catalog
    pub fn build(catalog: &Catalog) -> Self {
        let mut vocab: HashMap<String, usize> = HashMap::new();
        let mut df: Vec<u32> = Vec::new();
        let mut doc_tokens: Vec<(u32, Vec<usize>)> = Vec::with_capacity(catalog.len());

        for item in catalog.items() {
            let text = format!(
                "{} {} {} {}",
                item.title,
                item.overview,
                item.genres.join(" "),
                item.vibes.join(" ")
            );
            let mut term_ids = Vec::new();
            for token in tokenize(&text) {
                let id = match vocab.get(&token) {
                    Some(&id) => id,
                    None => {
                        let id = vocab.len();
                        vocab.insert(token, id);
                        df.push(0);
                        id
                    }
                };
                term_ids.push(id);
            }
            let distinct: HashSet<usize> = term_ids.iter().copied().collect();
            for id in distinct {
                df[id] += 1;
            }
            doc_tokens.push((item.id, term_ids));
        }

        // Smoothed idf: ln((N + 1) / (df + 1)) + 1, so corpus-wide terms
        // still carry a small positive weight
        let n = doc_tokens.len() as f64;
        let idf: Vec<f64> = df
            .iter()
            .map(|&d| ((n + 1.0) / (f64::from(d) + 1.0)).ln() + 1.0)
            .collect();

        let mut doc_vectors = HashMap::with_capacity(doc_tokens.len());
        for (item_id, term_ids) in doc_tokens {
            let mut weights: HashMap<usize, f64> = HashMap::new();
            for id in term_ids {
                *weights.entry(id).or_insert(0.0) += 1.0;
            }
            for (id, w) in weights.iter_mut() {
                *w *= idf[*id];
            }
            l2_normalize(&mut weights);
            doc_vectors.insert(item_id, weights);
        }

        Self {
            vocab,
            idf,
            doc_vectors,
        }
    }

    /// Project already-tokenized query terms into the index's vector space.
    /// Terms outside the corpus vocabulary are ignored; an all-unknown query
    /// yields the empty vector.
    pub fn query_vector(&self, terms: &[String]) -> HashMap<usize, f64> {
        let mut weights: HashMap<usize, f64> = HashMap::new();
        for term in terms {
            if let Some(&id) = self.vocab.get(term.as_str()) {
                *weights.entry(id).or_insert(0.0) += 1.0;
            }
        }
        for (id, w) in weights.iter_mut() {
            *w *= self.idf[*id];
        }
        l2_normalize(&mut weights);
        weights
    }

    /// Cosine similarity between a query vector and one item's document.
    /// Both sides are normalized, so this is a sparse dot product.
    pub fn cosine(&self, item_id: u32, query: &HashMap<usize, f64>) -> f64 {
        let Some(doc) = self.doc_vectors.get(&item_id) else {
            return 0.0;
        };
        let (small, large) = if doc.len() < query.len() {
            (doc, query)
        } else {
            (query, doc)
        };
        small
            .iter()
            .map(|(id, w)| w * large.get(id).copied().unwrap_or(0.0))
            .sum()
    }

    pub fn doc_count(&self) -> usize {
        self.doc_vectors.len()
    }

    pub fn vocab_size(&self) -> usize {
        self.vocab.len()
    }
}

fn l2_normalize(vec: &mut HashMap<usize, f64>) {
    let norm: f64 = vec.values().map(|w| w * w).sum::<f64>().sqrt();
    if norm > 0.0 {
        for w in vec.values_mut() {
            *w /= norm;
        }
    }
}
