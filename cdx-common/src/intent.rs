//! Structured query intent
//!
//! A `QueryIntent` is the interpreter's output: the structured filters and
//! preferences derived from one natural-language request. It is owned by a
//! single request's execution and discarded after logging. Absence of a
//! constraint always means "no filter", never "filter on empty".

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Where the raw query text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryOrigin {
    #[default]
    Text,
    /// Voice-transcribed input; passed through transcription-artifact
    /// correction before interpretation
    Voice,
}

/// Runtime comparator extracted from phrases like "under two hours"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeCmp {
    /// "under" / "shorter than" / "less than"
    Lt,
    /// "over" / "longer than" / "more than"
    Gt,
}

/// Hard runtime gate: items violating it are excluded, not penalized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConstraint {
    pub cmp: RuntimeCmp,
    pub minutes: u32,
}

impl RuntimeConstraint {
    /// Whether an item of the given runtime passes the gate
    pub fn admits(&self, runtime_minutes: u32) -> bool {
        match self.cmp {
            RuntimeCmp::Lt => runtime_minutes < self.minutes,
            RuntimeCmp::Gt => runtime_minutes > self.minutes,
        }
    }
}

/// Inclusive release-year gate ("1990s", "from 2005", "before 1999")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct YearRange {
    pub min: Option<i32>,
    pub max: Option<i32>,
}

impl YearRange {
    pub fn admits(&self, year: i32) -> bool {
        if let Some(min) = self.min {
            if year < min {
                return false;
            }
        }
        if let Some(max) = self.max {
            if year > max {
                return false;
            }
        }
        true
    }
}

/// Structured filters and preferences derived from one query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryIntent {
    /// Canonical genre names; empty = unconstrained
    pub genres: BTreeSet<String>,
    /// Canonical cast names; empty = unconstrained
    pub cast: BTreeSet<String>,
    /// Hard runtime gate
    pub runtime: Option<RuntimeConstraint>,
    /// Hard release-year gate
    pub years: Option<YearRange>,
    /// Canonical vibe tags; empty = unconstrained
    pub vibes: BTreeSet<String>,
    /// Residual non-stop-word terms, feeding the similarity query document
    pub keywords: Vec<String>,
    /// Original text as received, retained for debugging/logging
    pub raw: String,
    pub origin: QueryOrigin,
}

impl QueryIntent {
    /// Intent with no constraints at all; still flows through ranking and
    /// yields the popularity-ordered list
    pub fn unconstrained(raw: impl Into<String>, origin: QueryOrigin) -> Self {
        Self {
            genres: BTreeSet::new(),
            cast: BTreeSet::new(),
            runtime: None,
            years: None,
            vibes: BTreeSet::new(),
            keywords: Vec::new(),
            raw: raw.into(),
            origin,
        }
    }

    /// True when no categorical constraint was extracted
    pub fn is_unconstrained(&self) -> bool {
        self.genres.is_empty()
            && self.cast.is_empty()
            && self.runtime.is_none()
            && self.years.is_none()
            && self.vibes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_gate_is_strict() {
        let lt = RuntimeConstraint {
            cmp: RuntimeCmp::Lt,
            minutes: 120,
        };
        assert!(lt.admits(119));
        assert!(!lt.admits(120));

        let gt = RuntimeConstraint {
            cmp: RuntimeCmp::Gt,
            minutes: 90,
        };
        assert!(gt.admits(91));
        assert!(!gt.admits(90));
    }

    #[test]
    fn test_year_range_inclusive() {
        let decade = YearRange {
            min: Some(1990),
            max: Some(1999),
        };
        assert!(decade.admits(1990));
        assert!(decade.admits(1999));
        assert!(!decade.admits(2000));

        let open_ended = YearRange {
            min: Some(2005),
            max: None,
        };
        assert!(open_ended.admits(2024));
        assert!(!open_ended.admits(2004));
    }

    #[test]
    fn test_unconstrained_intent() {
        let intent = QueryIntent::unconstrained("anything at all", QueryOrigin::Text);
        assert!(intent.is_unconstrained());
        assert_eq!(intent.raw, "anything at all");
    }
}
