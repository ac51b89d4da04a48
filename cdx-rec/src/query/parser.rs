//! Natural-language query parser
//!
//! Applies, in order: genre vocabulary lookup, cast phrase matching, runtime
//! comparator extraction, decade/year extraction, vibe keywords, and
//! stop-worded residual keywords. Unmatched tokens are discarded; empty or
//! fully-unmatched text yields the unconstrained intent.

use cdx_common::intent::{QueryIntent, QueryOrigin, RuntimeCmp, RuntimeConstraint, YearRange};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::lexicon;

static RUNTIME_MAX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:under|less\s+than|shorter\s+than|at\s+most|no\s+more\s+than)\s+(\d+(?:\.\d+)?)(?:\s*(hours?|hrs?|minutes?|mins?))?",
    )
    .unwrap()
});

static RUNTIME_MIN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:over|more\s+than|longer\s+than|at\s+least)\s+(\d+(?:\.\d+)?)(?:\s*(hours?|hrs?|minutes?|mins?))?",
    )
    .unwrap()
});

/// A bare duration with a unit but no comparator ("90 minute movies") is
/// read as an upper bound, the common intent of such phrasing.
static RUNTIME_BARE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*(hours?|hrs?|minutes?|mins?)\b").unwrap());

static DECADE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b((?:19|20)\d0)s\b").unwrap());

static YEAR_AFTER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:from|after|since)\s+((?:19|20)\d{2})\b").unwrap());

static YEAR_BEFORE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:before|until)\s+((?:19|20)\d{2})\b").unwrap());

static YEAR_BARE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b((?:19|20)\d{2})\b").unwrap());

static RECENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\brecent(?:ly)?\b").unwrap());

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-z0-9']+").unwrap());

/// Deterministic query → intent mapping against the static lexicons
#[derive(Debug, Clone)]
pub struct QueryInterpreter {
    /// Year floor applied when a query asks for "recent" content
    recent_min_year: i32,
}

impl QueryInterpreter {
    pub fn new(recent_min_year: i32) -> Self {
        Self { recent_min_year }
    }

    /// Interpret normalized query text into structured filters.
    ///
    /// `raw` is the text as originally received (pre-normalization); it is
    /// retained on the intent for debugging and logging.
    pub fn interpret(&self, text: &str, raw: &str, origin: QueryOrigin) -> QueryIntent {
        let lowered = text.to_lowercase();
        let mut intent = QueryIntent::unconstrained(raw, origin);

        for (canonical, synonyms) in lexicon::GENRES {
            if synonyms.iter().any(|s| contains_phrase(&lowered, s)) {
                intent.genres.insert((*canonical).to_string());
            }
        }

        for (canonical, variations) in lexicon::KNOWN_CAST {
            if variations.iter().any(|v| contains_phrase(&lowered, v)) {
                intent.cast.insert((*canonical).to_string());
            }
        }

        intent.runtime = extract_runtime(&lowered);
        intent.years = self.extract_years(&lowered);

        for (canonical, keywords) in lexicon::VIBES {
            if keywords.iter().any(|k| contains_phrase(&lowered, k)) {
                intent.vibes.insert((*canonical).to_string());
            }
        }

        intent.keywords = extract_keywords(&lowered);
        intent
    }

    fn extract_years(&self, text: &str) -> Option<YearRange> {
        if let Some(caps) = DECADE_RE.captures(text) {
            let year: i32 = caps[1].parse().unwrap_or(0);
            return Some(YearRange {
                min: Some(year),
                max: Some(year + 9),
            });
        }

        let mut range = YearRange::default();
        if let Some(caps) = YEAR_AFTER_RE.captures(text) {
            range.min = caps[1].parse().ok();
        }
        if let Some(caps) = YEAR_BEFORE_RE.captures(text) {
            range.max = caps[1].parse().ok();
        }

        // A bare year with no qualifier means exactly that year
        if range.min.is_none() && range.max.is_none() {
            if let Some(caps) = YEAR_BARE_RE.captures(text) {
                let year: i32 = caps[1].parse().unwrap_or(0);
                range.min = Some(year);
                range.max = Some(year);
            }
        }

        if range.min.is_none() && range.max.is_none() && RECENT_RE.is_match(text) {
            range.min = Some(self.recent_min_year);
        }

        if range.min.is_none() && range.max.is_none() {
            None
        } else {
            Some(range)
        }
    }
}

fn extract_runtime(text: &str) -> Option<RuntimeConstraint> {
    // Upper-bound phrasings first: "no more than" must not fall through to
    // the lower-bound "more than" pattern.
    if let Some(caps) = RUNTIME_MAX_RE.captures(text) {
        return Some(RuntimeConstraint {
            cmp: RuntimeCmp::Lt,
            minutes: capture_minutes(&caps),
        });
    }
    if let Some(caps) = RUNTIME_MIN_RE.captures(text) {
        return Some(RuntimeConstraint {
            cmp: RuntimeCmp::Gt,
            minutes: capture_minutes(&caps),
        });
    }
    if let Some(caps) = RUNTIME_BARE_RE.captures(text) {
        return Some(RuntimeConstraint {
            cmp: RuntimeCmp::Lt,
            minutes: capture_minutes(&caps),
        });
    }
    None
}

/// Numeric capture + optional unit → whole minutes. Hours convert at 60:1;
/// a missing unit means minutes.
fn capture_minutes(caps: &Captures) -> u32 {
    let value: f64 = caps[1].parse().unwrap_or(0.0);
    let is_hours = caps
        .get(2)
        .map(|unit| unit.as_str().starts_with('h'))
        .unwrap_or(false);
    let minutes = if is_hours { value * 60.0 } else { value };
    minutes.round() as u32
}

fn extract_keywords(text: &str) -> Vec<String> {
    WORD_RE
        .find_iter(text)
        .map(|m| m.as_str().trim_matches('\'').to_string())
        .filter(|w| w.len() > 2 && !lexicon::STOP_WORDS.contains(w.as_str()))
        .collect()
}

/// Whole-phrase containment: `phrase` must not sit inside a larger word
fn contains_phrase(text: &str, phrase: &str) -> bool {
    if phrase.is_empty() {
        return false;
    }
    let mut start = 0;
    while let Some(pos) = text[start..].find(phrase) {
        let begin = start + pos;
        let end = begin + phrase.len();
        let before_ok = text[..begin]
            .chars()
            .next_back()
            .map(|c| !c.is_alphanumeric())
            .unwrap_or(true);
        let after_ok = text[end..]
            .chars()
            .next()
            .map(|c| !c.is_alphanumeric())
            .unwrap_or(true);
        if before_ok && after_ok {
            return true;
        }
        // Advance one full character so the next slice stays on a boundary
        start = begin
            + text[begin..]
                .chars()
                .next()
                .map(char::len_utf8)
                .unwrap_or(1);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interpret(text: &str) -> QueryIntent {
        QueryInterpreter::new(2020).interpret(text, text, QueryOrigin::Text)
    }

    #[test]
    fn test_genre_and_cast_scenario() {
        let intent = interpret("find comedy movies with Tom Hanks");
        assert!(intent.genres.contains("Comedy"));
        assert!(intent.cast.contains("Tom Hanks"));
        assert!(intent.runtime.is_none());
        assert!(intent.years.is_none());
    }

    #[test]
    fn test_genre_synonyms_map_to_canonical() {
        assert!(interpret("something funny").genres.contains("Comedy"));
        assert!(interpret("a science fiction epic").genres.contains("Sci-Fi"));
        assert!(interpret("scary films").genres.contains("Horror"));
    }

    #[test]
    fn test_phrase_match_respects_word_boundaries() {
        // "slaughter" must not trigger the "laugh" synonym
        let intent = interpret("a slaughterhouse documentary");
        assert!(!intent.genres.contains("Comedy"));
    }

    #[test]
    fn test_runtime_upper_bound() {
        let intent = interpret("comedy under 2 hours");
        assert_eq!(
            intent.runtime,
            Some(RuntimeConstraint {
                cmp: RuntimeCmp::Lt,
                minutes: 120
            })
        );

        let intent = interpret("something less than 95 minutes");
        assert_eq!(intent.runtime.unwrap().minutes, 95);
    }

    #[test]
    fn test_runtime_lower_bound() {
        let intent = interpret("epics longer than 3 hours");
        assert_eq!(
            intent.runtime,
            Some(RuntimeConstraint {
                cmp: RuntimeCmp::Gt,
                minutes: 180
            })
        );
    }

    #[test]
    fn test_no_more_than_is_an_upper_bound() {
        let intent = interpret("no more than 100 minutes");
        assert_eq!(intent.runtime.unwrap().cmp, RuntimeCmp::Lt);
        assert_eq!(intent.runtime.unwrap().minutes, 100);
    }

    #[test]
    fn test_bare_duration_defaults_to_upper_bound() {
        let intent = interpret("90 minute movies");
        assert_eq!(
            intent.runtime,
            Some(RuntimeConstraint {
                cmp: RuntimeCmp::Lt,
                minutes: 90
            })
        );
    }

    #[test]
    fn test_decade_extraction() {
        let intent = interpret("1990s thrillers");
        assert_eq!(
            intent.years,
            Some(YearRange {
                min: Some(1990),
                max: Some(1999)
            })
        );
    }

    #[test]
    fn test_year_qualifiers() {
        assert_eq!(interpret("dramas from 2005").years.unwrap().min, Some(2005));
        assert_eq!(
            interpret("classics before 1980").years.unwrap().max,
            Some(1980)
        );
        let exact = interpret("movies of 2010").years.unwrap();
        assert_eq!(exact.min, Some(2010));
        assert_eq!(exact.max, Some(2010));
    }

    #[test]
    fn test_recent_uses_configured_floor() {
        let intent = QueryInterpreter::new(2021).interpret(
            "recent action movies",
            "recent action movies",
            QueryOrigin::Text,
        );
        assert_eq!(
            intent.years,
            Some(YearRange {
                min: Some(2021),
                max: None
            })
        );
    }

    #[test]
    fn test_vibe_keywords() {
        let intent = interpret("something dark and gritty");
        assert!(intent.vibes.contains("dark"));
    }

    #[test]
    fn test_keywords_drop_stop_words() {
        let intent = interpret("find space movies with heists");
        assert!(intent.keywords.contains(&"space".to_string()));
        assert!(intent.keywords.contains(&"heists".to_string()));
        assert!(!intent.keywords.iter().any(|k| k == "find" || k == "movies"));
    }

    #[test]
    fn test_empty_and_unmatched_text_is_unconstrained() {
        assert!(interpret("").is_unconstrained());
        assert!(interpret("zxqv blorp").is_unconstrained());
    }

    #[test]
    fn test_interpretation_is_deterministic() {
        let a = interpret("funny 1990s movies with tom hanks under 2 hours");
        let b = interpret("funny 1990s movies with tom hanks under 2 hours");
        assert_eq!(serde_json::to_string(&a).unwrap(), serde_json::to_string(&b).unwrap());
    }
}
