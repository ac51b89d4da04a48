//! Voice transcription normalization
//!
//! Cleans up voice-transcribed queries before interpretation: strips filler
//! words, peels command prefixes ("find …", "show me …"), converts spoken
//! duration numbers to digits, and applies a table of known transcription
//! corrections (homophones, split compound terms). Typed text passes through
//! untouched.
//!
//! Best-effort by contract: never fails, unmatched input is left as-is.

use cdx_common::intent::QueryOrigin;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static PUNCT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9\s]").unwrap());

static FILLER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:um|uh|er|ah|like|you know|i mean)\b").unwrap());

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Command phrasings whose trailing content is the actual query.
/// Longer phrasings first so "can you find …" wins over "find …".
static COMMAND_PREFIXES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"^can you find (.+)$",
        r"^help me find (.+)$",
        r"^i am looking for (.+)$",
        r"^are there any (.+)$",
        r"^do you have (.+)$",
        r"^look for (.+)$",
        r"^search for (.+)$",
        r"^show me (.+)$",
        r"^give me (.+)$",
        r"^i want (.+)$",
        r"^i need (.+)$",
        r"^recommend (.+)$",
        r"^suggest (.+)$",
        r"^find (.+)$",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).unwrap())
    .collect()
});

/// Spoken duration numbers, only when a time unit follows ("two hours");
/// bare number words are left alone ("one flew over the cuckoo's nest").
static DURATION_WORDS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(one|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve)\s+(hours?|hrs?|minutes?|mins?)\b",
    )
    .unwrap()
});

fn number_word_value(word: &str) -> Option<u32> {
    let value = match word {
        "one" => 1,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        "eleven" => 11,
        "twelve" => 12,
        _ => return None,
    };
    Some(value)
}

/// Known transcription errors → canonical forms. Applied after punctuation
/// stripping, so compound terms are restored here ("sci fi" → "sci-fi").
static CORRECTIONS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"\btom hank\b", "tom hanks"),
        (r"\bthomas hanks\b", "tom hanks"),
        (r"\bleo dicaprio\b", "leonardo dicaprio"),
        (r"\bleonardo de caprio\b", "leonardo dicaprio"),
        (r"\bbobby de niro\b", "robert de niro"),
        (r"\brobert deniro\b", "robert de niro"),
        (r"\bbradley pitt\b", "brad pitt"),
        (r"\bbrad pit\b", "brad pitt"),
        (r"\bmatthew damon\b", "matt damon"),
        (r"\bjulie roberts\b", "julia roberts"),
        (r"\bmerrill streep\b", "meryl streep"),
        (r"\bjody foster\b", "jodie foster"),
        (r"\bmark hammill\b", "mark hamill"),
        (r"\bsam jackson\b", "samuel jackson"),
        (r"\bed norton\b", "edward norton"),
        (r"\bcarrie anne moss\b", "carrie-anne moss"),
        (r"\bsci fi\b", "sci-fi"),
        (r"\brom com\b", "rom-com"),
        (r"\bfeel good\b", "feel-good"),
    ]
    .iter()
    .map(|(pattern, replacement)| (Regex::new(pattern).unwrap(), *replacement))
    .collect()
});

/// Corrects voice transcription artifacts before query interpretation
#[derive(Debug, Default)]
pub struct VoiceNormalizer;

impl VoiceNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Normalize raw query text according to its origin. Pure transform.
    pub fn normalize(&self, raw: &str, origin: QueryOrigin) -> String {
        match origin {
            QueryOrigin::Text => raw.trim().to_string(),
            QueryOrigin::Voice => normalize_voice(raw),
        }
    }
}

fn normalize_voice(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let cleaned = PUNCT_RE.replace_all(&lowered, " ");
    let cleaned = FILLER_RE.replace_all(&cleaned, " ");
    let cleaned = WHITESPACE_RE.replace_all(&cleaned, " ");
    let mut text = cleaned.trim().to_string();

    for prefix in COMMAND_PREFIXES.iter() {
        if let Some(caps) = prefix.captures(&text) {
            text = caps[1].trim().to_string();
            break;
        }
    }

    text = DURATION_WORDS_RE
        .replace_all(&text, |caps: &Captures| {
            match number_word_value(&caps[1]) {
                Some(n) => format!("{n} {}", &caps[2]),
                None => caps[0].to_string(),
            }
        })
        .to_string();

    for (re, replacement) in CORRECTIONS.iter() {
        if re.is_match(&text) {
            text = re.replace_all(&text, *replacement).to_string();
        }
    }

    WHITESPACE_RE.replace_all(text.trim(), " ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voice(raw: &str) -> String {
        VoiceNormalizer::new().normalize(raw, QueryOrigin::Voice)
    }

    #[test]
    fn test_text_origin_passes_through() {
        let normalizer = VoiceNormalizer::new();
        assert_eq!(
            normalizer.normalize("  Find comedy movies!  ", QueryOrigin::Text),
            "Find comedy movies!"
        );
    }

    #[test]
    fn test_fillers_and_prefix_stripped() {
        assert_eq!(
            voice("um can you find uh comedy movies"),
            "comedy movies"
        );
        assert_eq!(voice("show me action films"), "action films");
    }

    #[test]
    fn test_transcription_corrections() {
        assert_eq!(
            voice("find funny movies with tom hank"),
            "funny movies with tom hanks"
        );
        assert_eq!(voice("i want leo dicaprio movies"), "leonardo dicaprio movies");
    }

    #[test]
    fn test_spoken_durations_become_digits() {
        assert_eq!(
            voice("show me sci fi films under two hours"),
            "sci-fi films under 2 hours"
        );
        assert_eq!(voice("movies under ninety minutes"), "movies under ninety minutes");
    }

    #[test]
    fn test_bare_number_words_untouched() {
        assert_eq!(
            voice("one flew over the cuckoo's nest"),
            "one flew over the cuckoo s nest"
        );
    }

    #[test]
    fn test_unmatched_input_left_as_is() {
        assert_eq!(voice("zxqv blorp"), "zxqv blorp");
        assert_eq!(voice(""), "");
    }
}
