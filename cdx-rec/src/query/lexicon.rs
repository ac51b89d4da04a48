//! Static vocabulary tables
//!
//! Immutable lookup structures built once at startup; never mutated at
//! runtime, so there is no hidden cross-request coupling. Matching against
//! these tables is categorical: a term is either in the table or discarded.

use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Canonical genre name → synonyms/trigger phrases (all lowercase)
pub static GENRES: &[(&str, &[&str])] = &[
    ("Comedy", &["comedy", "funny", "humor", "humorous", "laugh"]),
    ("Drama", &["drama", "serious", "emotional", "touching"]),
    ("Thriller", &["thriller", "suspense", "suspenseful", "mystery"]),
    ("Action", &["action", "adventure", "exciting", "fast-paced"]),
    ("Romance", &["romance", "romantic", "love story", "rom-com"]),
    ("Horror", &["horror", "scary", "frightening", "terrifying"]),
    (
        "Sci-Fi",
        &["sci-fi", "science fiction", "futuristic", "space", "alien", "aliens"],
    ),
    ("Fantasy", &["fantasy", "magical", "wizard", "wizards", "magic"]),
    (
        "Crime",
        &["crime", "criminal", "gangster", "gangsters", "mob", "detective"],
    ),
    ("Biography", &["biography", "biographical", "true story"]),
    ("History", &["historical", "history", "period piece"]),
    ("Family", &["family", "kids", "children", "family-friendly"]),
];

/// Canonical cast name → accepted variations (all lowercase)
pub static KNOWN_CAST: &[(&str, &[&str])] = &[
    ("Tom Hanks", &["tom hanks", "thomas hanks"]),
    ("Leonardo DiCaprio", &["leonardo dicaprio", "leo dicaprio"]),
    ("Morgan Freeman", &["morgan freeman"]),
    ("Robert De Niro", &["robert de niro", "robert deniro"]),
    ("Al Pacino", &["al pacino"]),
    ("Brad Pitt", &["brad pitt", "bradley pitt"]),
    ("Matt Damon", &["matt damon", "matthew damon"]),
    ("Julia Roberts", &["julia roberts"]),
    ("Meryl Streep", &["meryl streep"]),
    ("Denzel Washington", &["denzel washington"]),
    ("Keanu Reeves", &["keanu reeves"]),
    ("Christian Bale", &["christian bale"]),
    ("Heath Ledger", &["heath ledger"]),
    ("Robin Williams", &["robin williams"]),
    ("Anthony Hopkins", &["anthony hopkins"]),
    ("Jodie Foster", &["jodie foster"]),
    ("Harrison Ford", &["harrison ford"]),
    ("Mark Hamill", &["mark hamill"]),
    ("Carrie Fisher", &["carrie fisher"]),
    (
        "Samuel L. Jackson",
        &["samuel l. jackson", "samuel l jackson", "samuel jackson"],
    ),
    ("John Travolta", &["john travolta"]),
    ("Uma Thurman", &["uma thurman"]),
    ("Tim Robbins", &["tim robbins"]),
    ("Marlon Brando", &["marlon brando"]),
    ("Edward Norton", &["edward norton"]),
    ("Laurence Fishburne", &["laurence fishburne"]),
    ("Carrie-Anne Moss", &["carrie-anne moss", "carrie anne moss"]),
    ("Joe Pesci", &["joe pesci"]),
    ("Ian McKellen", &["ian mckellen"]),
    ("Elijah Wood", &["elijah wood"]),
    ("Orlando Bloom", &["orlando bloom"]),
    ("Tom Hardy", &["tom hardy"]),
    ("Jack Nicholson", &["jack nicholson"]),
    ("Kevin Spacey", &["kevin spacey"]),
];

/// Canonical vibe tag → trigger keywords (all lowercase). Canonical tags
/// match the catalog's vibe vocabulary.
pub static VIBES: &[(&str, &[&str])] = &[
    ("funny", &["funny", "hilarious", "laugh", "humor"]),
    ("serious", &["serious", "dramatic", "intense", "heavy"]),
    ("romantic", &["romantic", "romance", "sweet", "cute"]),
    (
        "exciting",
        &["exciting", "thrilling", "action-packed", "adrenaline"],
    ),
    ("scary", &["scary", "frightening", "terrifying", "creepy"]),
    (
        "thought-provoking",
        &["thought-provoking", "deep", "philosophical", "meaningful"],
    ),
    (
        "feel-good",
        &["feel-good", "light", "easy", "fun", "uplifting", "entertaining"],
    ),
    ("dark", &["dark", "gritty", "disturbing", "bleak"]),
    ("family", &["family", "wholesome", "kids"]),
];

/// Stop words dropped from residual keywords and similarity-index tokens.
/// Includes domain chatter (movie/film/find/show) and the comparator/unit
/// words consumed by the numeric extractors.
pub static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "an", "and", "are", "as", "at", "be", "been", "being", "but", "by", "can", "could",
        "did", "do", "does", "for", "from", "had", "has", "have", "if", "in", "into", "is", "it",
        "may", "me", "might", "must", "no", "not", "of", "on", "or", "should", "some", "something",
        "such", "that", "the", "their", "then", "there", "these", "they", "this", "to", "was",
        "were", "will", "with", "would",
        // domain chatter
        "movie", "movies", "film", "films", "watch", "watching", "find", "show", "give",
        "recommend", "suggest", "want", "looking", "please",
        // consumed by the numeric extractors
        "under", "over", "than", "less", "more", "shorter", "longer", "least", "most", "about",
        "minute", "minutes", "min", "mins", "hour", "hours", "hr", "hrs", "year", "years",
        "before", "after", "since", "until", "recent", "recently",
    ]
    .into_iter()
    .collect()
});
