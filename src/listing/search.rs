//! Case-insensitive search with fuzzy word matching.

use strsim::jaro_winkler;
use zendulge_domain::Searchable;

/// Similarity at or above which a word counts as a typo-level match.
pub const FUZZY_THRESHOLD: f64 = 0.9;
/// Shorter query tokens must match exactly; fuzzy scores are noisy below this.
pub const MIN_FUZZY_LEN: usize = 4;

fn token_matches(token: &str, haystack: &str) -> bool {
    if haystack.contains(token) {
        return true;
    }
    if token.chars().count() < MIN_FUZZY_LEN {
        return false;
    }
    haystack
        .split(|ch: char| !ch.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .any(|word| jaro_winkler(token, word) >= FUZZY_THRESHOLD)
}

/// Every whitespace-separated query token must match one of the record's
/// search terms. An empty query matches everything.
pub fn matches<T: Searchable + ?Sized>(record: &T, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    let haystack = record
        .search_terms()
        .iter()
        .map(|term| term.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");
    query
        .split_whitespace()
        .all(|token| token_matches(token, &haystack))
}
