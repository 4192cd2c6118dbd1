//! Knowledge base matching: a three-strategy cascade.
//!
//! Strategy 1 tries the normalized query and each generated
//! alternative for string equality against every key variant.
//! Strategy 2 scores alternatives against variants with edit distance
//! and containment, cutoff 0.8. Strategy 3 expands the query's word
//! set with synonyms and semantic fields and computes a weighted
//! Jaccard/overlap/phrase score with heuristic boosts and penalties
//! against a dynamic acceptance threshold.

use crate::error::NanduError;
use crate::expand::expand;
use crate::kb::KnowledgeBase;
use crate::normalize::QueryIntent;
use crate::similarity::{edit_distance, jaccard, ngrams, overlap};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Which strategy produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSource {
    Exact,
    Fuzzy,
    Semantic,
}

/// A successful match against a knowledge base key.
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub key: String,
    pub score: f64,
    pub source: MatchSource,
}

/// Outcome of the cascade. A rejection still carries the best
/// candidate so the caller can log it for analytics.
#[derive(Debug, Clone)]
pub enum MatchOutcome {
    Matched(MatchResult),
    NoMatch {
        best_key: Option<String>,
        best_score: f64,
    },
}

/// Minimum fuzzy score for a key to be considered at all.
const FUZZY_CUTOFF: f64 = 0.8;

/// Weighted-semantic score composition.
const JACCARD_WEIGHT: f64 = 0.25;
const OVERLAP_WEIGHT: f64 = 0.60;
const PHRASE_WEIGHT: f64 = 0.15;

/// Multiplier when query and key word counts differ by more than 3.
const LENGTH_MISMATCH_PENALTY: f64 = 0.5;
/// Multiplier when an important query term appears in the key.
const IMPORTANT_TERM_BOOST: f64 = 1.2;
/// Multiplier when at least one query n-gram appears in the key.
const PHRASE_MATCH_BOOST: f64 = 1.15;
/// Multiplier for timing-flavoured queries scored against
/// repository/catalogue-software keys.
const CROSS_TOPIC_PENALTY: f64 = 0.1;

const DEFAULT_THRESHOLD: f64 = 0.40;
const PRIORITY_THRESHOLD: f64 = 0.30;
const SPECIFIC_THRESHOLD: f64 = 0.25;

const STOPWORDS: &[&str] = &[
    "is", "are", "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of",
    "with", "by",
];

const IMPORTANT_TERMS: &[&str] = &[
    "library", "book", "books", "timing", "hours", "fine", "vpn", "dspace", "koha",
    "technobooth", "renewal", "borrow", "issue", "issued", "privilege", "privileges",
    "collection", "total", "many", "number",
];

const TIMING_WORDS: &[&str] = &["open", "timing", "hours", "schedule", "close", "today", "time"];

/// Substrings that lower the semantic threshold for common queries.
const PRIORITY_SUBSTRINGS: &[&str] = &["library", "timing", "hours", "open", "borrow", "fine"];
/// Substrings that lower it further for specific technical terms.
const SPECIFIC_SUBSTRINGS: &[&str] = &["technobooth", "dspace", "koha", "vpn", "opac"];

/// Run the cascade. An empty knowledge base is an internal-state
/// error, not a silent miss.
pub fn find_match(raw_query: &str, kb: &KnowledgeBase) -> Result<MatchOutcome, NanduError> {
    if kb.is_empty() {
        return Err(NanduError::KnowledgeBaseNotLoaded);
    }

    let intent = QueryIntent::extract(raw_query);

    // Strategy 1: exact match over candidates in generation order.
    for candidate in std::iter::once(intent.normalized.as_str())
        .chain(intent.alternatives.iter().map(String::as_str))
    {
        for key in kb.keys() {
            for variant in KnowledgeBase::key_variants(key) {
                if variant.to_lowercase().trim() == candidate {
                    debug!(candidate, key, "exact match");
                    return Ok(MatchOutcome::Matched(MatchResult {
                        key: key.to_string(),
                        score: 1.0,
                        source: MatchSource::Exact,
                    }));
                }
            }
        }
    }

    // Strategy 2: fuzzy string match, best score across all
    // alternatives and keys.
    let mut fuzzy_best: Option<(String, f64)> = None;
    for alternative in &intent.alternatives {
        for key in kb.keys() {
            let best_variant_score = KnowledgeBase::key_variants(key)
                .iter()
                .map(|variant| fuzzy_score(alternative, variant.to_lowercase().trim()))
                .fold(0.0_f64, f64::max);

            if best_variant_score >= FUZZY_CUTOFF
                && fuzzy_best
                    .as_ref()
                    .map(|(_, s)| best_variant_score > *s)
                    .unwrap_or(true)
            {
                fuzzy_best = Some((key.to_string(), best_variant_score));
            }
        }
    }
    if let Some((key, score)) = fuzzy_best {
        debug!(key, score, "fuzzy match");
        return Ok(MatchOutcome::Matched(MatchResult {
            key,
            score,
            source: MatchSource::Fuzzy,
        }));
    }

    // Strategy 3: weighted semantic match.
    Ok(semantic_match(&intent, kb))
}

/// Score one alternative against one key variant.
fn fuzzy_score(query: &str, variant: &str) -> f64 {
    if variant == query {
        return 1.0;
    }

    let query_len = query.chars().count();
    let variant_len = variant.chars().count();
    if query_len > 0 && variant_len > 0 && (variant.contains(query) || query.contains(variant)) {
        return query_len.min(variant_len) as f64 / query_len.max(variant_len) as f64;
    }

    let max_len = query_len.max(variant_len);
    if max_len == 0 {
        return 0.0;
    }
    let score = 1.0 - edit_distance(query, variant) as f64 / max_len as f64;
    if score < 0.5 {
        // Character-set rescue for badly transposed typos.
        let query_chars: HashSet<char> = query.chars().collect();
        let variant_chars: HashSet<char> = variant.chars().collect();
        return score.max(jaccard(&query_chars, &variant_chars));
    }
    score
}

fn semantic_match(intent: &QueryIntent, kb: &KnowledgeBase) -> MatchOutcome {
    let query_words: HashSet<String> = intent
        .normalized
        .split_whitespace()
        .map(String::from)
        .collect();
    let filtered: HashSet<String> = query_words
        .into_iter()
        .filter(|w| !STOPWORDS.contains(&w.as_str()))
        .collect();

    let phrases: HashSet<String> = ngrams(&intent.normalized, 2)
        .into_iter()
        .chain(ngrams(&intent.normalized, 3))
        .collect();

    let expanded = expand(&filtered);

    let query_has_timing = filtered.iter().any(|w| TIMING_WORDS.contains(&w.as_str()));

    let mut best_key: Option<String> = None;
    let mut best_score = 0.0_f64;

    for key in kb.keys() {
        for variant in KnowledgeBase::key_variants(key) {
            let variant_lower = variant.to_lowercase();
            let variant_norm = variant_lower.trim();
            let key_words: HashSet<String> =
                variant_norm.split_whitespace().map(String::from).collect();
            let key_phrases: HashSet<String> = ngrams(variant_norm, 2)
                .into_iter()
                .chain(ngrams(variant_norm, 3))
                .collect();

            let jaccard_score = jaccard(&expanded, &key_words);
            let overlap_score = overlap(&expanded, &key_words);
            let phrase_matches = phrases.intersection(&key_phrases).count();
            let phrase_score = if phrases.is_empty() {
                0.0
            } else {
                phrase_matches as f64 / phrases.len() as f64
            };

            let mut score = jaccard_score * JACCARD_WEIGHT
                + overlap_score * OVERLAP_WEIGHT
                + phrase_score * PHRASE_WEIGHT;

            let word_count_diff = filtered.len().abs_diff(key_words.len());
            if word_count_diff > 3 {
                score *= LENGTH_MISMATCH_PENALTY;
            }

            let important_hit = filtered
                .iter()
                .any(|w| IMPORTANT_TERMS.contains(&w.as_str()) && key_words.contains(w));
            if important_hit {
                score *= IMPORTANT_TERM_BOOST;
            }

            if phrase_matches > 0 {
                score *= PHRASE_MATCH_BOOST;
            }

            let key_is_repository = variant_norm.contains("dspace")
                || variant_norm.contains("repository")
                || variant_norm.contains("koha");
            if query_has_timing && key_is_repository {
                score *= CROSS_TOPIC_PENALTY;
            }

            if score > best_score {
                best_score = score;
                best_key = Some(key.to_string());
            }
        }
    }

    let threshold = semantic_threshold(&intent.normalized);

    match best_key {
        Some(key) if best_score > threshold => {
            debug!(key, best_score, threshold, "semantic match");
            MatchOutcome::Matched(MatchResult {
                key,
                score: best_score,
                source: MatchSource::Semantic,
            })
        }
        best_key => {
            debug!(?best_key, best_score, threshold, "no match above threshold");
            MatchOutcome::NoMatch {
                best_key,
                best_score,
            }
        }
    }
}

/// Dynamic acceptance threshold for the semantic layer, keyed off
/// substrings of the normalized query.
pub fn semantic_threshold(normalized_query: &str) -> f64 {
    if SPECIFIC_SUBSTRINGS.iter().any(|s| normalized_query.contains(s)) {
        SPECIFIC_THRESHOLD
    } else if PRIORITY_SUBSTRINGS.iter().any(|s| normalized_query.contains(s)) {
        PRIORITY_THRESHOLD
    } else {
        DEFAULT_THRESHOLD
    }
}
