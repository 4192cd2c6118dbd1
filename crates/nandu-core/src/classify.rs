//! Query classification: greeting vs. book search vs. general FAQ.
//!
//! An ordered list of pattern -> label rules, evaluated top to bottom.
//! Greeting rules come first, so a greeting that also mentions books
//! still greets. Every string gets exactly one label.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// The three request kinds the resolver routes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    Greeting,
    BookSearch,
    General,
}

struct IntentRule {
    kind: QueryKind,
    pattern: Regex,
}

static INTENT_RULES: Lazy<Vec<IntentRule>> = Lazy::new(|| {
    let rule = |kind, pattern: &str| IntentRule {
        kind,
        pattern: Regex::new(pattern).expect("intent rule pattern"),
    };

    vec![
        // Conversational openers, tolerant of trailing punctuation
        // ("hello, can you..." is still a greeting).
        rule(
            QueryKind::Greeting,
            r"(?i)^(hi|hello|hey|good\s+(morning|afternoon|evening)|nandu|hii+|helo+)([\s,!.?].*)?$",
        ),
        rule(
            QueryKind::Greeting,
            r"(?i)^(what'?s\s+up|how\s+are\s+you|nice\s+to\s+meet\s+you)([\s,!.?].*)?$",
        ),
        // Explicit search verb + book noun + preposition
        rule(
            QueryKind::BookSearch,
            r"(?i)^(search|find|look for|show|give|list)\s+(me\s+)?(books?|titles?|novels?|publications?)\s+(on|about|for|by|called|named)",
        ),
        rule(QueryKind::BookSearch, r"(?i)^books?\s+(on|about|for|by|called|named)\s+"),
        rule(QueryKind::BookSearch, r"(?i)search\s+(catalogue|catalog|opac|library)\s+for"),
        rule(
            QueryKind::BookSearch,
            r"(?i)^(where|how)\s+.*(find|search).*books?\s+(on|about|for|by)",
        ),
    ]
});

/// Classify a raw query. Total and deterministic.
pub fn classify(query: &str) -> QueryKind {
    for rule in INTENT_RULES.iter() {
        if rule.pattern.is_match(query) {
            return rule.kind;
        }
    }
    QueryKind::General
}
