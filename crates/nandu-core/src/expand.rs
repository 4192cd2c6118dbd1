//! Synonym and semantic-field expansion of query terms.
//!
//! The synonym table is directional: "hours" lists "timing" but the
//! reverse holds only because it is spelled out too. Semantic fields
//! pull in a whole topical cluster when any of its members appears in
//! the query; fields are checked in declaration order and the first
//! field containing the word wins. Expansion is one level deep.

use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

/// Directional synonym table, term -> related terms.
pub static SYNONYMS: Lazy<HashMap<&'static str, &'static [&'static str]>> = Lazy::new(|| {
    let entries: &[(&str, &[&str])] = &[
        ("hours", &["timing", "timings", "time", "schedule", "open", "close", "when", "today"]),
        ("timing", &["hours", "timings", "time", "schedule", "open", "when", "today"]),
        ("timings", &["hours", "timing", "time", "schedule", "open", "when", "today"]),
        ("open", &["timing", "hours", "schedule", "timings", "available", "accessible", "today"]),
        ("today", &["timing", "hours", "schedule", "open", "now"]),
        ("when", &["timing", "hours", "time", "schedule", "what time"]),
        ("fine", &["penalty", "charge", "fee", "fines", "late fee", "overdue"]),
        ("renew", &["renewal", "extend", "extension", "reissue"]),
        ("renewal", &["renew", "extend", "extension", "reissue"]),
        ("issue", &["borrow", "checkout", "take", "get", "loan", "issued"]),
        ("issued", &["issue", "borrow", "checkout", "take", "get", "loan"]),
        ("borrow", &["issue", "checkout", "take", "get", "loan", "borrowing"]),
        ("borrowing", &["issue", "checkout", "borrow", "take", "get", "loan"]),
        ("return", &["submit", "give back", "bring back"]),
        ("search", &["find", "look", "locate", "discover"]),
        ("find", &["search", "look", "locate", "get"]),
        ("e-journals", &["ejournal", "ejournals", "e-journal", "journal", "journals", "e-resources", "digital", "online"]),
        ("ejournal", &["e-journals", "ejournals", "e-journal", "journals", "e-resources"]),
        ("e-resources", &["eresources", "e-journals", "ejournals", "digital", "online", "electronic"]),
        ("help", &["assist", "support", "guide", "information"]),
        ("access", &["use", "get", "obtain", "available"]),
        ("library", &["lib", "central library", "nandu"]),
        ("book", &["books", "publication", "text", "volume"]),
        ("books", &["book", "publication", "texts", "volumes"]),
        ("collection", &["holdings", "resources", "materials", "total"]),
        ("total", &["collection", "number", "how many", "count"]),
        ("privilege", &["privileges", "rights", "benefits", "entitlement"]),
        ("privileges", &["privilege", "rights", "benefits", "entitlements"]),
        ("member", &["membership", "registration", "account"]),
        ("card", &["id card", "library card", "identity"]),
        ("database", &["db", "databases", "resource"]),
        ("journal", &["journals", "periodical", "publication"]),
        ("contact", &["reach", "call", "email", "phone"]),
        ("faculty", &["teacher", "professor", "staff"]),
        ("student", &["pupil", "scholar", "learner"]),
        ("research", &["study", "investigation", "analysis"]),
        ("thesis", &["dissertation", "project", "paper"]),
        ("reference", &["ref", "citation", "source"]),
        ("digital", &["online", "electronic", "e-"]),
        ("wifi", &["internet", "network", "connection"]),
        ("computer", &["pc", "laptop", "system"]),
        ("room", &["space", "area", "hall"]),
        ("quiet", &["silent", "noise-free", "peaceful"]),
        ("reservation", &["booking", "reserve", "hold"]),
        ("location", &["address", "place", "where"]),
        ("floor", &["level", "storey"]),
        ("section", &["department", "division", "area"]),
        ("catalogue", &["catalog", "opac", "database"]),
        ("available", &["accessibility", "free", "accessible"]),
        ("allowed", &["permitted", "can i", "able to", "possible"]),
        ("closed", &["shut", "not open", "unavailable"]),
        ("holiday", &["vacation", "break", "festival"]),
        ("exam", &["examination", "test", "assessment"]),
        ("lost", &["missing", "misplaced", "can't find"]),
        ("damage", &["damaged", "torn", "broken"]),
        ("payment", &["pay", "charge", "cost", "price"]),
        ("online", &["internet", "web", "digital"]),
        ("remote", &["off-campus", "home", "external"]),
        ("vpn", &["virtual private network", "secure connection"]),
    ];
    entries.iter().copied().collect()
});

/// Topical clusters, checked in declaration order.
pub static SEMANTIC_FIELDS: Lazy<Vec<(&'static str, &'static [&'static str])>> = Lazy::new(|| {
    vec![
        ("timing", &["open", "close", "hours", "schedule", "available", "today", "time", "when"] as &[&str]),
        ("borrowing", &["issue", "checkout", "return", "renew", "due date", "loan", "borrow", "issued", "privilege", "limit"]),
        ("fines", &["penalty", "charge", "overdue", "late", "fee", "payment", "fine"]),
        ("resources", &["ejournal", "database", "online", "digital", "access", "e-resources", "collection", "books", "holdings"]),
        ("facility", &["room", "space", "wifi", "computer", "printer", "technobooth"]),
        ("membership", &["card", "registration", "account", "student", "faculty", "member", "who"]),
    ]
});

/// Expand a set of query words with synonyms and semantic fields.
/// Expanded terms are not themselves re-expanded.
pub fn expand(words: &HashSet<String>) -> HashSet<String> {
    let mut expanded: HashSet<String> = words.clone();

    for word in words {
        if let Some(synonyms) = SYNONYMS.get(word.as_str()) {
            for synonym in *synonyms {
                expanded.insert((*synonym).to_string());
            }
        }
    }

    for word in words {
        for (_field, terms) in SEMANTIC_FIELDS.iter() {
            if terms.contains(&word.as_str()) {
                for term in *terms {
                    expanded.insert((*term).to_string());
                }
                break;
            }
        }
    }

    expanded
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(words: &[&str]) -> HashSet<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_direct_synonym_lookup() {
        let expanded = expand(&set(&["fine"]));
        assert!(expanded.contains("penalty"));
        assert!(expanded.contains("overdue"));
        assert!(expanded.contains("fine"));
    }

    #[test]
    fn test_synonyms_are_directional() {
        // "lib" is a synonym of "library", but not the other way round
        let expanded = expand(&set(&["lib"]));
        assert!(!expanded.contains("library"));
    }

    #[test]
    fn test_field_member_pulls_whole_field() {
        let expanded = expand(&set(&["checkout"]));
        // "checkout" is in the borrowing field
        assert!(expanded.contains("renew"));
        assert!(expanded.contains("loan"));
        assert!(expanded.contains("due date"));
    }

    #[test]
    fn test_one_level_deep() {
        // "hours" expands to "schedule"; "schedule" is a member of the
        // timing field, which happens to contain "hours" terms anyway,
        // but nothing reachable only through a second hop appears.
        let expanded = expand(&set(&["renewal"]));
        assert!(expanded.contains("extend"));
        // "extend" is not in any table, so no further growth
        assert!(!expanded.contains("extension s"));
    }

    #[test]
    fn first_field_wins_for_shared_terms() {
        // "charge" belongs to the fines field; "payment" does too. Both
        // resolve to fines (declaration order) even though "payment" is
        // also a synonym key. The fines cluster comes in whole.
        let expanded = expand(&set(&["charge"]));
        assert!(expanded.contains("overdue"));
        assert!(expanded.contains("late"));
        // Nothing from the facility field leaks in
        assert!(!expanded.contains("printer"));
    }
}
