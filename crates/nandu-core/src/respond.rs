//! Response payloads, canned tables and formatting.
//!
//! Every "random" pick (greeting fallback, generic answer prefix,
//! clarification phrasing) goes through a [`Seeder`] so tests can pin
//! deterministic output.

use crate::catalogue::CatalogueResults;
use crate::matcher::MatchSource;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Injectable randomness source for phrase picks.
#[derive(Debug)]
pub enum Seeder {
    /// Counter starting at a fixed value; deterministic for tests.
    Fixed(AtomicU64),
    /// Fresh entropy per pick.
    Entropy,
}

impl Seeder {
    pub fn fixed(start: u64) -> Self {
        Seeder::Fixed(AtomicU64::new(start))
    }

    pub fn next(&self) -> u64 {
        match self {
            Seeder::Fixed(counter) => counter.fetch_add(1, Ordering::Relaxed),
            Seeder::Entropy => rand::random(),
        }
    }
}

/// What kind of response the resolver produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseKind {
    Greeting,
    General,
    BookSearch,
    Clarification,
    ValidationError,
    RateLimited,
    Error,
}

/// The structured result of resolving one query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// HTML-bearing answer text
    pub text: String,
    pub kind: ResponseKind,
    /// Which matching strategy produced a general answer, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<MatchSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_score: Option<f64>,
    pub from_cache: bool,
    pub processing_time_ms: u64,
}

impl Response {
    pub fn new(text: impl Into<String>, kind: ResponseKind) -> Self {
        Self {
            text: text.into(),
            kind,
            source: None,
            match_score: None,
            from_cache: false,
            processing_time_ms: 0,
        }
    }

    pub fn with_source(mut self, source: MatchSource, score: Option<f64>) -> Self {
        self.source = Some(source);
        self.match_score = score;
        self
    }
}

/// Greeting responses, substring-matched in declaration order.
const GREETINGS: &[(&str, &str)] = &[
    (
        "hello",
        "👋 Hello! I'm Nandu, the library helpdesk assistant. I'm here to help \
         you with all your library-related questions about timings, policies, \
         services, and facilities.",
    ),
    (
        "hi",
        "🌟 Hi there! Ready to explore the world of knowledge? I can help you \
         find information about library hours, fine policies, e-resources, and \
         much more!",
    ),
    (
        "hey",
        "✨ Hey! Great to see you here. I'm your personal library guide - ask \
         me anything about our services, policies, or facilities.",
    ),
    (
        "good",
        "🎓 Good to meet you! I'm here to make your library experience smooth \
         and enjoyable. What would you like to know today?",
    ),
    ("nandu", "Hello! I am Nandu, the library helpdesk assistant."),
];

/// Pick a greeting: first table keyword found in the query wins,
/// otherwise a seeded pick from the whole table.
pub fn greeting_response(query: &str, seed: u64) -> String {
    let query_lower = query.to_lowercase();
    for (keyword, response) in GREETINGS {
        if query_lower.contains(keyword) {
            return (*response).to_string();
        }
    }
    GREETINGS[(seed as usize) % GREETINGS.len()].1.to_string()
}

const GENERIC_PREFIXES: &[&str] = &[
    "💡 <strong>Here's what I found:</strong><br><br>",
    "ℹ️ <strong>Library Information:</strong><br><br>",
    "✨ <strong>Here's the information you need:</strong><br><br>",
    "📚 <strong>From our library database:</strong><br><br>",
];

/// Context-aware prefix for a matched general answer.
pub fn response_prefix(query: &str, seed: u64) -> &'static str {
    let q = query.to_lowercase();
    if q.contains("hour") || q.contains("timing") || q.contains("time") {
        "⏰ <strong>Library Hours:</strong><br><br>"
    } else if q.contains("fine") || q.contains("penalty") || q.contains("charge") {
        "💰 <strong>Fine &amp; Penalty Information:</strong><br><br>"
    } else if q.contains("e-resource") || q.contains("online") || q.contains("database") {
        "🌐 <strong>Digital Resources:</strong><br><br>"
    } else if q.contains("contact") || q.contains("phone") || q.contains("email") {
        "📞 <strong>Contact Information:</strong><br><br>"
    } else {
        GENERIC_PREFIXES[(seed as usize) % GENERIC_PREFIXES.len()]
    }
}

const CLARIFICATION_PREFIXES: &[&str] = &[
    "🤔 <strong>I'd like to help, but I need more details.</strong><br><br>",
    "💭 <strong>Could you be more specific?</strong><br><br>",
    "❓ <strong>I want to give you the right information.</strong><br><br>",
    "🎯 <strong>Let me understand better.</strong><br><br>",
    "💡 <strong>I'm here to help!</strong><br><br>",
];

const TIME_SUGGESTIONS: &[&str] = &[
    "📅 <strong>Library hours and schedules</strong>",
    "⏰ <strong>Specific timing information</strong>",
    "🕐 <strong>Holiday and exam timings</strong>",
];
const SERVICE_SUGGESTIONS: &[&str] = &[
    "📖 <strong>Book borrowing procedures</strong>",
    "🔄 <strong>Renewal and return policies</strong>",
    "💰 <strong>Fine and penalty information</strong>",
];
const RESOURCE_SUGGESTIONS: &[&str] = &[
    "🌐 <strong>E-resources and databases</strong>",
    "📚 <strong>Online journal access</strong>",
    "🔐 <strong>VPN and remote access</strong>",
];
const FACILITY_SUGGESTIONS: &[&str] = &[
    "🏢 <strong>Library facilities and services</strong>",
    "💻 <strong>Computer and printing services</strong>",
    "📖 <strong>Study rooms and spaces</strong>",
];
const GENERIC_SUGGESTIONS: &[&str] = &[
    "⏰ <strong>Library hours and timings</strong>",
    "📖 <strong>Book borrowing and policies</strong>",
    "💰 <strong>Fine policies and charges</strong>",
    "🌐 <strong>E-resources and digital access</strong>",
    "🏢 <strong>Library facilities and services</strong>",
];

fn contains_any(text: &str, words: &[&str]) -> bool {
    words.iter().any(|w| text.contains(w))
}

/// Build a clarification response: a suggestion cluster chosen by
/// keyword family, wrapped in a seeded prefatory phrasing.
pub fn clarification_response(query: &str, seed: u64) -> String {
    let q = query.to_lowercase();

    let suggestions: &[&str] = if contains_any(&q, &["time", "timing", "hours", "open", "close", "schedule", "when"]) {
        TIME_SUGGESTIONS
    } else if contains_any(&q, &["borrow", "return", "fine", "penalty", "issue", "renew", "membership"]) {
        SERVICE_SUGGESTIONS
    } else if contains_any(&q, &["journal", "database", "eresource", "vpn", "online"]) {
        RESOURCE_SUGGESTIONS
    } else if contains_any(&q, &["room", "reading", "technobooth", "printer", "wifi", "computer"]) {
        FACILITY_SUGGESTIONS
    } else {
        GENERIC_SUGGESTIONS
    };

    let prefix = CLARIFICATION_PREFIXES[(seed as usize) % CLARIFICATION_PREFIXES.len()];
    let list = suggestions
        .iter()
        .map(|s| format!("• {}", s))
        .collect::<Vec<_>>()
        .join("<br>");

    format!(
        "{}{}<br><br>📞 <strong>Direct Help:</strong> libraryhelpdesk@example.edu",
        prefix, list
    )
}

/// Render catalogue results for display.
pub fn format_book_results(results: &CatalogueResults, term: &str) -> String {
    let mut html = format!("<strong>Search Results for: \"{}\"</strong><br><br>", term);

    if results.results.is_empty() {
        html.push_str("No books found in search. Check the catalogue for complete results.<br><br>");
    } else {
        html.push_str(&format!("<strong>{} Book(s) Found:</strong><br><br>", results.total_results));
        for (idx, book) in results.results.iter().enumerate() {
            html.push_str(&format!("<strong>{}. {}</strong><br>", idx + 1, book.title));
            if let Some(author) = &book.author {
                html.push_str(&format!("<strong>Author:</strong> {}<br>", author));
            }
            if !book.accession_numbers.is_empty() {
                html.push_str(&format!(
                    "<strong>Accession:</strong> {}<br>",
                    book.accession_numbers.join(", ")
                ));
            }
            if let Some(call_number) = &book.call_number {
                html.push_str(&format!("<strong>Call Number:</strong> {}<br>", call_number));
            }
            if let Some(copies) = book.copies {
                html.push_str(&format!("<strong>Copies:</strong> {}<br>", copies));
            }
            html.push_str(&format!("<strong>Availability:</strong> {}", book.availability));
            if let Some(url) = &book.opac_url {
                html.push_str(&format!(" — <a href=\"{}\">View in catalogue</a>", url));
            }
            html.push_str("<br><br>");
        }
    }

    html.push_str(&format!(
        "<a href=\"{}\">Search Catalogue →</a>",
        results.opac_url
    ));
    html
}

/// Static degrade response when the catalogue delegate is down.
pub fn catalogue_fallback_text(opac_url: &str) -> String {
    format!(
        "📖 I couldn't search the catalogue just now. You can search the \
         complete collection directly: <a href=\"{}\">Open Catalogue</a>",
        opac_url
    )
}

/// Help shown when a book-search query carries no usable search term.
pub fn book_search_help_text(opac_url: &str) -> String {
    format!(
        "📚 <strong>What would you like to search for?</strong><br><br>\
         You can search the collection by:<br>\
         • <strong>Title:</strong> 'Search for Python programming'<br>\
         • <strong>Author:</strong> 'Search books by Knuth'<br>\
         • <strong>Subject:</strong> 'Find books on machine learning'<br><br>\
         <a href=\"{}\">Browse Full Catalogue</a>",
        opac_url
    )
}

static BR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<br\s*/?>").expect("br pattern"));
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("tag pattern"));

/// Flatten answer HTML into terminal-friendly plain text.
pub fn plain_text(html: &str) -> String {
    let with_breaks = BR_RE.replace_all(html, "\n");
    let stripped = TAG_RE.replace_all(&with_breaks, "");
    stripped
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::BookRecord;

    #[test]
    fn test_greeting_keyword_first_wins() {
        // "hello" precedes "hi" in the table and both are substrings here
        let response = greeting_response("hello hi", 3);
        assert!(response.starts_with("👋"));
    }

    #[test]
    fn test_greeting_seeded_fallback_is_deterministic() {
        let a = greeting_response("namaste", 2);
        let b = greeting_response("namaste", 2);
        assert_eq!(a, b);
        assert_eq!(a, GREETINGS[2].1);
    }

    #[test]
    fn test_prefix_families() {
        assert!(response_prefix("library hours", 0).contains("Library Hours"));
        assert!(response_prefix("fine for late return", 0).contains("Penalty"));
        assert!(response_prefix("online databases", 0).contains("Digital Resources"));
        assert!(response_prefix("phone number", 0).contains("Contact"));
        assert_eq!(response_prefix("borrowing limit", 1), GENERIC_PREFIXES[1]);
    }

    #[test]
    fn test_clarification_picks_cluster() {
        let timing = clarification_response("opening something", 0);
        assert!(timing.contains("timing information"));

        let generic = clarification_response("zzz unknown", 4);
        assert!(generic.starts_with(CLARIFICATION_PREFIXES[4]));
        assert!(generic.contains("E-resources and digital access"));
        assert!(generic.contains("Direct Help"));
    }

    #[test]
    fn test_format_book_results_zero_and_some() {
        let empty = CatalogueResults {
            results: vec![],
            total_results: 0,
            opac_url: "https://opac.example.edu/".to_string(),
        };
        let text = format_book_results(&empty, "plasma physics");
        assert!(text.contains("No books found"));
        assert!(text.contains("Search Catalogue"));

        let some = CatalogueResults {
            results: vec![BookRecord {
                title: "Plasma Physics".to_string(),
                author: Some("Chen".to_string()),
                accession_numbers: vec!["A1".to_string()],
                call_number: Some("530.4 CHE".to_string()),
                copies: Some(3),
                publisher: None,
                location: None,
                availability: "Available".to_string(),
                opac_url: None,
            }],
            total_results: 1,
            opac_url: "https://opac.example.edu/".to_string(),
        };
        let text = format_book_results(&some, "plasma physics");
        assert!(text.contains("1. Plasma Physics"));
        assert!(text.contains("Chen"));
    }

    #[test]
    fn test_plain_text_flattens_markup() {
        assert_eq!(
            plain_text("💰 <strong>Fine &amp; Penalty Information:</strong><br><br>Rs. 1 per day"),
            "💰 Fine & Penalty Information:\n\nRs. 1 per day"
        );
        assert_eq!(plain_text("no markup"), "no markup");
    }

    #[test]
    fn test_seeder_fixed_counts_up() {
        let seeder = Seeder::fixed(7);
        assert_eq!(seeder.next(), 7);
        assert_eq!(seeder.next(), 8);
    }
}
