//! The knowledge base: canonical question keys mapped to answers.
//!
//! A key may carry several interchangeable phrasings joined by `|`;
//! each variant is tried independently during matching. The mapping is
//! loaded once (remote JSON with a builtin fallback) and never mutated
//! afterwards.

use crate::error::NanduError;
use serde::{Deserialize, Serialize};

/// Answer payload for one canonical question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    pub intent: String,
    /// HTML-bearing answer text
    pub answer: String,
}

/// JSON values are either a bare answer string or a full entry.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Full { intent: String, answer: String },
    Text(String),
}

/// Immutable mapping of question keys (possibly `|`-joined variant
/// sets) to answers. Keys are unique; iteration order is stable.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    entries: Vec<(String, KnowledgeEntry)>,
}

impl KnowledgeBase {
    /// Parse from a JSON object document.
    pub fn from_json(json: &str) -> Result<Self, NanduError> {
        let raw: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json)?;

        let mut entries = Vec::with_capacity(raw.len());
        for (key, value) in raw {
            let entry = match serde_json::from_value::<RawEntry>(value)? {
                RawEntry::Full { intent, answer } => KnowledgeEntry { intent, answer },
                RawEntry::Text(answer) => KnowledgeEntry {
                    intent: "general".to_string(),
                    answer,
                },
            };
            entries.push((key, entry));
        }

        Ok(Self { entries })
    }

    /// Serialize back to the JSON document shape (used by the loader's
    /// disk cache).
    pub fn to_json(&self) -> Result<String, NanduError> {
        let map: serde_json::Map<String, serde_json::Value> = self
            .entries
            .iter()
            .map(|(k, e)| (k.clone(), serde_json::to_value(e).unwrap_or_default()))
            .collect();
        Ok(serde_json::to_string_pretty(&map)?)
    }

    pub fn get(&self, key: &str) -> Option<&KnowledgeEntry> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, e)| e)
    }

    /// Keys in stable order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Split a key into its `|`-delimited variants, trimmed.
    pub fn key_variants(key: &str) -> Vec<&str> {
        if key.contains('|') {
            key.split('|').map(str::trim).collect()
        } else {
            vec![key]
        }
    }

    /// Deterministic offline fallback set, used when the remote source
    /// stays unreachable after retries.
    pub fn builtin() -> Self {
        let mut entries = Vec::new();
        let mut add = |key: &str, intent: &str, answer: &str| {
            entries.push((
                key.to_string(),
                KnowledgeEntry {
                    intent: intent.to_string(),
                    answer: answer.to_string(),
                },
            ));
        };

        add(
            "library hours|hours|timings|timing|opening hours",
            "timing",
            "The library is open all year. The ground floor stack and reading \
             area are open 24/7. The first floor is open from 6 AM to 2 AM. \
             Issue/return via the kiosk is available 24/7; staff counter \
             timings are 9 AM to 5:30 PM on working days.",
        );
        add(
            "fine policy|fines|overdue charges|late fee",
            "policy",
            "Library fine policy:<br><br>\
             1. Books: students ₹2 per day per book, faculty/staff ₹5 per day \
             per book, capped at the book price.<br>\
             2. Magazines and journals: ₹10 per day per item.<br>\
             3. Lost books: cost of the book plus a ₹100 processing fee \
             (150% of the price if out of print).<br>\
             4. Payment: online preferred; cash or DD at the counter.<br>\
             5. Grace period: 3 days for renewals; no fine during institute \
             holidays.<br><br>Contact: libraryhelpdesk@example.edu",
        );
        add(
            "e-resources|e resources|ejournals|online databases",
            "resources",
            "E-resources and services:<br><br>\
             1. Digital library portal with local digital collections.<br>\
             2. Major databases: IEEE Xplore, ACM Digital Library, Science \
             Direct, Springer Link, Web of Science, Scopus, JSTOR.<br>\
             3. E-books from Cengage, McGraw Hill, Taylor &amp; Francis and \
             Cambridge University Press.<br>\
             4. Access: direct on campus, VPN off campus.<br><br>\
             Support: libraryhelpdesk@example.edu",
        );
        add(
            "contact information|contact|contact library|phone number",
            "contact",
            "Library contact information:<br><br>\
             Phone: main desk 242175, librarian 242176, circulation 242177.<br>\
             Email: library@example.edu (general), \
             libraryhelpdesk@example.edu (help desk).<br>\
             Service hours: ground floor 24/7, staff counter 9 AM to 5:30 PM \
             on working days, help desk 9 AM to 5 PM Mon-Fri.",
        );
        add(
            "dspace|institutional repository|research repository",
            "resources",
            "DSpace is the institutional repository hosting theses, \
             dissertations, question papers and faculty publications. It is \
             accessible on campus from the library website; off campus it \
             requires VPN.",
        );
        add(
            "koha|opac|library catalogue software",
            "resources",
            "The library catalogue runs on Koha. Use the OPAC to search \
             holdings, place holds and check your borrower account. Your \
             login is your institute ID.",
        );
        add(
            "vpn access|remote access|off-campus access",
            "resources",
            "Off-campus access to e-resources requires the institute VPN. \
             Install the VPN client from the IT portal, sign in with your \
             institute credentials and all subscribed databases work as if \
             on campus.",
        );
        add(
            "technobooth|techno booth",
            "facility",
            "The Technobooth is a soundproof recording booth on the first \
             floor for recording lectures and presentations. Book a slot at \
             the help desk; sessions are limited to two hours.",
        );
        add(
            "borrowing privileges|how many books can i borrow|book limit",
            "borrowing",
            "Borrowing privileges:<br><br>\
             Students may borrow up to 6 books for 14 days. Faculty may \
             borrow up to 10 books for one semester. Staff may borrow up to \
             4 books for 30 days. Reference items and current journal issues \
             are not issued.",
        );
        add(
            "book renewal|renew books|renewal",
            "borrowing",
            "Books can be renewed twice if no one else has placed a hold. \
             Renew online through the OPAC account page, at the kiosk, or at \
             the circulation counter before the due date.",
        );

        Self { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_variants() {
        assert_eq!(
            KnowledgeBase::key_variants("library hours|hours| timings"),
            vec!["library hours", "hours", "timings"]
        );
        assert_eq!(KnowledgeBase::key_variants("fine policy"), vec!["fine policy"]);
    }

    #[test]
    fn test_from_json_string_or_object() {
        let kb = KnowledgeBase::from_json(
            r#"{
                "wifi": "Campus wifi covers the whole building.",
                "library hours|hours": {"intent": "timing", "answer": "Open 24/7."}
            }"#,
        )
        .unwrap();

        assert_eq!(kb.len(), 2);
        assert_eq!(kb.get("wifi").unwrap().intent, "general");
        assert_eq!(kb.get("library hours|hours").unwrap().intent, "timing");
    }

    #[test]
    fn test_from_json_keeps_document_order() {
        // Strategy tie-breaks walk keys in order, so a loaded KB must
        // iterate as the source document does, not alphabetically.
        let kb = KnowledgeBase::from_json(
            r#"{"zebra crossing": "z", "apple": "a", "mango": "m"}"#,
        )
        .unwrap();
        assert_eq!(
            kb.keys().collect::<Vec<_>>(),
            vec!["zebra crossing", "apple", "mango"]
        );
    }

    #[test]
    fn test_builtin_covers_heuristic_topics() {
        let kb = KnowledgeBase::builtin();
        assert!(!kb.is_empty());
        let joined: String = kb.keys().collect::<Vec<_>>().join(" ");
        for topic in ["hours", "fine", "dspace", "koha", "vpn", "technobooth"] {
            assert!(joined.contains(topic), "builtin KB missing {}", topic);
        }
    }

    #[test]
    fn test_json_round_trip_preserves_entries() {
        let kb = KnowledgeBase::builtin();
        let reloaded = KnowledgeBase::from_json(&kb.to_json().unwrap()).unwrap();
        assert_eq!(reloaded.len(), kb.len());
    }
}
