//! Query normalization and alternative word-form generation.
//!
//! Normalization: lowercase, trim, strip everything outside
//! alphanumerics/whitespace/hyphen, collapse whitespace runs. The
//! alternatives feed the exact and fuzzy matching layers, so their
//! generation order matters: the first alternative that hits a key
//! wins a tie.

/// Normalize a raw query for matching. Idempotent.
pub fn normalize(raw: &str) -> String {
    let cleaned: String = raw
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() || c == '-' {
                c
            } else {
                ' '
            }
        })
        .collect();

    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Derived, per-query view of a raw user string.
#[derive(Debug, Clone)]
pub struct QueryIntent {
    /// Fully normalized query text
    pub normalized: String,
    /// Candidate phrasings in generation order (normalized form first)
    pub alternatives: Vec<String>,
    /// Whitespace-split words of the normalized query
    pub words: Vec<String>,
}

impl QueryIntent {
    /// Extract intent data and generate alternative phrasings.
    pub fn extract(raw: &str) -> Self {
        let normalized = normalize(raw);
        let words: Vec<String> = normalized.split(' ').map(String::from).collect();

        let mut alternatives: Vec<String> = Vec::new();
        let mut push = |alts: &mut Vec<String>, s: String| {
            if !alts.contains(&s) {
                alts.push(s);
            }
        };

        push(&mut alternatives, normalized.clone());
        push(&mut alternatives, normalized.replace(' ', ""));
        push(&mut alternatives, normalized.replace(' ', "-"));
        push(&mut alternatives, normalized.replace('-', " "));

        // Plural/singular variants: transform one word at a time,
        // leaving the rest of the string unchanged.
        for (i, word) in words.iter().enumerate() {
            if word.ends_with('s') && word.len() >= 4 {
                push(&mut alternatives, replace_word(&words, i, &word[..word.len() - 1]));
            } else if word.len() > 2 && !word.ends_with('s') {
                push(&mut alternatives, replace_word(&words, i, &format!("{}s", word)));
            }
        }

        Self {
            normalized,
            alternatives,
            words,
        }
    }
}

fn replace_word(words: &[String], index: usize, replacement: &str) -> String {
    let mut out: Vec<&str> = words.iter().map(String::as_str).collect();
    out[index] = replacement;
    out.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_punctuation() {
        assert_eq!(normalize("What are the library hours?!"), "what are the library hours");
        assert_eq!(normalize("  e-resources,  please  "), "e-resources please");
    }

    #[test]
    fn test_normalize_keeps_hyphen_and_digits() {
        assert_eq!(normalize("Wi-Fi on floor 2"), "wi-fi on floor 2");
    }

    #[test]
    fn test_normalize_idempotent() {
        let once = normalize("Hello!!  Library  HOURS???");
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn test_empty_input() {
        let intent = QueryIntent::extract("");
        assert_eq!(intent.normalized, "");
        assert_eq!(intent.alternatives, vec![String::new()]);
    }

    #[test]
    fn test_alternatives_start_with_normalized() {
        let intent = QueryIntent::extract("Library Hours");
        assert_eq!(intent.alternatives[0], "library hours");
        assert!(intent.alternatives.contains(&"libraryhours".to_string()));
        assert!(intent.alternatives.contains(&"library-hours".to_string()));
    }

    #[test]
    fn test_singular_variant_for_long_plural() {
        let intent = QueryIntent::extract("library hours");
        // "hours" has >=4 chars and ends in "s"
        assert!(intent.alternatives.contains(&"library hour".to_string()));
        // "library" does not end in "s", gets a plural form
        assert!(intent.alternatives.contains(&"librarys hours".to_string()));
    }

    #[test]
    fn test_one_word_transformed_per_variant() {
        let intent = QueryIntent::extract("fine policy");
        assert!(intent.alternatives.contains(&"fines policy".to_string()));
        assert!(intent.alternatives.contains(&"fine policys".to_string()));
        assert!(!intent.alternatives.contains(&"fines policys".to_string()));
    }
}
