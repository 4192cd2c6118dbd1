//! String and set similarity primitives used by the matcher.

use std::collections::HashSet;
use std::hash::Hash;

/// Classic Levenshtein distance (single-character insert, delete,
/// substitute). Symmetric; zero only when the strings are equal.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=a.len()).collect();
    let mut curr: Vec<usize> = vec![0; a.len() + 1];

    for (j, bc) in b.iter().enumerate() {
        curr[0] = j + 1;
        for (i, ac) in a.iter().enumerate() {
            let cost = if ac == bc { 0 } else { 1 };
            curr[i + 1] = (curr[i] + 1).min(prev[i + 1] + 1).min(prev[i] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[a.len()]
}

/// Jaccard similarity: |intersection| / |union|. Two empty sets
/// score 0 rather than dividing by zero.
pub fn jaccard<T: Eq + Hash>(a: &HashSet<T>, b: &HashSet<T>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    intersection as f64 / union as f64
}

/// Asymmetric overlap: |intersection| / |key set|. Penalizes only
/// against the key's vocabulary size, not the query's.
pub fn overlap(query: &HashSet<String>, key: &HashSet<String>) -> f64 {
    if key.is_empty() {
        return 0.0;
    }
    let intersection = query.intersection(key).count();
    intersection as f64 / key.len() as f64
}

/// Contiguous n-word windows over whitespace-split tokens, in order.
/// Empty when the text has fewer than `n` words.
pub fn ngrams(text: &str, n: usize) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if n == 0 || words.len() < n {
        return Vec::new();
    }
    words.windows(n).map(|w| w.join(" ")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn set(words: &[&str]) -> HashSet<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_edit_distance_basics() {
        assert_eq!(edit_distance("library", "library"), 0);
        assert_eq!(edit_distance("libary", "library"), 1);
        assert_eq!(edit_distance("", "hours"), 5);
        assert_eq!(edit_distance("kitten", "sitting"), 3);
    }

    #[test]
    fn test_edit_distance_symmetric() {
        assert_eq!(edit_distance("timing", "timings"), edit_distance("timings", "timing"));
    }

    #[test]
    fn test_jaccard() {
        let a = set(&["library", "hours"]);
        let b = set(&["library", "fine"]);
        assert_relative_eq!(jaccard(&a, &b), 1.0 / 3.0);

        let empty: HashSet<String> = HashSet::new();
        assert_relative_eq!(jaccard(&empty, &empty), 0.0);
    }

    #[test]
    fn test_overlap_is_asymmetric() {
        let query = set(&["what", "are", "the", "library", "hours"]);
        let key = set(&["library", "hours"]);
        assert_relative_eq!(overlap(&query, &key), 1.0);
        assert_relative_eq!(overlap(&key, &query), 2.0 / 5.0);
        assert_relative_eq!(overlap(&query, &HashSet::new()), 0.0);
    }

    #[test]
    fn test_ngrams() {
        assert_eq!(
            ngrams("what are the hours", 2),
            vec!["what are", "are the", "the hours"]
        );
        assert_eq!(ngrams("what are the hours", 3), vec!["what are the", "are the hours"]);
        assert!(ngrams("hours", 2).is_empty());
    }
}
