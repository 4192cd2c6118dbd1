//! Catalogue-search collaborator: delegated book lookups.
//!
//! The core never stores or ranks holdings; it hands a cleaned search
//! term to the external catalogue endpoint and renders whatever comes
//! back. The trait seam lets tests inject a stub.

use crate::error::NanduError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

pub const DEFAULT_RESULT_LIMIT: usize = 5;

/// One book record as reported by the catalogue backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRecord {
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub accession_numbers: Vec<String>,
    #[serde(default)]
    pub call_number: Option<String>,
    #[serde(default)]
    pub copies: Option<u32>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default = "default_availability")]
    pub availability: String,
    #[serde(default)]
    pub opac_url: Option<String>,
}

fn default_availability() -> String {
    "Check OPAC".to_string()
}

/// Search outcome; `opac_url` is always usable, even at zero results.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogueResults {
    pub results: Vec<BookRecord>,
    pub total_results: usize,
    pub opac_url: String,
}

/// External catalogue search. Implementations carry their own timeout
/// and must tolerate zero results.
pub trait CatalogueSearch: Send + Sync {
    fn search(
        &self,
        term: &str,
        limit: usize,
    ) -> impl Future<Output = Result<CatalogueResults, NanduError>> + Send;
}

/// Filler words stripped from a raw query to get the search term.
static FILLER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(search|find|books?|on|about|for|look|what|by|author|catalogue|catalog|opac)\b")
        .expect("filler pattern")
});

/// Extract the actual search term from a book-search query.
pub fn extract_search_term(query: &str) -> String {
    let stripped = FILLER_RE.replace_all(query, " ");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponse {
    success: bool,
    #[serde(default)]
    results: Vec<BookRecord>,
    #[serde(default)]
    total_results: usize,
    opac_url: String,
}

/// HTTP client for the catalogue search endpoint.
pub struct HttpCatalogue {
    client: reqwest::Client,
    base_url: String,
    opac_url: String,
}

impl HttpCatalogue {
    pub fn new(base_url: impl Into<String>, opac_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
            base_url: base_url.into(),
            opac_url: opac_url.into(),
        }
    }

    pub fn opac_url(&self) -> &str {
        &self.opac_url
    }

    fn request(&self, term: &str, limit: usize) -> reqwest::RequestBuilder {
        self.client.get(&self.base_url).query(&[
            ("q", term),
            ("type", "all"),
            ("limit", limit.to_string().as_str()),
        ])
    }
}

impl CatalogueSearch for HttpCatalogue {
    fn search(
        &self,
        term: &str,
        limit: usize,
    ) -> impl Future<Output = Result<CatalogueResults, NanduError>> + Send {
        let request = self.request(term, limit);
        async move {
            let response = request
                .send()
                .await
                .map_err(|e| NanduError::Catalogue(format!("request failed: {}", e)))?;

            if !response.status().is_success() {
                return Err(NanduError::Catalogue(format!("HTTP error: {}", response.status())));
            }

            let api: ApiResponse = response
                .json()
                .await
                .map_err(|e| NanduError::Catalogue(format!("bad response body: {}", e)))?;

            if !api.success {
                return Err(NanduError::Catalogue("backend reported failure".to_string()));
            }

            Ok(CatalogueResults {
                total_results: api.total_results.max(api.results.len()),
                results: api.results,
                opac_url: api.opac_url,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_search_term_strips_filler() {
        assert_eq!(extract_search_term("search books on machine learning"), "machine learning");
        assert_eq!(extract_search_term("find me books by Knuth"), "me Knuth");
        assert_eq!(extract_search_term("books about quantum physics"), "quantum physics");
    }

    #[test]
    fn test_extract_search_term_can_empty_out() {
        assert_eq!(extract_search_term("search books"), "");
    }

    #[test]
    fn test_request_url_is_query_encoded() {
        let catalogue = HttpCatalogue::new(
            "https://library.example.edu/lib_chat/book-search",
            "https://opac.example.edu/",
        );
        let request = catalogue.request("c++ primer", 5).build().unwrap();
        assert_eq!(
            request.url().as_str(),
            "https://library.example.edu/lib_chat/book-search?q=c%2B%2B+primer&type=all&limit=5"
        );
    }

    #[test]
    fn test_api_response_defaults() {
        let api: ApiResponse = serde_json::from_str(
            r#"{"success": true, "opacUrl": "https://opac.example.edu/"}"#,
        )
        .unwrap();
        assert!(api.results.is_empty());
        assert_eq!(api.total_results, 0);
    }

    #[test]
    fn test_book_record_parsing() {
        let record: BookRecord = serde_json::from_str(
            r#"{
                "title": "The Art of Computer Programming",
                "author": "Knuth",
                "accessionNumbers": ["A123", "A124"],
                "callNumber": "005.1 KNU",
                "copies": 2,
                "availability": "Available"
            }"#,
        )
        .unwrap();
        assert_eq!(record.accession_numbers.len(), 2);
        assert_eq!(record.availability, "Available");
        assert!(record.opac_url.is_none());
    }
}
