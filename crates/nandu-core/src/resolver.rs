//! The query resolution orchestrator.
//!
//! A constructed service object (no global singleton): it owns its
//! configuration, the lazily loaded knowledge base, the response
//! cache, the rate limiter and the analytics buffers, and is safe to
//! share behind `&self`. `resolve` never fails outward; every input
//! yields a well-formed [`Response`].

use crate::analytics::{FailedQueryEntry, FailedQueryLog, QueryLogger, TracingLogger};
use crate::cache::{ResponseCache, DEFAULT_CACHE_CAPACITY};
use crate::catalogue::{
    extract_search_term, CatalogueSearch, HttpCatalogue, DEFAULT_RESULT_LIMIT,
};
use crate::classify::{classify, QueryKind};
use crate::error::NanduError;
use crate::kb::KnowledgeBase;
use crate::loader::KbFetcher;
use crate::matcher::{find_match, MatchOutcome, MatchSource};
use crate::rate_limit::{RateLimiter, DEFAULT_REQUESTS_PER_MINUTE};
use crate::respond::{
    book_search_help_text, catalogue_fallback_text, clarification_response, format_book_results,
    greeting_response, response_prefix, Response, ResponseKind, Seeder,
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;
use tokio::sync::OnceCell;
use tracing::{error, warn};

/// Configuration for a resolver instance.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Remote JSON source of the knowledge base
    pub kb_url: String,
    /// Catalogue search endpoint
    pub catalogue_url: String,
    /// Generic catalogue link shown in fallbacks
    pub opac_url: String,
    pub book_search_enabled: bool,
    pub max_requests_per_minute: usize,
    pub cache_capacity: usize,
    pub min_query_len: usize,
    pub max_query_len: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            kb_url: "https://library.example.edu/lib_chat/general_queries.json".to_string(),
            catalogue_url: "https://library.example.edu/lib_chat/book-search".to_string(),
            opac_url: "https://opac.example.edu/".to_string(),
            book_search_enabled: true,
            max_requests_per_minute: DEFAULT_REQUESTS_PER_MINUTE,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            min_query_len: 2,
            max_query_len: 500,
        }
    }
}

static SCRIPT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").expect("script pattern"));
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("tag pattern"));

/// Vocabulary that routes an unmatched query to the catalogue.
static BOOKISH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(book|books|catalog|catalogue|opac|author|title|subject|search|find|look|novel|publication|isbn)\b",
    )
    .expect("bookish pattern")
});

/// Strip script blocks and remaining tags, then trim.
fn sanitize(input: &str) -> String {
    let without_scripts = SCRIPT_RE.replace_all(input, "");
    TAG_RE.replace_all(&without_scripts, "").trim().to_string()
}

pub struct Resolver<C: CatalogueSearch = HttpCatalogue> {
    config: ResolverConfig,
    fetcher: KbFetcher,
    kb: OnceCell<KnowledgeBase>,
    catalogue: C,
    cache: Mutex<ResponseCache>,
    limiter: Mutex<RateLimiter>,
    failed: Mutex<FailedQueryLog>,
    logger: Box<dyn QueryLogger>,
    seeder: Seeder,
}

impl Resolver<HttpCatalogue> {
    pub fn new(config: ResolverConfig) -> Self {
        let catalogue = HttpCatalogue::new(config.catalogue_url.clone(), config.opac_url.clone());
        Self::with_catalogue(config, catalogue)
    }
}

impl<C: CatalogueSearch> Resolver<C> {
    /// Build with an injected catalogue collaborator (tests use a stub).
    pub fn with_catalogue(config: ResolverConfig, catalogue: C) -> Self {
        Self {
            fetcher: KbFetcher::new(config.kb_url.clone()),
            kb: OnceCell::new(),
            catalogue,
            cache: Mutex::new(ResponseCache::new(config.cache_capacity)),
            limiter: Mutex::new(RateLimiter::per_minute(config.max_requests_per_minute)),
            failed: Mutex::new(FailedQueryLog::default()),
            logger: Box::new(TracingLogger),
            seeder: Seeder::Entropy,
            config,
        }
    }

    /// Preload the knowledge base, skipping the remote fetch entirely.
    pub fn with_knowledge_base(mut self, kb: KnowledgeBase) -> Self {
        self.kb = OnceCell::new_with(Some(kb));
        self
    }

    /// Pin phrase picks for deterministic output.
    pub fn with_seeder(mut self, seeder: Seeder) -> Self {
        self.seeder = seeder;
        self
    }

    pub fn with_logger(mut self, logger: Box<dyn QueryLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// The injected catalogue collaborator.
    pub fn catalogue(&self) -> &C {
        &self.catalogue
    }

    /// Snapshot of the failed-query buffer for analytics.
    pub fn failed_queries(&self) -> Vec<FailedQueryEntry> {
        lock(&self.failed).entries().cloned().collect()
    }

    /// Cache hit/miss counters.
    pub fn cache_stats(&self) -> (u64, u64) {
        let cache = lock(&self.cache);
        (cache.hits(), cache.misses())
    }

    /// Resolve one query end to end. Never panics or errors outward:
    /// rejection errors become their matching response kinds, anything
    /// else a generic apology.
    pub async fn resolve(&self, raw_query: &str) -> Response {
        let start = Instant::now();
        let response = match self.resolve_inner(raw_query, start).await {
            Ok(response) => return response,
            Err(e @ (NanduError::QueryTooShort | NanduError::QueryTooLong(_))) => {
                Response::new(e.to_string(), ResponseKind::ValidationError)
            }
            Err(e @ NanduError::RateLimited) => {
                Response::new(format!("⚠️ {}", e), ResponseKind::RateLimited)
            }
            Err(e) => {
                error!("query resolution failed: {}", e);
                Response::new(
                    "❌ Sorry, I encountered an error while processing your query. \
                     Please try again or contact the library directly.",
                    ResponseKind::Error,
                )
            }
        };
        finish(response, start)
    }

    async fn resolve_inner(
        &self,
        raw_query: &str,
        start: Instant,
    ) -> Result<Response, NanduError> {
        // Idempotent lazy init; concurrent callers share one load.
        let kb = self.kb.get_or_init(|| self.fetcher.load()).await;

        if !lock(&self.limiter).check() {
            return Err(NanduError::RateLimited);
        }

        let sanitized = sanitize(raw_query);
        let char_count = sanitized.chars().count();
        if char_count < self.config.min_query_len {
            return Err(NanduError::QueryTooShort);
        }
        if char_count > self.config.max_query_len {
            return Err(NanduError::QueryTooLong(self.config.max_query_len));
        }

        if let Some(mut cached) = lock(&self.cache).get(&sanitized) {
            cached.from_cache = true;
            return Ok(finish(cached, start));
        }

        match classify(&sanitized) {
            QueryKind::Greeting => Ok(finish(
                Response::new(
                    greeting_response(&sanitized, self.seeder.next()),
                    ResponseKind::Greeting,
                ),
                start,
            )),
            QueryKind::BookSearch => Ok(finish(self.search_books(&sanitized).await, start)),
            QueryKind::General => self.answer_general(kb, &sanitized, start).await,
        }
    }

    async fn answer_general(
        &self,
        kb: &KnowledgeBase,
        sanitized: &str,
        start: Instant,
    ) -> Result<Response, NanduError> {
        match find_match(sanitized, kb)? {
            MatchOutcome::Matched(matched) => {
                let entry = kb.get(&matched.key).ok_or_else(|| {
                    NanduError::Internal(format!("matched key vanished: {}", matched.key))
                })?;
                let text = format!(
                    "{}{}",
                    response_prefix(sanitized, self.seeder.next()),
                    entry.answer
                );
                let score = matches!(matched.source, MatchSource::Semantic)
                    .then_some(matched.score);
                let response =
                    Response::new(text, ResponseKind::General).with_source(matched.source, score);
                lock(&self.cache).put(sanitized, response.clone());
                self.logger.log(sanitized, "general", 1);
                Ok(finish(response, start))
            }
            MatchOutcome::NoMatch { best_key, best_score } => {
                lock(&self.failed).record(sanitized, best_key.as_deref(), best_score);

                let book_like = BOOKISH_RE.is_match(sanitized);
                let short = sanitized.split_whitespace().count() <= 2;
                if self.config.book_search_enabled && (book_like || short) {
                    return Ok(finish(self.search_books(sanitized).await, start));
                }

                let response = Response::new(
                    clarification_response(sanitized, self.seeder.next()),
                    ResponseKind::Clarification,
                );
                lock(&self.cache).put(sanitized, response.clone());
                self.logger.log(sanitized, "clarification", 0);
                Ok(finish(response, start))
            }
        }
    }

    /// Delegate to the catalogue collaborator. Failures degrade to a
    /// static "use the catalogue directly" answer; results are never
    /// cached here.
    async fn search_books(&self, query: &str) -> Response {
        if !self.config.book_search_enabled {
            return Response::new(
                format!(
                    "📖 Book search is currently disabled. Please use the catalogue \
                     instead: <a href=\"{}\">Open Catalogue</a>",
                    self.config.opac_url
                ),
                ResponseKind::BookSearch,
            );
        }

        let term = extract_search_term(query);
        if term.chars().count() < 2 {
            return Response::new(
                book_search_help_text(&self.config.opac_url),
                ResponseKind::BookSearch,
            );
        }

        match self.catalogue.search(&term, DEFAULT_RESULT_LIMIT).await {
            Ok(results) => {
                self.logger.log(query, "book_search", results.results.len());
                Response::new(format_book_results(&results, &term), ResponseKind::BookSearch)
            }
            Err(e) => {
                warn!("catalogue delegate failed: {}", e);
                Response::new(
                    catalogue_fallback_text(&self.config.opac_url),
                    ResponseKind::BookSearch,
                )
            }
        }
    }
}

fn finish(mut response: Response, start: Instant) -> Response {
    response.processing_time_ms = start.elapsed().as_millis() as u64;
    response
}

/// Lock a mutex, recovering the data from a poisoned lock rather than
/// propagating the panic.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
