//! Async loading of the knowledge base from its remote JSON source.
//!
//! Load order: fresh on-disk cache, then the remote endpoint with
//! bounded retry and exponential backoff, then the builtin offline
//! set. Loading is invoked through the resolver's single-flight init,
//! so concurrent callers collapse to one fetch.

use crate::error::NanduError;
use crate::kb::KnowledgeBase;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};
use tracing::{debug, info, warn};

/// Disk cache freshness window.
pub const CACHE_DURATION_SECS: u64 = 24 * 60 * 60;
/// Remote fetch attempts before falling back.
const MAX_FETCH_ATTEMPTS: u32 = 3;

/// Default cache file under the user cache directory.
pub fn default_cache_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("nandu")
        .join("general_queries.json")
}

/// Async knowledge base fetcher.
pub struct KbFetcher {
    client: reqwest::Client,
    url: String,
    cache_path: PathBuf,
}

impl KbFetcher {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            url: url.into(),
            cache_path: default_cache_path(),
        }
    }

    pub fn with_cache_path(mut self, path: PathBuf) -> Self {
        self.cache_path = path;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        self
    }

    /// Check whether the disk cache exists and is fresh.
    pub fn is_cache_valid(&self) -> bool {
        if !self.cache_path.exists() {
            return false;
        }
        if let Ok(metadata) = std::fs::metadata(&self.cache_path) {
            if let Ok(modified) = metadata.modified() {
                let age = SystemTime::now()
                    .duration_since(modified)
                    .unwrap_or(Duration::MAX);
                return age < Duration::from_secs(CACHE_DURATION_SECS);
            }
        }
        false
    }

    /// Fetch from the remote URL once.
    async fn fetch_once(&self) -> Result<KnowledgeBase, NanduError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| NanduError::Fetch(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(NanduError::Fetch(format!("HTTP error: {}", response.status())));
        }

        let text = response
            .text()
            .await
            .map_err(|e| NanduError::Fetch(format!("failed to read response: {}", e)))?;

        KnowledgeBase::from_json(&text)
    }

    /// Fetch with retry and exponential backoff (1s, 2s, 4s).
    pub async fn fetch_remote(&self) -> Result<KnowledgeBase, NanduError> {
        info!("📡  Fetching knowledge base from {}", self.url);

        let mut last_error = NanduError::Fetch("no attempts made".to_string());
        for attempt in 1..=MAX_FETCH_ATTEMPTS {
            match self.fetch_once().await {
                Ok(kb) => {
                    info!("✅  Knowledge base fetched: {} entries", kb.len());
                    if let Err(e) = self.save_to_cache(&kb) {
                        warn!("Failed to cache knowledge base: {}", e);
                    }
                    return Ok(kb);
                }
                Err(e) => {
                    warn!("Fetch attempt {}/{} failed: {}", attempt, MAX_FETCH_ATTEMPTS, e);
                    last_error = e;
                    if attempt < MAX_FETCH_ATTEMPTS {
                        let backoff = Duration::from_secs(1 << (attempt - 1));
                        tokio::time::sleep(backoff).await;
                    }
                }
            }
        }

        Err(last_error)
    }

    /// Load the knowledge base: cache first, then remote, then builtin.
    /// Never fails; the builtin set is the deterministic floor.
    pub async fn load(&self) -> KnowledgeBase {
        if self.is_cache_valid() {
            debug!("Loading knowledge base from disk cache");
            if let Some(cached) = self.load_from_cache() {
                return cached;
            }
        }

        match self.fetch_remote().await {
            Ok(kb) => kb,
            Err(e) => {
                warn!("Knowledge base unavailable after retries: {} - using builtin", e);
                KnowledgeBase::builtin()
            }
        }
    }

    fn load_from_cache(&self) -> Option<KnowledgeBase> {
        let text = std::fs::read_to_string(&self.cache_path).ok()?;
        match KnowledgeBase::from_json(&text) {
            Ok(kb) if !kb.is_empty() => Some(kb),
            _ => None,
        }
    }

    fn save_to_cache(&self, kb: &KnowledgeBase) -> Result<(), NanduError> {
        if let Some(parent) = self.cache_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.cache_path, kb.to_json()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_cache_is_invalid() {
        let dir = tempdir().unwrap();
        let fetcher =
            KbFetcher::new("http://localhost/kb.json").with_cache_path(dir.path().join("kb.json"));
        assert!(!fetcher.is_cache_valid());
    }

    #[test]
    fn test_cache_round_trip() {
        let dir = tempdir().unwrap();
        let fetcher =
            KbFetcher::new("http://localhost/kb.json").with_cache_path(dir.path().join("kb.json"));

        let kb = KnowledgeBase::builtin();
        fetcher.save_to_cache(&kb).unwrap();
        assert!(fetcher.is_cache_valid());

        let loaded = fetcher.load_from_cache().unwrap();
        assert_eq!(loaded.len(), kb.len());
    }

    #[tokio::test]
    async fn test_load_falls_back_to_builtin() {
        let dir = tempdir().unwrap();
        // Unroutable address, immediate connection failure.
        let fetcher = KbFetcher::new("http://127.0.0.1:1/kb.json")
            .with_cache_path(dir.path().join("kb.json"))
            .with_timeout(Duration::from_millis(100));

        let kb = fetcher.load().await;
        assert_eq!(kb.len(), KnowledgeBase::builtin().len());
    }
}
