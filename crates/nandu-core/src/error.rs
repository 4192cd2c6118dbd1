//! Error types for Nandu.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NanduError {
    #[error("Query is too short. Please provide more details.")]
    QueryTooShort,

    #[error("Query is too long (max {0} characters).")]
    QueryTooLong(usize),

    #[error("Too many requests. Please wait a moment.")]
    RateLimited,

    #[error("Knowledge base is not loaded")]
    KnowledgeBaseNotLoaded,

    #[error("Knowledge base fetch failed: {0}")]
    Fetch(String),

    #[error("Catalogue search failed: {0}")]
    Catalogue(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}
