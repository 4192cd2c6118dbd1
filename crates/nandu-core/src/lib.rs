//! Core resolution engine for the Nandu library helpdesk assistant.
//!
//! Takes a raw user query, decides what kind of request it is
//! (greeting / book search / general FAQ) and finds the stored answer
//! that best matches it, using a three-layer cascade of exact, fuzzy
//! and weighted-semantic matching over a small knowledge base.

pub mod analytics;
pub mod cache;
pub mod catalogue;
pub mod classify;
pub mod error;
pub mod expand;
pub mod kb;
pub mod loader;
pub mod matcher;
pub mod normalize;
pub mod rate_limit;
pub mod resolver;
pub mod respond;
pub mod similarity;

pub use error::NanduError;
pub use resolver::{Resolver, ResolverConfig};
pub use respond::{Response, ResponseKind};
