//! Search backend abstraction.
//!
//! The [`SearchBackend`] trait is the single seam between the dispatcher and
//! whatever resolves a query into ranked results: the in-memory index built
//! from a document collection ([`memory::MemoryIndex`]) or a remote HTTP
//! service (implemented in the `wolf-search` app crate).
//!
//! Implementations must be `Send + Sync` so a session can be shared across
//! async tasks.

pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::SearchResult;
use crate::query::QueryParseError;

/// Why a single backend call failed.
///
/// Every variant is recoverable by the dispatcher's sanitized retry; the
/// distinction exists for logging and for the server's status codes.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    /// The backend's query parser rejected the query text.
    #[error(transparent)]
    Syntax(#[from] QueryParseError),

    /// The backend answered with a non-success status.
    #[error("search backend returned HTTP {status}: {message}")]
    Rejected { status: u16, message: String },

    /// The request never produced a response.
    #[error("search request failed: {0}")]
    Transport(String),

    /// The response body was not the expected shape.
    #[error("invalid search response: {0}")]
    Decode(String),
}

/// Resolves a query string into an ordered list of results.
///
/// The order of the returned vector is the ranking; callers never re-sort.
/// An empty vector means "no matches" and is not an error.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Short identifier used in logs (`"memory"`, `"remote"`).
    fn name(&self) -> &str;

    /// Run one query.
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, BackendError>;
}
