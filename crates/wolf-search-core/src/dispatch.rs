//! Search dispatch with a single sanitized retry.
//!
//! # Algorithm
//!
//! 1. Send `query*` to the backend (prefix-broadened).
//! 2. If the backend fails for any reason, replace every character that is
//!    not an ASCII letter, ASCII digit or whitespace with a space and send
//!    that once to the same backend.
//! 3. If the retry also fails, return [`DispatchError`] with both failures.
//!
//! An empty result list is a successful search, never an error.

use thiserror::Error;

use crate::backend::{BackendError, SearchBackend};
use crate::models::SearchResult;

/// Appended to the primary attempt so partially typed words still match.
pub const WILDCARD_SUFFIX: char = '*';

/// Both attempts failed.
///
/// Displays as the fallback failure, which is the one the user should see.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{fallback}")]
pub struct DispatchError {
    pub primary: BackendError,
    pub fallback: BackendError,
}

/// Which attempt produced the results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    Primary,
    Fallback,
}

/// Results plus the attempt that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatched {
    pub results: Vec<SearchResult>,
    pub attempt: Attempt,
}

/// The query sent on the first attempt.
pub fn primary_query(query: &str) -> String {
    let mut q = String::with_capacity(query.len() + 1);
    q.push_str(query);
    q.push(WILDCARD_SUFFIX);
    q
}

/// The query sent on the retry: only ASCII alphanumerics and whitespace
/// survive, everything else becomes a space.
pub fn sanitize_query(query: &str) -> String {
    query
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect()
}

/// Run a search, retrying once with a sanitized query on failure.
pub async fn dispatch(
    backend: &dyn SearchBackend,
    query: &str,
) -> Result<Dispatched, DispatchError> {
    let primary = match backend.search(&primary_query(query)).await {
        Ok(results) => {
            tracing::debug!(backend = backend.name(), hits = results.len(), "primary search");
            return Ok(Dispatched {
                results,
                attempt: Attempt::Primary,
            });
        }
        Err(e) => e,
    };

    tracing::debug!(
        backend = backend.name(),
        error = %primary,
        "primary search failed, retrying with sanitized query"
    );

    match backend.search(&sanitize_query(query)).await {
        Ok(results) => Ok(Dispatched {
            results,
            attempt: Attempt::Fallback,
        }),
        Err(fallback) => {
            tracing::warn!(backend = backend.name(), error = %fallback, "fallback search failed");
            Err(DispatchError { primary, fallback })
        }
    }
}
