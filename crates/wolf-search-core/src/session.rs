//! Per-page search session.
//!
//! A [`Session`] owns everything the search box needs between keystrokes:
//! the backend (once it is ready) and the render options. Front ends build
//! one at startup, share it behind an `Arc`, and call [`Session::handle`] for
//! every settled input.

use std::sync::{Arc, PoisonError, RwLock};

use crate::backend::SearchBackend;
use crate::classify::{classify, Classification};
use crate::dispatch::dispatch;
use crate::models::SearchResult;
use crate::render::{render_message, render_results, RenderOptions};

pub const NOT_READY_MESSAGE: &str = "Index not loaded yet. Reload the page if this persists.";

/// Readiness of the search backend.
#[derive(Clone)]
pub enum IndexState {
    Loading,
    Ready(Arc<dyn SearchBackend>),
    Failed(String),
}

/// What a front end should do after handling one input.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Blank input: clear the results area.
    Cleared,
    /// Leave the page for this URL.
    Navigate(String),
    /// A completed search (possibly with zero hits).
    Results {
        query: String,
        results: Vec<SearchResult>,
    },
    /// A search was requested before the backend was usable.
    NotReady,
    /// Both search attempts failed.
    Failed { query: String, message: String },
    /// The document collection finished loading.
    IndexLoaded { documents: usize },
    /// The document collection could not be loaded.
    IndexFailed(String),
}

pub struct Session {
    state: RwLock<IndexState>,
    render: RenderOptions,
}

impl Session {
    /// A session whose backend is still loading.
    pub fn new(render: RenderOptions) -> Self {
        Self {
            state: RwLock::new(IndexState::Loading),
            render,
        }
    }

    /// A session with a backend that is usable immediately (e.g. remote).
    pub fn with_backend(backend: Arc<dyn SearchBackend>, render: RenderOptions) -> Self {
        Self {
            state: RwLock::new(IndexState::Ready(backend)),
            render,
        }
    }

    pub fn set_ready(&self, backend: Arc<dyn SearchBackend>) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = IndexState::Ready(backend);
    }

    pub fn set_failed(&self, message: impl Into<String>) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) =
            IndexState::Failed(message.into());
    }

    pub fn state(&self) -> IndexState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state(), IndexState::Ready(_))
    }

    pub fn render_options(&self) -> &RenderOptions {
        &self.render
    }

    /// Classify `raw` and act on it.
    ///
    /// Empty input and URLs never touch the backend, so they work while the
    /// index is loading or after it failed.
    pub async fn handle(&self, raw: &str) -> Outcome {
        match classify(raw) {
            Classification::Empty => Outcome::Cleared,
            Classification::Navigate(url) => {
                tracing::info!(url = %url, "input classified as navigation");
                Outcome::Navigate(url)
            }
            Classification::Search(query) => {
                let IndexState::Ready(backend) = self.state() else {
                    return Outcome::NotReady;
                };
                match dispatch(backend.as_ref(), &query).await {
                    Ok(dispatched) => Outcome::Results {
                        query,
                        results: dispatched.results,
                    },
                    Err(e) => Outcome::Failed {
                        query,
                        message: e.to_string(),
                    },
                }
            }
        }
    }

    /// HTML for the results area; `None` for [`Outcome::Navigate`], which
    /// replaces the page instead.
    pub fn render(&self, outcome: &Outcome) -> Option<String> {
        let html = match outcome {
            Outcome::Cleared => String::new(),
            Outcome::Navigate(_) => return None,
            Outcome::Results { query, results } => render_results(results, query, &self.render),
            Outcome::NotReady => render_message(NOT_READY_MESSAGE),
            Outcome::Failed { message, .. } => render_message(&format!("Search error: {}", message)),
            Outcome::IndexLoaded { documents } => {
                render_message(&format!("Index loaded — {} documents ready.", documents))
            }
            Outcome::IndexFailed(message) => {
                render_message(&format!("Error loading index: {}", message))
            }
        };
        Some(html)
    }
}
