//! HTTP search server.
//!
//! Serves the in-memory index to browsers and to `search.backend = "remote"`
//! clients.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/?q=` | Search page; URLs redirect, everything else renders results |
//! | `GET`  | `/api/search?q=` | Ranked hits for `q` (query syntax as the index accepts it) |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "column 1: expected a term after '+'" } }
//! ```
//!
//! # Privacy
//!
//! Every response carries a restrictive CSP, `Referrer-Policy: no-referrer`,
//! a `Permissions-Policy` denying sensors, and `X-WolfSearch-Privacy`.
//! Queries are logged at `debug` only.

use axum::{
    extract::{Query, State},
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;

use wolf_search_core::backend::memory::MemoryIndex;
use wolf_search_core::classify::{classify, Classification};
use wolf_search_core::dispatch::dispatch;
use wolf_search_core::render::{
    escape_html, render_message, render_results, truncate_snippet, RenderOptions,
};

use crate::config::Config;
use crate::documents::load_index;

const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; script-src 'self'; object-src 'none';";
const PERMISSIONS_POLICY: &str = "geolocation=(), microphone=(), camera=()";
const PRIVACY_NOTICE: &str = "no-collection; no-profiling; no-sales";
const PAGE_TEMPLATE: &str = include_str!("../static/index.html");

/// Shared state for the route handlers.
#[derive(Clone)]
pub struct AppState {
    index: Arc<MemoryIndex>,
    render: Arc<RenderOptions>,
}

impl AppState {
    pub fn new(index: Arc<MemoryIndex>, render: RenderOptions) -> Self {
        Self {
            index,
            render: Arc::new(render),
        }
    }
}

/// Loads the configured collection and serves it on `[server].bind` until
/// the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let index = load_index(config).await?;
    println!("Loaded {} documents", index.len());

    let app = router(AppState::new(Arc::new(index), config.render.options()));

    let bind_addr = config.server.bind.clone();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    println!("Search server listening on http://{}", bind_addr);
    tracing::info!(bind = %bind_addr, "server started");

    axum::serve(listener, app).await?;
    Ok(())
}

/// The full application router with CORS and privacy headers applied.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handle_page))
        .route("/api/search", get(handle_search))
        .route("/health", get(handle_health))
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static(CONTENT_SECURITY_POLICY),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("permissions-policy"),
            HeaderValue::from_static(PERMISSIONS_POLICY),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-wolfsearch-privacy"),
            HeaderValue::from_static(PRIVACY_NOTICE),
        ))
        .with_state(state)
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ GET / ============

/// Search page. Input goes through the same classification and dispatch as
/// the interactive front ends; navigation becomes a `303 See Other`.
async fn handle_page(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Response {
    let results = match classify(&params.q) {
        Classification::Empty => String::new(),
        Classification::Navigate(url) => return Redirect::to(&url).into_response(),
        Classification::Search(query) => match dispatch(state.index.as_ref(), &query).await {
            Ok(dispatched) => render_results(&dispatched.results, &query, &state.render),
            Err(e) => render_message(&format!("Search error: {}", e)),
        },
    };

    Html(render_page(params.q.trim(), &results)).into_response()
}

fn render_page(query: &str, results_html: &str) -> String {
    PAGE_TEMPLATE
        .replace("{{query}}", &escape_html(query))
        .replace("{{results}}", results_html)
}

// ============ GET /api/search ============

#[derive(Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
}

#[derive(Serialize)]
struct SearchResponse {
    query: String,
    results: Vec<SearchHit>,
}

/// One hit on the wire. `path` is the document's url, else its path.
#[derive(Serialize)]
struct SearchHit {
    path: String,
    title: String,
    snippet: String,
    score: f64,
}

async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, AppError> {
    let query = params.q.trim().to_string();
    if query.is_empty() {
        return Ok(Json(SearchResponse {
            query: String::new(),
            results: Vec::new(),
        }));
    }

    tracing::debug!(query = %query, "api search");

    let results = state
        .index
        .query(&query)
        .map_err(|e| bad_request(e.to_string()))?;

    let results = results
        .into_iter()
        .map(|r| {
            let path = state
                .index
                .document(&r.reference)
                .and_then(|doc| doc.url.clone().or_else(|| doc.path.clone()))
                .unwrap_or_default();
            SearchHit {
                path,
                title: r.title,
                snippet: truncate_snippet(&r.snippet, state.render.snippet_chars),
                score: r.score,
            }
        })
        .collect();

    Ok(Json(SearchResponse { query, results }))
}
