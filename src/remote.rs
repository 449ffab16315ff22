//! Remote HTTP [`SearchBackend`].
//!
//! Sends `GET <endpoint>?q=<query>` with `Accept: application/json` and no
//! cookies, and expects:
//!
//! ```json
//! { "query": "rust*", "results": [ { "path": "...", "title": "...", "snippet": "...", "score": 1.2 } ] }
//! ```
//!
//! Missing result fields fall back the same way documents do: title to the
//! path, snippet to empty, score to zero.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use wolf_search_core::backend::{BackendError, SearchBackend};
use wolf_search_core::models::SearchResult;

use crate::config::SearchConfig;

/// The echoed `query` key is ignored along with any other unknown keys.
#[derive(Debug, Deserialize)]
struct RemoteResponse {
    #[serde(default)]
    results: Vec<RemoteHit>,
}

#[derive(Debug, Deserialize)]
struct RemoteHit {
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    snippet: Option<String>,
    #[serde(default)]
    score: Option<f64>,
}

impl RemoteHit {
    fn into_result(self) -> SearchResult {
        let path = self.path.unwrap_or_default();
        let title = self
            .title
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| {
                if path.is_empty() {
                    "Document".to_string()
                } else {
                    path.clone()
                }
            });
        let link = if path.is_empty() {
            "#".to_string()
        } else {
            path.clone()
        };
        SearchResult {
            reference: path,
            title,
            link,
            snippet: self.snippet.unwrap_or_default(),
            score: self.score.unwrap_or(0.0),
        }
    }
}

/// Client for a `/api/search`-style endpoint.
pub struct RemoteBackend {
    client: reqwest::Client,
    endpoint: String,
}

impl RemoteBackend {
    pub fn new(endpoint: impl Into<String>, timeout_secs: u64) -> anyhow::Result<Self> {
        // reqwest keeps no cookie store unless asked to.
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn from_config(config: &SearchConfig) -> anyhow::Result<Self> {
        Self::new(config.endpoint.clone(), config.timeout_secs)
    }
}

#[async_trait]
impl SearchBackend for RemoteBackend {
    fn name(&self) -> &str {
        "remote"
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, BackendError> {
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query)])
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(BackendError::Rejected {
                status: status.as_u16(),
                message: error_message(&body).unwrap_or_else(|| {
                    status.canonical_reason().unwrap_or("error").to_string()
                }),
            });
        }

        let body: RemoteResponse = resp
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;

        Ok(body.results.into_iter().map(RemoteHit::into_result).collect())
    }
}

/// Pull `error.message` out of a `{ "error": { "code", "message" } }` body.
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value["error"]["message"].as_str().map(str::to_string)
}
