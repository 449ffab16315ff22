//! Loading the document collection for the in-memory index.
//!
//! The collection is a JSON array of `{ title, content, url, path }` objects,
//! read from a local file or fetched over HTTP(S) with caching disabled.
//! Element order is preserved: it determines every document's id.

use anyhow::{bail, Context, Result};
use std::time::Duration;

use wolf_search_core::backend::memory::MemoryIndex;
use wolf_search_core::models::{parse_documents, Document};

use crate::config::Config;

/// Read or fetch the collection named by `source`.
pub async fn load_documents(source: &str, timeout_secs: u64) -> Result<Vec<Document>> {
    let body = if source.starts_with("http://") || source.starts_with("https://") {
        fetch(source, timeout_secs).await?
    } else {
        tokio::fs::read_to_string(source)
            .await
            .with_context(|| format!("Failed to read {}", source))?
    };

    let docs = parse_documents(&body).with_context(|| format!("Failed to parse {}", source))?;
    tracing::info!(source, documents = docs.len(), "loaded document collection");
    Ok(docs)
}

async fn fetch(url: &str, timeout_secs: u64) -> Result<String> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()?;

    let resp = client
        .get(url)
        .header(reqwest::header::CACHE_CONTROL, "no-store")
        .send()
        .await
        .with_context(|| format!("Failed to fetch {}", url))?;

    let status = resp.status();
    if !status.is_success() {
        bail!("Failed to fetch {}: HTTP {}", url, status);
    }
    Ok(resp.text().await?)
}

/// Load the configured collection and build the index over it.
pub async fn load_index(config: &Config) -> Result<MemoryIndex> {
    let docs = load_documents(&config.index.documents, config.search.timeout_secs).await?;
    Ok(MemoryIndex::build(
        docs,
        config.index.field_weights(),
        config.search.max_results,
    ))
}
