//! Core data models shared by the classifier, backends, and renderer.
//!
//! Documents come from an untyped JSON collection, so every field except the
//! positional `id` is optional and degrades to a stated fallback instead of
//! failing the load.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A document in the client-side collection.
///
/// `id` is the decimal form of the document's position in the collection at
/// load time. It is assigned by [`MemoryIndex::build`](crate::backend::memory::MemoryIndex::build)
/// and never changes afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default, skip_serializing)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub content: String,
}

impl Document {
    /// Lenient conversion from one element of a `documents.json` array.
    ///
    /// Fields that are missing or not strings are treated as absent. A
    /// non-object element yields an empty document so positions stay aligned.
    pub fn from_value(value: &Value) -> Self {
        let text = |key: &str| {
            value
                .get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        Self {
            id: String::new(),
            title: text("title").filter(|t| !t.is_empty()),
            path: text("path").filter(|p| !p.is_empty()),
            url: text("url").filter(|u| !u.is_empty()),
            content: text("content").unwrap_or_default(),
        }
    }

    /// Title, falling back to the path, then to a generated placeholder.
    pub fn display_title(&self) -> String {
        self.title
            .clone()
            .or_else(|| self.path.clone())
            .unwrap_or_else(|| format!("Document {}", self.id))
    }

    /// Link target, falling back to the path, then to `#`.
    pub fn link(&self) -> String {
        self.url
            .clone()
            .or_else(|| self.path.clone())
            .unwrap_or_else(|| "#".to_string())
    }
}

/// Parse a whole `documents.json` payload.
///
/// The top level must be an array; its elements are converted with
/// [`Document::from_value`].
pub fn parse_documents(json: &str) -> Result<Vec<Document>, serde_json::Error> {
    let values: Vec<Value> = serde_json::from_str(json)?;
    Ok(values.iter().map(Document::from_value).collect())
}

/// One ranked hit, as produced by any [`SearchBackend`](crate::backend::SearchBackend).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    /// Opaque id into the backend's result set (document id or path).
    pub reference: String,
    pub title: String,
    pub link: String,
    /// Untruncated text; the renderer shortens it.
    pub snippet: String,
    /// Backend-defined scale; only the order matters.
    pub score: f64,
}
