use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use wolf_search_core::backend::memory::FieldWeights;
use wolf_search_core::render::RenderOptions;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub build: BuildConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IndexConfig {
    /// File path or `http(s)` URL of `documents.json`.
    #[serde(default = "default_documents")]
    pub documents: String,
    #[serde(default = "default_title_boost")]
    pub title_boost: f64,
    #[serde(default = "default_content_boost")]
    pub content_boost: f64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            documents: default_documents(),
            title_boost: default_title_boost(),
            content_boost: default_content_boost(),
        }
    }
}

fn default_documents() -> String {
    "docs/documents.json".to_string()
}
fn default_title_boost() -> f64 {
    10.0
}
fn default_content_boost() -> f64 {
    1.0
}

impl IndexConfig {
    pub fn field_weights(&self) -> FieldWeights {
        FieldWeights {
            title: self.title_boost,
            content: self.content_boost,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_backend")]
    pub backend: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            endpoint: default_endpoint(),
            debounce_ms: default_debounce_ms(),
            timeout_secs: default_timeout_secs(),
            max_results: default_max_results(),
        }
    }
}

fn default_backend() -> String {
    "local".to_string()
}
fn default_endpoint() -> String {
    "http://127.0.0.1:8080/api/search".to_string()
}
fn default_debounce_ms() -> u64 {
    200
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_max_results() -> usize {
    50
}

impl SearchConfig {
    pub fn is_remote(&self) -> bool {
        self.backend == "remote"
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RenderConfig {
    #[serde(default = "default_snippet_chars")]
    pub snippet_chars: usize,
    #[serde(default)]
    pub show_score: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            snippet_chars: default_snippet_chars(),
            show_score: false,
        }
    }
}

fn default_snippet_chars() -> usize {
    400
}

impl RenderConfig {
    pub fn options(&self) -> RenderOptions {
        RenderOptions {
            snippet_chars: self.snippet_chars,
            show_score: self.show_score,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct BuildConfig {
    #[serde(default = "default_docs_dir")]
    pub docs_dir: PathBuf,
    #[serde(default = "default_output")]
    pub output: PathBuf,
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            docs_dir: default_docs_dir(),
            output: default_output(),
            include_globs: default_include_globs(),
            exclude_globs: Vec::new(),
        }
    }
}

fn default_docs_dir() -> PathBuf {
    PathBuf::from("docs")
}
fn default_output() -> PathBuf {
    PathBuf::from("docs/documents.json")
}
fn default_include_globs() -> Vec<String> {
    vec![
        "**/*.html".to_string(),
        "**/*.htm".to_string(),
        "**/*.txt".to_string(),
    ]
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

pub fn validate(config: &Config) -> Result<()> {
    if !(config.index.title_boost > 0.0) || !(config.index.content_boost > 0.0) {
        anyhow::bail!("index.title_boost and index.content_boost must be > 0");
    }

    match config.search.backend.as_str() {
        "local" => {}
        "remote" => {
            let endpoint = url::Url::parse(&config.search.endpoint).with_context(|| {
                format!("search.endpoint is not a valid URL: {}", config.search.endpoint)
            })?;
            if endpoint.scheme() != "http" && endpoint.scheme() != "https" {
                anyhow::bail!("search.endpoint must be an http(s) URL");
            }
        }
        other => anyhow::bail!(
            "Unknown search backend: '{}'. Must be local or remote.",
            other
        ),
    }

    if config.search.debounce_ms > 10_000 {
        anyhow::bail!("search.debounce_ms must be <= 10000");
    }
    if config.search.max_results < 1 {
        anyhow::bail!("search.max_results must be >= 1");
    }
    if config.render.snippet_chars < 1 {
        anyhow::bail!("render.snippet_chars must be >= 1");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_src: &str) -> Result<Config> {
        let config: Config = toml::from_str(toml_src)?;
        validate(&config)?;
        Ok(config)
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let cfg = parse("").unwrap();
        assert_eq!(cfg.index.documents, "docs/documents.json");
        assert_eq!(cfg.search.backend, "local");
        assert_eq!(cfg.search.debounce_ms, 200);
        assert_eq!(cfg.search.max_results, 50);
        assert_eq!(cfg.render.snippet_chars, 400);
        assert_eq!(cfg.index.field_weights(), FieldWeights::default());
    }

    #[test]
    fn test_remote_requires_http_endpoint() {
        assert!(parse("[search]\nbackend = \"remote\"\nendpoint = \"ftp://x/y\"").is_err());
        assert!(parse("[search]\nbackend = \"remote\"\nendpoint = \"not a url\"").is_err());
        let cfg = parse("[search]\nbackend = \"remote\"\nendpoint = \"https://s.example/api/search\"")
            .unwrap();
        assert!(cfg.search.is_remote());
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(parse("[search]\nbackend = \"elastic\"").is_err());
        assert!(parse("[index]\ntitle_boost = 0.0").is_err());
        assert!(parse("[search]\nmax_results = 0").is_err());
        assert!(parse("[render]\nsnippet_chars = 0").is_err());
        assert!(parse("[search]\ndebounce_ms = 60000").is_err());
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config(Path::new("/nonexistent/wolf.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
