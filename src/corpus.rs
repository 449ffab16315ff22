//! Builds `documents.json` from a directory of HTML and text files.
//!
//! Files are walked in sorted relative-path order so rebuilding an unchanged
//! directory yields identical ids. HTML files contribute their `<title>`,
//! visible text, and canonical link; anything else contributes its file
//! name and raw text.

use anyhow::{bail, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use scraper::{Html, Selector};
use std::path::Path;
use walkdir::WalkDir;

use wolf_search_core::models::Document;

use crate::config::{BuildConfig, Config};

pub fn scan_documents(build: &BuildConfig) -> Result<Vec<Document>> {
    let root = &build.docs_dir;
    if !root.exists() {
        bail!("Docs directory does not exist: {}", root.display());
    }

    let include_set = build_globset(&build.include_globs)?;

    let mut default_excludes = vec!["**/.git/**".to_string(), "**/documents.json".to_string()];
    default_excludes.extend(build.exclude_globs.clone());
    let exclude_set = build_globset(&default_excludes)?;

    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        let rel_str = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        // Output written inside the docs dir must never index itself.
        if path == build.output.as_path() || exclude_set.is_match(&rel_str) {
            continue;
        }
        if !include_set.is_match(&rel_str) {
            continue;
        }
        files.push((rel_str, path.to_path_buf()));
    }

    files.sort_by(|a, b| a.0.cmp(&b.0));

    let mut docs = Vec::with_capacity(files.len());
    for (rel, path) in files {
        match std::fs::read(&path) {
            Ok(bytes) => {
                docs.push(file_to_document(&path, &rel, &bytes));
                tracing::debug!(path = %rel, "indexed");
            }
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping unreadable file"),
        }
    }
    Ok(docs)
}

fn file_to_document(path: &Path, relative_path: &str, bytes: &[u8]) -> Document {
    let text = String::from_utf8_lossy(bytes);
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| relative_path.to_string());

    let (title, content, canonical) = if looks_like_html(&text) {
        let page = extract_html(&text);
        (
            page.title.unwrap_or(file_name),
            page.text,
            page.canonical,
        )
    } else {
        (file_name, text.into_owned(), None)
    };

    Document {
        id: String::new(),
        title: Some(title),
        path: Some(relative_path.to_string()),
        url: Some(canonical.unwrap_or_else(|| format!("./{}", relative_path))),
        content,
    }
}

fn looks_like_html(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.contains("<html") || lower.trim_start().starts_with("<!doctype html")
}

struct HtmlPage {
    title: Option<String>,
    text: String,
    canonical: Option<String>,
}

fn extract_html(source: &str) -> HtmlPage {
    let doc = Html::parse_document(source);

    let title = Selector::parse("title").ok().and_then(|sel| {
        doc.select(&sel)
            .next()
            .map(|el| normalize_whitespace(&el.text().collect::<String>()))
            .filter(|t| !t.is_empty())
    });

    let canonical = Selector::parse("link[rel='canonical']").ok().and_then(|sel| {
        doc.select(&sel)
            .filter_map(|el| el.value().attr("href"))
            .map(str::trim)
            .find(|href| !href.is_empty())
            .map(str::to_string)
    });

    let text = Selector::parse("body")
        .ok()
        .and_then(|sel| doc.select(&sel).next())
        .map(|body| visible_text(&body))
        .unwrap_or_default();

    HtmlPage {
        title,
        text,
        canonical,
    }
}

/// Text of `root` with `<script>`, `<style>` and `<noscript>` dropped.
fn visible_text(root: &scraper::ElementRef<'_>) -> String {
    let mut lines = Vec::new();
    for node in root.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|a| {
            a.value()
                .as_element()
                .map(|e| matches!(e.name(), "script" | "style" | "noscript"))
                .unwrap_or(false)
        });
        if hidden {
            continue;
        }
        let cleaned = normalize_whitespace(text);
        if !cleaned.is_empty() {
            lines.push(cleaned);
        }
    }
    lines.join("\n")
}

fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

/// CLI entry point for `wolf build`.
pub fn run_build(config: &Config) -> Result<()> {
    let docs = scan_documents(&config.build)?;

    if let Some(parent) = config.build.output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(&docs)?;
    std::fs::write(&config.build.output, json)?;

    for doc in &docs {
        println!("Indexed: {}", doc.path.as_deref().unwrap_or(""));
    }
    println!(
        "Written {} documents to {}",
        docs.len(),
        config.build.output.display()
    );
    Ok(())
}
