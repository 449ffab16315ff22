use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use tempfile::TempDir;

use wolf_search::remote::RemoteBackend;
use wolf_search::server::{router, AppState};
use wolf_search_core::backend::memory::{FieldWeights, MemoryIndex};
use wolf_search_core::models::Document;
use wolf_search_core::render::RenderOptions;
use wolf_search_core::session::{Outcome, Session};

fn wolf_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("wolf");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let docs_dir = root.join("docs");
    fs::create_dir_all(docs_dir.join("guides")).unwrap();
    fs::write(
        docs_dir.join("guides/ownership.html"),
        r#"<!DOCTYPE html>
<html><head><title>Ownership in Rust</title></head>
<body><h1>Ownership</h1><p>Every value has a single owner. The borrow checker enforces this.</p>
<script>console.log("not indexed")</script></body></html>"#,
    )
    .unwrap();
    fs::write(
        docs_dir.join("wolves.txt"),
        "Wolves live and hunt in packs.\nA pack is a family group.",
    )
    .unwrap();
    fs::write(docs_dir.join("skip.md"), "markdown is not collected").unwrap();

    let config_content = format!(
        r#"[index]
documents = "{root}/docs/documents.json"

[search]
debounce_ms = 0
max_results = 10

[render]
snippet_chars = 40

[server]
bind = "127.0.0.1:7341"

[build]
docs_dir = "{root}/docs"
output = "{root}/docs/documents.json"
"#,
        root = root.display()
    );

    let config_path = config_dir.join("wolf.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_wolf(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = wolf_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run wolf binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

#[test]
fn test_classify_needs_no_config() {
    let missing = Path::new("/nonexistent/wolf.toml");

    let (stdout, _, success) = run_wolf(missing, &["classify", "example.com/docs"]);
    assert!(success);
    assert_eq!(stdout.trim(), "Navigate: https://example.com/docs");

    let (stdout, _, _) = run_wolf(missing, &["classify", "how to use rust"]);
    assert_eq!(stdout.trim(), "Search: how to use rust");

    let (stdout, _, _) = run_wolf(missing, &["classify", "   "]);
    assert_eq!(stdout.trim(), "Empty");
}

#[test]
fn test_build_then_search() {
    let (tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_wolf(&config_path, &["build"]);
    assert!(success, "build failed: {}", stderr);
    assert!(stdout.contains("Written 2 documents"), "stdout: {}", stdout);

    let written = fs::read_to_string(tmp.path().join("docs/documents.json")).unwrap();
    assert!(written.contains("Ownership in Rust"));
    assert!(!written.contains("not indexed"));
    assert!(!written.contains("markdown"));

    let (stdout, stderr, success) = run_wolf(&config_path, &["search", "own"]);
    assert!(success, "search failed: {}", stderr);
    assert!(stdout.contains("1. ["), "stdout: {}", stdout);
    assert!(stdout.contains("Ownership in Rust"));
    assert!(stdout.contains("link: ./guides/ownership.html"));

    let (stdout, _, _) = run_wolf(&config_path, &["search", "zebra"]);
    assert!(stdout.contains("No results."));
}

#[test]
fn test_search_falls_back_on_syntax_error() {
    let (_tmp, config_path) = setup_test_env();
    let (_, _, success) = run_wolf(&config_path, &["build"]);
    assert!(success);

    // "pack:" names no field, so only the sanitized retry can succeed.
    let (stdout, stderr, success) = run_wolf(&config_path, &["search", "pack:"]);
    assert!(success, "search failed: {}", stderr);
    assert!(stdout.contains("wolves.txt"), "stdout: {}", stdout);
}

#[test]
fn test_search_html_output() {
    let (_tmp, config_path) = setup_test_env();
    run_wolf(&config_path, &["build"]);

    let (stdout, _, success) = run_wolf(&config_path, &["search", "borrow", "--html"]);
    assert!(success);
    assert!(stdout.contains(r#"<a href="./guides/ownership.html""#), "stdout: {}", stdout);
    assert!(stdout.contains("…"));

    let (stdout, _, _) = run_wolf(&config_path, &["search", "<b>zebra</b>", "--html"]);
    assert!(stdout.contains("&lt;b&gt;zebra&lt;/b&gt;"));
}

#[test]
fn test_search_without_index() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_wolf(&config_path, &["search", "rust"]);
    assert!(success);
    assert!(stdout.contains("Index not loaded yet"), "stdout: {}", stdout);

    let (stdout, _, success) = run_wolf(&config_path, &["search", "https://example.com"]);
    assert!(success);
    assert_eq!(stdout.trim(), "Navigate: https://example.com");
}

#[test]
fn test_invalid_config_fails() {
    let tmp = TempDir::new().unwrap();
    let config_path = tmp.path().join("wolf.toml");
    fs::write(&config_path, "[search]\nbackend = \"elastic\"\n").unwrap();

    let (_, stderr, success) = run_wolf(&config_path, &["search", "rust"]);
    assert!(!success);
    assert!(stderr.contains("Unknown search backend"), "stderr: {}", stderr);
}

// ─── Server ─────────────────────────────────────────────────────────

fn sample_index() -> MemoryIndex {
    let docs = vec![
        Document {
            title: Some("Ownership in Rust".into()),
            path: Some("guides/ownership.html".into()),
            url: Some("https://docs.example/ownership".into()),
            content: "Every value has a single owner. The borrow checker enforces this rule \
                      at compile time."
                .into(),
            ..Default::default()
        },
        Document {
            title: None,
            path: Some("wolves.txt".into()),
            url: None,
            content: "Wolves live and hunt in packs.".into(),
            ..Default::default()
        },
    ];
    MemoryIndex::build(docs, FieldWeights::default(), 10)
}

async fn spawn_server() -> String {
    let render = RenderOptions {
        snippet_chars: 20,
        show_score: false,
    };
    let app = router(AppState::new(Arc::new(sample_index()), render));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_server_search() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{}/api/search", base))
        .query(&[("q", "borrow*")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["referrer-policy"], "no-referrer");
    assert_eq!(
        resp.headers()["x-wolfsearch-privacy"],
        "no-collection; no-profiling; no-sales"
    );
    assert!(resp.headers()["content-security-policy"]
        .to_str()
        .unwrap()
        .contains("object-src 'none'"));

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["query"], "borrow*");
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["path"], "https://docs.example/ownership");
    assert_eq!(results[0]["title"], "Ownership in Rust");
    assert_eq!(
        results[0]["snippet"].as_str().unwrap().chars().count(),
        21
    );
}

#[tokio::test]
async fn test_server_blank_and_bad_queries() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let body: serde_json::Value = client
        .get(format!("{}/api/search?q=%20%20", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body, serde_json::json!({ "query": "", "results": [] }));

    let resp = client
        .get(format!("{}/api/search", base))
        .query(&[("q", "nosuchfield:x")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "bad_request");

    let health: serde_json::Value = client
        .get(format!("{}/health", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "ok");
}

#[tokio::test]
async fn test_remote_session_against_server() {
    let base = spawn_server().await;
    let backend = RemoteBackend::new(format!("{}/api/search", base), 5).unwrap();
    let session = Session::with_backend(Arc::new(backend), Default::default());

    match session.handle("wolves").await {
        Outcome::Results { results, .. } => {
            assert_eq!(results.len(), 1);
            assert_eq!(results[0].link, "wolves.txt");
            assert_eq!(results[0].title, "wolves.txt");
        }
        other => panic!("unexpected {:?}", other),
    }

    // Server answers 400 to the primary attempt; the sanitized retry succeeds.
    match session.handle("packs:").await {
        Outcome::Results { results, .. } => assert_eq!(results[0].link, "wolves.txt"),
        other => panic!("unexpected {:?}", other),
    }

    assert_eq!(
        session.handle("docs.example/ownership").await,
        Outcome::Navigate("https://docs.example/ownership".into())
    );
}

#[tokio::test]
async fn test_server_search_page() {
    let base = spawn_server().await;
    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    let resp = client.get(format!("{}/", base)).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["referrer-policy"], "no-referrer");
    let page = resp.text().await.unwrap();
    assert!(page.contains(r#"<form method="get" action="/""#));
    assert!(!page.contains("{{"));

    let page = client
        .get(format!("{}/", base))
        .query(&[("q", "borrow")])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains(r#"<a href="https://docs.example/ownership""#), "page: {}", page);
    assert!(page.contains(r#"value="borrow""#));

    // Rejected by the query parser, answered by the sanitized retry.
    let page = client
        .get(format!("{}/", base))
        .query(&[("q", "packs:")])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("wolves.txt"), "page: {}", page);

    let page = client
        .get(format!("{}/", base))
        .query(&[("q", "\"><script>x</script>")])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(!page.contains("<script>x"));
    assert!(page.contains("&lt;script&gt;"));

    let resp = client
        .get(format!("{}/", base))
        .query(&[("q", "docs.example/ownership")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 303);
    assert_eq!(resp.headers()["location"], "https://docs.example/ownership");
}
