//! One-shot search from the command line, and session construction shared
//! with the REPL.

use anyhow::Result;
use std::sync::Arc;

use wolf_search_core::session::{Outcome, Session};

use crate::config::Config;
use crate::documents::load_index;
use crate::remote::RemoteBackend;

/// Build a session for the configured backend, together with the outcome of
/// loading the local index (`None` for a remote backend).
///
/// A local index that fails to load leaves the session in the failed state
/// rather than returning an error: URLs still navigate without an index.
pub async fn build_session(config: &Config) -> Result<(Arc<Session>, Option<Outcome>)> {
    let render = config.render.options();

    if config.search.is_remote() {
        let backend = RemoteBackend::from_config(&config.search)?;
        tracing::info!(endpoint = %config.search.endpoint, "using remote backend");
        return Ok((
            Arc::new(Session::with_backend(Arc::new(backend), render)),
            None,
        ));
    }

    let session = Arc::new(Session::new(render));
    let outcome = match load_index(config).await {
        Ok(index) => {
            let documents = index.len();
            session.set_ready(Arc::new(index));
            Outcome::IndexLoaded { documents }
        }
        Err(e) => {
            let message = format!("{:#}", e);
            tracing::warn!(error = %message, "index failed to load");
            session.set_failed(message.clone());
            Outcome::IndexFailed(message)
        }
    };
    Ok((session, Some(outcome)))
}

/// CLI entry point for `wolf search`.
pub async fn run_search(
    config: &Config,
    input: &str,
    html: bool,
    limit: Option<usize>,
) -> Result<()> {
    let (session, _) = build_session(config).await?;

    let mut outcome = session.handle(input).await;
    if let (Some(limit), Outcome::Results { results, .. }) = (limit, &mut outcome) {
        results.truncate(limit);
    }

    if html {
        match session.render(&outcome) {
            Some(markup) => println!("{}", markup),
            None => print_plain(&outcome, config.render.snippet_chars),
        }
        return Ok(());
    }

    print_plain(&outcome, config.render.snippet_chars);
    Ok(())
}

fn print_plain(outcome: &Outcome, snippet_chars: usize) {
    match outcome {
        Outcome::Cleared => {}
        Outcome::Navigate(url) => println!("Navigate: {}", url),
        Outcome::Results { results, .. } if results.is_empty() => println!("No results."),
        Outcome::Results { results, .. } => {
            for (i, result) in results.iter().enumerate() {
                println!("{}. [{:.2}] {}", i + 1, result.score, result.title);
                println!("    link: {}", result.link);
                let excerpt = wolf_search_core::render::truncate_snippet(
                    &result.snippet.replace('\n', " "),
                    snippet_chars,
                );
                println!("    excerpt: \"{}\"", excerpt.trim());
                println!();
            }
        }
        Outcome::NotReady => println!("{}", wolf_search_core::session::NOT_READY_MESSAGE),
        Outcome::Failed { message, .. } => println!("Search error: {}", message),
        Outcome::IndexLoaded { documents } => {
            println!("Index loaded — {} documents ready.", documents)
        }
        Outcome::IndexFailed(message) => println!("Error loading index: {}", message),
    }
}
