//! `wolf repl`: the controller driven by stdin.
//!
//! Each line is the search box's current text, so lines arriving faster than
//! `search.debounce_ms` collapse into one search for the last of them.
//! `:go <text>` searches immediately, like pressing the search button.
//! `:clear` clears the view; `:quit` or EOF exits once outstanding searches
//! have finished.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use wolf_search_core::session::{Outcome, Session};

use crate::config::Config;
use crate::controller::{Controller, InputEvent, ViewUpdate};
use crate::search::build_session;

/// Map one input line to an event; `None` means quit.
pub fn parse_line(line: &str) -> Option<InputEvent> {
    let trimmed = line.trim();
    match trimmed {
        ":quit" | ":q" => None,
        ":clear" => Some(InputEvent::Clear),
        _ => match trimmed.strip_prefix(":go") {
            Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => {
                Some(InputEvent::Submit(rest.trim().to_string()))
            }
            _ => Some(InputEvent::Changed(line.to_string())),
        },
    }
}

pub async fn run_repl(config: &Config, html: bool) -> Result<()> {
    let (session, loaded) = build_session(config).await?;
    if let Some(loaded) = loaded {
        print_update(&session, &ViewUpdate::Show(loaded), html);
    }

    let (out_tx, mut out_rx) = mpsc::channel(32);
    let printer = {
        let session = session.clone();
        tokio::spawn(async move {
            while let Some(update) = out_rx.recv().await {
                print_update(&session, &update, html);
            }
        })
    };

    drive_lines(
        BufReader::new(tokio::io::stdin()),
        session,
        Duration::from_millis(config.search.debounce_ms),
        out_tx,
    )
    .await?;

    printer.await?;
    Ok(())
}

/// Feed `reader` line by line through a controller until EOF or `:quit`,
/// returning once every resulting update has been sent to `output`.
pub async fn drive_lines<R>(
    reader: R,
    session: Arc<Session>,
    debounce: Duration,
    output: mpsc::Sender<ViewUpdate>,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let (in_tx, in_rx) = mpsc::channel(32);
    let worker = tokio::spawn(Controller::new(session, debounce).run(in_rx, output));

    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        let Some(event) = parse_line(&line) else {
            break;
        };
        if in_tx.send(event).await.is_err() {
            break;
        }
    }
    drop(in_tx);

    worker.await?;
    Ok(())
}

fn print_update(session: &Session, update: &ViewUpdate, html: bool) {
    match update {
        ViewUpdate::Clear => println!("(cleared)"),
        ViewUpdate::Navigate(url) => println!("Navigate: {}", url),
        ViewUpdate::Show(outcome) if html => {
            if let Some(markup) = session.render(outcome) {
                println!("{}", markup);
            }
        }
        ViewUpdate::Show(Outcome::Results { results, .. }) if results.is_empty() => {
            println!("No results.")
        }
        ViewUpdate::Show(Outcome::Results { results, .. }) => {
            for (i, result) in results.iter().enumerate() {
                println!("{}. [{:.2}] {} <{}>", i + 1, result.score, result.title, result.link);
            }
        }
        ViewUpdate::Show(Outcome::NotReady) => {
            println!("{}", wolf_search_core::session::NOT_READY_MESSAGE)
        }
        ViewUpdate::Show(Outcome::Failed { message, .. }) => println!("Search error: {}", message),
        ViewUpdate::Show(Outcome::IndexLoaded { documents }) => {
            println!("Index loaded — {} documents ready.", documents)
        }
        ViewUpdate::Show(Outcome::IndexFailed(message)) => {
            println!("Error loading index: {}", message)
        }
        ViewUpdate::Show(Outcome::Cleared) => println!("(cleared)"),
        ViewUpdate::Show(Outcome::Navigate(url)) => println!("Navigate: {}", url),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wolf_search_core::backend::memory::{FieldWeights, MemoryIndex};
    use wolf_search_core::models::Document;
    use wolf_search_core::render::RenderOptions;

    fn session() -> Arc<Session> {
        let docs = vec![
            Document {
                title: Some("Rust guide".into()),
                content: "ownership and borrowing".into(),
                ..Default::default()
            },
            Document {
                title: Some("Wolves".into()),
                content: "pack animals".into(),
                ..Default::default()
            },
        ];
        let index = MemoryIndex::build(docs, FieldWeights::default(), 50);
        Arc::new(Session::with_backend(Arc::new(index), RenderOptions::default()))
    }

    async fn collect(input: &str) -> Vec<ViewUpdate> {
        let (tx, mut rx) = mpsc::channel(32);
        drive_lines(input.as_bytes(), session(), Duration::from_millis(200), tx)
            .await
            .unwrap();
        let mut updates = Vec::new();
        while let Some(update) = rx.recv().await {
            updates.push(update);
        }
        updates
    }

    fn queries(updates: &[ViewUpdate]) -> Vec<String> {
        updates
            .iter()
            .filter_map(|u| match u {
                ViewUpdate::Show(Outcome::Results { query, .. }) => Some(query.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_parse_line() {
        assert_eq!(parse_line(":quit"), None);
        assert_eq!(parse_line("  :clear "), Some(InputEvent::Clear));
        assert_eq!(
            parse_line("rust async"),
            Some(InputEvent::Changed("rust async".into()))
        );
        assert_eq!(
            parse_line(":go rust async"),
            Some(InputEvent::Submit("rust async".into()))
        );
        assert_eq!(parse_line(":go"), Some(InputEvent::Submit(String::new())));
        assert_eq!(
            parse_line(":gopher"),
            Some(InputEvent::Changed(":gopher".into()))
        );
        assert_eq!(parse_line(""), Some(InputEvent::Changed(String::new())));
    }

    #[tokio::test(start_paused = true)]
    async fn test_line_burst_is_debounced() {
        let updates = collect("w\nwo\nwol\nwolv\n").await;
        assert_eq!(updates.len(), 1, "updates: {:?}", updates);
        assert_eq!(queries(&updates), vec!["wolv"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_go_searches_and_cancels_pending_edit() {
        let updates = collect("wol\n:go rust\n").await;
        assert_eq!(queries(&updates), vec!["rust"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_quit_stops_reading() {
        let updates = collect(":go rust\n:quit\n:go wolves\n").await;
        assert_eq!(queries(&updates), vec!["rust"]);
    }
}
