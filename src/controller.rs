//! Event loop between a text input and a results view.
//!
//! The controller reads [`InputEvent`]s from a channel and writes
//! [`ViewUpdate`]s to another:
//!
//! - `Changed` is debounced; only the last edit in a burst is searched.
//! - `Submit` is searched at once and cancels any pending edit.
//! - `Clear` cancels pending work and clears the view.
//!
//! Every event bumps a generation counter. A search whose generation is no
//! longer current when it completes is dropped, so a slow early response can
//! never overwrite a newer one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use wolf_search_core::session::{Outcome, Session};

use crate::debounce::Debouncer;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// The input text changed.
    Changed(String),
    /// The user pressed Enter.
    Submit(String),
    /// The input was cleared.
    Clear,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewUpdate {
    Clear,
    Navigate(String),
    Show(Outcome),
}

impl From<Outcome> for ViewUpdate {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Cleared => ViewUpdate::Clear,
            Outcome::Navigate(url) => ViewUpdate::Navigate(url),
            other => ViewUpdate::Show(other),
        }
    }
}

pub struct Controller {
    session: Arc<Session>,
    debounce: Duration,
    generation: Arc<AtomicU64>,
    debouncer: Debouncer,
    in_flight: JoinSet<()>,
}

impl Controller {
    pub fn new(session: Arc<Session>, debounce: Duration) -> Self {
        Self {
            session,
            debounce,
            generation: Arc::new(AtomicU64::new(0)),
            debouncer: Debouncer::new(),
            in_flight: JoinSet::new(),
        }
    }

    /// Process events until `input` closes, then let outstanding work
    /// finish before returning.
    pub async fn run(
        mut self,
        mut input: mpsc::Receiver<InputEvent>,
        output: mpsc::Sender<ViewUpdate>,
    ) {
        loop {
            tokio::select! {
                event = input.recv() => match event {
                    Some(event) => self.on_event(event, &output).await,
                    None => break,
                },
                Some(_) = self.in_flight.join_next(), if !self.in_flight.is_empty() => {}
            }
        }

        self.debouncer.flush().await;
        while self.in_flight.join_next().await.is_some() {}
    }

    async fn on_event(&mut self, event: InputEvent, output: &mpsc::Sender<ViewUpdate>) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        match event {
            InputEvent::Changed(text) => {
                let task = search_task(
                    self.session.clone(),
                    text,
                    generation,
                    self.generation.clone(),
                    output.clone(),
                );
                self.debouncer.schedule(self.debounce, task);
            }
            InputEvent::Submit(text) => {
                self.debouncer.cancel();
                self.in_flight.spawn(search_task(
                    self.session.clone(),
                    text,
                    generation,
                    self.generation.clone(),
                    output.clone(),
                ));
            }
            InputEvent::Clear => {
                self.debouncer.cancel();
                let _ = output.send(ViewUpdate::Clear).await;
            }
        }
    }
}

async fn search_task(
    session: Arc<Session>,
    text: String,
    generation: u64,
    current: Arc<AtomicU64>,
    output: mpsc::Sender<ViewUpdate>,
) {
    let outcome = session.handle(&text).await;
    if current.load(Ordering::SeqCst) != generation {
        tracing::debug!(generation, "dropping stale outcome");
        return;
    }
    let _ = output.send(outcome.into()).await;
}
