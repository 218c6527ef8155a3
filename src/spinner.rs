//! Terminal progress for a running evaluation.
//!
//! [`Spinner`] animates a single status line; [`follow`] drives one from the
//! orchestrator's [`EventBus`](crate::events::EventBus).

use std::io::Write;
use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::events::Event;

/// Braille spinner frames.
const FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Frame interval.
const INTERVAL: Duration = Duration::from_millis(80);

/// A stderr spinner whose message can change while it runs.
pub struct Spinner {
    handle: JoinHandle<()>,
    message: watch::Sender<String>,
    cancel: watch::Sender<bool>,
}

impl Spinner {
    pub fn start(message: &str) -> Self {
        let (cancel_tx, mut cancel_rx) = watch::channel(false);
        let (message_tx, message_rx) = watch::channel(message.to_string());

        let handle = tokio::spawn(async move {
            let mut i = 0;
            loop {
                let frame = FRAMES[i % FRAMES.len()];
                let message = message_rx.borrow().clone();
                // \r moves to start of line, \x1b[2K clears the line
                eprint!("\x1b[2K\r{frame} {message}");
                let _ = std::io::stderr().flush();

                tokio::select! {
                    _ = tokio::time::sleep(INTERVAL) => {}
                    _ = cancel_rx.changed() => break,
                }
                i += 1;
            }
            eprint!("\x1b[2K\r");
            let _ = std::io::stderr().flush();
        });

        Self {
            handle,
            message: message_tx,
            cancel: cancel_tx,
        }
    }

    /// Replace the text shown next to the spinner.
    pub fn set_message(&self, message: String) {
        let _ = self.message.send(message);
    }

    /// Stop the spinner and clear its line.
    pub async fn stop(self) {
        let _ = self.cancel.send(true);
        let _ = self.handle.await;
    }
}

/// Status line for an event, or `None` when the line should stay as is.
/// `done`/`total` count agents that have finished.
pub fn status_line(event: &Event, done: usize, total: usize) -> Option<String> {
    match event {
        Event::EvaluationStarted { agents } => Some(format!("asking {agents} agent(s)")),
        Event::AgentStarted { display_name, .. } => {
            Some(format!("[{}/{}] {} is thinking", done + 1, total, display_name))
        }
        Event::AgentFinished { .. } => None,
        Event::SummaryStarted => Some("synthesizing the panel's views".to_string()),
        Event::SummaryFinished { .. } | Event::EvaluationFinished { .. } => None,
    }
}

/// Render events onto a spinner until the evaluation finishes or the bus closes.
pub async fn follow(mut rx: broadcast::Receiver<Event>) {
    let spinner = Spinner::start("starting");
    let mut total = 0;
    let mut done = 0;

    loop {
        let event = match rx.recv().await {
            Ok(event) => event,
            Err(broadcast::error::RecvError::Lagged(_)) => continue,
            Err(broadcast::error::RecvError::Closed) => break,
        };

        if let Event::EvaluationStarted { agents } = event {
            total = agents;
        }
        if let Some(line) = status_line(&event, done, total) {
            spinner.set_message(line);
        }
        match event {
            Event::AgentFinished { .. } => done += 1,
            Event::EvaluationFinished { .. } => break,
            _ => {}
        }
    }

    spinner.stop().await;
}
