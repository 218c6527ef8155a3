//! Progress events for a running evaluation.
//!
//! The orchestrator emits via [`EventBus::emit`]; the CLI spinner and the
//! server logs subscribe via [`EventBus::subscribe`]. Built on
//! [`tokio::sync::broadcast`] so multiple listeners can react independently.

use tokio::sync::broadcast;

/// Events that flow out of an evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// An evaluation passed validation and is about to call `agents` agents.
    EvaluationStarted { agents: usize },
    /// An agent's completion call is starting.
    AgentStarted {
        agent_id: String,
        display_name: String,
    },
    /// An agent's call returned. `ok` is false when it recorded an error.
    AgentFinished { agent_id: String, ok: bool },
    /// The synthesis call is starting.
    SummaryStarted,
    SummaryFinished { ok: bool },
    /// All calls are done.
    EvaluationFinished { failed: usize },
}

/// A broadcast channel that any component can emit to or subscribe from.
#[derive(Debug)]
pub struct EventBus {
    tx: broadcast::Sender<Event>,
}

impl EventBus {
    /// Create a new event bus with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Emit an event to all current subscribers.
    /// Returns the number of receivers that will see it.
    pub fn emit(&self, event: Event) -> usize {
        self.tx.send(event).unwrap_or(0)
    }

    /// Subscribe to events. Returns a receiver that yields all
    /// future events (does not replay past ones).
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}
