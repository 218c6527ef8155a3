use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::BackendError;

use super::{Backend, Completion, Prompt, TokenUsage};

enum Mode {
    /// Reply with the prompt itself.
    Echo,
    /// Reply with pre-defined results in call order.
    Scripted(Vec<Result<String, BackendError>>),
}

/// A backend for tests. Echoes prompts or replays a script, and records every call.
pub struct MockBackend {
    mode: Mode,
    index: AtomicUsize,
    prompts: Mutex<Vec<Prompt>>,
}

impl MockBackend {
    /// Every call succeeds with `"{system}\n\n{user}"`.
    pub fn echo() -> Self {
        Self::with_mode(Mode::Echo)
    }

    /// Call `i` returns `replies[i]`; running past the end is a `Malformed` error.
    pub fn scripted(replies: Vec<Result<String, BackendError>>) -> Self {
        Self::with_mode(Mode::Scripted(replies))
    }

    /// Every call fails with the given error.
    pub fn failing(error: BackendError, calls: usize) -> Self {
        Self::scripted(vec![Err(error); calls])
    }

    fn with_mode(mode: Mode) -> Self {
        Self {
            mode,
            index: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Number of `complete` calls so far.
    pub fn calls(&self) -> usize {
        self.index.load(Ordering::SeqCst)
    }

    /// Every prompt received, in call order.
    pub fn prompts(&self) -> Vec<Prompt> {
        self.prompts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl Backend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock"
    }

    async fn complete(&self, prompt: &Prompt) -> Result<Completion, BackendError> {
        let i = self.index.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(prompt.clone());

        let text = match &self.mode {
            Mode::Echo => format!("{}\n\n{}", prompt.system, prompt.user),
            Mode::Scripted(replies) => replies.get(i).cloned().unwrap_or_else(|| {
                Err(BackendError::Malformed(format!(
                    "MockBackend: no more replies (called {} times)",
                    i + 1
                )))
            })?,
        };

        Ok(Completion {
            usage: Some(TokenUsage {
                input_tokens: (prompt.system.len() + prompt.user.len()) as u64,
                output_tokens: text.len() as u64,
            }),
            text,
        })
    }
}
