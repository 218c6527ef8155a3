//! Error types shared across the crate.
//!
//! Backend failures are information for the caller: the orchestrator turns
//! them into per-agent error strings instead of aborting an evaluation.

use thiserror::Error;

/// A completion call that did not produce text.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("backend unreachable at {url}: {reason}")]
    Unreachable { url: String, reason: String },

    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed backend response: {0}")]
    Malformed(String),

    #[error("configuration missing: {0}")]
    ConfigurationMissing(String),
}

/// A request rejected before any backend call was made.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
    #[error("idea text must not be empty")]
    EmptyIdea,

    #[error("unknown agent: {0}")]
    UnknownAgent(String),

    #[error("no agents selected")]
    NoAgents,

    #[error("temperature must be a number between 0 and 2, got {0}")]
    InvalidTemperature(String),
}

/// Settings that could not be read from the environment.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}
