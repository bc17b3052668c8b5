// src/error.rs

//! Error taxonomy for the routing engine.
//!
//! Only [`ClassificationError`] and [`RequestError`] ever reach the caller.
//! [`ExecutorError`] and [`ModelError`] are absorbed by the router, which
//! turns them into a simulated result or placeholder text.

use std::time::Duration;

use thiserror::Error;

use crate::executor::Stage;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassificationError {
    #[error("Unsupported language: {0:?} (expected Python or Java)")]
    UnsupportedLanguage(String),
}

/// Problems with the shape of an execution request, raised before any work.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error(transparent)]
    Classification(#[from] ClassificationError),

    #[error("Entrypoint {name:?} does not match {language} (expected a .{expected} file)")]
    EntrypointExtension {
        name: String,
        language: &'static str,
        expected: &'static str,
    },

    #[error("Entrypoint name is empty")]
    EmptyEntrypoint,
}

#[derive(Error, Debug)]
pub enum ExecutorError {
    #[error("{stage} timed out after {}s", .limit.as_secs_f64())]
    Timeout { stage: Stage, limit: Duration },

    #[error("{stage} exceeded the {limit}-byte output limit")]
    OutputLimit { stage: Stage, limit: u64 },

    /// Only the file name is kept so scratch locations never leak to callers.
    #[error("entrypoint not found: {name}: {reason}")]
    EntrypointNotFound { name: String, reason: String },

    #[error("Unexpected execution failure: {0}")]
    UnexpectedExecutionFailure(String),
}

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Model request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Model returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Model returned no content")]
    Empty,

    #[error("Model did not answer within {}s", .0.as_secs())]
    Deadline(Duration),

    #[error("Model unavailable: {0}")]
    Unavailable(String),
}
