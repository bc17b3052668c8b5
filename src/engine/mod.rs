use serde::{Serialize, Serializer};
use std::time::Duration;

use crate::execution_id::ExecutionId;

pub mod events;
pub mod router;
pub mod sink;

pub use router::ExecutionRouter;

/* ---------------- routing output ---------------- */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionPath {
    Real,
    Simulated,
}

/// Why a request was answered by simulation instead of a real process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FallbackReason {
    IoDetected,
    TookTooLong,
    TimedOut(String),
    OutputLimit(String),
    EntrypointNotFound(String),
    RuntimeError(String),
}

impl FallbackReason {
    /// The diagnostic placed in stderr for a simulated result.
    pub fn diagnostic(&self) -> String {
        match self {
            FallbackReason::IoDetected => "I/O detected; using simulated output.".to_string(),
            FallbackReason::TookTooLong => "execution took too long; simulated output.".to_string(),
            FallbackReason::TimedOut(what)
            | FallbackReason::OutputLimit(what)
            | FallbackReason::EntrypointNotFound(what) => format!("{}; simulated output.", what),
            FallbackReason::RuntimeError(what) => {
                format!("runtime error: {}; simulated output.", what)
            }
        }
    }
}

/// The single result shape every request ends with.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionResult {
    pub execution_id: ExecutionId,
    pub stdout: String,
    pub stderr: String,
    pub path: ExecutionPath,
    #[serde(rename = "elapsed_ms", serialize_with = "as_millis")]
    pub elapsed: Duration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<FallbackReason>,
    pub exit_code: Option<i32>,
    pub compilation_failed: bool,
    pub peak_memory_kb: Option<u64>,
}

impl ExecutionResult {
    /// Machine-facing reason string: the routing reason for simulated runs,
    /// the captured stderr for real ones.
    pub fn diagnostic(&self) -> &str {
        &self.stderr
    }

    pub fn is_simulated(&self) -> bool {
        self.path == ExecutionPath::Simulated
    }
}

fn as_millis<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}
