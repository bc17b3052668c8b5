use crate::engine::ExecutionPath;
use crate::execution_id::ExecutionId;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// One state transition of the router.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExecutionEventKind {
    ExecutionCreated,
    Classified { has_blocking_io: bool },
    RealStarted,
    RealFinished { elapsed_ms: u64, compilation_failed: bool },
    RealFailed { error: String },
    FallbackStarted { reason: String },
    ExecutionFinished { path: String },
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ExecutionEvent {
    pub execution_id: ExecutionId,
    pub kind: ExecutionEventKind,
    pub timestamp: SystemTime,
}

impl ExecutionEvent {
    pub fn new(execution_id: &ExecutionId, kind: ExecutionEventKind) -> Self {
        Self {
            execution_id: execution_id.clone(),
            kind,
            timestamp: SystemTime::now(),
        }
    }
}

pub fn execution_finished(execution_id: &ExecutionId, path: ExecutionPath) -> ExecutionEvent {
    let path = match path {
        ExecutionPath::Real => "real",
        ExecutionPath::Simulated => "simulated",
    };
    ExecutionEvent::new(
        execution_id,
        ExecutionEventKind::ExecutionFinished {
            path: path.to_string(),
        },
    )
}
