// src/engine/router.rs

//! Real-vs-simulated routing.
//!
//! ```text
//! Classifying --io------------------------------> Simulating --> Done
//! Classifying --no io--> RealExecuting --ok, fast--------------> Done
//!                                      --compile failure-------> Done
//!                                      --ok, slow--> Simulating --> Done
//!                                      --error-----> Simulating --> Done
//! ```
//!
//! Every request reaches `Done` with exactly one result. A failed real run is
//! never retried; it turns into exactly one simulation.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::classify::classify_source;
use crate::config::Config;
use crate::engine::events::{execution_finished, ExecutionEvent, ExecutionEventKind};
use crate::engine::sink::{DiscardingEventSink, EventSink};
use crate::engine::{ExecutionPath, ExecutionResult, FallbackReason};
use crate::error::ExecutorError;
use crate::executor::{Executor, ProcessExecutor, RealOutcome};
use crate::language::ExecutionRequest;
use crate::model::CompletionModel;
use crate::simulate::Simulator;
use crate::sinks::collecting::CollectingEventSink;

pub struct ExecutionRouter {
    executor: Arc<dyn Executor>,
    simulator: Simulator,
    slow_after: Duration,
}

impl ExecutionRouter {
    pub fn new(executor: Arc<dyn Executor>, simulator: Simulator, slow_after: Duration) -> Self {
        Self {
            executor,
            simulator,
            slow_after,
        }
    }

    /// Wire the process executor and the given model from configuration.
    pub fn from_config(cfg: &Config, model: Arc<dyn CompletionModel>) -> Self {
        Self::new(
            Arc::new(ProcessExecutor::from_config(cfg)),
            Simulator::new(model, cfg.limits.model()),
            cfg.limits.slow_after(),
        )
    }

    pub async fn route_execution(&self, request: &ExecutionRequest) -> ExecutionResult {
        self.route(request, &mut DiscardingEventSink).await
    }

    /// Route and also return every transition that was emitted.
    pub async fn route_with_events(
        &self,
        request: &ExecutionRequest,
    ) -> (ExecutionResult, CollectingEventSink) {
        let mut sink = CollectingEventSink::new();
        let result = self.route(request, &mut sink).await;
        (result, sink)
    }

    pub async fn route(
        &self,
        request: &ExecutionRequest,
        sink: &mut dyn EventSink,
    ) -> ExecutionResult {
        let id = &request.execution_id;
        let start = Instant::now();
        sink.emit(ExecutionEvent::new(id, ExecutionEventKind::ExecutionCreated));

        // ---- classifying ----
        let risk = classify_source(request.language, &request.source);
        sink.emit(ExecutionEvent::new(
            id,
            ExecutionEventKind::Classified {
                has_blocking_io: risk.has_blocking_io,
            },
        ));

        let result = if risk.has_blocking_io {
            tracing::info!(execution_id = %id, matched = ?risk.matched, "blocking I/O detected");
            self.simulated(request, FallbackReason::IoDetected, start, sink).await
        } else {
            self.real_or_fallback(request, start, sink).await
        };

        tracing::info!(
            execution_id = %id,
            language = %request.language,
            path = ?result.path,
            elapsed_ms = result.elapsed.as_millis() as u64,
            "execution routed"
        );
        sink.emit(execution_finished(id, result.path));
        result
    }

    async fn real_or_fallback(
        &self,
        request: &ExecutionRequest,
        start: Instant,
        sink: &mut dyn EventSink,
    ) -> ExecutionResult {
        let id = &request.execution_id;
        sink.emit(ExecutionEvent::new(id, ExecutionEventKind::RealStarted));

        let outcome = match self.executor.run_real(request).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(execution_id = %id, error = %e, "real execution failed");
                sink.emit(ExecutionEvent::new(
                    id,
                    ExecutionEventKind::RealFailed {
                        error: e.to_string(),
                    },
                ));
                return self.simulated(request, fallback_reason(&e), start, sink).await;
            }
        };

        let output = outcome.output();
        let compilation_failed = matches!(outcome, RealOutcome::CompileFailed(_));
        sink.emit(ExecutionEvent::new(
            id,
            ExecutionEventKind::RealFinished {
                elapsed_ms: output.elapsed.as_millis() as u64,
                compilation_failed,
            },
        ));

        // Compiler diagnostics are the user's own error; they are returned
        // as-is no matter how long javac took.
        if !compilation_failed && output.elapsed > self.slow_after {
            tracing::info!(
                execution_id = %id,
                elapsed_ms = output.elapsed.as_millis() as u64,
                "real run exceeded slow threshold, discarding output"
            );
            return self.simulated(request, FallbackReason::TookTooLong, start, sink).await;
        }

        let output = outcome.into_output();
        ExecutionResult {
            execution_id: id.clone(),
            stdout: output.stdout,
            stderr: output.stderr,
            path: ExecutionPath::Real,
            elapsed: output.elapsed,
            reason: None,
            exit_code: output.exit_code,
            compilation_failed,
            peak_memory_kb: output.peak_memory_kb,
        }
    }

    async fn simulated(
        &self,
        request: &ExecutionRequest,
        reason: FallbackReason,
        start: Instant,
        sink: &mut dyn EventSink,
    ) -> ExecutionResult {
        let diagnostic = reason.diagnostic();
        sink.emit(ExecutionEvent::new(
            &request.execution_id,
            ExecutionEventKind::FallbackStarted {
                reason: diagnostic.clone(),
            },
        ));

        let narrative = self
            .simulator
            .simulate(request.language, &request.source)
            .await;

        ExecutionResult {
            execution_id: request.execution_id.clone(),
            stdout: narrative,
            stderr: diagnostic,
            path: ExecutionPath::Simulated,
            elapsed: start.elapsed(),
            reason: Some(reason),
            exit_code: None,
            compilation_failed: false,
            peak_memory_kb: None,
        }
    }
}

fn fallback_reason(err: &ExecutorError) -> FallbackReason {
    match err {
        ExecutorError::Timeout { .. } => FallbackReason::TimedOut(err.to_string()),
        ExecutorError::OutputLimit { .. } => FallbackReason::OutputLimit(err.to_string()),
        ExecutorError::EntrypointNotFound { .. } => FallbackReason::EntrypointNotFound(err.to_string()),
        ExecutorError::UnexpectedExecutionFailure(msg) => FallbackReason::RuntimeError(msg.clone()),
    }
}
