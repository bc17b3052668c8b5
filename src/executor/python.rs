// src/executor/python.rs

use std::time::Instant;

use crate::config::{Limits, Runtime};
use crate::error::ExecutorError;
use crate::language::ExecutionRequest;

use super::process::run_with_deadline;
use super::scratch::ScratchSpace;
use super::{RealOutcome, Stage};

/// Write the source under its entrypoint name and run `<python> <file>`.
pub async fn run(
    runtime: &Runtime,
    limits: &Limits,
    scratch: &ScratchSpace,
    request: &ExecutionRequest,
) -> Result<RealOutcome, ExecutorError> {
    let start = Instant::now();
    let file = scratch.write(&request.entrypoint_name, &request.source)?;
    let file = file.to_string_lossy();

    let mut output = run_with_deadline(
        &runtime.python,
        &[&*file],
        Some(scratch.path()),
        Stage::Interpret,
        limits.interpret(),
        limits.output_bytes,
    )
    .await?;

    output.elapsed = start.elapsed();
    Ok(RealOutcome::Finished(output))
}
