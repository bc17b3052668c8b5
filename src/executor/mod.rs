// src/executor/mod.rs

//! Real execution through local toolchains.
//!
//! The router only talks to the [`Executor`] trait so it can be exercised
//! with a double; [`ProcessExecutor`] is the implementation that spawns
//! `python3`, `javac` and `java`.

use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::Serialize;

use crate::config::{Config, Limits, Runtime};
use crate::error::ExecutorError;
use crate::language::{ExecutionRequest, Language};

pub mod java;
pub mod process;
pub mod python;
pub mod scratch;

pub use process::{run_with_deadline, ProcessOutput};
pub use scratch::ScratchSpace;

/// Which toolchain step a process belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Interpret,
    Compile,
    Run,
    Install,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Interpret => "interpreter",
            Stage::Compile => "compilation",
            Stage::Run => "run",
            Stage::Install => "package install",
        })
    }
}

/// What a real execution produced when no executor error occurred.
#[derive(Debug, Clone)]
pub enum RealOutcome {
    /// The program ran to completion (any exit code). `elapsed` covers
    /// every stage, compile included.
    Finished(ProcessOutput),
    /// javac rejected the source; stderr is the compiler's diagnostic.
    CompileFailed(ProcessOutput),
}

impl RealOutcome {
    pub fn output(&self) -> &ProcessOutput {
        match self {
            RealOutcome::Finished(o) | RealOutcome::CompileFailed(o) => o,
        }
    }

    pub fn into_output(self) -> ProcessOutput {
        match self {
            RealOutcome::Finished(o) | RealOutcome::CompileFailed(o) => o,
        }
    }
}

#[async_trait]
pub trait Executor: Send + Sync {
    async fn run_real(&self, request: &ExecutionRequest) -> Result<RealOutcome, ExecutorError>;
}

/// Runs requests in local processes, one scratch directory per request.
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    runtime: Runtime,
    limits: Limits,
    scratch_root: Option<PathBuf>,
}

impl ProcessExecutor {
    pub fn new(runtime: Runtime, limits: Limits, scratch_root: Option<PathBuf>) -> Self {
        Self {
            runtime,
            limits,
            scratch_root,
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.runtime.clone(), cfg.limits.clone(), cfg.scratch.dir.clone())
    }
}

#[async_trait]
impl Executor for ProcessExecutor {
    async fn run_real(&self, request: &ExecutionRequest) -> Result<RealOutcome, ExecutorError> {
        let scratch = ScratchSpace::create(self.scratch_root.as_deref(), &request.execution_id)?;

        // scratch drops on every return path, taking sources and class files with it
        match request.language {
            Language::Python => python::run(&self.runtime, &self.limits, &scratch, request).await,
            Language::Java => java::run(&self.runtime, &self.limits, &scratch, request).await,
        }
    }
}
