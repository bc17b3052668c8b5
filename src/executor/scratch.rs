// src/executor/scratch.rs

//! Per-request scratch directories.
//!
//! Every execution gets its own directory named after its execution id, so
//! two requests submitting `main.py` at the same time never touch the same
//! file. The directory and everything the toolchain wrote into it (class
//! files included) is removed when the [`ScratchSpace`] drops.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error::ExecutorError;
use crate::execution_id::ExecutionId;

#[derive(Debug)]
pub struct ScratchSpace {
    dir: TempDir,
}

impl ScratchSpace {
    /// Create a fresh directory under `root` (or the system temp dir).
    pub fn create(root: Option<&Path>, id: &ExecutionId) -> Result<Self, ExecutorError> {
        let mut builder = tempfile::Builder::new();
        let prefix = format!("coderoute-{}-", id);
        builder.prefix(&prefix);

        let dir = match root {
            Some(root) => {
                std::fs::create_dir_all(root).map_err(|e| {
                    ExecutorError::UnexpectedExecutionFailure(format!(
                        "failed to create scratch root {}: {}",
                        root.display(),
                        e
                    ))
                })?;
                builder.tempdir_in(root)
            }
            None => builder.tempdir(),
        }
        .map_err(|e| {
            ExecutorError::UnexpectedExecutionFailure(format!(
                "failed to create scratch directory: {}",
                e
            ))
        })?;

        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `source` to `file_name` inside the scratch directory.
    ///
    /// Only the final path component of `file_name` is used, so a name like
    /// `../../etc/x.py` cannot escape the directory. The file is checked to
    /// exist before returning.
    pub fn write(&self, file_name: &str, source: &str) -> Result<PathBuf, ExecutorError> {
        let base = Path::new(file_name)
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(file_name));

        let name = base.to_string_lossy().into_owned();
        let path = self.dir.path().join(&base);

        std::fs::write(&path, source).map_err(|e| ExecutorError::EntrypointNotFound {
            name: name.clone(),
            reason: e.to_string(),
        })?;

        if !path.is_file() {
            return Err(ExecutorError::EntrypointNotFound {
                name,
                reason: "file missing after write".to_string(),
            });
        }

        Ok(path)
    }
}
