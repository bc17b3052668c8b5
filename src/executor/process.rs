// src/executor/process.rs

use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;

use crate::error::ExecutorError;
use crate::metrics::{MemoryTracker, SAMPLE_EVERY};

use super::Stage;

/// Captured result of one finished child process.
#[derive(Debug, Clone, Default)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
    pub elapsed: Duration,
    pub peak_memory_kb: Option<u64>,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Spawn `program args...` in `cwd` and wait at most `limit` for it.
///
/// stdin is closed so the child can never block on the terminal. stdout and
/// stderr are each capped at `max_output` bytes; a child that writes more is
/// killed. On timeout the child is killed when its handle drops and its
/// output is discarded.
pub async fn run_with_deadline(
    program: &str,
    args: &[&str],
    cwd: Option<&Path>,
    stage: Stage,
    limit: Duration,
    max_output: u64,
) -> Result<ProcessOutput, ExecutorError> {
    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }

    tracing::debug!(%stage, program, ?args, limit_ms = limit.as_millis() as u64, max_output, "spawning");

    let start = Instant::now();
    let mut child = cmd.spawn().map_err(|e| {
        ExecutorError::UnexpectedExecutionFailure(format!("failed to launch {}: {}", program, e))
    })?;

    let memory = child.id().map(|pid| MemoryTracker::start(pid, SAMPLE_EVERY));
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let waited = {
        let collect = async {
            let (out, err) = tokio::try_join!(
                read_capped(stdout, max_output),
                read_capped(stderr, max_output)
            )?;
            let status = child.wait().await.map_err(Capture::Io)?;
            Ok::<_, Capture>((out, err, status))
        };
        tokio::time::timeout(limit, collect).await
    };
    let elapsed = start.elapsed();
    let peak_memory_kb = match memory {
        Some(tracker) => tracker.finish().await,
        None => None,
    };

    match waited {
        Err(_) => {
            tracing::warn!(%stage, program, limit_ms = limit.as_millis() as u64, "deadline exceeded, child killed");
            Err(ExecutorError::Timeout { stage, limit })
        }
        Ok(Err(Capture::Overflow)) => {
            let _ = child.start_kill();
            tracing::warn!(%stage, program, max_output, "output limit exceeded, child killed");
            Err(ExecutorError::OutputLimit { stage, limit: max_output })
        }
        Ok(Err(Capture::Io(e))) => Err(ExecutorError::UnexpectedExecutionFailure(format!(
            "failed while waiting for {}: {}",
            program, e
        ))),
        Ok(Ok((stdout, stderr, status))) => Ok(ProcessOutput {
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
            exit_code: status.code(),
            elapsed,
            peak_memory_kb,
        }),
    }
}

enum Capture {
    Io(std::io::Error),
    Overflow,
}

/// Drain `pipe` to EOF, giving up as soon as it yields more than `cap` bytes.
async fn read_capped<R>(pipe: Option<R>, cap: u64) -> Result<Vec<u8>, Capture>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    let Some(pipe) = pipe else {
        return Ok(buf);
    };

    let mut limited = pipe.take(cap.saturating_add(1));
    limited.read_to_end(&mut buf).await.map_err(Capture::Io)?;

    if buf.len() as u64 > cap {
        return Err(Capture::Overflow);
    }
    Ok(buf)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    const MAX_OUTPUT: u64 = 1024 * 1024;

    #[tokio::test]
    async fn captures_streams_and_exit_code() {
        let out = run_with_deadline(
            "sh",
            &["-c", "echo out; echo err 1>&2; exit 3"],
            None,
            Stage::Run,
            Duration::from_secs(5),
            MAX_OUTPUT,
        )
        .await
        .unwrap();

        assert_eq!(out.stdout, "out\n");
        assert_eq!(out.stderr, "err\n");
        assert_eq!(out.exit_code, Some(3));
        assert!(!out.success());
    }

    #[tokio::test]
    async fn kills_process_past_deadline() {
        let start = Instant::now();
        let err = run_with_deadline(
            "sh",
            &["-c", "sleep 10"],
            None,
            Stage::Interpret,
            Duration::from_millis(200),
            MAX_OUTPUT,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ExecutorError::Timeout { stage: Stage::Interpret, .. }));
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn missing_binary_is_a_launch_failure() {
        let err = run_with_deadline(
            "definitely-not-a-real-binary-7f3a",
            &[],
            None,
            Stage::Interpret,
            Duration::from_secs(1),
            MAX_OUTPUT,
        )
        .await
        .unwrap_err();

        match err {
            ExecutorError::UnexpectedExecutionFailure(msg) => {
                assert!(msg.contains("definitely-not-a-real-binary-7f3a"))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn stdin_is_closed() {
        let out = run_with_deadline("cat", &[], None, Stage::Run, Duration::from_secs(2), MAX_OUTPUT)
            .await
            .unwrap();
        assert!(out.success());
        assert_eq!(out.stdout, "");
    }

    #[tokio::test]
    async fn runaway_output_kills_the_child() {
        let start = Instant::now();
        let err = run_with_deadline(
            "sh",
            &["-c", "head -c 200000000 /dev/zero | tr '\\0' x"],
            None,
            Stage::Interpret,
            Duration::from_secs(20),
            4096,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ExecutorError::OutputLimit { stage: Stage::Interpret, limit: 4096 }));
        assert!(start.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn output_at_the_cap_is_kept() {
        let out = run_with_deadline(
            "sh",
            &["-c", "printf 'abcd'; printf 'wxyz' 1>&2"],
            None,
            Stage::Run,
            Duration::from_secs(5),
            4,
        )
        .await
        .unwrap();

        assert_eq!(out.stdout, "abcd");
        assert_eq!(out.stderr, "wxyz");
    }

    #[tokio::test]
    async fn stderr_flood_is_capped_too() {
        let err = run_with_deadline(
            "sh",
            &["-c", "head -c 100000 /dev/zero 1>&2"],
            None,
            Stage::Run,
            Duration::from_secs(5),
            1024,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ExecutorError::OutputLimit { .. }));
    }
}
