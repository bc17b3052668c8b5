// src/report.rs

//! Rendering of routed results for the terminal.

use anyhow::{Context, Result};
use serde_json::Value;
use std::io::IsTerminal;

use crate::config::OutputMode;
use crate::engine::{ExecutionPath, ExecutionResult};
use crate::explain::DiagnosticReport;

pub fn render(
    mode: OutputMode,
    result: &ExecutionResult,
    report: Option<&DiagnosticReport>,
    use_color: bool,
) -> Result<String> {
    match mode {
        OutputMode::Json => serde_json::to_string(&envelope(result, report))
            .context("Failed to format result as JSON"),
        OutputMode::Pretty => serde_json::to_string_pretty(&envelope(result, report))
            .context("Failed to format result as pretty JSON"),
        OutputMode::Simple => Ok(format_simple(result, report, use_color)),
    }
}

fn envelope(result: &ExecutionResult, report: Option<&DiagnosticReport>) -> Value {
    let mut value = serde_json::json!({ "result": result });
    if let Some(report) = report {
        value["explanation"] = Value::String(report.explanation.clone());
    }
    value
}

fn format_simple(
    result: &ExecutionResult,
    report: Option<&DiagnosticReport>,
    use_color: bool,
) -> String {
    let (status, color) = match (result.path, result.compilation_failed) {
        (ExecutionPath::Real, true) => ("COMPILE ERROR", "31"),
        (ExecutionPath::Real, false) if result.exit_code == Some(0) => ("REAL", "32"),
        (ExecutionPath::Real, false) => ("REAL (failed)", "31"),
        (ExecutionPath::Simulated, _) => ("SIMULATED", "33"),
    };

    let mut out = String::new();
    out.push_str(&format!(
        "{} {} ({}ms)\n",
        paint(status, color, use_color),
        result.execution_id,
        result.elapsed.as_millis()
    ));
    if let Some(kb) = result.peak_memory_kb {
        out.push_str(&format!("memory: {}kb\n", kb));
    }

    out.push_str("\nOutput:\n");
    out.push_str(&result.stdout);
    if !result.stdout.ends_with('\n') {
        out.push('\n');
    }

    if !result.stderr.is_empty() {
        out.push_str(&format!("\n{}\n", paint("Errors:", "31", use_color)));
        out.push_str(&result.stderr);
        if !result.stderr.ends_with('\n') {
            out.push('\n');
        }
    }

    if let Some(report) = report.filter(|r| !r.explanation.is_empty()) {
        out.push_str("\nExplanation:\n");
        out.push_str(&report.explanation);
        out.push('\n');
    }

    out.trim_end().to_string()
}

pub fn should_use_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    std::io::stdout().is_terminal()
}

fn paint(text: &str, color: &str, use_color: bool) -> String {
    if use_color {
        format!("\x1b[{}m{}\x1b[0m", color, text)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::FallbackReason;
    use crate::execution_id::ExecutionId;
    use std::time::Duration;

    fn simulated() -> ExecutionResult {
        ExecutionResult {
            execution_id: ExecutionId("exec_test".into()),
            stdout: "Hello, Ada".into(),
            stderr: FallbackReason::IoDetected.diagnostic(),
            path: ExecutionPath::Simulated,
            elapsed: Duration::from_millis(1234),
            reason: Some(FallbackReason::IoDetected),
            exit_code: None,
            compilation_failed: false,
            peak_memory_kb: None,
        }
    }

    #[test]
    fn simple_output_has_sections() {
        let text = render(OutputMode::Simple, &simulated(), None, false).unwrap();
        assert_eq!(
            text,
            "SIMULATED exec_test (1234ms)\n\nOutput:\nHello, Ada\n\nErrors:\nI/O detected; using simulated output."
        );
    }

    #[test]
    fn explanation_is_appended_when_present() {
        let report = DiagnosticReport {
            explanation: "Fix the typo.".into(),
        };
        let text = render(OutputMode::Simple, &simulated(), Some(&report), false).unwrap();
        assert!(text.ends_with("Explanation:\nFix the typo."));
    }

    #[test]
    fn json_carries_path_and_elapsed_ms() {
        let text = render(OutputMode::Json, &simulated(), None, false).unwrap();
        let v: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(v["result"]["path"], "simulated");
        assert_eq!(v["result"]["elapsed_ms"], 1234);
        assert_eq!(v["result"]["reason"]["kind"], "io_detected");
        assert!(v.get("explanation").is_none());
    }

    #[test]
    fn colour_codes_only_when_enabled() {
        let text = render(OutputMode::Simple, &simulated(), None, true).unwrap();
        assert!(text.starts_with("\x1b[33mSIMULATED\x1b[0m"));
    }
}
