//! End-to-end routing through real toolchains.
//!
//! Each test checks for the binaries it needs and returns early when they are
//! not installed, so the suite stays green on machines without Python or a JDK.

use std::process::Command;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use coderoute::config::Config;
use coderoute::engine::{ExecutionPath, ExecutionRouter};
use coderoute::error::ModelError;
use coderoute::language::{ExecutionRequest, Language};
use coderoute::model::CompletionModel;

struct CountingModel {
    calls: AtomicUsize,
}

impl CountingModel {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionModel for CountingModel {
    async fn complete(&self, _prompt: &str) -> Result<String, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok("simulated output".to_string())
    }
}

fn available(program: &str, arg: &str) -> bool {
    Command::new(program)
        .arg(arg)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn router(cfg: &Config, model: Arc<CountingModel>) -> ExecutionRouter {
    ExecutionRouter::from_config(cfg, model)
}

#[tokio::test]
async fn python_hello_world_runs_for_real() {
    if !available("python3", "--version") {
        eprintln!("python3 not installed; skipping");
        return;
    }

    let model = CountingModel::new();
    let r = router(&Config::default(), model.clone());
    let req = ExecutionRequest::new(Language::Python, "print('Hello, World!')", "main.py", vec![]).unwrap();

    let result = r.route_execution(&req).await;

    assert_eq!(result.path, ExecutionPath::Real);
    assert_eq!(result.stdout, "Hello, World!\n");
    assert_eq!(result.stderr, "");
    assert_eq!(result.exit_code, Some(0));
    assert!(result.elapsed < Duration::from_secs(10));
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn python_runtime_error_is_real_stderr() {
    if !available("python3", "--version") {
        eprintln!("python3 not installed; skipping");
        return;
    }

    let r = router(&Config::default(), CountingModel::new());
    let req = ExecutionRequest::new(Language::Python, "print(1 / 0)", "main.py", vec![]).unwrap();

    let result = r.route_execution(&req).await;

    assert_eq!(result.path, ExecutionPath::Real);
    assert!(result.stderr.contains("ZeroDivisionError"));
    assert_ne!(result.exit_code, Some(0));
}

#[tokio::test]
async fn python_past_deadline_is_simulated() {
    if !available("python3", "--version") {
        eprintln!("python3 not installed; skipping");
        return;
    }

    let mut cfg = Config::default();
    cfg.limits.interpret_ms = 500;
    let model = CountingModel::new();
    let r = router(&cfg, model.clone());
    let req = ExecutionRequest::new(Language::Python, "import time\ntime.sleep(30)\n", "main.py", vec![]).unwrap();

    let result = r.route_execution(&req).await;

    assert_eq!(result.path, ExecutionPath::Simulated);
    assert!(result.stderr.contains("timed out"), "{}", result.stderr);
    assert_eq!(result.stdout, "simulated output");
    assert_eq!(model.calls(), 1);
    assert!(result.elapsed < Duration::from_secs(10));
}

#[tokio::test]
async fn missing_interpreter_degrades_to_simulation() {
    let mut cfg = Config::default();
    cfg.runtime.python = "python-binary-that-does-not-exist".to_string();
    let model = CountingModel::new();
    let r = router(&cfg, model.clone());
    let req = ExecutionRequest::new(Language::Python, "print(1)", "main.py", vec![]).unwrap();

    let result = r.route_execution(&req).await;

    assert_eq!(result.path, ExecutionPath::Simulated);
    assert!(result.stderr.starts_with("runtime error:"), "{}", result.stderr);
    assert_eq!(model.calls(), 1);
}

#[tokio::test]
async fn scratch_files_are_removed_after_the_run() {
    if !available("python3", "--version") {
        eprintln!("python3 not installed; skipping");
        return;
    }

    let root = tempfile::tempdir().unwrap();
    let mut cfg = Config::default();
    cfg.scratch.dir = Some(root.path().to_path_buf());
    let r = router(&cfg, CountingModel::new());

    let a = ExecutionRequest::new(Language::Python, "print('A')", "main.py", vec![]).unwrap();
    let b = ExecutionRequest::new(Language::Python, "print('B')", "main.py", vec![]).unwrap();
    let (ra, rb) = tokio::join!(r.route_execution(&a), r.route_execution(&b));

    assert_eq!(ra.stdout, "A\n");
    assert_eq!(rb.stdout, "B\n");
    assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn java_runs_with_arguments() {
    if !available("javac", "-version") || !available("java", "-version") {
        eprintln!("JDK not installed; skipping");
        return;
    }

    let src = r#"
public class Adder {
    public static void main(String[] args) {
        int a = Integer.parseInt(args[0]);
        int b = Integer.parseInt(args[1]);
        System.out.println(a + b);
    }
}
"#;
    let mut cfg = Config::default();
    // JVM start-up on a cold CI runner can be slow
    cfg.limits.compile_ms = 60_000;
    cfg.limits.run_ms = 30_000;
    cfg.limits.slow_after_ms = 90_000;
    let r = router(&cfg, CountingModel::new());
    let req = ExecutionRequest::new(Language::Java, src, "Main.java", vec!["1".into(), "2".into()]).unwrap();

    let result = r.route_execution(&req).await;

    assert_eq!(result.path, ExecutionPath::Real);
    assert_eq!(result.stdout.trim(), "3");
}

#[tokio::test]
async fn java_compile_error_is_returned_verbatim() {
    if !available("javac", "-version") {
        eprintln!("javac not installed; skipping");
        return;
    }

    let mut cfg = Config::default();
    cfg.limits.compile_ms = 60_000;
    cfg.limits.slow_after_ms = 90_000;
    let model = CountingModel::new();
    let r = router(&cfg, model.clone());
    let src = "public class Broken {\n    public static void main(String[] args) {\n        int x = 1\n    }\n}\n";
    let req = ExecutionRequest::new(Language::Java, src, "Main.java", vec![]).unwrap();

    let result = r.route_execution(&req).await;

    assert_eq!(result.path, ExecutionPath::Real);
    assert!(result.compilation_failed);
    assert!(result.stderr.contains("Broken.java"), "{}", result.stderr);
    assert!(result.stderr.contains("error"));
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn python_output_flood_is_simulated() {
    if !available("python3", "--version") {
        eprintln!("python3 not installed; skipping");
        return;
    }

    let mut cfg = Config::default();
    cfg.limits.output_bytes = 64 * 1024;
    let model = CountingModel::new();
    let r = router(&cfg, model.clone());
    let req = ExecutionRequest::new(Language::Python, "while True:\n    print('x' * 1000)\n", "main.py", vec![]).unwrap();

    let result = r.route_execution(&req).await;

    assert_eq!(result.path, ExecutionPath::Simulated);
    assert!(result.stderr.contains("65536-byte output limit"), "{}", result.stderr);
    assert_eq!(result.stdout, "simulated output");
    assert_eq!(model.calls(), 1);
    assert!(result.elapsed < Duration::from_secs(10));
}
