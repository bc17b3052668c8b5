// src/runner.rs

use crate::classify::classify_source;
use crate::cli::{Cli, Command};
use crate::config::Config;
use crate::engine::{ExecutionPath, ExecutionResult, ExecutionRouter};
use crate::explain::{DiagnosticReport, Explainer};
use crate::install::install_package;
use crate::language::{ExecutionRequest, Language};
use crate::model::{self, CompletionModel};
use crate::report::{render, should_use_color};
use crate::util::{file_name, read_to_string, write_if_missing};

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Everything a request needs, built once from configuration and shared by
/// the CLI and the HTTP surface.
pub struct Services {
    pub config: Config,
    pub router: ExecutionRouter,
    pub explainer: Explainer,
}

impl Services {
    pub fn from_config(config: Config) -> Self {
        let model = model::from_config(&config.model, config.limits.model());
        Self::with_model(config, model)
    }

    /// Wire the services around an already-built model.
    pub fn with_model(config: Config, model: Arc<dyn CompletionModel>) -> Self {
        let router = ExecutionRouter::from_config(&config, Arc::clone(&model));
        let explainer = Explainer::new(model, config.limits.model());

        Self {
            config,
            router,
            explainer,
        }
    }
}

/// Entry point from `main.rs`.
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Init { language } => init_scaffold(language),

        Command::Run {
            file,
            language,
            args,
            output,
            explain,
        } => {
            let mut cfg = Config::load_or_default(&cli.config)?;
            if let Some(mode) = output {
                cfg.output.mode = mode;
            }
            run_file(Services::from_config(cfg), &file, language.as_deref(), args, explain).await
        }

        Command::Classify { file, language } => {
            let language = resolve_language(&file, language.as_deref())?;
            let source = read_to_string(&file)?;
            let risk = classify_source(language, &source);
            println!("{}", serde_json::to_string_pretty(&risk)?);
            Ok(())
        }

        Command::Explain { diagnostic } => {
            let services = Services::from_config(Config::load_or_default(&cli.config)?);
            let report = services.explainer.explain(&diagnostic).await;
            println!("{}", report.explanation);
            Ok(())
        }

        Command::Install { package } => {
            let cfg = Config::load_or_default(&cli.config)?;
            let text = install_package(&cfg.runtime.pip, &package, &cfg.limits).await;
            println!("{}", text);
            Ok(())
        }

        Command::Serve { addr } => {
            let services = Services::from_config(Config::load_or_default(&cli.config)?);
            crate::runtime::serve(&addr, services).await
        }
    }
}

/* ---------------- run ---------------- */

async fn run_file(
    services: Services,
    file: &Path,
    language: Option<&str>,
    args: Vec<String>,
    explain: bool,
) -> Result<()> {
    let request = build_request(file, language, args)?;
    let (result, report) = execute(&services, &request, explain).await;

    let rendered = render(
        services.config.output.mode,
        &result,
        report.as_ref(),
        should_use_color(),
    )?;
    println!("{}", rendered);
    Ok(())
}

/// Read `file` into a request. Java programs with no arguments get `1 2`.
fn build_request(file: &Path, language: Option<&str>, mut args: Vec<String>) -> Result<ExecutionRequest> {
    let language = resolve_language(file, language)?;
    let source = read_to_string(file)?;

    if language == Language::Java && args.is_empty() {
        args = vec!["1".to_string(), "2".to_string()];
    }

    let entrypoint = entrypoint_for(file, language)?;
    Ok(ExecutionRequest::new(language, source, &entrypoint, args)?)
}

/// The file's own name when its extension already fits `language`,
/// otherwise its stem with the language's extension.
fn entrypoint_for(file: &Path, language: Language) -> Result<String> {
    if Language::from_path(file).ok() == Some(language) {
        return file_name(file);
    }

    let stem = file
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty());

    Ok(match stem {
        Some(stem) => format!("{}.{}", stem, language.extension()),
        None => language.default_entrypoint().to_string(),
    })
}

async fn execute(
    services: &Services,
    request: &ExecutionRequest,
    explain: bool,
) -> (ExecutionResult, Option<DiagnosticReport>) {
    let result = services.router.route_execution(request).await;
    let report = explain_if_useful(&services.explainer, &result, explain).await;
    (result, report)
}

// Routing reasons are not worth explaining; only real program/compiler errors are.
async fn explain_if_useful(
    explainer: &Explainer,
    result: &ExecutionResult,
    explain: bool,
) -> Option<DiagnosticReport> {
    if !explain || result.path != ExecutionPath::Real || result.stderr.is_empty() {
        return None;
    }
    Some(explainer.explain(result.diagnostic()).await)
}

fn resolve_language(file: &Path, language: Option<&str>) -> Result<Language> {
    let language = match language {
        Some(l) => l.parse::<Language>()?,
        None => Language::from_path(file)
            .with_context(|| format!("Cannot infer language of {:?}; pass --language", file))?,
    };
    Ok(language)
}

/* ---------------- init ---------------- */

fn init_scaffold(language: Option<String>) -> Result<()> {
    report_created(Path::new("config.yaml"), default_config_yaml())?;

    let Some(language) = language else {
        return Ok(());
    };

    let language = language.parse::<Language>()?;
    let (path, contents) = match language {
        Language::Python => (PathBuf::from("main.py"), default_python_program()),
        Language::Java => (PathBuf::from("Main.java"), default_java_program()),
    };
    report_created(&path, contents)
}

fn report_created(path: &Path, contents: &str) -> Result<()> {
    if write_if_missing(path, contents)? {
        eprintln!("Created {}", path.display());
    } else {
        eprintln!("{} already exists (skipping)", path.display());
    }
    Ok(())
}

fn default_config_yaml() -> &'static str {
    r#"# coderoute configuration

runtime:
  python: python3
  javac: javac
  java: java
  pip: pip

limits:
  interpret_ms: 20000
  compile_ms: 20000
  run_ms: 5000
  # finished runs slower than this are replaced by a simulated result
  slow_after_ms: 10000
  model_ms: 30000
  install_ms: 120000
  # per-stream cap on captured stdout/stderr; larger output kills the run
  output_bytes: 1048576

model:
  provider: gemini # gemini | openai
  name: gemini-pro
  # base_url: https://generativelanguage.googleapis.com/v1beta
  api_key_env: GEMINI_API_KEY

# scratch:
#   dir: /tmp/coderoute

output:
  mode: simple # simple | pretty | json
"#
}

fn default_python_program() -> &'static str {
    "print('Hello, World!')\n"
}

fn default_java_program() -> &'static str {
    r#"public class Main {
    public static void main(String[] args) {
        System.out.println("Hello, World!");
    }
}
"#
}
