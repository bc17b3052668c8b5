// src/config.rs

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::Path, path::PathBuf, time::Duration};

/// Root configuration loaded from `config.yaml`.
///
/// This file controls:
/// - Which interpreter / compiler / runtime binaries to use
/// - The deadlines applied to every blocking step
/// - Which generative model backs simulation and explanations
/// - Where scratch files are written
///
/// Every section is optional; a missing file means all defaults.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    #[serde(default)]
    pub runtime: Runtime,

    #[serde(default)]
    pub limits: Limits,

    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default)]
    pub scratch: ScratchConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Toolchain binaries.
///
/// Example:
///
/// runtime:
///   python: python3
///   javac: javac
///   java: java
///   pip: pip
#[derive(Debug, Deserialize, Clone)]
pub struct Runtime {
    #[serde(default = "default_python")]
    pub python: String,

    #[serde(default = "default_javac")]
    pub javac: String,

    #[serde(default = "default_java")]
    pub java: String,

    #[serde(default = "default_pip")]
    pub pip: String,
}

impl Default for Runtime {
    fn default() -> Self {
        Self {
            python: default_python(),
            javac: default_javac(),
            java: default_java(),
            pip: default_pip(),
        }
    }
}

fn default_python() -> String {
    "python3".to_string()
}

fn default_javac() -> String {
    "javac".to_string()
}

fn default_java() -> String {
    "java".to_string()
}

fn default_pip() -> String {
    "pip".to_string()
}

/// Deadlines in milliseconds, plus the per-stream output cap in bytes.
///
/// `slow_after_ms` is not a kill deadline: a run that finishes but took
/// longer than this is replaced by a simulated result.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Limits {
    pub interpret_ms: u64,
    pub compile_ms: u64,
    pub run_ms: u64,
    pub slow_after_ms: u64,
    pub model_ms: u64,
    pub install_ms: u64,
    pub output_bytes: u64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            interpret_ms: 20_000,
            compile_ms: 20_000,
            run_ms: 5_000,
            slow_after_ms: 10_000,
            model_ms: 30_000,
            install_ms: 120_000,
            output_bytes: 1024 * 1024,
        }
    }
}

impl Limits {
    pub fn interpret(&self) -> Duration {
        Duration::from_millis(self.interpret_ms)
    }

    pub fn compile(&self) -> Duration {
        Duration::from_millis(self.compile_ms)
    }

    pub fn run(&self) -> Duration {
        Duration::from_millis(self.run_ms)
    }

    pub fn slow_after(&self) -> Duration {
        Duration::from_millis(self.slow_after_ms)
    }

    pub fn model(&self) -> Duration {
        Duration::from_millis(self.model_ms)
    }

    pub fn install(&self) -> Duration {
        Duration::from_millis(self.install_ms)
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Gemini,
    /// Any endpoint speaking the OpenAI chat-completions protocol.
    Openai,
}

/// Generative model section.
///
/// The API key itself never lives in this file; `api_key_env` names the
/// environment variable (or `.env` entry) holding it.
#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    #[serde(default = "default_provider")]
    pub provider: Provider,

    #[serde(default = "default_model_name")]
    pub name: String,

    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            name: default_model_name(),
            base_url: None,
            api_key_env: default_api_key_env(),
        }
    }
}

fn default_provider() -> Provider {
    Provider::Gemini
}

fn default_model_name() -> String {
    "gemini-pro".to_string()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

impl ModelConfig {
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
    }
}

/// Scratch directory root. Each request gets its own subdirectory.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ScratchConfig {
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct OutputConfig {
    #[serde(default)]
    pub mode: OutputMode,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    #[default]
    Simple,
    Pretty,
    Json,
}

impl Config {
    /// Load and parse `config.yaml` from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        Self::from_yaml(&raw)
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            Ok(Self::default())
        }
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        // An empty document deserializes as unit, not as an empty mapping.
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }

        let cfg: Config = serde_yaml::from_str(raw).context("Failed to parse YAML config")?;
        Ok(cfg)
    }
}
