// src/cli.rs

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::OutputMode;

/// Run Python / Java snippets locally, or get a simulated run when that is
/// unsafe or too slow.
///
/// `config.yaml` is optional; CLI flags only override its values.
#[derive(Parser, Debug)]
#[command(name = "coderoute", version, disable_help_subcommand = true)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, default_value = "config.yaml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Route a source file: real execution when safe, simulation otherwise.
    Run {
        /// Source file; its name becomes the entrypoint name
        file: PathBuf,

        /// Language override (python | java). Inferred from the extension
        /// when omitted.
        #[arg(short, long)]
        language: Option<String>,

        /// Program argument (repeatable, Java only)
        ///
        /// Java programs get `1 2` when none are given.
        #[arg(long = "arg")]
        args: Vec<String>,

        /// Output format override
        #[arg(short, long, value_enum)]
        output: Option<OutputMode>,

        /// Ask the model to explain a non-empty error from a real run
        #[arg(long)]
        explain: bool,
    },

    /// Report whether a source file uses blocking I/O.
    Classify {
        file: PathBuf,

        #[arg(short, long)]
        language: Option<String>,
    },

    /// Explain an error message and suggest a fix.
    Explain {
        /// The diagnostic text
        diagnostic: String,
    },

    /// Install a Python package with pip.
    Install { package: String },

    /// Serve the engine over HTTP.
    Serve {
        #[arg(long, default_value = "127.0.0.1:8080")]
        addr: String,
    },

    /// Write a starter config.yaml and program.
    Init {
        /// Allowed values: python | java
        #[arg(value_parser = ["python", "java"])]
        language: Option<String>,
    },
}
