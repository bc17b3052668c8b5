//! coderoute
//!
//! Execution routing for submitted Python / Java snippets: real execution in
//! a local toolchain under deadlines, or a model-simulated execution report
//! when the snippet would block on I/O, times out, or cannot be launched.
//!
//! The three entry points a front end needs are
//! [`engine::ExecutionRouter::route_execution`],
//! [`explain::Explainer::explain`] and [`classify::classify`].

pub mod auth;
pub mod classify;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod execution_id;
pub mod executor;
pub mod explain;
pub mod install;
pub mod language;
pub mod metrics;
pub mod model;
pub mod report;
pub mod runner;
pub mod runtime;
pub mod simulate;
pub mod sinks;
pub mod util;
