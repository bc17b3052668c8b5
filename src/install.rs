// src/install.rs

//! Package installation helper.
//!
//! A pass-through to `pip install <package>`. It sits beside the routing
//! engine, not inside it: its result is plain text for display.

use crate::config::Limits;
use crate::error::ExecutorError;
use crate::executor::{run_with_deadline, Stage};

/// Install `package` with `pip` and describe what happened.
pub async fn install_package(pip: &str, package: &str, limits: &Limits) -> String {
    let package = package.trim();
    if let Err(msg) = validate_package_name(package) {
        return msg;
    }

    tracing::info!(package, "installing package");

    let installed = run_with_deadline(
        pip,
        &["install", package],
        None,
        Stage::Install,
        limits.install(),
        limits.output_bytes,
    )
    .await;

    match installed {
        Ok(out) if out.success() => format!("Package '{}' installed successfully!", package),
        Ok(out) if out.stderr.trim().is_empty() => format!(
            "Package '{}' failed to install (exit code {:?})",
            package, out.exit_code
        ),
        Ok(out) => out.stderr,
        Err(ExecutorError::Timeout { limit, .. }) => format!(
            "Installing '{}' did not finish within {}s",
            package,
            limit.as_secs()
        ),
        Err(e) => format!("An error occurred: {}", e),
    }
}

/// Reject names that pip would read as options or that cannot be a
/// requirement at all.
fn validate_package_name(package: &str) -> Result<(), String> {
    if package.is_empty() {
        return Err("Package name is empty".to_string());
    }
    if package.starts_with('-') {
        return Err(format!("Invalid package name: {:?}", package));
    }
    if package.chars().any(char::is_whitespace) {
        return Err(format!("Invalid package name: {:?} (contains whitespace)", package));
    }
    Ok(())
}
