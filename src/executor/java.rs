// src/executor/java.rs

use std::path::Path;
use std::sync::LazyLock;
use std::time::Instant;

use regex::Regex;

use crate::config::{Limits, Runtime};
use crate::error::ExecutorError;
use crate::language::ExecutionRequest;

use super::process::run_with_deadline;
use super::scratch::ScratchSpace;
use super::{RealOutcome, Stage};

static PUBLIC_CLASS: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"\bpublic\s+(?:(?:final|abstract|strictfp)\s+)*class\s+([A-Za-z_$][\w$]*)").ok()
});

static ANY_CLASS: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\bclass\s+([A-Za-z_$][\w$]*)").ok());

/// Name of the class javac expects the file to be named after.
///
/// A `public class` wins; otherwise the first `class` declaration.
pub fn extract_class_name(source: &str) -> Option<String> {
    [&*PUBLIC_CLASS, &*ANY_CLASS]
        .into_iter()
        .flatten()
        .find_map(|re| re.captures(source))
        .map(|caps| caps[1].to_string())
}

/// Class name for this source, falling back to the stem of the previously
/// known entrypoint when the source declares no class.
pub fn resolve_class_name(source: &str, previous_entrypoint: &str) -> String {
    extract_class_name(source).unwrap_or_else(|| {
        Path::new(previous_entrypoint)
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .unwrap_or("Main")
            .to_string()
    })
}

/// Compile with `<javac>`, then run `<java> -cp <scratch> <Class> <args...>`.
///
/// A non-zero compiler exit is returned as [`RealOutcome::CompileFailed`]
/// with the compiler's stderr untouched.
pub async fn run(
    runtime: &Runtime,
    limits: &Limits,
    scratch: &ScratchSpace,
    request: &ExecutionRequest,
) -> Result<RealOutcome, ExecutorError> {
    let start = Instant::now();
    let class_name = resolve_class_name(&request.source, &request.entrypoint_name);
    let file = scratch.write(&format!("{}.java", class_name), &request.source)?;
    let file = file.to_string_lossy();

    let mut compiled = run_with_deadline(
        &runtime.javac,
        &[&*file],
        Some(scratch.path()),
        Stage::Compile,
        limits.compile(),
        limits.output_bytes,
    )
    .await?;

    if !compiled.success() {
        tracing::debug!(class = %class_name, exit_code = ?compiled.exit_code, "javac rejected source");
        compiled.elapsed = start.elapsed();
        return Ok(RealOutcome::CompileFailed(compiled));
    }

    let classpath = scratch.path().to_string_lossy();
    let mut args: Vec<&str> = vec!["-cp", &*classpath, class_name.as_str()];
    args.extend(request.arguments.iter().map(String::as_str));

    let mut output = run_with_deadline(
        &runtime.java,
        &args,
        Some(scratch.path()),
        Stage::Run,
        limits.run(),
        limits.output_bytes,
    )
    .await?;

    output.elapsed = start.elapsed();
    Ok(RealOutcome::Finished(output))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_public_class() {
        let src = "import java.util.*;\n\npublic class HelloApp {\n  public static void main(String[] a) {}\n}";
        assert_eq!(extract_class_name(src).as_deref(), Some("HelloApp"));
    }

    #[test]
    fn public_class_beats_earlier_helper_class() {
        let src = "class Helper {}\npublic final class Entry { }";
        assert_eq!(extract_class_name(src).as_deref(), Some("Entry"));
    }

    #[test]
    fn falls_back_to_any_class() {
        assert_eq!(extract_class_name("class Solo { }").as_deref(), Some("Solo"));
    }

    #[test]
    fn no_class_uses_previous_filename() {
        let src = "System.out.println(1);";
        assert_eq!(extract_class_name(src), None);
        assert_eq!(resolve_class_name(src, "Calculator.java"), "Calculator");
    }

    #[test]
    fn empty_previous_name_defaults_to_main() {
        assert_eq!(resolve_class_name("", ""), "Main");
    }
}
