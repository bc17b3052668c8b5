// src/classify.rs

//! Static risk classification.
//!
//! A lexical scan for calls that would wait on stdin or touch the filesystem.
//! Sandboxed runs are non-interactive, so such programs are routed straight
//! to simulation.
//!
//! This is not a parser: tokens inside comments or string literals are
//! flagged too. Over-flagging only costs a simulated run; under-flagging
//! would leave a process blocked until its deadline.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::ClassificationError;
use crate::language::Language;

struct IoPattern {
    label: &'static str,
    regex: Regex,
}

fn compile(patterns: &[(&'static str, &str)]) -> Vec<IoPattern> {
    patterns
        .iter()
        .filter_map(|&(label, re)| {
            Regex::new(re).ok().map(|regex| IoPattern { label, regex })
        })
        .collect()
}

static PYTHON_IO: LazyLock<Vec<IoPattern>> = LazyLock::new(|| {
    compile(&[
        ("input(", r"\binput\s*\("),
        ("open(", r"\bopen\s*\("),
        ("read(", r"\bread\s*\("),
        ("write(", r"\bwrite\s*\("),
    ])
});

static JAVA_IO: LazyLock<Vec<IoPattern>> = LazyLock::new(|| {
    compile(&[
        ("Scanner(", r"\bScanner\s*\("),
        ("System.in", r"\bSystem\.in\b"),
        ("BufferedReader(", r"\bBufferedReader\s*\("),
        ("FileReader(", r"\bFileReader\s*\("),
        ("FileWriter(", r"\bFileWriter\s*\("),
    ])
});

/// Outcome of scanning one snippet. Never cached; recomputed per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RiskClassification {
    pub has_blocking_io: bool,
    /// Labels of the patterns that matched, in pattern order.
    pub matched: Vec<&'static str>,
}

/// Classify source given the language as free text.
///
/// Unknown languages are an error rather than being treated as safe.
pub fn classify(language: &str, source: &str) -> Result<RiskClassification, ClassificationError> {
    let language = language.parse::<Language>()?;
    Ok(classify_source(language, source))
}

pub fn classify_source(language: Language, source: &str) -> RiskClassification {
    let patterns = match language {
        Language::Python => &*PYTHON_IO,
        Language::Java => &*JAVA_IO,
    };

    let matched: Vec<&'static str> = patterns
        .iter()
        .filter(|p| p.regex.is_match(source))
        .map(|p| p.label)
        .collect();

    RiskClassification {
        has_blocking_io: !matched.is_empty(),
        matched,
    }
}
