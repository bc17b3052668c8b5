// src/language.rs

//! Supported languages and the per-request execution context.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ClassificationError, RequestError};
use crate::execution_id::ExecutionId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    Python,
    Java,
}

impl Language {
    /// File extension (without the dot) that entrypoints must carry.
    pub fn extension(self) -> &'static str {
        match self {
            Language::Python => "py",
            Language::Java => "java",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Language::Python => "Python",
            Language::Java => "Java",
        }
    }

    /// Infer the language from a file path's extension.
    pub fn from_path(path: &Path) -> Result<Self, ClassificationError> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "py" => Ok(Language::Python),
            "java" => Ok(Language::Java),
            _ => Err(ClassificationError::UnsupportedLanguage(format!(".{}", ext))),
        }
    }

    /// Entrypoint used when the caller does not name one.
    pub fn default_entrypoint(self) -> &'static str {
        match self {
            Language::Python => "main.py",
            Language::Java => "Main.java",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Language {
    type Err = ClassificationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "python" | "py" | "python3" => Ok(Language::Python),
            "java" => Ok(Language::Java),
            _ => Err(ClassificationError::UnsupportedLanguage(s.to_string())),
        }
    }
}

/// One run of one snippet.
///
/// Built once per submission and threaded through the router; nothing in it
/// outlives the response.
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    pub execution_id: ExecutionId,
    pub language: Language,
    pub source: String,
    pub entrypoint_name: String,
    /// Command-line arguments; only passed to Java programs.
    pub arguments: Vec<String>,
}

impl ExecutionRequest {
    /// Build a request, validating the entrypoint against the language.
    ///
    /// A name without an extension gets the language's extension appended.
    /// A name with a different extension is rejected.
    pub fn new(
        language: Language,
        source: impl Into<String>,
        entrypoint_name: &str,
        arguments: Vec<String>,
    ) -> Result<Self, RequestError> {
        let entrypoint_name = normalize_entrypoint(language, entrypoint_name)?;

        Ok(Self {
            execution_id: ExecutionId::new(),
            language,
            source: source.into(),
            entrypoint_name,
            arguments,
        })
    }

    /// Like [`ExecutionRequest::new`] but with the language given as text,
    /// which fails fast when it is neither Python nor Java.
    pub fn parse(
        language: &str,
        source: impl Into<String>,
        entrypoint_name: &str,
        arguments: Vec<String>,
    ) -> Result<Self, RequestError> {
        let language = language.parse::<Language>()?;
        Self::new(language, source, entrypoint_name, arguments)
    }
}

fn normalize_entrypoint(language: Language, name: &str) -> Result<String, RequestError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(RequestError::EmptyEntrypoint);
    }

    match Path::new(name).extension().and_then(|s| s.to_str()) {
        None => Ok(format!("{}.{}", name, language.extension())),
        Some(ext) if ext.eq_ignore_ascii_case(language.extension()) => Ok(name.to_string()),
        Some(_) => Err(RequestError::EntrypointExtension {
            name: name.to_string(),
            language: language.name(),
            expected: language.extension(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_language_names_case_insensitively() {
        assert_eq!("Python".parse::<Language>().unwrap(), Language::Python);
        assert_eq!(" java ".parse::<Language>().unwrap(), Language::Java);
        assert!(matches!(
            "rust".parse::<Language>(),
            Err(ClassificationError::UnsupportedLanguage(l)) if l == "rust"
        ));
    }

    #[test]
    fn infers_language_from_extension() {
        assert_eq!(Language::from_path(Path::new("a/hello.py")).unwrap(), Language::Python);
        assert_eq!(Language::from_path(Path::new("Main.JAVA")).unwrap(), Language::Java);
        assert!(Language::from_path(Path::new("script.rb")).is_err());
    }

    #[test]
    fn appends_missing_extension() {
        let req = ExecutionRequest::new(Language::Python, "print(1)", "hello", vec![]).unwrap();
        assert_eq!(req.entrypoint_name, "hello.py");
    }

    #[test]
    fn rejects_mismatched_extension() {
        let err = ExecutionRequest::new(Language::Java, "", "Main.py", vec![]).unwrap_err();
        assert!(matches!(err, RequestError::EntrypointExtension { expected: "java", .. }));
    }

    #[test]
    fn unsupported_language_text_fails_before_anything_runs() {
        let err = ExecutionRequest::parse("cobol", "", "main.cbl", vec![]).unwrap_err();
        assert!(matches!(err, RequestError::Classification(_)));
    }

    #[test]
    fn every_request_gets_its_own_id() {
        let a = ExecutionRequest::new(Language::Python, "", "main.py", vec![]).unwrap();
        let b = ExecutionRequest::new(Language::Python, "", "main.py", vec![]).unwrap();
        assert_ne!(a.execution_id.0, b.execution_id.0);
    }
}
