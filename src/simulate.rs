// src/simulate.rs

//! Simulated execution.
//!
//! When a snippet cannot or should not run for real, the model is asked to
//! play the interpreter and report what the program would print. The result
//! is always some text: failures become a placeholder message.

use std::sync::Arc;
use std::time::Duration;

use crate::language::Language;
use crate::model::{complete_within, CompletionModel};

pub struct Simulator {
    model: Arc<dyn CompletionModel>,
    limit: Duration,
}

impl Simulator {
    pub fn new(model: Arc<dyn CompletionModel>, limit: Duration) -> Self {
        Self { model, limit }
    }

    /// Narrative of what running `source` would produce.
    pub async fn simulate(&self, language: Language, source: &str) -> String {
        let prompt = simulation_prompt(language, source);

        match complete_within(self.model.as_ref(), &prompt, self.limit).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(%language, error = %e, "simulation unavailable");
                format!(
                    "An unexpected error occurred while generating the simulated output: {}",
                    e
                )
            }
        }
    }
}

fn simulation_prompt(language: Language, source: &str) -> String {
    let (role, fence) = match language {
        Language::Python => ("the CPython 3 interpreter", "python"),
        Language::Java => ("the Java compiler (javac) and Java Virtual Machine", "java"),
    };

    format!(
        "You are {role}. Execute the following {language} program exactly as {role} would, \
         without actually running it.\n\
         - If it runs successfully, reply with only the exact text it writes to stdout, nothing else.\n\
         - If it fails to compile or raises an error, reply with the error type, \
         the line where it occurs, and a suggested fix.\n\
         - Assume any input the program reads is empty unless the code provides it.\n\n\
         ```{fence}\n{source}\n```"
    )
}
