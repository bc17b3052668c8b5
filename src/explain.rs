// src/explain.rs

//! On-demand explanations of diagnostics.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::model::{complete_within, CompletionModel};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticReport {
    pub explanation: String,
}

pub struct Explainer {
    model: Arc<dyn CompletionModel>,
    limit: Duration,
}

impl Explainer {
    pub fn new(model: Arc<dyn CompletionModel>, limit: Duration) -> Self {
        Self { model, limit }
    }

    /// Explain `diagnostic` and suggest a fix.
    ///
    /// Blank diagnostics are answered with an empty explanation without
    /// contacting the model.
    pub async fn explain(&self, diagnostic: &str) -> DiagnosticReport {
        if diagnostic.trim().is_empty() {
            return DiagnosticReport {
                explanation: String::new(),
            };
        }

        let prompt = format!(
            "The following error was encountered in the code:\n\n{}\n\nPlease provide an explanation and suggest a solution.",
            diagnostic
        );

        let explanation = match complete_within(self.model.as_ref(), &prompt, self.limit).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "explanation unavailable");
                format!(
                    "An unexpected error occurred while generating an explanation: {}",
                    e
                )
            }
        };

        DiagnosticReport { explanation }
    }
}
