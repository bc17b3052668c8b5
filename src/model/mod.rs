// src/model/mod.rs

//! Generative model boundary.
//!
//! Simulation and explanations only need "send one prompt, get one text
//! back", so that is the whole interface. Providers live in submodules.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::{ModelConfig, Provider};
use crate::error::ModelError;

pub mod gemini;
pub mod openai;

pub use gemini::GeminiClient;
pub use openai::OpenAiClient;

#[async_trait]
pub trait CompletionModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, ModelError>;
}

/// Stand-in used when no API key is configured; every call fails.
#[derive(Debug, Clone)]
pub struct UnavailableModel {
    reason: String,
}

impl UnavailableModel {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl CompletionModel for UnavailableModel {
    async fn complete(&self, _prompt: &str) -> Result<String, ModelError> {
        Err(ModelError::Unavailable(self.reason.clone()))
    }
}

/// Build the configured provider.
///
/// A missing API key is not fatal: real execution still works, and the
/// fallback paths degrade to placeholder text.
pub fn from_config(cfg: &ModelConfig, timeout: Duration) -> Arc<dyn CompletionModel> {
    let Some(api_key) = cfg.api_key() else {
        tracing::warn!(
            env = %cfg.api_key_env,
            "no model API key configured; simulated output will be unavailable"
        );
        return Arc::new(UnavailableModel::new(format!(
            "{} is not set",
            cfg.api_key_env
        )));
    };

    let built = match cfg.provider {
        Provider::Gemini => GeminiClient::new(api_key, &cfg.name, cfg.base_url.as_deref(), timeout)
            .map(|c| Arc::new(c) as Arc<dyn CompletionModel>),
        Provider::Openai => OpenAiClient::new(api_key, &cfg.name, cfg.base_url.as_deref(), timeout)
            .map(|c| Arc::new(c) as Arc<dyn CompletionModel>),
    };

    match built {
        Ok(model) => model,
        Err(e) => {
            tracing::warn!(error = %e, "failed to build model client");
            Arc::new(UnavailableModel::new(e.to_string()))
        }
    }
}

/// One bounded completion. Blank answers count as failures.
pub async fn complete_within(
    model: &dyn CompletionModel,
    prompt: &str,
    limit: Duration,
) -> Result<String, ModelError> {
    let text = tokio::time::timeout(limit, model.complete(prompt))
        .await
        .map_err(|_| ModelError::Deadline(limit))??;

    if text.trim().is_empty() {
        return Err(ModelError::Empty);
    }

    Ok(text)
}


#[cfg(test)]
mod tests {
    use super::testing::StubModel;
    use super::*;

    #[tokio::test]
    async fn blank_completion_is_an_error() {
        let model = StubModel::replying("  \n");
        let err = complete_within(&model, "p", Duration::from_secs(1)).await.unwrap_err();
        assert!(matches!(err, ModelError::Empty));
    }

    #[tokio::test]
    async fn slow_completion_hits_the_deadline() {
        let model = StubModel::replying("late").slow(Duration::from_millis(500));
        let err = complete_within(&model, "p", Duration::from_millis(20)).await.unwrap_err();
        assert!(matches!(err, ModelError::Deadline(_)));
    }

    #[tokio::test]
    async fn missing_key_installs_unavailable_model() {
        let cfg = ModelConfig {
            api_key_env: "CODEROUTE_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..ModelConfig::default()
        };
        let model = from_config(&cfg, Duration::from_secs(1));
        let err = model.complete("hi").await.unwrap_err();
        assert!(err.to_string().contains("CODEROUTE_TEST_KEY_THAT_IS_NEVER_SET"));
    }
}
