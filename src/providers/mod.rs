mod google;
mod prompt;

pub use google::GoogleProvider;
pub use prompt::{build_recipe_prompt, build_refine_prompt};

use async_trait::async_trait;
use thiserror::Error;

/// Unified trait for generative text backends
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Get the provider name (e.g., "google")
    fn provider_name(&self) -> &str;

    /// Model identifier sent with every request
    fn model_name(&self) -> &str;

    /// Send one prompt and return the reply text
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError>;
}

/// Classified transport/upstream failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("{0}")]
    RateLimited(String),

    #[error("{0}")]
    QuotaExceeded(String),

    #[error("{0}")]
    InvalidCredential(String),

    #[error("{0}")]
    Failed(String),
}

const RATE_LIMIT_PREFIX: &str = "RATE_LIMIT:";
const QUOTA_EXCEEDED_PREFIX: &str = "QUOTA_EXCEEDED:";
const INVALID_KEY_PREFIX: &str = "INVALID_KEY:";

impl ProviderError {
    /// Classify a free-text upstream message tagged with a `RATE_LIMIT:`,
    /// `QUOTA_EXCEEDED:` or `INVALID_KEY:` prefix. Untagged messages are `Failed`.
    pub fn from_message(message: &str) -> Self {
        let message = message.trim_start();
        if let Some(rest) = message.strip_prefix(RATE_LIMIT_PREFIX) {
            ProviderError::RateLimited(rest.trim().to_string())
        } else if let Some(rest) = message.strip_prefix(QUOTA_EXCEEDED_PREFIX) {
            ProviderError::QuotaExceeded(rest.trim().to_string())
        } else if let Some(rest) = message.strip_prefix(INVALID_KEY_PREFIX) {
            ProviderError::InvalidCredential(rest.trim().to_string())
        } else {
            ProviderError::Failed(message.to_string())
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError::Failed(err.to_string())
    }
}
