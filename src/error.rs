use thiserror::Error;

use crate::providers::ProviderError;

/// Errors surfaced by recipe generation, refinement and the surrounding plumbing
#[derive(Error, Debug)]
pub enum RecipeError {
    /// No generation credential has been configured
    #[error("Generation API is not configured. Set an API key in settings first.")]
    NotConfigured,

    /// Caller passed input that is rejected before any network call
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Upstream is throttling requests
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Upstream usage or plan limit is exhausted
    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Upstream rejected the credential
    #[error("Invalid API key: {0}")]
    InvalidCredential(String),

    /// Any other transport or upstream failure
    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    /// Reply text could not be read as the expected JSON shape
    #[error("Failed to parse recipe response, please try again: {0}")]
    ParseFailed(String),

    /// Persistent store could not be written
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

/// Kind of a [`RecipeError`], for callers that only need to branch on the category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotConfigured,
    InvalidInput,
    RateLimited,
    QuotaExceeded,
    InvalidCredential,
    GenerationFailed,
    ParseFailed,
    Storage,
    Config,
}

impl ErrorKind {
    /// Whether trying the same request again later can succeed without user changes
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorKind::RateLimited | ErrorKind::GenerationFailed | ErrorKind::ParseFailed
        )
    }
}

impl RecipeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RecipeError::NotConfigured => ErrorKind::NotConfigured,
            RecipeError::InvalidInput(_) => ErrorKind::InvalidInput,
            RecipeError::RateLimited(_) => ErrorKind::RateLimited,
            RecipeError::QuotaExceeded(_) => ErrorKind::QuotaExceeded,
            RecipeError::InvalidCredential(_) => ErrorKind::InvalidCredential,
            RecipeError::GenerationFailed(_) => ErrorKind::GenerationFailed,
            RecipeError::ParseFailed(_) => ErrorKind::ParseFailed,
            RecipeError::Storage(_) => ErrorKind::Storage,
            RecipeError::Config(_) => ErrorKind::Config,
        }
    }
}

impl From<ProviderError> for RecipeError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::RateLimited(msg) => RecipeError::RateLimited(msg),
            ProviderError::QuotaExceeded(msg) => RecipeError::QuotaExceeded(msg),
            ProviderError::InvalidCredential(msg) => RecipeError::InvalidCredential(msg),
            ProviderError::Failed(msg) => RecipeError::GenerationFailed(msg),
        }
    }
}

/// Errors from the persistent key-value store
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to read or write the backing file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to encode or decode a stored value
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_errors_map_to_kinds() {
        let cases = [
            (ProviderError::RateLimited("slow down".into()), ErrorKind::RateLimited),
            (ProviderError::QuotaExceeded("plan".into()), ErrorKind::QuotaExceeded),
            (ProviderError::InvalidCredential("bad".into()), ErrorKind::InvalidCredential),
            (ProviderError::Failed("boom".into()), ErrorKind::GenerationFailed),
        ];

        for (provider_err, kind) in cases {
            assert_eq!(RecipeError::from(provider_err).kind(), kind);
        }
    }

    #[test]
    fn test_message_is_passed_through() {
        let err = RecipeError::from(ProviderError::RateLimited("try again in 30s".into()));
        assert!(err.to_string().contains("try again in 30s"));
    }

    #[test]
    fn test_retryable_kinds() {
        assert!(ErrorKind::ParseFailed.is_retryable());
        assert!(ErrorKind::RateLimited.is_retryable());
        assert!(!ErrorKind::NotConfigured.is_retryable());
        assert!(!ErrorKind::InvalidCredential.is_retryable());
        assert!(!ErrorKind::QuotaExceeded.is_retryable());
    }
}
