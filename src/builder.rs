use std::time::Duration;

use crate::config::{AppConfig, GeminiConfig};
use crate::providers::LlmProvider;
use crate::{RecipeError, RecipeService};

/// Builder for configuring a [`RecipeService`]
#[derive(Default)]
pub struct RecipeServiceBuilder {
    gemini: GeminiConfig,
    api_key: Option<String>,
    timeout: Option<Duration>,
    provider: Option<Box<dyn LlmProvider>>,
}

impl RecipeServiceBuilder {
    /// Start from the Gemini section and timeout of a loaded [`AppConfig`]
    ///
    /// # Example
    /// ```
    /// use leftover_recipe::{AppConfig, RecipeService};
    ///
    /// let service = RecipeService::builder()
    ///     .config(&AppConfig::default())
    ///     .build()
    ///     .unwrap();
    /// assert!(!service.is_ready());
    /// ```
    pub fn config(mut self, config: &AppConfig) -> Self {
        self.gemini = config.gemini.clone();
        if self.api_key.is_none() {
            self.api_key = config
                .gemini
                .api_key
                .clone()
                .filter(|k| !k.trim().is_empty());
        }
        self.timeout = config.timeout.map(Duration::from_secs);
        self
    }

    /// Set the API key. Without one the built service is not ready.
    ///
    /// # Example
    /// ```
    /// use leftover_recipe::RecipeService;
    ///
    /// let service = RecipeService::builder()
    ///     .api_key("your-api-key")
    ///     .build()
    ///     .unwrap();
    /// assert!(service.is_ready());
    /// ```
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the model name (defaults to "gemini-2.5-flash")
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.gemini.model = model.into();
        self
    }

    /// Point the Gemini backend at a different endpoint
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.gemini.base_url = Some(url.into());
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.gemini.temperature = Some(temperature);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.gemini.max_tokens = Some(max_tokens);
        self
    }

    /// Set a timeout for HTTP requests
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Use a custom provider instead of Gemini. Overrides every other option.
    pub fn provider(mut self, provider: Box<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Build the service
    ///
    /// # Errors
    /// Returns `RecipeError` if an API key was given but the backend could not
    /// be set up with it.
    pub fn build(self) -> Result<RecipeService, RecipeError> {
        if let Some(provider) = self.provider {
            return Ok(RecipeService::with_provider(provider));
        }

        let mut service = RecipeService::new(self.gemini);
        service.set_timeout(self.timeout);
        if let Some(key) = self.api_key {
            service.configure(&key)?;
        }
        Ok(service)
    }
}
