use log::{debug, info, warn};
use std::time::Duration;

use crate::builder::RecipeServiceBuilder;
use crate::config::GeminiConfig;
use crate::error::RecipeError;
use crate::model::{Constraints, Ingredient, Recipe};
use crate::parse::{parse_recipe, parse_recipes};
use crate::providers::{build_recipe_prompt, build_refine_prompt, GoogleProvider, LlmProvider};

/// Turns ingredients and constraints into recipes, and recipes plus an
/// instruction into refined recipes.
///
/// The service is only ready once it holds a provider, which for the default
/// backend means an API key has been supplied.
pub struct RecipeService {
    provider: Option<Box<dyn LlmProvider>>,
    gemini: GeminiConfig,
    /// Key the Gemini provider was built with, kept so a model change can rebuild it
    api_key: Option<String>,
    timeout: Option<Duration>,
}

impl RecipeService {
    /// A service with no credential; every call fails with `NotConfigured`
    pub fn new(gemini: GeminiConfig) -> Self {
        RecipeService {
            provider: None,
            gemini,
            api_key: None,
            timeout: None,
        }
    }

    pub fn builder() -> RecipeServiceBuilder {
        RecipeServiceBuilder::default()
    }

    /// A ready service backed by an arbitrary provider
    pub fn with_provider(provider: Box<dyn LlmProvider>) -> Self {
        let gemini = GeminiConfig {
            model: provider.model_name().to_string(),
            ..Default::default()
        };
        RecipeService {
            provider: Some(provider),
            gemini,
            api_key: None,
            timeout: None,
        }
    }

    pub(crate) fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout;
    }

    /// Configure the Gemini backend with `api_key`, replacing any previous provider.
    ///
    /// On failure the service is left unconfigured.
    pub fn configure(&mut self, api_key: &str) -> Result<(), RecipeError> {
        self.provider = None;
        self.api_key = None;
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(RecipeError::InvalidInput(
                "API key cannot be empty".to_string(),
            ));
        }

        let provider =
            GoogleProvider::with_timeout(&self.gemini, api_key.to_string(), self.timeout)?;
        info!(
            "Configured {} provider ({})",
            provider.provider_name(),
            self.gemini.model
        );
        self.provider = Some(Box::new(provider));
        self.api_key = Some(api_key.to_string());
        Ok(())
    }

    /// Change the model used for subsequent calls.
    ///
    /// A Gemini provider is rebuilt with the same key right away. A custom
    /// provider from [`RecipeService::with_provider`] keeps its own model.
    pub fn set_model(&mut self, model: &str) -> Result<(), RecipeError> {
        self.gemini.model = model.to_string();
        match self.api_key.clone() {
            Some(key) => self.configure(&key),
            None => Ok(()),
        }
    }

    /// Drop the current provider and the key it was built with
    pub fn reset(&mut self) {
        self.provider = None;
        self.api_key = None;
    }

    pub fn is_ready(&self) -> bool {
        self.provider.is_some()
    }

    /// Model of the active provider, or the configured one when not ready
    pub fn model(&self) -> &str {
        self.provider
            .as_ref()
            .map(|p| p.model_name())
            .unwrap_or(self.gemini.model.as_str())
    }

    fn provider(&self) -> Result<&dyn LlmProvider, RecipeError> {
        self.provider.as_deref().ok_or(RecipeError::NotConfigured)
    }

    /// Ask the model for 3-5 recipes using `ingredients`.
    ///
    /// Exactly one request is sent. The returned collection is non-empty and in
    /// the order the model produced it.
    pub async fn generate_recipes(
        &self,
        ingredients: &[Ingredient],
        constraints: &Constraints,
    ) -> Result<Vec<Recipe>, RecipeError> {
        let provider = self.provider()?;
        if ingredients.is_empty() {
            return Err(RecipeError::InvalidInput(
                "At least one ingredient is required".to_string(),
            ));
        }

        let prompt = build_recipe_prompt(ingredients, constraints);
        debug!("Recipe prompt:\n{}", prompt);

        let reply = provider.generate(&prompt).await.map_err(|e| {
            warn!("Recipe generation failed: {}", e);
            RecipeError::from(e)
        })?;

        let recipes = parse_recipes(&reply)?;
        info!(
            "Generated {} recipes using {}",
            recipes.len(),
            provider.model_name()
        );
        Ok(recipes)
    }

    /// Rewrite `recipe` following a free-text `instruction`.
    ///
    /// Returns a new value; `recipe` itself is never touched, so a failure
    /// leaves the caller's copy as it was.
    pub async fn refine_recipe(
        &self,
        recipe: &Recipe,
        instruction: &str,
    ) -> Result<Recipe, RecipeError> {
        let provider = self.provider()?;
        let instruction = instruction.trim();
        if instruction.is_empty() {
            return Err(RecipeError::InvalidInput(
                "Refinement instruction cannot be empty".to_string(),
            ));
        }

        let prompt = build_refine_prompt(recipe, instruction);
        debug!("Refine prompt:\n{}", prompt);

        let reply = provider.generate(&prompt).await.map_err(|e| {
            warn!("Recipe refinement failed: {}", e);
            RecipeError::from(e)
        })?;

        let refined = parse_recipe(&reply)?;
        info!("Refined '{}' into '{}'", recipe.title, refined.title);
        Ok(refined)
    }
}
