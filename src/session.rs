use log::info;

use crate::config::AppConfig;
use crate::error::RecipeError;
use crate::images::{enrich_recipes, RecipeImage, UnsplashClient};
use crate::model::{Constraints, FavoriteRecipe, IngredientList, Recipe};
use crate::service::RecipeService;
use crate::storage::{FileStore, KeyValueStore, Storage, StorageKey};

/// Everything a front end needs, wired together: the generation service, the
/// image client, persisted state and the recipes of the current session.
///
/// Recipes live only as long as the session; they are not persisted.
pub struct Session<S: KeyValueStore> {
    service: RecipeService,
    images: UnsplashClient,
    storage: Storage<S>,
    recipes: Vec<Recipe>,
    recipe_images: Vec<Option<RecipeImage>>,
}

impl Session<FileStore> {
    /// Open the configured store and set up both API clients.
    ///
    /// Fails with [`RecipeError::Storage`] if an unreadable store file cannot
    /// be moved aside.
    ///
    /// Credentials saved in settings take priority over the configuration,
    /// which in turn takes priority over `GOOGLE_API_KEY`.
    pub fn from_config(config: &AppConfig) -> Result<Self, RecipeError> {
        let storage = Storage::new(FileStore::open(&config.storage_path)?);

        let mut builder = RecipeService::builder()
            .config(config)
            .model(storage.gemini_model_or(&config.gemini.model));
        let api_key = storage
            .api_key()
            .or_else(|| config.gemini.api_key.clone())
            .or_else(|| std::env::var("GOOGLE_API_KEY").ok())
            .filter(|k| !k.trim().is_empty());
        if let Some(key) = api_key {
            builder = builder.api_key(key);
        }
        let service = builder.build()?;

        let access_key = storage
            .unsplash_key()
            .or_else(|| config.unsplash.access_key.clone());
        let images = match &config.unsplash.base_url {
            Some(url) => UnsplashClient::with_base_url(access_key, url.clone()),
            None => UnsplashClient::new(access_key),
        };

        Ok(Session::new(service, images, storage))
    }
}

impl<S: KeyValueStore> Session<S> {
    pub fn new(service: RecipeService, images: UnsplashClient, storage: Storage<S>) -> Self {
        Session {
            service,
            images,
            storage,
            recipes: Vec::new(),
            recipe_images: Vec::new(),
        }
    }

    pub fn service(&self) -> &RecipeService {
        &self.service
    }

    pub fn storage(&self) -> &Storage<S> {
        &self.storage
    }

    pub fn images(&self) -> &UnsplashClient {
        &self.images
    }

    pub fn ingredients(&self) -> IngredientList {
        self.storage.ingredients()
    }

    pub fn add_ingredient(&mut self, name: &str) -> Result<IngredientList, RecipeError> {
        let mut ingredients = self.storage.ingredients();
        ingredients.add(name)?;
        self.storage.save_ingredients(&ingredients)?;
        Ok(ingredients)
    }

    pub fn remove_ingredient(&mut self, name: &str) -> Result<IngredientList, RecipeError> {
        let mut ingredients = self.storage.ingredients();
        if ingredients.remove(name) {
            self.storage.save_ingredients(&ingredients)?;
        }
        Ok(ingredients)
    }

    pub fn clear_ingredients(&mut self) -> Result<(), RecipeError> {
        self.storage.save_ingredients(&IngredientList::new())?;
        Ok(())
    }

    pub fn constraints(&self) -> Constraints {
        self.storage.constraints()
    }

    /// Update one constraint field from its stored string form
    pub fn set_constraint(&mut self, field: &str, value: &str) -> Result<Constraints, RecipeError> {
        let mut constraints = self.storage.constraints();
        constraints.set_field(field, value)?;
        self.storage.save_constraints(&constraints)?;
        Ok(constraints)
    }

    /// Apply and save a generation credential
    pub fn configure_credential(&mut self, api_key: &str) -> Result<(), RecipeError> {
        self.service.configure(api_key)?;
        self.storage.save_api_key(api_key.trim())?;
        Ok(())
    }

    /// Forget the saved generation credential; the service stops being ready
    pub fn delete_credential(&mut self) -> Result<(), RecipeError> {
        self.storage.remove(StorageKey::ApiKey)?;
        self.service.reset();
        Ok(())
    }

    /// Save the model selection and switch the live service over to it
    pub fn set_model(&mut self, model: &str) -> Result<(), RecipeError> {
        let model = model.trim();
        if model.is_empty() {
            return Err(RecipeError::InvalidInput(
                "Model name cannot be empty".to_string(),
            ));
        }
        self.service.set_model(model)?;
        self.storage.save_gemini_model(model)?;
        Ok(())
    }

    pub fn set_image_key(&mut self, access_key: &str) -> Result<(), RecipeError> {
        self.storage.save_unsplash_key(access_key.trim())?;
        self.images.set_access_key(Some(access_key.trim().to_string()));
        Ok(())
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn image(&self, index: usize) -> Option<&RecipeImage> {
        self.recipe_images.get(index).and_then(|i| i.as_ref())
    }

    /// Generate a new collection from the saved ingredients and constraints,
    /// replacing the current one, then look up photos one recipe at a time.
    pub async fn generate(&mut self) -> Result<&[Recipe], RecipeError> {
        let ingredients = self.storage.ingredients();
        if ingredients.is_empty() {
            return Err(RecipeError::InvalidInput(
                "Add at least one ingredient first".to_string(),
            ));
        }
        let constraints = self.storage.constraints();

        let recipes = self
            .service
            .generate_recipes(ingredients.as_slice(), &constraints)
            .await?;

        self.recipe_images = if self.images.has_access_key() {
            enrich_recipes(&self.images, &recipes).await
        } else {
            vec![None; recipes.len()]
        };
        self.recipes = recipes;

        Ok(&self.recipes)
    }

    /// Refine the recipe at `index`. The collection only changes on success.
    pub async fn refine(&mut self, index: usize, instruction: &str) -> Result<&Recipe, RecipeError> {
        let current = self.recipes.get(index).ok_or_else(|| {
            RecipeError::InvalidInput(format!("No recipe at position {}", index + 1))
        })?;

        let refined = self.service.refine_recipe(current, instruction).await?;
        info!("Replacing recipe {} with '{}'", index + 1, refined.title);
        self.recipes[index] = refined;
        Ok(&self.recipes[index])
    }

    pub fn favorites(&self) -> Vec<FavoriteRecipe> {
        self.storage.favorites()
    }

    pub fn save_favorite(&mut self, index: usize) -> Result<(), RecipeError> {
        let recipe = self.recipes.get(index).ok_or_else(|| {
            RecipeError::InvalidInput(format!("No recipe at position {}", index + 1))
        })?;
        self.storage.add_favorite(recipe)?;
        Ok(())
    }

    pub fn remove_favorite(&mut self, title: &str) -> Result<usize, RecipeError> {
        Ok(self.storage.remove_favorite(title)?)
    }
}
