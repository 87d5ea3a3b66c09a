//! Recipe suggestions from leftover ingredients.
//!
//! [`RecipeService`] sends a prompt built from the user's ingredients and
//! constraints to Google Gemini and parses the reply into [`Recipe`] values.
//! A recipe can then be refined with a free-text instruction. [`Session`]
//! ties the service to persisted state and best-effort photo lookup.
//!
//! # Example
//! ```no_run
//! use leftover_recipe::{Constraints, Ingredient, RecipeService};
//!
//! # async fn run() -> Result<(), leftover_recipe::RecipeError> {
//! let service = RecipeService::builder().api_key("your-api-key").build()?;
//! let ingredients = vec![Ingredient::new("豚肉")?, Ingredient::new("玉ねぎ")?];
//! let recipes = service
//!     .generate_recipes(&ingredients, &Constraints::default())
//!     .await?;
//! let lighter = service.refine_recipe(&recipes[0], "もっとヘルシーに").await?;
//! println!("{}", lighter.title);
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod images;
pub mod model;
pub mod parse;
pub mod providers;
pub mod service;
pub mod session;
pub mod storage;

pub use builder::RecipeServiceBuilder;
pub use config::{AppConfig, GeminiConfig, UnsplashConfig, DEFAULT_MODEL};
pub use error::{ErrorKind, RecipeError, StorageError};
pub use images::{RecipeImage, UnsplashClient};
pub use model::{
    Constraints, CookingTime, Difficulty, FavoriteRecipe, Ingredient, IngredientList, MealType,
    Nutrition, Recipe, RefinePreset, Spiciness,
};
pub use providers::{LlmProvider, ProviderError};
pub use service::RecipeService;
pub use session::Session;
pub use storage::{FileStore, KeyValueStore, MemoryStore, Storage};
