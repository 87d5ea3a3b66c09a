//! Persisted user state: ingredients, constraints, credentials, model and favorites.

use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::DEFAULT_MODEL;
use crate::error::StorageError;
use crate::model::{Constraints, FavoriteRecipe, IngredientList, Recipe};

/// Raw JSON key-value access
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&mut self, key: &str, value: Value) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-memory store, for tests and throwaway sessions
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StorageError> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.values.remove(key);
        Ok(())
    }
}

/// Store backed by a single JSON object on disk, written through on every change
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: Map<String, Value>,
}

impl FileStore {
    /// Open `path`, starting empty if it does not exist.
    ///
    /// A file that is not a JSON object is moved to `<path>.bak` before the
    /// store starts empty, so the next write cannot destroy it. Fails if the
    /// file cannot be moved.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let values = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<Map<String, Value>>(&content) {
                Ok(values) => values,
                Err(e) => {
                    let backup = Self::backup_path(&path);
                    warn!(
                        "Unreadable store {} ({}), moving it to {}",
                        path.display(),
                        e,
                        backup.display()
                    );
                    fs::rename(&path, &backup)?;
                    Map::new()
                }
            },
            Err(e) => {
                debug!("Starting with empty store {}: {}", path.display(), e);
                Map::new()
            }
        };
        Ok(FileStore { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where an unreadable store file is kept, e.g. `state.json.bak`
    pub fn backup_path(path: &Path) -> PathBuf {
        let mut name = path.as_os_str().to_os_string();
        name.push(".bak");
        PathBuf::from(name)
    }

    fn flush(&self) -> Result<(), StorageError> {
        let content = serde_json::to_string_pretty(&self.values)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, content)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StorageError> {
        self.values.insert(key.to_string(), value);
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        if self.values.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

/// Named slots in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKey {
    Ingredients,
    Constraints,
    ApiKey,
    GeminiModel,
    UnsplashKey,
    Favorites,
}

impl StorageKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::Ingredients => "leftover_ingredients",
            StorageKey::Constraints => "leftover_constraints",
            StorageKey::ApiKey => "gemini_api_key",
            StorageKey::GeminiModel => "gemini_model",
            StorageKey::UnsplashKey => "unsplash_api_key",
            StorageKey::Favorites => "favorite_recipes",
        }
    }
}

/// Typed access to the named slots. Absent or unreadable values read as defaults.
pub struct Storage<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> Storage<S> {
    pub fn new(store: S) -> Self {
        Storage { store }
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    fn read<T: DeserializeOwned>(&self, key: StorageKey) -> Option<T> {
        let value = self.store.get(key.as_str())?;
        match serde_json::from_value(value) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!("Ignoring unreadable value for {}: {}", key.as_str(), e);
                None
            }
        }
    }

    fn write<T: Serialize>(&mut self, key: StorageKey, value: &T) -> Result<(), StorageError> {
        let value = serde_json::to_value(value)?;
        self.store.set(key.as_str(), value)
    }

    pub fn remove(&mut self, key: StorageKey) -> Result<(), StorageError> {
        self.store.remove(key.as_str())
    }

    pub fn ingredients(&self) -> IngredientList {
        self.read(StorageKey::Ingredients).unwrap_or_default()
    }

    pub fn save_ingredients(&mut self, ingredients: &IngredientList) -> Result<(), StorageError> {
        self.write(StorageKey::Ingredients, ingredients)
    }

    pub fn constraints(&self) -> Constraints {
        self.read(StorageKey::Constraints).unwrap_or_default()
    }

    pub fn save_constraints(&mut self, constraints: &Constraints) -> Result<(), StorageError> {
        self.write(StorageKey::Constraints, constraints)
    }

    pub fn api_key(&self) -> Option<String> {
        self.read::<String>(StorageKey::ApiKey)
            .filter(|k| !k.trim().is_empty())
    }

    pub fn save_api_key(&mut self, api_key: &str) -> Result<(), StorageError> {
        self.write(StorageKey::ApiKey, &api_key)
    }

    pub fn unsplash_key(&self) -> Option<String> {
        self.read::<String>(StorageKey::UnsplashKey)
            .filter(|k| !k.trim().is_empty())
    }

    pub fn save_unsplash_key(&mut self, access_key: &str) -> Result<(), StorageError> {
        self.write(StorageKey::UnsplashKey, &access_key)
    }

    /// Selected model, "gemini-2.5-flash" until one is saved
    pub fn gemini_model(&self) -> String {
        self.gemini_model_or(DEFAULT_MODEL)
    }

    /// Selected model, or `fallback` until one is saved
    pub fn gemini_model_or(&self, fallback: &str) -> String {
        self.read::<String>(StorageKey::GeminiModel)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string())
    }

    pub fn save_gemini_model(&mut self, model: &str) -> Result<(), StorageError> {
        self.write(StorageKey::GeminiModel, &model)
    }

    pub fn favorites(&self) -> Vec<FavoriteRecipe> {
        self.read(StorageKey::Favorites).unwrap_or_default()
    }

    /// Append `recipe` to the favorites, stamped with the current time
    pub fn add_favorite(&mut self, recipe: &Recipe) -> Result<(), StorageError> {
        let mut favorites = self.favorites();
        favorites.push(FavoriteRecipe::now(recipe.clone()));
        self.write(StorageKey::Favorites, &favorites)
    }

    /// Remove every favorite titled `title`. Returns how many were removed.
    pub fn remove_favorite(&mut self, title: &str) -> Result<usize, StorageError> {
        let mut favorites = self.favorites();
        let before = favorites.len();
        favorites.retain(|f| f.recipe.title != title);
        let removed = before - favorites.len();
        self.write(StorageKey::Favorites, &favorites)?;
        Ok(removed)
    }
}
