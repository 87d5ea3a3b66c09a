use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

/// Default Gemini model, used until the user picks another one
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Generative API settings
    #[serde(default)]
    pub gemini: GeminiConfig,
    /// Image search settings
    #[serde(default)]
    pub unsplash: UnsplashConfig,
    /// Path of the JSON file holding persisted state
    #[serde(default = "default_storage_path")]
    pub storage_path: PathBuf,
    /// Request timeout in seconds. Unset means the transport default (none).
    #[serde(default)]
    pub timeout: Option<u64>,
}

/// Configuration for the Gemini generative API
#[derive(Debug, Deserialize, Clone)]
pub struct GeminiConfig {
    /// Model identifier (e.g., "gemini-2.5-flash")
    #[serde(default = "default_model")]
    pub model: String,
    /// API key (can also be set via GOOGLE_API_KEY or the settings slot)
    pub api_key: Option<String>,
    /// Base URL for API endpoint (for proxies and tests)
    pub base_url: Option<String>,
    /// Temperature for generation; the API default applies when unset
    pub temperature: Option<f32>,
    /// Maximum output tokens; the API default applies when unset
    pub max_tokens: Option<u32>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key: None,
            base_url: None,
            temperature: None,
            max_tokens: None,
        }
    }
}

/// Configuration for the Unsplash image search API
#[derive(Debug, Deserialize, Clone)]
pub struct UnsplashConfig {
    /// Access key (can also be set via the settings slot)
    pub access_key: Option<String>,
    /// Base URL for API endpoint
    pub base_url: Option<String>,
    /// Application name reported in attribution links
    #[serde(default = "default_app_name")]
    pub app_name: String,
}

impl Default for UnsplashConfig {
    fn default() -> Self {
        Self {
            access_key: None,
            base_url: None,
            app_name: default_app_name(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            gemini: GeminiConfig::default(),
            unsplash: UnsplashConfig::default(),
            storage_path: default_storage_path(),
            timeout: None,
        }
    }
}

// Default value functions
fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_app_name() -> String {
    "leftover-recipe-ai".to_string()
}

fn default_storage_path() -> PathBuf {
    PathBuf::from(".leftover-recipe.json")
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with LEFTOVER__ prefix
    /// 2. config.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: LEFTOVER__GEMINI__API_KEY
    pub fn load() -> Result<Self, ConfigError> {
        load_config()
    }
}

/// Load configuration from file and environment variables
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name("config").required(false))
        // Use double underscore for nested: LEFTOVER__GEMINI__API_KEY
        .add_source(
            Environment::with_prefix("LEFTOVER")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}
