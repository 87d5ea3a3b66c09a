//! JSON extraction from free-form model replies.
//!
//! A reply is handed to an ordered list of [`ExtractionStrategy`] values. Each
//! strategy may yield a candidate JSON string; the first candidate that
//! deserializes into the requested type wins.

use log::{debug, error};
use serde::de::DeserializeOwned;

use crate::error::RecipeError;
use crate::model::Recipe;

const FENCE: &str = "```";
const JSON_FENCE: &str = "```json";

/// One way of locating the JSON document inside a reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStrategy {
    /// Inner content of the first code block labelled `json`
    FencedBlock,
    /// The whole reply text
    WholeText,
}

/// Strategies in the order they are tried
pub const DEFAULT_STRATEGIES: &[ExtractionStrategy] =
    &[ExtractionStrategy::FencedBlock, ExtractionStrategy::WholeText];

impl ExtractionStrategy {
    /// Candidate JSON text for this strategy, if it applies to `text`
    pub fn candidate<'a>(&self, text: &'a str) -> Option<&'a str> {
        match self {
            ExtractionStrategy::FencedBlock => fenced_json_block(text),
            ExtractionStrategy::WholeText => Some(text.trim()),
        }
    }
}

/// Find the first ```json block and return its trimmed inner content
fn fenced_json_block(text: &str) -> Option<&str> {
    let start = text.find(JSON_FENCE)? + JSON_FENCE.len();
    let rest = &text[start..];
    let end = rest.find(FENCE)?;
    Some(rest[..end].trim())
}

/// Deserialize the first candidate that parses, trying `strategies` in order
pub fn extract_json_with<T: DeserializeOwned>(
    text: &str,
    strategies: &[ExtractionStrategy],
) -> Result<T, RecipeError> {
    let mut last_error = None;

    for strategy in strategies {
        let Some(candidate) = strategy.candidate(text) else {
            continue;
        };
        match serde_json::from_str::<T>(candidate) {
            Ok(value) => {
                debug!("Parsed model reply using {:?}", strategy);
                return Ok(value);
            }
            Err(e) => {
                debug!("{:?} did not yield valid JSON: {}", strategy, e);
                last_error = Some(e.to_string());
            }
        }
    }

    error!("Failed to parse model reply as JSON");
    debug!("Raw response: {}", text);
    Err(RecipeError::ParseFailed(
        last_error.unwrap_or_else(|| "no JSON found in response".to_string()),
    ))
}

/// Deserialize using [`DEFAULT_STRATEGIES`]
pub fn extract_json<T: DeserializeOwned>(text: &str) -> Result<T, RecipeError> {
    extract_json_with(text, DEFAULT_STRATEGIES)
}

/// Parse a generation reply into a non-empty recipe collection, preserving order
pub fn parse_recipes(text: &str) -> Result<Vec<Recipe>, RecipeError> {
    let recipes: Vec<Recipe> = extract_json(text)?;
    if recipes.is_empty() {
        return Err(RecipeError::ParseFailed(
            "response contained no recipes".to_string(),
        ));
    }
    Ok(recipes)
}

/// Parse a refinement reply into a single recipe
pub fn parse_recipe(text: &str) -> Result<Recipe, RecipeError> {
    extract_json(text)
}
