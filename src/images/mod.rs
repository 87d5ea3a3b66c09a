//! Best-effort photo lookup for generated recipes.
//!
//! Nothing in this module returns an error: a missing credential, an empty
//! search or a network failure all mean "no image".

mod unsplash;

pub use unsplash::{clean_recipe_title, UnsplashClient};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::model::Recipe;

/// A photo chosen for a recipe, with the attribution the provider requires
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeImage {
    /// Small rendition, suitable for a card thumbnail
    pub thumbnail_url: String,
    pub regular_url: String,
    pub alt: String,
    pub attribution_name: String,
    pub attribution_url: String,
    /// Location to hit once the photo is displayed
    pub download_location: Option<String>,
}

impl RecipeImage {
    /// HTML credit line ("Photo by X on Unsplash") with referral parameters
    pub fn attribution_html(&self, app_name: &str) -> String {
        let referral = format!(
            "utm_source={}&utm_medium=referral",
            html_escape::encode_double_quoted_attribute(app_name)
        );
        format!(
            r#"Photo by <a href="{}?{}" target="_blank" rel="noopener">{}</a> on <a href="https://unsplash.com?{}" target="_blank" rel="noopener">Unsplash</a>"#,
            html_escape::encode_double_quoted_attribute(&self.attribution_url),
            referral,
            html_escape::encode_text(&self.attribution_name),
            referral
        )
    }
}

/// Look up one image per recipe, one request at a time and in collection order.
///
/// The result has the same length as `recipes`. Every image found has its
/// download tracked in the background.
pub async fn enrich_recipes(
    client: &UnsplashClient,
    recipes: &[Recipe],
) -> Vec<Option<RecipeImage>> {
    let mut images = Vec::with_capacity(recipes.len());

    for (index, recipe) in recipes.iter().enumerate() {
        let image = client.search_image(&recipe.title).await;
        match &image {
            Some(found) => {
                if let Some(location) = &found.download_location {
                    client.spawn_track_download(location.clone());
                }
            }
            None => debug!("No image for recipe {} ('{}')", index, recipe.title),
        }
        images.push(image);
    }

    images
}
