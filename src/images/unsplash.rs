use log::{debug, warn};
use reqwest::Client;
use serde::Deserialize;
use std::error::Error;

use super::RecipeImage;

const DEFAULT_BASE_URL: &str = "https://api.unsplash.com";

/// Client for the Unsplash photo search API
#[derive(Debug, Clone)]
pub struct UnsplashClient {
    client: Client,
    access_key: Option<String>,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    urls: PhotoUrls,
    alt_description: Option<String>,
    user: PhotoUser,
    links: PhotoLinks,
}

#[derive(Debug, Deserialize)]
struct PhotoUrls {
    small: String,
    regular: String,
}

#[derive(Debug, Deserialize)]
struct PhotoUser {
    name: String,
    links: UserLinks,
}

#[derive(Debug, Deserialize)]
struct UserLinks {
    html: String,
}

#[derive(Debug, Deserialize)]
struct PhotoLinks {
    download_location: Option<String>,
}

/// Strip generic cooking words from a recipe title and bias the search
/// towards food photos
pub fn clean_recipe_title(title: &str) -> String {
    let cleaned = ["のレシピ", "レシピ", "簡単な", "簡単", "美味しい", "作り方"]
        .iter()
        .fold(title.to_string(), |acc, word| acc.replace(word, ""));
    format!("{} food dish", cleaned.trim())
}

impl UnsplashClient {
    pub fn new(access_key: Option<String>) -> Self {
        Self::with_base_url(access_key, DEFAULT_BASE_URL.to_string())
    }

    #[doc(hidden)]
    pub fn with_base_url(access_key: Option<String>, base_url: String) -> Self {
        UnsplashClient {
            client: Client::new(),
            access_key: access_key.filter(|k| !k.trim().is_empty()),
            base_url,
        }
    }

    pub fn has_access_key(&self) -> bool {
        self.access_key.is_some()
    }

    pub fn set_access_key(&mut self, access_key: Option<String>) {
        self.access_key = access_key.filter(|k| !k.trim().is_empty());
    }

    /// Find one landscape photo for `title`.
    ///
    /// Returns `None` when no access key is set, when nothing matches, and on
    /// any request failure.
    pub async fn search_image(&self, title: &str) -> Option<RecipeImage> {
        let access_key = self.access_key.as_deref()?;

        match self.fetch_first_photo(access_key, title).await {
            Ok(image) => image,
            Err(e) => {
                warn!("Error fetching Unsplash image for '{}': {}", title, e);
                None
            }
        }
    }

    async fn fetch_first_photo(
        &self,
        access_key: &str,
        title: &str,
    ) -> Result<Option<RecipeImage>, Box<dyn Error + Send + Sync>> {
        let query = clean_recipe_title(title);
        debug!("Searching Unsplash for '{}'", query);

        let response = self
            .client
            .get(format!("{}/search/photos", self.base_url))
            .query(&[
                ("query", query.as_str()),
                ("per_page", "1"),
                ("orientation", "landscape"),
                ("content_filter", "high"),
                ("client_id", access_key),
            ])
            .header("Authorization", format!("Client-ID {}", access_key))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(format!("Unsplash API error: {}", response.status()).into());
        }

        let body: SearchResponse = response.json().await?;
        Ok(body.results.into_iter().next().map(|photo| RecipeImage {
            thumbnail_url: photo.urls.small,
            regular_url: photo.urls.regular,
            alt: photo
                .alt_description
                .filter(|alt| !alt.is_empty())
                .unwrap_or_else(|| title.to_string()),
            attribution_name: photo.user.name,
            attribution_url: photo.user.links.html,
            download_location: photo.links.download_location,
        }))
    }

    /// Report that a photo was used. Failures are logged and otherwise ignored.
    pub async fn track_download(&self, download_location: &str) {
        let Some(access_key) = self.access_key.as_deref() else {
            return;
        };

        let result = self
            .client
            .get(download_location)
            .header("Authorization", format!("Client-ID {}", access_key))
            .send()
            .await
            .and_then(|r| r.error_for_status());

        if let Err(e) = result {
            warn!("Error tracking Unsplash download: {}", e);
        }
    }

    /// Fire-and-forget variant of [`UnsplashClient::track_download`].
    /// Must be called from within a Tokio runtime.
    pub fn spawn_track_download(&self, download_location: String) {
        let client = self.clone();
        tokio::spawn(async move {
            client.track_download(&download_location).await;
        });
    }
}
