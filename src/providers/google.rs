use crate::config::GeminiConfig;
use crate::providers::{LlmProvider, ProviderError};
use async_trait::async_trait;
use log::debug;
use reqwest::{Client, StatusCode};
use serde_json::{json, Map, Value};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

pub struct GoogleProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl GoogleProvider {
    /// Create a new Google Gemini provider from configuration
    pub fn new(config: &GeminiConfig, api_key: String) -> Result<Self, ProviderError> {
        Self::with_timeout(config, api_key, None)
    }

    /// Same as [`GoogleProvider::new`], with a transport-level request timeout
    pub fn with_timeout(
        config: &GeminiConfig,
        api_key: String,
        timeout: Option<Duration>,
    ) -> Result<Self, ProviderError> {
        if api_key.trim().is_empty() {
            return Err(ProviderError::InvalidCredential(
                "API key cannot be empty".to_string(),
            ));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(GoogleProvider {
            client: builder.build()?,
            api_key,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    #[doc(hidden)]
    pub fn with_base_url(api_key: String, base_url: String, model: String) -> Self {
        GoogleProvider {
            client: Client::new(),
            api_key,
            base_url,
            model,
            temperature: None,
            max_tokens: None,
        }
    }

    fn request_body(&self, prompt: &str) -> Value {
        let mut body = json!({
            "contents": [{
                "parts": [{ "text": prompt }]
            }]
        });

        let mut generation_config = Map::new();
        if let Some(temperature) = self.temperature {
            generation_config.insert("temperature".to_string(), json!(temperature));
        }
        if let Some(max_tokens) = self.max_tokens {
            generation_config.insert("maxOutputTokens".to_string(), json!(max_tokens));
        }
        if !generation_config.is_empty() {
            body["generationConfig"] = Value::Object(generation_config);
        }

        body
    }
}

#[async_trait]
impl LlmProvider for GoogleProvider {
    fn provider_name(&self) -> &str {
        "google"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&self.request_body(prompt))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        debug!("Google Gemini response ({}): {}", status, body);

        let response_body: Value = match serde_json::from_str(&body) {
            Ok(value) => value,
            Err(_) if !status.is_success() => {
                return Err(classify_api_error(status, None, &body));
            }
            Err(e) => {
                return Err(ProviderError::Failed(format!(
                    "Invalid JSON from Google Gemini: {}",
                    e
                )))
            }
        };

        // Check for API error response
        if let Some(error) = response_body.get("error") {
            let error_message = error["message"].as_str().unwrap_or("Unknown error");
            return Err(classify_api_error(status, Some(error), error_message));
        }
        if !status.is_success() {
            return Err(classify_api_error(status, None, &body));
        }

        // Replies may be split across several parts
        let parts = response_body["candidates"][0]["content"]["parts"]
            .as_array()
            .ok_or_else(|| {
                let reason = response_body["candidates"][0]["finishReason"]
                    .as_str()
                    .or_else(|| response_body["promptFeedback"]["blockReason"].as_str())
                    .unwrap_or("no candidates");
                ProviderError::Failed(format!(
                    "Failed to extract content from Google Gemini response ({})",
                    reason
                ))
            })?;

        let text: String = parts.iter().filter_map(|p| p["text"].as_str()).collect();
        if text.trim().is_empty() {
            return Err(ProviderError::Failed(
                "Google Gemini returned an empty reply".to_string(),
            ));
        }

        Ok(text)
    }
}

/// Map a Gemini error payload onto the typed error kinds.
///
/// A `RATE_LIMIT:`/`QUOTA_EXCEEDED:`/`INVALID_KEY:` tag on the message decides
/// the kind; status and error details are only consulted for untagged messages.
fn classify_api_error(status: StatusCode, error: Option<&Value>, message: &str) -> ProviderError {
    let tagged = ProviderError::from_message(message);
    if !matches!(tagged, ProviderError::Failed(_)) {
        return tagged;
    }

    let api_status = error.and_then(|e| e["status"].as_str()).unwrap_or_default();
    let code = error
        .and_then(|e| e["code"].as_u64())
        .and_then(|c| u16::try_from(c).ok())
        .and_then(|c| StatusCode::from_u16(c).ok())
        .unwrap_or(status);
    let reasons: Vec<&str> = error
        .and_then(|e| e["details"].as_array())
        .map(|details| details.iter().filter_map(|d| d["reason"].as_str()).collect())
        .unwrap_or_default();

    let lower = message.to_lowercase();
    let formatted = format!("Google Gemini API error ({}): {}", code.as_u16(), message);

    if code == StatusCode::TOO_MANY_REQUESTS || api_status == "RESOURCE_EXHAUSTED" {
        if lower.contains("quota") {
            ProviderError::QuotaExceeded(formatted)
        } else {
            ProviderError::RateLimited(formatted)
        }
    } else if code == StatusCode::UNAUTHORIZED
        || code == StatusCode::FORBIDDEN
        || reasons.contains(&"API_KEY_INVALID")
        || lower.contains("api key not valid")
    {
        ProviderError::InvalidCredential(formatted)
    } else {
        ProviderError::Failed(formatted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    const PATH: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

    fn provider(server: &Server) -> GoogleProvider {
        GoogleProvider::with_base_url(
            "fake_api_key".to_string(),
            server.url(),
            "gemini-2.5-flash".to_string(),
        )
    }

    #[tokio::test]
    async fn test_provider_name() {
        let provider =
            GoogleProvider::new(&GeminiConfig::default(), "test-key".to_string()).unwrap();
        assert_eq!(provider.provider_name(), "google");
        assert_eq!(provider.model_name(), "gemini-2.5-flash");
    }

    #[test]
    fn test_empty_key_rejected() {
        let result = GoogleProvider::new(&GeminiConfig::default(), "  ".to_string());
        assert!(matches!(result, Err(ProviderError::InvalidCredential(_))));
    }

    #[test]
    fn test_generation_config_only_when_set() {
        let mut config = GeminiConfig::default();
        let plain = GoogleProvider::new(&config, "k".to_string()).unwrap();
        assert!(plain.request_body("hi").get("generationConfig").is_none());

        config.temperature = Some(0.5);
        let tuned = GoogleProvider::new(&config, "k".to_string()).unwrap();
        let body = tuned.request_body("hi");
        assert_eq!(body["generationConfig"]["temperature"], json!(0.5));
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hi");
    }

    #[tokio::test]
    async fn test_generate() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", PATH)
            .match_header("x-goog-api-key", "fake_api_key")
            .match_body(Matcher::PartialJson(json!({
                "contents": [{ "parts": [{ "text": "make dinner" }] }]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "candidates": [{
                        "content": { "parts": [{ "text": "part one, " }, { "text": "part two" }] }
                    }]
                }"#,
            )
            .create_async()
            .await;

        let text = provider(&server).generate("make dinner").await.unwrap();
        assert_eq!(text, "part one, part two");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", PATH)
            .with_status(429)
            .with_body(
                r#"{"error": {"code": 429, "message": "Too many requests", "status": "RESOURCE_EXHAUSTED"}}"#,
            )
            .create_async()
            .await;

        let err = provider(&server).generate("x").await.unwrap_err();
        assert!(matches!(err, ProviderError::RateLimited(ref m) if m.contains("Too many requests")));
    }

    #[tokio::test]
    async fn test_quota_exceeded() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", PATH)
            .with_status(429)
            .with_body(
                r#"{"error": {"code": 429, "message": "You exceeded your current quota", "status": "RESOURCE_EXHAUSTED"}}"#,
            )
            .create_async()
            .await;

        let err = provider(&server).generate("x").await.unwrap_err();
        assert!(matches!(err, ProviderError::QuotaExceeded(_)));
    }

    #[tokio::test]
    async fn test_invalid_key() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", PATH)
            .with_status(400)
            .with_body(
                r#"{"error": {"code": 400, "message": "API key not valid. Please pass a valid API key.",
                    "status": "INVALID_ARGUMENT", "details": [{"reason": "API_KEY_INVALID"}]}}"#,
            )
            .create_async()
            .await;

        let err = provider(&server).generate("x").await.unwrap_err();
        assert!(matches!(err, ProviderError::InvalidCredential(_)));
    }

    #[tokio::test]
    async fn test_other_api_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", PATH)
            .with_status(500)
            .with_body(r#"{"error": {"code": 500, "message": "Internal error", "status": "INTERNAL"}}"#)
            .create_async()
            .await;

        let err = provider(&server).generate("x").await.unwrap_err();
        assert_eq!(
            err,
            ProviderError::Failed("Google Gemini API error (500): Internal error".to_string())
        );
    }

    #[test]
    fn test_tagged_message_wins_over_status() {
        let forbidden = classify_api_error(
            StatusCode::FORBIDDEN,
            Some(&json!({"code": 403, "status": "PERMISSION_DENIED"})),
            "RATE_LIMIT: slow down",
        );
        assert_eq!(forbidden, ProviderError::RateLimited("slow down".to_string()));

        let too_many = classify_api_error(
            StatusCode::TOO_MANY_REQUESTS,
            None,
            "RATE_LIMIT: per-minute quota window",
        );
        assert_eq!(
            too_many,
            ProviderError::RateLimited("per-minute quota window".to_string())
        );

        let server_error =
            classify_api_error(StatusCode::INTERNAL_SERVER_ERROR, None, "INVALID_KEY: revoked");
        assert_eq!(server_error, ProviderError::InvalidCredential("revoked".to_string()));
    }

    #[tokio::test]
    async fn test_tagged_error_body() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", PATH)
            .with_status(401)
            .with_body(r#"{"error": {"code": 401, "message": "QUOTA_EXCEEDED: monthly limit"}}"#)
            .create_async()
            .await;

        let err = provider(&server).generate("x").await.unwrap_err();
        assert_eq!(err, ProviderError::QuotaExceeded("monthly limit".to_string()));
    }

    #[tokio::test]
    async fn test_non_json_error_body() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", PATH)
            .with_status(502)
            .with_body("Bad Gateway")
            .create_async()
            .await;

        let err = provider(&server).generate("x").await.unwrap_err();
        assert!(matches!(err, ProviderError::Failed(ref m) if m.contains("502")));
    }

    #[tokio::test]
    async fn test_blocked_prompt() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", PATH)
            .with_status(200)
            .with_body(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#)
            .create_async()
            .await;

        let err = provider(&server).generate("x").await.unwrap_err();
        assert!(matches!(err, ProviderError::Failed(ref m) if m.contains("SAFETY")));
    }
}
