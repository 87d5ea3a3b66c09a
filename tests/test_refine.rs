use leftover_recipe::{ErrorKind, Recipe, RecipeError, RecipeService};
use mockito::{Matcher, Server};
use serde_json::json;

fn gemini_reply(text: &str) -> String {
    json!({
        "candidates": [{ "content": { "parts": [{ "text": text }] } }]
    })
    .to_string()
}

fn original() -> Recipe {
    Recipe {
        title: "豚の生姜焼き".to_string(),
        description: "定番のおかず".to_string(),
        cooking_time: "20分".to_string(),
        difficulty: "簡単".to_string(),
        seasonings: vec!["醤油 大さじ2".to_string()],
        ingredients: vec!["豚肉 200g".to_string()],
        steps: vec!["焼く".to_string(), "タレを絡める".to_string()],
        ..Default::default()
    }
}

#[tokio::test]
async fn test_refine_with_custom_model() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1beta/models/gemini-2.5-pro:generateContent")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex("「もっとヘルシーに」".to_string()),
            Matcher::Regex("豚の生姜焼き".to_string()),
            Matcher::Regex("醤油 大さじ2".to_string()),
        ]))
        .with_status(200)
        .with_body(gemini_reply(
            "```json\n{\"title\": \"鶏むね肉の生姜焼き\", \"steps\": [\"蒸し焼きにする\"], \"nutrition\": {\"calories\": \"350kcal\", \"protein\": \"30g\"}}\n```",
        ))
        .expect(1)
        .create_async()
        .await;

    let service = RecipeService::builder()
        .api_key("test-key")
        .model("gemini-2.5-pro")
        .base_url(server.url())
        .build()
        .unwrap();
    let recipe = original();

    let refined = service
        .refine_recipe(&recipe, "もっとヘルシーに")
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(refined.title, "鶏むね肉の生姜焼き");
    assert_eq!(refined.nutrition.unwrap().calories, "350kcal");
    assert_eq!(recipe, original());
}

#[tokio::test]
async fn test_refine_array_reply_is_parse_failure() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1beta/models/gemini-2.5-flash:generateContent")
        .with_status(200)
        .with_body(gemini_reply(r#"[{"title": "A"}]"#))
        .create_async()
        .await;

    let service = RecipeService::builder()
        .api_key("test-key")
        .base_url(server.url())
        .build()
        .unwrap();

    let err = service.refine_recipe(&original(), "時短にする").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ParseFailed);
}

#[tokio::test]
async fn test_refine_blank_instruction_sends_nothing() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let service = RecipeService::builder()
        .api_key("test-key")
        .base_url(server.url())
        .build()
        .unwrap();

    let err = service.refine_recipe(&original(), " \n ").await.unwrap_err();
    assert!(matches!(err, RecipeError::InvalidInput(_)));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_blocked_prompt_is_generation_failure() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1beta/models/gemini-2.5-flash:generateContent")
        .with_status(200)
        .with_body(json!({"promptFeedback": {"blockReason": "SAFETY"}}).to_string())
        .create_async()
        .await;

    let service = RecipeService::builder()
        .api_key("test-key")
        .base_url(server.url())
        .build()
        .unwrap();

    let err = service.refine_recipe(&original(), "激辛に").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::GenerationFailed);
    assert!(err.to_string().contains("SAFETY"));
}
