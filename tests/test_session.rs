use leftover_recipe::{AppConfig, RecipeError, Session};
use mockito::{Matcher, Server};
use serde_json::json;
use std::path::Path;

fn gemini_reply(text: &str) -> String {
    json!({
        "candidates": [{ "content": { "parts": [{ "text": text }] } }]
    })
    .to_string()
}

fn config(storage_path: &Path, gemini_url: String, unsplash_url: String) -> AppConfig {
    let mut config = AppConfig {
        storage_path: storage_path.to_path_buf(),
        ..Default::default()
    };
    config.gemini.api_key = Some("config-key".to_string());
    config.gemini.base_url = Some(gemini_url);
    config.unsplash.base_url = Some(unsplash_url);
    config
}

#[tokio::test]
async fn test_generate_refine_and_favorite_across_sessions() {
    let mut gemini = Server::new_async().await;
    let unsplash = Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    let config = config(&path, gemini.url(), unsplash.url());

    let generate = gemini
        .mock("POST", "/v1beta/models/gemini-2.5-flash:generateContent")
        .match_body(Matcher::Regex("利用可能な食材".to_string()))
        .with_status(200)
        .with_body(gemini_reply(
            "```json\n[{\"title\": \"キャベツ炒め\"}, {\"title\": \"コールスロー\"}]\n```",
        ))
        .expect(1)
        .create_async()
        .await;
    let refine = gemini
        .mock("POST", "/v1beta/models/gemini-2.5-flash:generateContent")
        .match_body(Matcher::Regex("元のレシピ".to_string()))
        .with_status(200)
        .with_body(gemini_reply(r#"{"title": "ピリ辛コールスロー"}"#))
        .expect(1)
        .create_async()
        .await;

    let mut session = Session::from_config(&config).unwrap();
    assert!(session.service().is_ready());
    assert!(!session.images().has_access_key());

    session.add_ingredient("キャベツ").unwrap();
    session.set_constraint("time", "10").unwrap();

    let recipes = session.generate().await.unwrap();
    assert_eq!(recipes.len(), 2);
    assert!(session.image(0).is_none());

    let refined = session.refine(1, "辛くして").await.unwrap();
    assert_eq!(refined.title, "ピリ辛コールスロー");
    session.save_favorite(1).unwrap();

    generate.assert_async().await;
    refine.assert_async().await;

    let reopened = Session::from_config(&config).unwrap();
    assert!(reopened.recipes().is_empty());
    assert_eq!(reopened.ingredients().len(), 1);
    assert_eq!(reopened.constraints().cooking_time.as_str(), "10");
    let favorites = reopened.favorites();
    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0].recipe.title, "ピリ辛コールスロー");
}

#[tokio::test]
async fn test_stored_settings_win_over_config() {
    let mut gemini = Server::new_async().await;
    let unsplash = Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    let config = config(&path, gemini.url(), unsplash.url());

    {
        let mut session = Session::from_config(&config).unwrap();
        session.configure_credential("stored-key").unwrap();
        session.set_model("gemini-2.5-pro").unwrap();
        session.set_image_key("unsplash-key").unwrap();
        session.add_ingredient("卵").unwrap();
    }

    let mock = gemini
        .mock("POST", "/v1beta/models/gemini-2.5-pro:generateContent")
        .match_header("x-goog-api-key", "stored-key")
        .with_status(200)
        .with_body(gemini_reply(r#"[{"title": "茶碗蒸し"}]"#))
        .expect(1)
        .create_async()
        .await;

    let mut session = Session::from_config(&config).unwrap();
    assert_eq!(session.service().model(), "gemini-2.5-pro");
    assert!(session.images().has_access_key());

    // Image lookups fail against the empty server and are skipped
    let recipes = session.generate().await.unwrap();
    assert_eq!(recipes[0].title, "茶碗蒸し");
    assert!(session.image(0).is_none());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_model_change_reaches_requests_with_config_key() {
    let mut gemini = Server::new_async().await;
    let unsplash = Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();
    let config = config(&dir.path().join("state.json"), gemini.url(), unsplash.url());

    let old_model = gemini
        .mock("POST", "/v1beta/models/gemini-2.5-flash:generateContent")
        .expect(0)
        .create_async()
        .await;
    let new_model = gemini
        .mock("POST", "/v1beta/models/gemini-2.5-pro:generateContent")
        .match_header("x-goog-api-key", "config-key")
        .with_status(200)
        .with_body(gemini_reply(r#"[{"title": "卵かけご飯"}]"#))
        .expect(1)
        .create_async()
        .await;

    let mut session = Session::from_config(&config).unwrap();
    assert!(session.storage().api_key().is_none());
    session.add_ingredient("卵").unwrap();
    session.set_model("gemini-2.5-pro").unwrap();

    let recipes = session.generate().await.unwrap();
    assert_eq!(recipes[0].title, "卵かけご飯");
    new_model.assert_async().await;
    old_model.assert_async().await;
}

#[tokio::test]
async fn test_generate_without_ingredients_or_credential() {
    let gemini = Server::new_async().await;
    let unsplash = Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();
    let mut config = config(&dir.path().join("state.json"), gemini.url(), unsplash.url());
    config.gemini.api_key = None;

    let mut session = Session::from_config(&config).unwrap();
    let err = session.generate().await.unwrap_err();
    assert!(matches!(err, RecipeError::InvalidInput(_)));

    session.add_ingredient("卵").unwrap();
    session.delete_credential().unwrap();
    let err = session.generate().await.unwrap_err();
    assert!(matches!(err, RecipeError::NotConfigured));
}

#[tokio::test]
async fn test_corrupt_store_is_kept_aside() {
    let gemini = Server::new_async().await;
    let unsplash = Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    std::fs::write(&path, r#"{"favorite_recipes": [{"title": "A""#).unwrap();

    let mut session = Session::from_config(&config(&path, gemini.url(), unsplash.url())).unwrap();
    assert!(session.favorites().is_empty());
    session.add_ingredient("卵").unwrap();

    let backup = std::fs::read_to_string(dir.path().join("state.json.bak")).unwrap();
    assert!(backup.contains("favorite_recipes"));
}
