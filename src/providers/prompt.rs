//! Prompt templates sent to the generative API.
//!
//! The JSON schema blocks live in `generate_format.txt` and `refine_format.txt`
//! and are embedded at compile time, so they can be edited without dealing with
//! Rust string syntax.

use crate::model::{Constraints, Ingredient, Recipe};

/// Schema block for a generation reply (an array of recipes)
pub const GENERATE_FORMAT: &str = include_str!("generate_format.txt");

/// Schema block for a refinement reply (a single recipe)
pub const REFINE_FORMAT: &str = include_str!("refine_format.txt");

/// Build the prompt asking for 3-5 recipes from the given ingredients.
///
/// Only constraint fields that differ from their neutral default are listed.
pub fn build_recipe_prompt(ingredients: &[Ingredient], constraints: &Constraints) -> String {
    let mut prompt = String::from(
        "あなたは経験豊富な料理人です。以下の食材と条件から、3〜5種類のユニークで美味しいレシピを提案してください。\n\n",
    );

    prompt.push_str("### 利用可能な食材:\n");
    for ingredient in ingredients {
        prompt.push_str(&format!("- {}\n", ingredient));
    }

    prompt.push_str("\n### 条件:\n");
    let conditions = [
        ("調理時間", constraints.cooking_time.label()),
        ("難易度", constraints.difficulty.label()),
        ("食事タイプ", constraints.meal_type.label()),
        ("辛さ", constraints.spiciness.label()),
    ];
    for (name, label) in conditions {
        if let Some(label) = label {
            prompt.push_str(&format!("- {}: {}\n", name, label));
        }
    }

    prompt.push_str("\n### 出力フォーマット:\n");
    prompt.push_str("各レシピについて、以下のJSON形式で出力してください（複数のレシピを配列として）:\n\n");
    prompt.push_str(GENERATE_FORMAT);
    prompt.push('\n');
    prompt.push_str("JSONコードブロック以外の説明は不要です。JSON配列のみを返してください。");

    prompt
}

/// Build the prompt asking the model to rewrite one recipe following `instruction`
pub fn build_refine_prompt(recipe: &Recipe, instruction: &str) -> String {
    let mut prompt = format!(
        "以下のレシピを「{}」という指示に従って修正してください。\n\n",
        instruction
    );

    prompt.push_str("### 元のレシピ:\n");
    prompt.push_str(&format!("**タイトル**: {}\n", recipe.title));
    prompt.push_str(&format!("**説明**: {}\n", recipe.description));
    prompt.push_str(&format!("**調理時間**: {}\n", recipe.cooking_time));
    prompt.push_str(&format!("**難易度**: {}\n\n", recipe.difficulty));

    prompt.push_str("**調味料**:\n");
    for seasoning in &recipe.seasonings {
        prompt.push_str(&format!("- {}\n", seasoning));
    }

    prompt.push_str("\n**食材**:\n");
    for ingredient in &recipe.ingredients {
        prompt.push_str(&format!("- {}\n", ingredient));
    }

    prompt.push_str("\n**手順**:\n");
    for (index, step) in recipe.steps.iter().enumerate() {
        prompt.push_str(&format!("{}. {}\n", index + 1, step));
    }

    prompt.push_str("\n### 出力フォーマット:\n");
    prompt.push_str("修正後のレシピを以下のJSON形式で出力してください:\n\n");
    prompt.push_str(REFINE_FORMAT);
    prompt.push('\n');
    prompt.push_str("JSONコードブロック以外の説明は不要です。JSONオブジェクトのみを返してください。");

    prompt
}
