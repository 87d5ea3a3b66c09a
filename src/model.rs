use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::RecipeError;

/// A single user-supplied food item. Never blank.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ingredient(String);

impl Ingredient {
    pub fn new(name: impl Into<String>) -> Result<Self, RecipeError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(RecipeError::InvalidInput(
                "Ingredient name cannot be empty".to_string(),
            ));
        }
        Ok(Ingredient(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Ingredient {
    type Error = RecipeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Ingredient::new(value)
    }
}

impl From<Ingredient> for String {
    fn from(ingredient: Ingredient) -> Self {
        ingredient.0
    }
}

impl fmt::Display for Ingredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered, duplicate-free list of ingredients
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IngredientList(Vec<Ingredient>);

impl IngredientList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an ingredient, rejecting blanks and duplicates
    pub fn add(&mut self, name: &str) -> Result<&Ingredient, RecipeError> {
        let ingredient = Ingredient::new(name)?;
        if self.0.contains(&ingredient) {
            return Err(RecipeError::InvalidInput(format!(
                "Ingredient '{}' has already been added",
                ingredient
            )));
        }
        self.0.push(ingredient);
        Ok(&self.0[self.0.len() - 1])
    }

    /// Remove an ingredient by name. Returns whether anything was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|i| i.as_str() != name.trim());
        self.0.len() != before
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ingredient> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Ingredient] {
        &self.0
    }
}

/// Maximum cooking time the user asks for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CookingTime {
    #[default]
    #[serde(rename = "any")]
    Any,
    #[serde(rename = "10")]
    Within10,
    #[serde(rename = "20")]
    Within20,
    #[serde(rename = "30")]
    Within30,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Any,
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    #[default]
    Any,
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

/// Spiciness has no "any" option; `Medium` is the neutral default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Spiciness {
    Mild,
    #[default]
    Medium,
    Spicy,
    VerySpicy,
}

impl CookingTime {
    /// Prompt label, or `None` when the value leaves the choice to the model
    pub fn label(&self) -> Option<&'static str> {
        match self {
            CookingTime::Any => None,
            CookingTime::Within10 => Some("10分以内"),
            CookingTime::Within20 => Some("20分以内"),
            CookingTime::Within30 => Some("30分以内"),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CookingTime::Any => "any",
            CookingTime::Within10 => "10",
            CookingTime::Within20 => "20",
            CookingTime::Within30 => "30",
        }
    }
}

impl Difficulty {
    pub fn label(&self) -> Option<&'static str> {
        match self {
            Difficulty::Any => None,
            Difficulty::Easy => Some("簡単"),
            Difficulty::Medium => Some("普通"),
            Difficulty::Hard => Some("上級"),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Any => "any",
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl MealType {
    pub fn label(&self) -> Option<&'static str> {
        match self {
            MealType::Any => None,
            MealType::Breakfast => Some("朝食"),
            MealType::Lunch => Some("昼食"),
            MealType::Dinner => Some("夕食"),
            MealType::Snack => Some("おやつ"),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Any => "any",
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
        }
    }
}

impl Spiciness {
    /// `None` for the neutral `Medium`
    pub fn label(&self) -> Option<&'static str> {
        match self {
            Spiciness::Mild => Some("辛くない"),
            Spiciness::Medium => None,
            Spiciness::Spicy => Some("辛い"),
            Spiciness::VerySpicy => Some("とても辛い"),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Spiciness::Mild => "mild",
            Spiciness::Medium => "medium",
            Spiciness::Spicy => "spicy",
            Spiciness::VerySpicy => "very-spicy",
        }
    }
}

macro_rules! impl_from_str {
    ($ty:ty, $field:literal, [$($variant:expr),+ $(,)?]) => {
        impl FromStr for $ty {
            type Err = RecipeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().to_lowercase();
                [$($variant),+]
                    .into_iter()
                    .find(|v| v.as_str() == wanted)
                    .ok_or_else(|| {
                        RecipeError::InvalidInput(format!("Unknown {} value: {}", $field, s))
                    })
            }
        }
    };
}

impl_from_str!(
    CookingTime,
    "cooking time",
    [
        CookingTime::Any,
        CookingTime::Within10,
        CookingTime::Within20,
        CookingTime::Within30
    ]
);
impl_from_str!(
    Difficulty,
    "difficulty",
    [
        Difficulty::Any,
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard
    ]
);
impl_from_str!(
    MealType,
    "meal type",
    [
        MealType::Any,
        MealType::Breakfast,
        MealType::Lunch,
        MealType::Dinner,
        MealType::Snack
    ]
);
impl_from_str!(
    Spiciness,
    "spiciness",
    [
        Spiciness::Mild,
        Spiciness::Medium,
        Spiciness::Spicy,
        Spiciness::VerySpicy
    ]
);

/// Ready-made refinement instructions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefinePreset {
    Healthier,
    KidFriendly,
    Spicier,
    Quicker,
}

impl RefinePreset {
    pub const ALL: [RefinePreset; 4] = [
        RefinePreset::Healthier,
        RefinePreset::KidFriendly,
        RefinePreset::Spicier,
        RefinePreset::Quicker,
    ];

    /// Instruction text sent to the model
    pub fn instruction(&self) -> &'static str {
        match self {
            RefinePreset::Healthier => "もっとヘルシーに",
            RefinePreset::KidFriendly => "子供向けに甘く",
            RefinePreset::Spicier => "辛くする",
            RefinePreset::Quicker => "時短にする",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RefinePreset::Healthier => "healthy",
            RefinePreset::KidFriendly => "kids",
            RefinePreset::Spicier => "spicy",
            RefinePreset::Quicker => "quick",
        }
    }

    /// The preset's instruction if `input` names one, otherwise `input` itself
    pub fn expand(input: &str) -> &str {
        match input.parse::<RefinePreset>() {
            Ok(preset) => preset.instruction(),
            Err(_) => input,
        }
    }
}

impl_from_str!(
    RefinePreset,
    "refine preset",
    [
        RefinePreset::Healthier,
        RefinePreset::KidFriendly,
        RefinePreset::Spicier,
        RefinePreset::Quicker
    ]
);

/// Generation preferences chosen by the user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraints {
    #[serde(default)]
    pub cooking_time: CookingTime,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub meal_type: MealType,
    #[serde(default)]
    pub spiciness: Spiciness,
}

impl Constraints {
    /// Set one field from its stored string form, e.g. `("mealType", "dinner")`
    pub fn set_field(&mut self, field: &str, value: &str) -> Result<(), RecipeError> {
        match field {
            "cookingTime" | "cooking-time" | "time" => self.cooking_time = value.parse()?,
            "difficulty" => self.difficulty = value.parse()?,
            "mealType" | "meal-type" | "meal" => self.meal_type = value.parse()?,
            "spiciness" | "spice" => self.spiciness = value.parse()?,
            other => {
                return Err(RecipeError::InvalidInput(format!(
                    "Unknown constraint: {}",
                    other
                )))
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nutrition {
    #[serde(default)]
    pub calories: String,
    #[serde(default)]
    pub protein: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// One model-generated recipe.
///
/// Text fields are free text as written by the model; nothing is validated
/// against the [`Constraints`] that produced it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cooking_time: String,
    #[serde(default)]
    pub difficulty: String,
    #[serde(default)]
    pub servings: String,
    #[serde(default)]
    pub seasonings: Vec<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutrition: Option<Nutrition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tips: Option<String>,
}

/// A recipe saved by the user, stamped with when it was saved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteRecipe {
    #[serde(flatten)]
    pub recipe: Recipe,
    pub saved_at: DateTime<Utc>,
}

impl FavoriteRecipe {
    pub fn now(recipe: Recipe) -> Self {
        FavoriteRecipe {
            recipe,
            saved_at: Utc::now(),
        }
    }
}
