use leftover_recipe::{AppConfig, FileStore, Recipe, RecipeError, RefinePreset, Session};
use log::debug;
use std::env;
use tokio::io::{AsyncBufReadExt, BufReader};

const USAGE: &str = "Usage:
  leftover-recipe ingredients add <name> | remove <name> | list | clear
  leftover-recipe constraints show | set <field> <value>
  leftover-recipe settings set-key <key> | set-model <model> | set-image-key <key> | delete-key | show
  leftover-recipe favorites list | remove <title>
  leftover-recipe generate";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    let config = AppConfig::load()?;
    debug!("Using store at {}", config.storage_path.display());
    let mut session = Session::from_config(&config)?;

    match args.as_slice() {
        ["ingredients", rest @ ..] => ingredients(&mut session, rest)?,
        ["constraints", rest @ ..] => constraints(&mut session, rest)?,
        ["settings", rest @ ..] => settings(&mut session, rest)?,
        ["favorites", rest @ ..] => favorites(&mut session, rest)?,
        ["generate"] => generate(&mut session).await?,
        _ => return Err(USAGE.into()),
    }

    Ok(())
}

fn ingredients(
    session: &mut Session<FileStore>,
    args: &[&str],
) -> Result<(), Box<dyn std::error::Error>> {
    let list = match args {
        ["add", name @ ..] if !name.is_empty() => session.add_ingredient(&name.join(" "))?,
        ["remove", name @ ..] if !name.is_empty() => session.remove_ingredient(&name.join(" "))?,
        ["clear"] => {
            session.clear_ingredients()?;
            session.ingredients()
        }
        ["list"] | [] => session.ingredients(),
        _ => return Err(USAGE.into()),
    };

    if list.is_empty() {
        println!("No ingredients yet.");
    }
    for ingredient in list.iter() {
        println!("- {}", ingredient);
    }
    Ok(())
}

fn constraints(
    session: &mut Session<FileStore>,
    args: &[&str],
) -> Result<(), Box<dyn std::error::Error>> {
    let constraints = match args {
        ["set", field, value] => session.set_constraint(field, value)?,
        ["show"] | [] => session.constraints(),
        _ => return Err(USAGE.into()),
    };

    println!("cookingTime: {}", constraints.cooking_time.as_str());
    println!("difficulty:  {}", constraints.difficulty.as_str());
    println!("mealType:    {}", constraints.meal_type.as_str());
    println!("spiciness:   {}", constraints.spiciness.as_str());
    Ok(())
}

fn settings(
    session: &mut Session<FileStore>,
    args: &[&str],
) -> Result<(), Box<dyn std::error::Error>> {
    match args {
        ["set-key", key] => {
            session.configure_credential(key)?;
            println!("API key saved.");
        }
        ["set-model", model] => {
            session.set_model(model)?;
            println!("Model set to {}.", model);
        }
        ["set-image-key", key] => {
            session.set_image_key(key)?;
            println!("Image key saved.");
        }
        ["delete-key"] => {
            session.delete_credential()?;
            println!("API key deleted.");
        }
        ["show"] | [] => {
            let ready = if session.service().is_ready() {
                "configured"
            } else {
                "not configured"
            };
            println!("API key: {}", ready);
            println!("Model:   {}", session.service().model());
            println!(
                "Images:  {}",
                if session.images().has_access_key() {
                    "enabled"
                } else {
                    "disabled"
                }
            );
        }
        _ => return Err(USAGE.into()),
    }
    Ok(())
}

fn favorites(
    session: &mut Session<FileStore>,
    args: &[&str],
) -> Result<(), Box<dyn std::error::Error>> {
    match args {
        ["remove", title @ ..] if !title.is_empty() => {
            let removed = session.remove_favorite(&title.join(" "))?;
            println!("Removed {} favorite(s).", removed);
        }
        ["list"] | [] => {
            let favorites = session.favorites();
            if favorites.is_empty() {
                println!("No favorites yet.");
            }
            for favorite in favorites {
                println!(
                    "{} (saved {})",
                    favorite.recipe.title,
                    favorite.saved_at.format("%Y-%m-%d %H:%M")
                );
            }
        }
        _ => return Err(USAGE.into()),
    }
    Ok(())
}

async fn generate(session: &mut Session<FileStore>) -> Result<(), Box<dyn std::error::Error>> {
    println!("Generating recipes...");
    let count = session.generate().await.map_err(describe)?.len();
    for index in 0..count {
        print_summary(session, index);
    }

    let presets: Vec<&str> = RefinePreset::ALL.iter().map(|p| p.as_str()).collect();
    println!("\nCommands: refine <n> <instruction> | show <n> | save <n> | quit");
    println!(
        "Preset instructions: {} (or type your own)",
        presets.join(" | ")
    );
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let mut parts = line.splitn(3, ' ');
        let command = parts.next().unwrap_or_default();
        let index = parts
            .next()
            .and_then(|n| n.parse::<usize>().ok())
            .and_then(|n| n.checked_sub(1));

        let result = match (command, index) {
            ("quit", _) | ("exit", _) => break,
            ("", _) => Ok(()),
            ("show", Some(index)) => match session.recipes().get(index) {
                Some(recipe) => {
                    print_recipe(recipe);
                    if let Some(image) = session.image(index) {
                        println!("Photo: {} ({})", image.regular_url, image.attribution_name);
                    }
                    Ok(())
                }
                None => Err(RecipeError::InvalidInput(format!("No recipe {}", index + 1))),
            },
            ("save", Some(index)) => session.save_favorite(index).map(|_| {
                println!("Saved to favorites.");
            }),
            ("refine", Some(index)) => {
                let instruction = RefinePreset::expand(parts.next().unwrap_or_default());
                println!("Refining...");
                session.refine(index, instruction).await.map(|recipe| {
                    print_recipe(recipe);
                })
            }
            _ => Err(RecipeError::InvalidInput(format!("Unknown command: {}", line))),
        };

        if let Err(e) = result {
            eprintln!("{}", describe(e));
        }
    }

    Ok(())
}

/// User-facing message for each error kind
fn describe(error: RecipeError) -> String {
    match error {
        RecipeError::NotConfigured => {
            "No API key configured. Run `leftover-recipe settings set-key <key>` first.".to_string()
        }
        RecipeError::RateLimited(_) => {
            "Too many requests. Wait a moment and try again.".to_string()
        }
        RecipeError::QuotaExceeded(_) => {
            "The API quota has been used up. Check your plan or try again later.".to_string()
        }
        RecipeError::InvalidCredential(_) => {
            "The API key was rejected. Check it in settings.".to_string()
        }
        RecipeError::ParseFailed(_) => {
            "The reply could not be read as recipes. Please try again.".to_string()
        }
        other => other.to_string(),
    }
}

fn print_summary(session: &Session<FileStore>, index: usize) {
    if let Some(recipe) = session.recipes().get(index) {
        println!(
            "\n{}. {}  [{} / {}]",
            index + 1,
            recipe.title,
            recipe.cooking_time,
            recipe.difficulty
        );
        if !recipe.description.is_empty() {
            println!("   {}", recipe.description);
        }
    }
}

fn print_recipe(recipe: &Recipe) {
    println!("\n{}", recipe.title);
    if !recipe.description.is_empty() {
        println!("{}", recipe.description);
    }
    println!(
        "Time: {}  Difficulty: {}  Servings: {}",
        recipe.cooking_time, recipe.difficulty, recipe.servings
    );

    println!("\nIngredients:");
    for item in recipe.ingredients.iter().chain(recipe.seasonings.iter()) {
        println!("- {}", item);
    }

    println!("\nSteps:");
    for (i, step) in recipe.steps.iter().enumerate() {
        println!("{}. {}", i + 1, step);
    }

    if let Some(nutrition) = &recipe.nutrition {
        println!("\nNutrition: {} / {}", nutrition.calories, nutrition.protein);
        if let Some(notes) = &nutrition.notes {
            println!("{}", notes);
        }
    }
    if let Some(tips) = &recipe.tips {
        println!("\nTip: {}", tips);
    }
}
