//! Prompt for turning a free-text request plus filters into a recipe.

use crate::filters::RecipeFilters;

/// Prompt name, used to label AI calls in logs.
pub const GENERATE_RECIPE_PROMPT_NAME: &str = "generate_recipe";

/// System prompt: persona and the exact JSON shape we parse.
pub fn render_generate_recipe_system_prompt() -> String {
    r#"You are RecipeReady, a friendly home-cooking assistant. You turn whatever the user tells you (ingredients they have, a dish they crave, a meal they need) into one complete, practical recipe.

The user may write in any language. Write the recipe text in the user's language, but always keep the JSON keys in English.

Respond with a single JSON object only, no other text:
{
  "title": "string",
  "description": "one or two sentences",
  "ingredients": ["quantity + ingredient", "..."],
  "instructions": ["step", "..."],
  "servings": number,
  "prepTime": minutes as a number,
  "cookTime": minutes as a number,
  "difficulty": "easy" | "medium" | "hard",
  "cuisine": "string"
}"#
    .to_string()
}

/// User prompt: the request text plus every filter that isn't "any".
pub fn render_generate_recipe_user_prompt(input: &str, filters: &RecipeFilters) -> String {
    let preferences = filters
        .preferences()
        .into_iter()
        .map(|(name, value)| format!("- {}: {}", name, value))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"Request: {input}

Preferences:
{preferences}

Follow the preferences where they make sense for the request."#,
        input = input.trim(),
        preferences = preferences
    )
}
